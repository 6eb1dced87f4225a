use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: object.into_iter().collect(),
        }
    }
}

/// 一批記錄加上推導出來的欄位集合
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub records: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 欄位 = 所有記錄欄位名稱的聯集，依名稱排序
    /// 缺少的欄位在序列化時視為空值
    pub fn columns(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|record| record.data.keys().map(String::as_str))
            .collect();

        names.into_iter().map(String::from).collect()
    }
}

/// 支援的輸出格式，固定只有兩種
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "csv" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Parquet => "Parquet",
        }
    }

    pub fn output_file(&self) -> &'static str {
        match self {
            Self::Csv => "dados_transformados.csv",
            Self::Parquet => "dados_transformados.parquet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        Record {
            data: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_columns_are_sorted_union() {
        let table = Table::from_records(vec![
            record(&[("Venda", 10.into()), ("Quantidade", 3.into())]),
            record(&[("Venda", 5.into()), ("Regiao", "Sul".into())]),
        ]);

        assert_eq!(table.columns(), vec!["Quantidade", "Regiao", "Venda"]);
    }

    #[test]
    fn test_empty_table_has_no_columns() {
        let table = Table::new();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("csv"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::parse("parquet"), Some(OutputFormat::Parquet));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(OutputFormat::parse("CSV"), None);
    }

    #[test]
    fn test_output_format_file_names() {
        assert_eq!(OutputFormat::Csv.output_file(), "dados_transformados.csv");
        assert_eq!(
            OutputFormat::Parquet.output_file(),
            "dados_transformados.parquet"
        );
    }
}
