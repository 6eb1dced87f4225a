use crate::core::{ConfigProvider, OutputFormat, Pipeline, Record, Storage, Table};
use crate::utils::error::{EtlError, Result};
use std::path::Path;
use std::sync::Arc;

pub struct KpiPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> KpiPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn read_record_file(path: &Path) -> Result<Vec<Record>> {
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;

        let mut records = Vec::new();
        match json {
            serde_json::Value::Array(items) => {
                for item in items {
                    if let serde_json::Value::Object(object) = item {
                        records.push(Record::from_object(object));
                    } else {
                        tracing::warn!("Ignoring non-object entry in {}", path.display());
                    }
                }
            }
            // 單一物件視為一筆記錄
            serde_json::Value::Object(object) => records.push(Record::from_object(object)),
            _ => {
                return Err(EtlError::ProcessingError {
                    message: format!(
                        "Expected a JSON object or array of objects in {}",
                        path.display()
                    ),
                });
            }
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for KpiPipeline<S, C> {
    async fn extract(&self) -> Result<Table> {
        let source_dir = self.config.source_dir();
        let pattern = Path::new(source_dir).join("*.json");
        let pattern = pattern.to_string_lossy().into_owned();

        tracing::debug!("Discovering input files with pattern: {}", pattern);

        // glob 以字母順序回傳，檔案順序因此是確定的
        let paths: Vec<_> = glob::glob(&pattern)
            .map_err(|e| EtlError::ProcessingError {
                message: format!("Invalid source pattern '{}': {}", pattern, e),
            })?
            .filter_map(|entry| entry.ok())
            .collect();

        if paths.is_empty() {
            tracing::error!("No JSON files found in source directory: {}", source_dir);
            return Ok(Table::new());
        }

        let mut records = Vec::new();
        for path in &paths {
            match Self::read_record_file(path) {
                Ok(mut batch) => records.append(&mut batch),
                Err(e) => {
                    // 壞掉的檔案跳過，其餘檔案照常處理
                    tracing::error!("Skipping malformed input file {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!(
            "Extracted {} records from {} files",
            records.len(),
            paths.len()
        );
        Ok(Table::from_records(records))
    }

    async fn transform(&self, table: &Table) -> Result<Table> {
        let value_field = self.config.value_field();
        let quantity_field = self.config.quantity_field();

        let mut records = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for record in &table.records {
            let total = match compute_total(record, value_field, quantity_field) {
                Some(total) => total,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            // 複製一份再加上衍生欄位，輸入的 Table 保持原樣
            let mut data = record.data.clone();
            data.insert("Total".to_string(), total);
            records.push(Record { data });
        }

        if skipped > 0 {
            tracing::warn!(
                "Skipped {} records without numeric '{}' and '{}' fields",
                skipped,
                value_field,
                quantity_field
            );
        }

        Ok(Table::from_records(records))
    }

    async fn load(&self, table: &Table) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for name in self.config.output_formats() {
            let format = match OutputFormat::parse(name) {
                Some(format) => format,
                None => {
                    tracing::error!("Unsupported output format: {}", name);
                    continue;
                }
            };

            let bytes = match format {
                OutputFormat::Csv => table_to_csv(table)?,
                OutputFormat::Parquet => {
                    if table.columns().is_empty() {
                        // Parquet 無法表示零欄位的 schema
                        tracing::warn!("No columns to write, skipping Parquet output");
                        continue;
                    }
                    table_to_parquet(table)?
                }
            };

            self.storage.write_file(format.output_file(), &bytes).await?;
            tracing::info!("Data saved as {}", format.label());

            let output = Path::new(self.config.output_path()).join(format.output_file());
            written.push(output.to_string_lossy().into_owned());
        }

        Ok(written)
    }
}

/// Total = 單價 × 數量；兩個都是整數時維持整數，否則以浮點數相乘
fn compute_total(record: &Record, value_field: &str, quantity_field: &str) -> Option<serde_json::Value> {
    let value = record.data.get(value_field)?;
    let quantity = record.data.get(quantity_field)?;

    if let (Some(value), Some(quantity)) = (value.as_i64(), quantity.as_i64()) {
        return Some(serde_json::Value::from(value * quantity));
    }

    let value = value.as_f64()?;
    let quantity = quantity.as_f64()?;
    serde_json::Number::from_f64(value * quantity).map(serde_json::Value::Number)
}

fn value_to_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn table_to_csv(table: &Table) -> Result<Vec<u8>> {
    let columns = table.columns();
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    // 標頭列是排序後的欄位名稱，沒有序號欄
    writer.write_record(&columns)?;

    for record in &table.records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                record
                    .data
                    .get(column)
                    .map(value_to_cell)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })
}

enum ColumnType {
    Int,
    Float,
    Text,
}

fn infer_column_type(table: &Table, column: &str) -> ColumnType {
    let mut seen_number = false;
    let mut seen_float = false;

    for record in &table.records {
        match record.data.get(column) {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::Number(number)) => {
                seen_number = true;
                if !number.is_i64() {
                    seen_float = true;
                }
            }
            Some(_) => return ColumnType::Text,
        }
    }

    if seen_float {
        ColumnType::Float
    } else if seen_number {
        ColumnType::Int
    } else {
        ColumnType::Text
    }
}

fn table_to_parquet(table: &Table) -> Result<Vec<u8>> {
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    let columns = table.columns();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for column in &columns {
        match infer_column_type(table, column) {
            ColumnType::Int => {
                let values: Vec<Option<i64>> = table
                    .records
                    .iter()
                    .map(|record| record.data.get(column).and_then(|v| v.as_i64()))
                    .collect();
                fields.push(Field::new(column.as_str(), DataType::Int64, true));
                arrays.push(Arc::new(Int64Array::from(values)));
            }
            ColumnType::Float => {
                let values: Vec<Option<f64>> = table
                    .records
                    .iter()
                    .map(|record| record.data.get(column).and_then(|v| v.as_f64()))
                    .collect();
                fields.push(Field::new(column.as_str(), DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(values)));
            }
            ColumnType::Text => {
                let values: Vec<Option<String>> = table
                    .records
                    .iter()
                    .map(|record| match record.data.get(column) {
                        None | Some(serde_json::Value::Null) => None,
                        Some(value) => Some(value_to_cell(value)),
                    })
                    .collect();
                fields.push(Field::new(column.as_str(), DataType::Utf8, true));
                arrays.push(Arc::new(StringArray::from(values)));
            }
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ArrowWriter::try_new(&mut cursor, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;
    }

    Ok(cursor.into_inner())
}
