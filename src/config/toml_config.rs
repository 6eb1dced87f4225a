use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_list, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub value_field: Option<String>,
    pub quantity_field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SOURCE_DIR})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("source.path", &self.source.path)?;
        validate_path("load.output_path", &self.load.output_path)?;

        // 格式名稱本身不在這裡驗證，讓 Loader 對未知格式記錄並跳過
        validate_non_empty_list("load.output_formats", &self.load.output_formats)?;

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source_dir(&self) -> &str {
        &self.source.path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn value_field(&self) -> &str {
        self.transform.value_field.as_deref().unwrap_or("Venda")
    }

    fn quantity_field(&self) -> &str {
        self.transform
            .quantity_field
            .as_deref()
            .unwrap_or("Quantidade")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "vendas-kpi"
description = "Sales KPI pipeline"
version = "1.0.0"

[source]
type = "directory"
path = "data"

[transform]
value_field = "Venda"
quantity_field = "Quantidade"

[load]
output_path = "."
output_formats = ["csv", "parquet"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "vendas-kpi");
        assert_eq!(config.source_dir(), "data");
        assert_eq!(config.value_field(), "Venda");
        assert_eq!(config.output_formats(), ["csv", "parquet"]);
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_field_names_default_when_omitted() {
        let toml_content = r#"
[pipeline]
name = "defaults"
description = "defaults"
version = "1.0"

[source]
type = "directory"
path = "data"

[transform]

[load]
output_path = "."
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.value_field(), "Venda");
        assert_eq!(config.quantity_field(), "Quantidade");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_VENDAS_SOURCE", "/tmp/vendas");

        let toml_content = r#"
[pipeline]
name = "env"
description = "env"
version = "1.0"

[source]
type = "directory"
path = "${TEST_VENDAS_SOURCE}"

[transform]

[load]
output_path = "."
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.path, "/tmp/vendas");

        std::env::remove_var("TEST_VENDAS_SOURCE");
    }

    #[test]
    fn test_config_validation_rejects_empty_formats() {
        let toml_content = r#"
[pipeline]
name = "invalid"
description = "invalid"
version = "1.0"

[source]
type = "directory"
path = "data"

[transform]

[load]
output_path = "."
output_formats = []
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_names_pass_validation() {
        // 未知格式由 Loader 跳過，配置驗證不應該擋下
        let toml_content = r#"
[pipeline]
name = "loose"
description = "loose"
version = "1.0"

[source]
type = "directory"
path = "data"

[transform]

[load]
output_path = "."
output_formats = ["csv", "xml"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
description = "File test"
version = "1.0"

[source]
type = "directory"
path = "data"

[transform]

[load]
output_path = "."
output_formats = ["csv"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}
