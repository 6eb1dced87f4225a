pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_path, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "vendas-etl")]
#[command(about = "A small ETL tool for computing sales KPIs from JSON batches")]
pub struct CliConfig {
    /// Directory containing the JSON record files
    #[arg(long, default_value = "data")]
    pub source_dir: String,

    /// Directory where output files are written
    #[arg(long, default_value = ".")]
    pub output_path: String,

    /// Output formats, processed in the order given
    #[arg(long, value_delimiter = ',', default_values_t = ["csv".to_string(), "parquet".to_string()])]
    pub formats: Vec<String>,

    /// Field holding the unit sale value
    #[arg(long, default_value = "Venda")]
    pub value_field: String,

    /// Field holding the quantity sold
    #[arg(long, default_value = "Quantidade")]
    pub quantity_field: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_dir(&self) -> &str {
        &self.source_dir
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn value_field(&self) -> &str {
        &self.value_field
    }

    fn quantity_field(&self) -> &str {
        &self.quantity_field
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validate_path("source_dir", &self.source_dir)?;
        validate_path("output_path", &self.output_path)?;
        // 未知的格式名稱留給 Loader 處理，不在這裡擋下
        validate_non_empty_list("formats", &self.formats)?;
        validate_non_empty_string("value_field", &self.value_field)?;
        validate_non_empty_string("quantity_field", &self.quantity_field)?;
        Ok(())
    }
}
