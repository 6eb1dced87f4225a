use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    DataProcessing,
    Serialization,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ProcessingError { .. } => ErrorCategory::DataProcessing,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ArrowError(_)
            | Self::ParquetError(_) => ErrorCategory::Serialization,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::DataProcessing => ErrorSeverity::Medium,
            ErrorCategory::Serialization => ErrorSeverity::High,
            // 磁碟或權限問題，無法在流程內恢復
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration values and run again with --verbose for details"
            }
            ErrorCategory::DataProcessing => {
                "Inspect the input files in the source directory for unexpected shapes"
            }
            ErrorCategory::Serialization => {
                "Verify the extracted records contain serializable scalar values"
            }
            ErrorCategory::System => {
                "Check disk space and file permissions on the output directory"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(source) => format!("A file operation failed: {}", source),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem with '{}': {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem with '{}': {}", field, reason)
            }
            other => format!("ETL process failed: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
