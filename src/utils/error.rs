use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error in '{}': {message}", path.display())]
    ConfigError { path: PathBuf, message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Extraction error reading '{}': {message}", path.display())]
    ExtractionError { path: PathBuf, message: String },

    #[error("Transform error: required column '{column}' is missing")]
    MissingColumnError { column: String },

    #[error("Transform error at line {line}, column '{column}' (value '{value}'): {reason}")]
    TransformError {
        column: String,
        line: u64,
        value: String,
        reason: String,
    },

    #[error("Load error writing '{}': {message}", path.display())]
    LoadError { path: PathBuf, message: String },
}

/// 錯誤分類，對應 ETL 的各個階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Extraction,
    Transform,
    Load,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::ExtractionError { .. } => ErrorCategory::Extraction,
            EtlError::MissingColumnError { .. } | EtlError::TransformError { .. } => {
                ErrorCategory::Transform
            }
            EtlError::LoadError { .. } => ErrorCategory::Load,
        }
    }

    /// 每個錯誤分類對應一個獨立的退出碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Extraction => 3,
            ErrorCategory::Transform => 4,
            ErrorCategory::Load => 5,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ConfigError { .. } => {
                "Check that the config file exists and is valid JSON or TOML"
            }
            EtlError::MissingConfigError { .. } => {
                "Add the missing key to the config file ('source' and 'destination' are required)"
            }
            EtlError::InvalidConfigValueError { .. } => "Fix the reported value in the config file",
            EtlError::ExtractionError { .. } => {
                "Make sure the source file exists, is readable and is well-formed CSV"
            }
            EtlError::MissingColumnError { .. } => {
                "The source file must contain the columns Customer ID, Age, Date, Price per Unit, Total Amount and Gender"
            }
            EtlError::TransformError { .. } => {
                "Fix the offending value in the source file, or set error_handling.on_transform_error = \"quarantine\""
            }
            EtlError::LoadError { .. } => {
                "Make sure the destination directory exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ConfigError { path, .. } => {
                format!("Could not load configuration from {}", path.display())
            }
            EtlError::MissingConfigError { field } => {
                format!("The configuration does not define '{}'", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            EtlError::ExtractionError { path, .. } => {
                format!("Could not read source data from {}", path.display())
            }
            EtlError::MissingColumnError { column } => {
                format!("Source data has no '{}' column", column)
            }
            EtlError::TransformError {
                column, line, value, ..
            } => format!(
                "Value '{}' in column '{}' (line {}) could not be converted",
                value, column, line
            ),
            EtlError::LoadError { path, .. } => {
                format!("Could not write output to {}", path.display())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
