#[cfg(feature = "cli")]
pub mod cli;
pub mod resolver;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub use resolver::ResolvedConfig;

/// 設定檔內容。`source` 與 `destination` 皆相對於設定檔所在目錄。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub delimiter: Option<String>,
    pub error_handling: Option<ErrorHandlingConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_transform_error: Option<RowErrorPolicy>,
    pub quarantine_path: Option<String>,
}

/// 資料列轉換失敗時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// 任一值轉換失敗即中止整批
    #[default]
    Fail,
    /// 將失敗的資料列隔離，其餘繼續處理
    Quarantine,
}

impl EtlConfig {
    /// 從設定檔載入配置，`.toml` 用 TOML 解析，其他一律視為 JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };

        parsed.map_err(|message| EtlError::ConfigError {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json_str(content: &str) -> std::result::Result<Self, String> {
        let processed = substitute_env_vars(content);
        serde_json::from_str(&processed).map_err(|e| format!("JSON parsing error: {}", e))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, String> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| format!("TOML parsing error: {}", e))
    }

    pub fn source(&self) -> Result<&str> {
        validation::validate_required_field("source", &self.source).map(String::as_str)
    }

    pub fn destination(&self) -> Result<&str> {
        validation::validate_required_field("destination", &self.destination).map(String::as_str)
    }

    pub fn delimiter(&self) -> Result<u8> {
        match &self.delimiter {
            Some(delimiter) => validation::validate_delimiter("delimiter", delimiter),
            None => Ok(b','),
        }
    }

    pub fn row_error_policy(&self) -> RowErrorPolicy {
        self.error_handling
            .as_ref()
            .and_then(|eh| eh.on_transform_error)
            .unwrap_or_default()
    }

    pub fn quarantine_path(&self) -> Option<&str> {
        self.error_handling
            .as_ref()
            .and_then(|eh| eh.quarantine_path.as_deref())
    }
}

impl Validate for EtlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("source", self.source()?)?;
        validation::validate_path("destination", self.destination()?)?;
        self.delimiter()?;

        if let Some(quarantine) = self.quarantine_path() {
            validation::validate_path("error_handling.quarantine_path", quarantine)?;
            if self.row_error_policy() == RowErrorPolicy::Fail {
                tracing::warn!(
                    "⚠️ error_handling.quarantine_path is set but on_transform_error is \"fail\"; no rows will be quarantined"
                );
            }
        }

        Ok(())
    }
}

/// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}
