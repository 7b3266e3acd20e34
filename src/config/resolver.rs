use super::{EtlConfig, RowErrorPolicy};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use std::path::{Component, Path, PathBuf};

/// 解析完成的設定：原始配置加上以設定檔目錄為基準的絕對路徑
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub config: EtlConfig,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub quarantine: Option<PathBuf>,
    pub delimiter: u8,
    pub row_error_policy: RowErrorPolicy,
}

impl ResolvedConfig {
    /// 載入並驗證設定檔，然後把相對路徑解析成絕對路徑。
    ///
    /// 路徑以設定檔所在目錄為基準，而不是行程的工作目錄，
    /// 因此設定檔與資料檔一起搬移後仍然有效。
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let requested = config_path.as_ref();
        let config_path = requested.canonicalize().map_err(|e| EtlError::ConfigError {
            path: requested.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!("Loading configuration from {}", config_path.display());
        let config = EtlConfig::from_file(&config_path)?;
        Self::from_config(config_path, config)
    }

    /// `config_path` 必須是絕對路徑
    pub fn from_config(config_path: PathBuf, config: EtlConfig) -> Result<Self> {
        config.validate()?;

        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let source = resolve_relative(&base_dir, config.source()?);
        let destination = resolve_relative(&base_dir, config.destination()?);
        let quarantine = config
            .quarantine_path()
            .map(|path| resolve_relative(&base_dir, path));

        Ok(Self {
            delimiter: config.delimiter()?,
            row_error_policy: config.row_error_policy(),
            config_path,
            config,
            source,
            destination,
            quarantine,
        })
    }
}

/// 以 `base_dir` 為基準拼接路徑並做字面正規化 (處理 `.` 與 `..`)。
/// 不存取檔案系統，來源或目的地此時不需要存在。
pub fn resolve_relative(base_dir: &Path, relative: &str) -> PathBuf {
    normalize(&base_dir.join(relative))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // 已在根目錄時 `..` 不再往上
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
