use crate::config::{ResolvedConfig, RowErrorPolicy};
use crate::core::{codec, transform};
use crate::domain::model::{RecordSet, TransformResult};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// 讀取來源 CSV、套用欄位改寫、寫出目的地 CSV
pub struct CsvPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) settings: ResolvedConfig,
}

impl<S: Storage> CsvPipeline<S> {
    pub fn new(storage: S, settings: ResolvedConfig) -> Self {
        Self { storage, settings }
    }

    pub fn settings(&self) -> &ResolvedConfig {
        &self.settings
    }

    async fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| EtlError::LoadError {
            path: path.to_path_buf(),
            message: "path has no parent directory".to_string(),
        })?;

        if !self.storage.is_dir(parent).await {
            return Err(EtlError::LoadError {
                path: path.to_path_buf(),
                message: format!("directory {} does not exist", parent.display()),
            });
        }
        Ok(())
    }

    async fn write_output(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.storage
            .write_file(path, data)
            .await
            .map_err(|e| EtlError::LoadError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CsvPipeline<S> {
    async fn extract(&self) -> Result<RecordSet> {
        let source = &self.settings.source;
        tracing::info!("📥 Extracting data from {}", source.display());

        let data = self
            .storage
            .read_file(source)
            .await
            .map_err(|e| EtlError::ExtractionError {
                path: source.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!("Read {} bytes from source", data.len());

        let records =
            codec::parse_csv(&data, self.settings.delimiter).map_err(|message| {
                EtlError::ExtractionError {
                    path: source.clone(),
                    message,
                }
            })?;

        tracing::info!(
            "📊 Extracted {} records with {} columns",
            records.len(),
            records.headers.len()
        );
        Ok(records)
    }

    async fn transform(&self, data: RecordSet) -> Result<TransformResult> {
        tracing::info!("🔧 Transforming {} records", data.len());

        let result = transform::transform_records(data, self.settings.row_error_policy)?;

        for rejection in &result.rejected {
            tracing::warn!(
                line = rejection.record.line,
                "⚠️ Quarantined record: {}",
                rejection.reason
            );
        }
        tracing::info!(
            "✅ Transformed {} records ({} quarantined)",
            result.records.len(),
            result.rejected.len()
        );
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<PathBuf> {
        let destination = &self.settings.destination;
        let delimiter = self.settings.delimiter;

        let output = codec::render_csv(&result.records, delimiter).map_err(|message| {
            EtlError::LoadError {
                path: destination.clone(),
                message,
            }
        })?;

        let quarantine = match (self.settings.row_error_policy, &self.settings.quarantine) {
            (RowErrorPolicy::Quarantine, Some(path)) => {
                let rejected =
                    codec::render_rejected(&result.source_headers, &result.rejected, delimiter)
                        .map_err(|message| EtlError::LoadError {
                            path: path.clone(),
                            message,
                        })?;
                Some((path, rejected))
            }
            _ => None,
        };

        // 兩個輸出檔的目錄都確認存在後才開始寫入
        self.ensure_parent_dir(destination).await?;
        if let Some((path, _)) = &quarantine {
            self.ensure_parent_dir(path).await?;
        }

        // 目的地檔案若已存在會直接覆寫
        tracing::debug!("Writing {} bytes to destination", output.len());
        self.write_output(destination, &output).await?;
        tracing::info!(
            "💾 Loaded {} records into {}",
            result.records.len(),
            destination.display()
        );

        if let Some((path, rejected)) = quarantine {
            self.write_output(path, &rejected).await?;
            tracing::info!(
                "🗂️ Wrote {} quarantined records to {}",
                result.rejected.len(),
                path.display()
            );
        }

        Ok(destination.clone())
    }
}
