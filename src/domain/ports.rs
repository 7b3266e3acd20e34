use crate::domain::model::{RecordSet, TransformResult};
use std::io;
use std::path::{Path, PathBuf};

/// 檔案存取介面。回傳 `io::Result`，由呼叫端依所在階段轉成對應的錯誤分類。
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = io::Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = io::Result<()>> + Send;
    fn is_dir(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
}

#[async_trait::async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> crate::Result<RecordSet>;
    async fn transform(&self, data: RecordSet) -> crate::Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> crate::Result<PathBuf>;
}
