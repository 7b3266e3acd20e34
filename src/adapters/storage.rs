use crate::domain::ports::Storage;
use std::io;
use std::path::Path;

/// 本機檔案系統。路徑在設定解析階段已轉為絕對路徑，這裡不再拼接。
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        // 不自動建立父目錄：目的地目錄不存在屬於載入錯誤
        tokio::fs::write(path, data).await
    }

    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let storage = LocalStorage::new();

        storage.write_file(&path, b"a,b\n1,2\n").await.unwrap();
        assert_eq!(storage.read_file(&path).await.unwrap(), b"a,b\n1,2\n");
        assert!(storage.is_dir(temp_dir.path()).await);
        assert!(!storage.is_dir(&path).await);
    }

    #[tokio::test]
    async fn test_write_does_not_create_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.csv");

        let err = LocalStorage::new().write_file(&path, b"x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!temp_dir.path().join("missing").exists());
    }
}
