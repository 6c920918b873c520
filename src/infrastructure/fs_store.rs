//! 文件系统操作

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{ScrapeError, ScrapeResult};

/// 目录不存在时创建（包括父目录）
pub async fn ensure_directory(path: &Path) -> ScrapeResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| ScrapeError::io(path, e))
}

/// 写入文件，已存在则覆盖
pub async fn write_file(path: &Path, bytes: &[u8]) -> ScrapeResult<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| ScrapeError::io(path, e))
}

/// 以追加方式写入一段文本（调用方负责串行化）
pub async fn append_line(path: &Path, text: &str) -> ScrapeResult<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| ScrapeError::io(path, e))?;

    file.write_all(text.as_bytes())
        .await
        .map_err(|e| ScrapeError::io(path, e))?;
    file.flush().await.map_err(|e| ScrapeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory(&nested).await.unwrap();
        ensure_directory(&nested).await.unwrap();

        let file = nested.join("doc.pdf");
        write_file(&file, b"first version").await.unwrap();
        write_file(&file, b"second").await.unwrap();
        assert_eq!(std::fs::read(&file).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing").join("doc.pdf");

        let err = write_file(&file, b"x").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Io { .. }));
    }
}
