//! 文件系统能力抽象：tokio 实现 + 内存实现

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CompilerError, CompilerResult, FileSystemErrorKind};

/// 文件系统能力
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_text_file(&self, path: &str) -> CompilerResult<String>;
    async fn write_text_file(&self, path: &str, text: &str) -> CompilerResult<()>;
    async fn exists(&self, path: &str) -> bool;
}

/// 本地磁盘（tokio::fs）
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn read_text_file(&self, path: &str) -> CompilerResult<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CompilerError::from_io(path, &e))
    }

    async fn write_text_file(&self, path: &str, text: &str) -> CompilerResult<()> {
        tokio::fs::write(path, text)
            .await
            .map_err(|e| CompilerError::from_io(path, &e))
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// 内存文件系统（嵌入场景 / 测试）
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<String, String>>,
    denied: RwLock<HashSet<String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置文件
    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.get_mut().insert(path.into(), text.into());
        self
    }

    /// 预置一个无读权限的路径
    pub fn with_denied(mut self, path: impl Into<String>) -> Self {
        self.denied.get_mut().insert(path.into());
        self
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read_text_file(&self, path: &str) -> CompilerResult<String> {
        if self.denied.read().await.contains(path) {
            return Err(CompilerError::FileSystemError {
                path: path.to_string(),
                kind: FileSystemErrorKind::PermissionDenied,
                message: "permission denied".to_string(),
            });
        }
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| CompilerError::FileSystemError {
                path: path.to_string(),
                kind: FileSystemErrorKind::NotFound,
                message: "no such file".to_string(),
            })
    }

    async fn write_text_file(&self, path: &str, text: &str) -> CompilerResult<()> {
        self.files.write().await.insert(path.to_string(), text.to_string());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.read().await.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fs() {
        let fs = MemoryFileSystem::new()
            .with_file("/lists/a.txt", "||a.example.org^")
            .with_denied("/lists/secret.txt");

        assert_eq!(fs.read_text_file("/lists/a.txt").await.unwrap(), "||a.example.org^");
        assert!(fs.exists("/lists/a.txt").await);
        assert!(matches!(
            fs.read_text_file("/lists/missing.txt").await,
            Err(CompilerError::FileSystemError { kind: FileSystemErrorKind::NotFound, .. })
        ));
        assert!(matches!(
            fs.read_text_file("/lists/secret.txt").await,
            Err(CompilerError::FileSystemError { kind: FileSystemErrorKind::PermissionDenied, .. })
        ));

        fs.write_text_file("/out.txt", "x").await.unwrap();
        assert!(fs.exists("/out.txt").await);
    }

    #[tokio::test]
    async fn test_tokio_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        let path = path.to_str().unwrap();

        let fs = TokioFileSystem;
        assert!(!fs.exists(path).await);
        fs.write_text_file(path, "||example.org^\n").await.unwrap();
        assert!(fs.exists(path).await);
        assert_eq!(fs.read_text_file(path).await.unwrap(), "||example.org^\n");

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            fs.read_text_file(missing.to_str().unwrap()).await,
            Err(CompilerError::FileSystemError { kind: FileSystemErrorKind::NotFound, .. })
        ));
    }
}
