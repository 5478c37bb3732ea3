//! 全局错误类型定义
use std::io::Error as IoError;
use std::time::Duration;

use rshostlist_engine::CoreError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

/// 本地文件读取失败的细分类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemErrorKind {
    NotFound,
    PermissionDenied,
    Other,
}

impl From<std::io::ErrorKind> for FileSystemErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::NotFound => FileSystemErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => FileSystemErrorKind::PermissionDenied,
            _ => FileSystemErrorKind::Other,
        }
    }
}

#[derive(Error, Debug)]
pub enum CompilerError {
    // 网络相关错误
    #[error("Network error fetching {url}: {message}")]
    NetworkError {
        url: String,
        /// HTTP 状态码（连接层失败时为空）
        status: Option<u16>,
        message: String,
        retryable: bool,
    },
    #[error("Request to {url} timed out after {timeout:?}")]
    TimeoutError { url: String, timeout: Duration },

    // 本地文件错误
    #[error("Failed to read {path} ({kind:?}): {message}")]
    FileSystemError {
        path: String,
        kind: FileSystemErrorKind,
        message: String,
    },

    // 内容错误
    #[error("Source {source_id} returned empty content")]
    EmptyContent { source_id: String },
    #[error("Preprocessor error in {source_id} at line {line}: {message}")]
    PreprocessorError {
        source_id: String,
        line: usize,
        message: String,
    },

    // 配置错误
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    // 内核错误（解析 / 过滤器 / 格式化）
    #[error(transparent)]
    Core(#[from] CoreError),

    // 序列化/反序列化错误
    #[error("JSON parse failed: {0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO operation failed: {0}")]
    IoError(#[from] IoError),
    #[error("URL parse failed: {0}")]
    UrlError(#[from] UrlParseError),

    #[error("Async task failed: {0}")]
    AsyncTaskError(String),
}

impl CompilerError {
    /// 是否值得重试：5xx / 429 / 超时 / 连接层失败
    pub fn is_retryable(&self) -> bool {
        match self {
            CompilerError::NetworkError { retryable, .. } => *retryable,
            CompilerError::TimeoutError { .. } => true,
            _ => false,
        }
    }

    /// 超时归类为网络错误
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CompilerError::NetworkError { .. } | CompilerError::TimeoutError { .. }
        )
    }

    /// 由 HTTP 状态码构造网络错误
    pub fn from_status(url: impl Into<String>, status: u16, status_text: &str) -> Self {
        CompilerError::NetworkError {
            url: url.into(),
            status: Some(status),
            message: format!("HTTP {} {}", status, status_text).trim_end().to_string(),
            retryable: status >= 500 || status == 429,
        }
    }

    /// 由 IO 错误构造文件系统错误
    pub fn from_io(path: impl Into<String>, err: &IoError) -> Self {
        CompilerError::FileSystemError {
            path: path.into(),
            kind: err.kind().into(),
            message: err.to_string(),
        }
    }
}

// 全局Result类型
pub type CompilerResult<T> = Result<T, CompilerError>;
