//! 内容获取：HTTP / 文件系统能力抽象 + 带重试的获取器 + include 路径解析

pub mod acquirer;
pub mod fs;
pub mod http;
pub mod path;

#[cfg(test)]
pub(crate) mod mock;

pub use acquirer::ContentAcquirer;
pub use fs::{FileSystem, MemoryFileSystem, TokioFileSystem};
pub use http::{FetchOptions, HttpClient, HttpResponse, ReqwestHttpClient};
pub use path::{is_remote, resolve_include_path};
