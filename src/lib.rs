//! rshostlist - 过滤列表编译器
//! 下载 adblock / `/etc/hosts` 规则源，展开预处理指令，执行固定顺序的转换流水线，
//! 并渲染为 hosts / dnsmasq / Pi-hole / Unbound / JSON / DoH 等目标格式

pub mod compiler;
pub mod config;
pub mod error;
pub mod fetch;
pub mod preprocessor;

// 导出全局错误类型
pub use self::error::{CompilerError, CompilerResult, FileSystemErrorKind};

// 导出配置模块核心结构体与构建器
pub use crate::config::{
    CompilerOptions, Configuration, CustomConfigBuilder, RetryPolicy, SourceConfig, SourceType,
};

// 导出内容获取能力
pub use crate::fetch::{
    ContentAcquirer, FileSystem, HttpClient, HttpResponse, MemoryFileSystem, ReqwestHttpClient,
    TokioFileSystem,
};

// 导出编译入口
pub use crate::compiler::{compile, CompilationMetrics, CompileResult, HostlistCompiler, SourceMetrics};
pub use crate::preprocessor::{DownloadResult, FilterDownloader};

// 内核常用类型
pub use rshostlist_engine::{
    formatter::format, FormatOptions, FormatResult, OptimizationStats, OptimizerOptions,
    OutputFormat, Transformation,
};
pub use rshostlist_engine as engine;
