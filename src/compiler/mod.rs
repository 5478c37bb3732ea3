//! 端到端编译：并发下载各源 -> 源级转换 -> 合并 -> 列表级转换 -> 列表头

pub mod compiler;
pub mod header;
pub mod metrics;
pub mod source;

pub use compiler::{compile, CompileResult, HostlistCompiler};
pub use metrics::{CompilationMetrics, SourceMetrics};
