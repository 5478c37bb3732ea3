//! 配置：运行期选项（链式构建器）+ 编译配置文档（serde）

pub mod configuration;
pub mod options;

pub use configuration::{Configuration, SourceConfig, SourceType};
pub use options::{CompilerOptions, CustomConfigBuilder, RetryPolicy};
