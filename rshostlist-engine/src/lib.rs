// 核心公共结构体：规则模型
pub mod core;
// 内核错误类型
pub mod error;
// `!#if` 条件表达式求值
pub mod expression;
// 规则流 -> 目标格式
pub mod formatter;
// 单行规则语法解析 + IDNA 转换
pub mod grammar;
// 主机名 / 公共后缀 / IP 策略
pub mod hostname;
// 可选优化阶段
pub mod optimizer;
// 固定顺序的转换流水线
pub mod transform;
// 日志辅助
pub mod utils;
// 规则校验
pub mod validator;

// 顶层导出常用类型
pub use core::{AdblockRule, HostsRule, ParsedRule, RuleOption};
pub use error::{CoreError, CoreResult};
pub use expression::ExpressionEvaluator;
pub use formatter::{FormatOptions, FormatResult, OutputFormat, OutputFormatter};
pub use grammar::RuleGrammar;
pub use optimizer::{OptimizationStats, OptimizerOptions, RuleOptimizer};
pub use transform::{PipelineOutput, Transformation, TransformationPipeline, Wildcard};
pub use validator::RuleValidator;
