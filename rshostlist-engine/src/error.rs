//! rshostlist-engine 内核错误定义
//! 内核层只做纯计算（解析/校验/转换/渲染），不涉及任何 I/O 错误
use thiserror::Error;

use regex::Error as RegexError;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================== 规则相关错误 =====================
    /// 单条规则无法按任一语法解析（非致命：调用方视为"非合法规则"）
    #[error("Rule parse failed: {0}")]
    RuleParseError(String),

    // ===================== 过滤器相关错误 =====================
    /// `/regex/` 形式的排除/包含过滤器编译失败
    #[error("Regex compilation failed: {0}")]
    RegexCompileError(#[from] RegexError),

    // ===================== 配置映射错误 =====================
    /// 未知的转换名称
    #[error("Unknown transformation: {0}")]
    UnknownTransformation(String),

    /// 未知的输出格式
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    /// 无效输入参数
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 输出序列化失败（json / doh 格式）
    #[error("Output serialization failed: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
