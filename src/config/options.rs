//! 编译器运行期选项

use std::time::Duration;

/// 默认 HTTP 超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// 默认重试基础间隔
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// 默认总尝试次数
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;
/// 默认 `!#include` 最大嵌套深度
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;
/// 默认顶层源并发下载数
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("rshostlist/", env!("CARGO_PKG_VERSION"));

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Never,     // 只尝试一次
    Times(u8), // 总尝试次数（含第一次）
}

impl RetryPolicy {
    /// 总尝试次数，至少为 1
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::Never => 1,
            RetryPolicy::Times(n) => u32::from(*n).max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Times(DEFAULT_MAX_ATTEMPTS)
    }
}

/// 编译器选项
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
    /// 指数退避的基础间隔：第 n 次重试前等待 base * 2^n（另加至多 30% 抖动）
    pub retry_delay: Duration,
    pub allow_empty_response: bool,
    pub max_include_depth: usize,
    /// `!#if` 条件中平台标识符的比较对象
    pub platform: Option<String>,
    pub concurrency: usize,
    /// 是否输出列表头与每个源的源头注释
    pub emit_header: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            retry_delay: DEFAULT_RETRY_DELAY,
            allow_empty_response: false,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            platform: None,
            concurrency: DEFAULT_CONCURRENCY,
            emit_header: true,
        }
    }
}

/// 自定义构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    options: CompilerOptions,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = user_agent.into();
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.options.retry = retry;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.options.retry_delay = delay;
        self
    }

    pub fn allow_empty_response(mut self, allow: bool) -> Self {
        self.options.allow_empty_response = allow;
        self
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.options.max_include_depth = depth;
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.options.platform = Some(platform.into());
        self
    }

    /// 并发数为 0 时按 1 处理
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency.max(1);
        self
    }

    pub fn emit_header(mut self, emit: bool) -> Self {
        self.options.emit_header = emit;
        self
    }

    pub fn build(self) -> CompilerOptions {
        self.options
    }
}
