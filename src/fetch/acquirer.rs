//! 源内容获取器
//! 核心特性：
//! 1. 远程源：超时 + User-Agent + 指数退避重试（含随机抖动）
//! 2. 4xx（429 除外）立即失败；5xx / 429 / 超时可重试
//! 3. 本地源：区分文件不存在与无权限
//! 4. 空内容默认视为错误

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::CompilerOptions;
use crate::error::{CompilerError, CompilerResult};
use crate::fetch::fs::{FileSystem, TokioFileSystem};
use crate::fetch::http::{FetchOptions, HttpClient, ReqwestHttpClient};
use crate::fetch::path::{is_remote, resolve_include_path};

/// 抖动上限（占退避时长的比例）
const MAX_JITTER_RATIO: f64 = 0.3;

/// 源内容获取器（可廉价克隆，跨任务共享）
#[derive(Clone)]
pub struct ContentAcquirer {
    http: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystem>,
    options: Arc<CompilerOptions>,
}

impl ContentAcquirer {
    pub fn new(http: Arc<dyn HttpClient>, fs: Arc<dyn FileSystem>, options: CompilerOptions) -> Self {
        Self {
            http,
            fs,
            options: Arc::new(options),
        }
    }

    /// reqwest + 本地磁盘
    pub fn with_defaults(options: CompilerOptions) -> CompilerResult<Self> {
        Ok(Self::new(
            Arc::new(ReqwestHttpClient::new()?),
            Arc::new(TokioFileSystem),
            options,
        ))
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// 获取源文本
    pub async fn fetch(&self, source: &str) -> CompilerResult<String> {
        let text = if is_remote(source) {
            self.fetch_remote(source).await?
        } else {
            self.fs.read_text_file(source).await?
        };

        if text.trim().is_empty() && !self.options.allow_empty_response {
            return Err(CompilerError::EmptyContent {
                source_id: source.to_string(),
            });
        }

        debug!("Fetched {} ({} bytes)", source, text.len());
        Ok(text)
    }

    /// include 路径解析（相对当前源标识）
    pub fn resolve_include_path(&self, include_path: &str, base: &str) -> CompilerResult<String> {
        resolve_include_path(include_path, base)
    }

    /// 顺序重试：同一 URL 的多次尝试从不并发
    async fn fetch_remote(&self, url: &str) -> CompilerResult<String> {
        let max_attempts = self.options.retry.max_attempts();
        let fetch_options = FetchOptions {
            timeout: self.options.timeout,
            user_agent: self.options.user_agent.clone(),
        };

        let mut attempt: u32 = 0;
        loop {
            let result = match self.http.fetch(url, &fetch_options).await {
                Ok(response) if response.ok() => Ok(response.body),
                Ok(response) => Err(CompilerError::from_status(
                    url,
                    response.status,
                    &response.status_text,
                )),
                Err(e) => Err(e),
            };

            match result {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = backoff_delay(self.options.retry_delay, attempt);
                    warn!(
                        "Request to {} failed: {} | retrying in {:?} (attempt {}/{})",
                        url,
                        e,
                        delay,
                        attempt + 1,
                        max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// 第 attempt 次失败后的等待时长：base * 2^attempt，再叠加至多 30% 的随机抖动
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter = exponential.mul_f64(rand::random::<f64>() * MAX_JITTER_RATIO);
    exponential.saturating_add(jitter)
}
