//! HTTP 能力抽象与 reqwest 实现

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CompilerError, CompilerResult};

/// 最多跟随的重定向次数
const MAX_REDIRECTS: usize = 10;

/// 单次请求参数
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

/// 响应：状态码 + 状态文本 + 正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: String::new(),
            body: body.into(),
        }
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }
}

/// HTTP 客户端能力
/// 实现方负责：超时返回 TimeoutError，连接层失败返回可重试的 NetworkError；
/// 非 2xx 状态不视为错误，原样返回由调用方分类
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> CompilerResult<HttpResponse>;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> CompilerResult<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()
            .map_err(|e| CompilerError::NetworkError {
                url: String::new(),
                status: None,
                message: format!("Failed to build HTTP client: {}", e),
                retryable: false,
            })?;
        Ok(Self { client })
    }

    /// 复用外部构造的 reqwest 客户端
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(url: &str, timeout: Duration, err: reqwest::Error) -> CompilerError {
    if err.is_timeout() {
        return CompilerError::TimeoutError {
            url: url.to_string(),
            timeout,
        };
    }
    CompilerError::NetworkError {
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
        // 连接 / 读取层失败均按瞬时故障处理
        retryable: true,
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> CompilerResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .timeout(options.timeout)
            .header(reqwest::header::USER_AGENT, options.user_agent.as_str())
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, options.timeout, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, options.timeout, e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_ok_range() {
        assert!(HttpResponse::new(200, "x").ok());
        assert!(HttpResponse::new(204, "").ok());
        assert!(!HttpResponse::new(301, "").ok());
        assert!(!HttpResponse::new(500, "").ok());
        assert_eq!(HttpResponse::new(200, "body").text(), "body");
    }
}
