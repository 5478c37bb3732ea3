//! 测试用脚本化 HTTP 客户端

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CompilerError, CompilerResult};
use crate::fetch::http::{FetchOptions, HttpClient, HttpResponse};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Timeout,
}

/// 每个 URL 按顺序消费预置回复；最后一条回复在队列耗尽后重复使用
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, url: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn ok(self, url: &str, body: &str) -> Self {
        self.reply(url, Reply::Status(200, body.to_string()))
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn fetch(&self, url: &str, _options: &FetchOptions) -> CompilerResult<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies.get_mut(url);
            match queue {
                Some(q) if q.len() > 1 => q.pop_front(),
                Some(q) => q.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Status(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Timeout) => Err(CompilerError::TimeoutError {
                url: url.to_string(),
                timeout: Duration::from_millis(1),
            }),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}
