//! 输出格式化
//! 规则流先规范化为去重后的主机名集合，再渲染为目标语法

pub mod canonical;
pub mod render;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use canonical::{canonicalize, CanonicalRecord};

/// hosts 格式默认 IP
pub const DEFAULT_BLOCKING_IP: &str = "0.0.0.0";

/// 目标输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Adblock,
    Hosts,
    Dnsmasq,
    Pihole,
    Unbound,
    Json,
    Doh,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Adblock,
        OutputFormat::Hosts,
        OutputFormat::Dnsmasq,
        OutputFormat::Pihole,
        OutputFormat::Unbound,
        OutputFormat::Json,
        OutputFormat::Doh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Adblock => "adblock",
            OutputFormat::Hosts => "hosts",
            OutputFormat::Dnsmasq => "dnsmasq",
            OutputFormat::Pihole => "pihole",
            OutputFormat::Unbound => "unbound",
            OutputFormat::Json => "json",
            OutputFormat::Doh => "doh",
        }
    }

    /// 输出文件推荐扩展名
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Doh => "json",
            OutputFormat::Unbound | OutputFormat::Dnsmasq => "conf",
            _ => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| CoreError::UnknownFormat(s.to_string()))
    }
}

/// 渲染选项
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// hosts 格式使用的 IP
    pub ip: String,
    /// 文本格式是否输出注释头
    pub include_header: bool,
    /// 列表名称（注释头与 json/doh 使用）
    pub name: String,
    /// 生成时间，缺省取当前时间
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            ip: DEFAULT_BLOCKING_IP.to_string(),
            include_header: false,
            name: "rshostlist".to_string(),
            generated_at: None,
        }
    }
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResult {
    pub format: OutputFormat,
    /// 实际输出的唯一主机名数量
    pub rule_count: usize,
    pub content: String,
}

/// 输出格式化器
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format(rules: &[String], format: OutputFormat, options: &FormatOptions) -> CoreResult<FormatResult> {
        if format == OutputFormat::Hosts && options.ip.trim().is_empty() {
            return Err(CoreError::InvalidInput("hosts format requires a non-empty IP".to_string()));
        }

        let hostnames = canonicalize(rules);
        let content = render::render(&hostnames, format, options)?;
        log::debug!(
            "Output formatted | format: {} | input rules: {} | unique hostnames: {}",
            format,
            rules.len(),
            hostnames.len()
        );

        Ok(FormatResult {
            format,
            rule_count: hostnames.len(),
            content,
        })
    }
}

/// 便捷函数
pub fn format(rules: &[String], format: OutputFormat, options: &FormatOptions) -> CoreResult<FormatResult> {
    OutputFormatter::format(rules, format, options)
}
