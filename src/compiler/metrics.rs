//! 编译指标

use std::time::Duration;

use rshostlist_engine::{OptimizationStats, RuleGrammar};
use serde::Serialize;

/// 单个源的指标
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetrics {
    pub name: String,
    pub source: String,
    pub source_type: String,
    /// 预处理后的规则数
    pub raw_rules: usize,
    /// 源级转换后的规则数
    pub final_rules: usize,
    pub duration_ms: u64,
}

/// 一次编译的指标
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationMetrics {
    pub sources: Vec<SourceMetrics>,
    /// 最终输出的规则数（不含注释与空行）
    pub rule_count: usize,
    pub total_duration_ms: u64,
    /// include 跳过 / 失败、过滤器源获取失败等非致命告警
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationStats>,
}

/// 规则数：不含注释与空行
pub fn count_rules(lines: &[String]) -> usize {
    lines
        .iter()
        .filter(|line| !RuleGrammar::is_comment_or_empty(line))
        .count()
}

pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
