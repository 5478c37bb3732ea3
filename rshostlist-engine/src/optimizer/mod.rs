//! 规则优化器（可选阶段）
//! 子阶段按固定顺序执行：冗余删除 -> pattern 改写 -> 修饰符精简 -> 规则合并
//! 每个子阶段都是 (规则, 统计) -> (规则, 统计) 的纯函数

pub mod merge;
pub mod modifier;
pub mod pattern;
pub mod redundancy;
pub mod stats;

use serde::{Deserialize, Serialize};

use crate::grammar::RuleGrammar;

pub use stats::OptimizationStats;

/// 默认合并阈值
pub const DEFAULT_MERGE_THRESHOLD: usize = 3;

/// 优化器开关（各子阶段相互独立）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerOptions {
    pub remove_redundant: bool,
    pub optimize_patterns: bool,
    pub simplify_modifiers: bool,
    /// 改变匹配语义，默认关闭
    pub merge_rules: bool,
    pub merge_threshold: usize,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            remove_redundant: true,
            optimize_patterns: true,
            simplify_modifiers: true,
            merge_rules: false,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
        }
    }
}

/// 规则优化器
#[derive(Debug, Clone, Default)]
pub struct RuleOptimizer {
    options: OptimizerOptions,
}

impl RuleOptimizer {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    /// 执行优化，统计信息每次调用重新计算
    pub fn optimize(&self, lines: Vec<String>) -> (Vec<String>, OptimizationStats) {
        let start = std::time::Instant::now();
        let mut stats = OptimizationStats::new(count_rules(&lines));
        let mut lines = lines;

        if self.options.remove_redundant {
            (lines, stats) = redundancy::remove_redundant(lines, stats);
        }
        if self.options.optimize_patterns {
            (lines, stats) = pattern::optimize_patterns(lines, stats);
        }
        if self.options.simplify_modifiers {
            (lines, stats) = modifier::simplify_modifiers(lines, stats);
        }
        if self.options.merge_rules {
            (lines, stats) = merge::merge_rules(lines, self.options.merge_threshold, stats);
        }

        let stats = stats.finish(count_rules(&lines));
        stats.print_stats(start.elapsed());
        (lines, stats)
    }
}

fn count_rules(lines: &[String]) -> usize {
    lines.iter().filter(|l| !RuleGrammar::is_comment_or_empty(l)).count()
}
