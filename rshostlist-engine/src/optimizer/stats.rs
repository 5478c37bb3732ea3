//! 优化统计：每次调用优化器时重新计算，不跨调用累积

use serde::Serialize;

/// 规则优化统计
/// 各子阶段以 (输入, 统计) -> (输出, 统计) 的方式显式传递本结构
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStats {
    /// 被改写的 pattern 数量
    pub rules_optimized: u32,
    /// 因父域规则而删除的冗余规则数量
    pub redundant_removed: u32,
    /// 合并掉的规则数量（合并组大小 - 1 之和）
    pub rules_merged: u32,
    /// 修饰符精简次数（含仅计数的内容类型否定集合）
    pub modifiers_simplified: u32,
    /// 优化前规则行数
    pub original_count: u32,
    /// 优化后规则行数
    pub final_count: u32,
    /// 规则行数缩减百分比
    pub size_reduction: f64,
}

impl OptimizationStats {
    pub fn new(original_count: usize) -> Self {
        Self {
            original_count: original_count as u32,
            ..Self::default()
        }
    }

    /// 收尾：写入最终行数并计算缩减百分比
    pub fn finish(mut self, final_count: usize) -> Self {
        self.final_count = final_count as u32;
        self.size_reduction = if self.original_count == 0 {
            0.0
        } else {
            let removed = self.original_count.saturating_sub(self.final_count) as f64;
            (removed / self.original_count as f64 * 10_000.0).round() / 100.0
        };
        self
    }

    /// 结构化日志输出
    pub fn print_stats(&self, total_time: std::time::Duration) {
        log::debug!(
            "Rule optimization completed | Time: {:?} | Original: {} | Final: {} | Reduction: {:.2}%",
            total_time,
            self.original_count,
            self.final_count,
            self.size_reduction
        );
        log::debug!(
            "Optimization breakdown: patterns rewritten {} | redundant removed {} | merged {} | modifiers simplified {}",
            self.rules_optimized,
            self.redundant_removed,
            self.rules_merged,
            self.modifiers_simplified
        );
    }
}
