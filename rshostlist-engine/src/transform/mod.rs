//! 转换流水线
//! 1. 转换名称为封闭枚举，经固定查找表映射到函数指针
//! 2. 执行顺序固定：exclude -> include -> 查找表顺序 -> 优化器 -> 收尾阶段
//! 3. 每个阶段接收完整序列、返回完整序列，所有权逐级线性传递

pub mod cascade;
pub mod compress;
pub mod dedupe;
pub mod filter;
pub mod lines;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::optimizer::{OptimizationStats, OptimizerOptions, RuleOptimizer};
use crate::validator;

pub use filter::{build_wildcards, Wildcard};

/// 转换函数签名
pub type TransformFn = fn(Vec<String>) -> Vec<String>;

/// 可配置的转换名称（对外为稳定字符串标识）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Transformation {
    RemoveComments,
    Compress,
    RemoveModifiers,
    Validate,
    ValidateAllowIp,
    Deduplicate,
    InvertAllow,
    RemoveEmptyLines,
    TrimLines,
    InsertFinalNewLine,
    ConvertToAscii,
}

/// 优化器之前的阶段（执行顺序）
const PRE_OPTIMIZER_ORDER: [Transformation; 9] = [
    Transformation::ConvertToAscii,
    Transformation::TrimLines,
    Transformation::RemoveComments,
    Transformation::Compress,
    Transformation::Deduplicate,
    Transformation::RemoveModifiers,
    Transformation::InvertAllow,
    Transformation::Validate,
    Transformation::ValidateAllowIp,
];

/// 优化器之后的收尾阶段
const POST_OPTIMIZER_ORDER: [Transformation; 2] = [
    Transformation::RemoveEmptyLines,
    Transformation::InsertFinalNewLine,
];

impl Transformation {
    pub const ALL: [Transformation; 11] = [
        Transformation::RemoveComments,
        Transformation::Compress,
        Transformation::RemoveModifiers,
        Transformation::Validate,
        Transformation::ValidateAllowIp,
        Transformation::Deduplicate,
        Transformation::InvertAllow,
        Transformation::RemoveEmptyLines,
        Transformation::TrimLines,
        Transformation::InsertFinalNewLine,
        Transformation::ConvertToAscii,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Transformation::RemoveComments => "RemoveComments",
            Transformation::Compress => "Compress",
            Transformation::RemoveModifiers => "RemoveModifiers",
            Transformation::Validate => "Validate",
            Transformation::ValidateAllowIp => "ValidateAllowIp",
            Transformation::Deduplicate => "Deduplicate",
            Transformation::InvertAllow => "InvertAllow",
            Transformation::RemoveEmptyLines => "RemoveEmptyLines",
            Transformation::TrimLines => "TrimLines",
            Transformation::InsertFinalNewLine => "InsertFinalNewLine",
            Transformation::ConvertToAscii => "ConvertToAscii",
        }
    }

    /// 查找表：名称 -> 实现
    pub fn handler(self) -> TransformFn {
        match self {
            Transformation::RemoveComments => lines::remove_comments,
            Transformation::Compress => compress::compress,
            Transformation::RemoveModifiers => lines::remove_modifiers,
            Transformation::Validate => |l| validator::validate(l, false),
            Transformation::ValidateAllowIp => |l| validator::validate(l, true),
            Transformation::Deduplicate => dedupe::deduplicate,
            Transformation::InvertAllow => lines::invert_allow,
            Transformation::RemoveEmptyLines => lines::remove_empty_lines,
            Transformation::TrimLines => lines::trim_lines,
            Transformation::InsertFinalNewLine => lines::insert_final_newline,
            Transformation::ConvertToAscii => lines::convert_to_ascii,
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transformation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transformation::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTransformation(s.to_string()))
    }
}

/// 流水线输出
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub lines: Vec<String>,
    /// 仅在启用优化器时存在
    pub optimization: Option<OptimizationStats>,
}

/// 转换流水线
#[derive(Debug, Clone, Default)]
pub struct TransformationPipeline {
    transformations: Vec<Transformation>,
    exclusions: Vec<Wildcard>,
    inclusions: Vec<Wildcard>,
    optimizer: Option<RuleOptimizer>,
}

impl TransformationPipeline {
    /// 配置中的顺序与重复项无关紧要，执行顺序始终固定
    pub fn new(transformations: &[Transformation]) -> Self {
        let mut transformations = transformations.to_vec();
        transformations.sort_unstable();
        transformations.dedup();
        Self {
            transformations,
            ..Self::default()
        }
    }

    pub fn with_exclusions(mut self, exclusions: Vec<Wildcard>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_inclusions(mut self, inclusions: Vec<Wildcard>) -> Self {
        self.inclusions = inclusions;
        self
    }

    pub fn with_optimizer(mut self, options: OptimizerOptions) -> Self {
        self.optimizer = Some(RuleOptimizer::new(options));
        self
    }

    pub fn is_enabled(&self, transformation: Transformation) -> bool {
        self.transformations.contains(&transformation)
    }

    /// 按固定顺序执行所有已启用阶段
    pub fn apply(&self, lines: Vec<String>) -> PipelineOutput {
        let input_len = lines.len();
        let mut lines = filter::exclude(lines, &self.exclusions);
        lines = filter::include(lines, &self.inclusions);

        for transformation in PRE_OPTIMIZER_ORDER {
            // 两种校验同时启用时仅执行允许 IP 的版本
            if transformation == Transformation::Validate && self.is_enabled(Transformation::ValidateAllowIp) {
                continue;
            }
            lines = self.run_stage(transformation, lines);
        }

        let optimization = match &self.optimizer {
            Some(optimizer) => {
                let (optimized, stats) = optimizer.optimize(lines);
                lines = optimized;
                Some(stats)
            }
            None => None,
        };

        for transformation in POST_OPTIMIZER_ORDER {
            lines = self.run_stage(transformation, lines);
        }

        log::debug!(
            "Transformation pipeline completed | stages: {} | input: {} | output: {}",
            self.transformations.len(),
            input_len,
            lines.len()
        );

        PipelineOutput { lines, optimization }
    }

    fn run_stage(&self, transformation: Transformation, lines: Vec<String>) -> Vec<String> {
        if !self.is_enabled(transformation) {
            return lines;
        }
        let before = lines.len();
        let lines = (transformation.handler())(lines);
        log::debug!("Stage {} | {} -> {} lines", transformation, before, lines.len());
        lines
    }
}
