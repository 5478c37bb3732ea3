//! 修饰符精简
//! 1. 删除完全重复的修饰符（按 `name` 或 `name=value` 比较）
//! 2. 内容类型集合中恰好否定了除一项以外的全部类型时，计为一次可精简（只计数，不改写：
//!    其余未列出的请求类型仍会受影响，改写为单一正向类型会改变匹配语义）

use rustc_hash::FxHashSet;

use crate::core::{ParsedRule, RuleOption};
use crate::grammar::RuleGrammar;
use crate::optimizer::OptimizationStats;

const CONTENT_TYPES: [&str; 6] = ["script", "image", "stylesheet", "font", "xmlhttprequest", "media"];

pub fn simplify_modifiers(
    lines: Vec<String>,
    mut stats: OptimizationStats,
) -> (Vec<String>, OptimizationStats) {
    let result = lines
        .into_iter()
        .map(|line| {
            let Ok(ParsedRule::Adblock(mut rule)) = RuleGrammar::parse(&line) else {
                return line;
            };
            if !rule.has_options() {
                return line;
            }

            if negates_all_but_one_content_type(&rule.options) {
                stats.modifiers_simplified += 1;
            }

            let before = rule.options.len();
            rule.options = dedupe_options(rule.options);
            let removed = before - rule.options.len();
            if removed == 0 {
                return line;
            }

            stats.modifiers_simplified += removed as u32;
            rule.to_rule_text()
        })
        .collect();

    (result, stats)
}

fn dedupe_options(options: Vec<RuleOption>) -> Vec<RuleOption> {
    let mut seen: FxHashSet<RuleOption> = FxHashSet::default();
    options
        .into_iter()
        .filter(|option| seen.insert(option.clone()))
        .collect()
}

fn negates_all_but_one_content_type(options: &[RuleOption]) -> bool {
    let negated = CONTENT_TYPES
        .iter()
        .filter(|ty| {
            options
                .iter()
                .any(|o| o.value.is_none() && o.name.strip_prefix('~') == Some(**ty))
        })
        .count();
    negated == CONTENT_TYPES.len() - 1
}
