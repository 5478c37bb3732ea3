//! 规则合并（默认关闭：会改变匹配语义，必须显式开启）
//! pattern 与其它修饰符完全相同、仅 `domain=` 不同的规则，组大小达到阈值时
//! 合并为一条，`domain=` 取各成员域名的并集（`|` 连接，保持首次出现顺序）

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{AdblockRule, ParsedRule, RuleOption};
use crate::grammar::RuleGrammar;
use crate::optimizer::OptimizationStats;
use crate::utils::{preview_compact, preview_lines};

const DOMAIN_MODIFIER: &str = "domain";

/// 分组键：例外标记 + pattern + 除 domain 以外的修饰符文本
type GroupKey = (bool, String, String);

struct Candidate {
    index: usize,
    rule: AdblockRule,
    domains: String,
}

pub fn merge_rules(
    lines: Vec<String>,
    threshold: usize,
    mut stats: OptimizationStats,
) -> (Vec<String>, OptimizationStats) {
    let threshold = threshold.max(2);
    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: FxHashMap<GroupKey, Vec<Candidate>> = FxHashMap::default();

    for (index, line) in lines.iter().enumerate() {
        let Some((key, candidate)) = to_candidate(index, line) else {
            continue;
        };
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(candidate);
    }

    let mut replacements: FxHashMap<usize, String> = FxHashMap::default();
    let mut dropped: FxHashSet<usize> = FxHashSet::default();

    for key in &order {
        let Some(group) = groups.get(key) else {
            continue;
        };
        if group.len() < threshold {
            continue;
        }

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let merged_domains: Vec<&str> = group
            .iter()
            .flat_map(|c| c.domains.split('|'))
            .filter(|d| !d.is_empty() && seen.insert(*d))
            .collect();

        let head = &group[0];
        let mut merged = head.rule.clone();
        for option in merged.options.iter_mut() {
            if option.name == DOMAIN_MODIFIER {
                option.value = Some(merged_domains.join("|"));
            }
        }

        replacements.insert(head.index, merged.to_rule_text());
        dropped.extend(group.iter().skip(1).map(|c| c.index));
        stats.rules_merged += (group.len() - 1) as u32;
        if log::log_enabled!(log::Level::Trace) {
            let members: Vec<String> = group.iter().map(|c| c.rule.to_rule_text()).collect();
            log::trace!("Merged {} -> {}", preview_lines(&members), preview_compact(&replacements[&head.index], 120));
        }
    }

    let result = lines
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !dropped.contains(index))
        .map(|(index, line)| replacements.remove(&index).unwrap_or(line))
        .collect();

    (result, stats)
}

fn to_candidate(index: usize, line: &str) -> Option<(GroupKey, Candidate)> {
    let ParsedRule::Adblock(rule) = RuleGrammar::parse(line).ok()? else {
        return None;
    };

    let domain_options: Vec<&RuleOption> =
        rule.options.iter().filter(|o| o.name == DOMAIN_MODIFIER).collect();
    if domain_options.len() != 1 {
        return None;
    }
    let domains = domain_options[0].value.clone()?;

    let others = rule
        .options
        .iter()
        .filter(|o| o.name != DOMAIN_MODIFIER)
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let key = (rule.is_exception, rule.pattern.clone(), others);
    Some((key, Candidate { index, rule, domains }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_at_threshold() {
        let input = strings(&[
            "||ads.example.com^$domain=a.com",
            "! keep",
            "||ads.example.com^$domain=b.com|a.com",
            "||ads.example.com^$domain=c.com",
            "||other.com^$domain=a.com",
        ]);
        let (output, stats) = merge_rules(input, 3, OptimizationStats::default());
        assert_eq!(
            output,
            strings(&[
                "||ads.example.com^$domain=a.com|b.com|c.com",
                "! keep",
                "||other.com^$domain=a.com",
            ])
        );
        assert_eq!(stats.rules_merged, 2);
    }

    #[test]
    fn test_below_threshold_untouched() {
        let input = strings(&["||ads.example.com^$domain=a.com", "||ads.example.com^$domain=b.com"]);
        let (output, stats) = merge_rules(input.clone(), 3, OptimizationStats::default());
        assert_eq!(output, input);
        assert_eq!(stats.rules_merged, 0);
    }

    #[test]
    fn test_different_modifiers_not_grouped() {
        let input = strings(&[
            "||ads.example.com^$domain=a.com,important",
            "||ads.example.com^$domain=b.com",
            "@@||ads.example.com^$domain=c.com",
        ]);
        let (output, _) = merge_rules(input.clone(), 2, OptimizationStats::default());
        assert_eq!(output, input);
    }
}
