//! 冗余规则删除：子域规则在其父域已有无修饰符规则时被删除
//! 注释、例外规则、带修饰符的规则永远不作为删除候选

use rustc_hash::FxHashSet;

use crate::core::ParsedRule;
use crate::grammar::RuleGrammar;
use crate::hostname::{extract_hostname, parent_domains};
use crate::optimizer::OptimizationStats;
use crate::utils::preview_compact;

/// 无修饰符的阻止规则对应的裸主机名（`||host^`、`||host^|` 或纯域名行）
pub fn unmodified_hostname(line: &str) -> Option<String> {
    if RuleGrammar::is_comment_or_empty(line) || RuleGrammar::is_exception(line) {
        return None;
    }

    let ParsedRule::Adblock(rule) = RuleGrammar::parse(line).ok()? else {
        return None;
    };
    if rule.has_options() {
        return None;
    }

    let hostname = extract_hostname(&rule.pattern)?;
    let pattern = rule.pattern.to_ascii_lowercase();
    let exact = pattern == format!("||{}^", hostname)
        || pattern == format!("||{}^|", hostname)
        || pattern == hostname;
    exact.then_some(hostname)
}

pub fn remove_redundant(
    lines: Vec<String>,
    mut stats: OptimizationStats,
) -> (Vec<String>, OptimizationStats) {
    let hostnames: Vec<Option<String>> = lines.iter().map(|l| unmodified_hostname(l)).collect();
    let blocked: FxHashSet<&str> = hostnames.iter().flatten().map(String::as_str).collect();

    let mut result = Vec::with_capacity(lines.len());
    for (line, hostname) in lines.iter().zip(hostnames.iter()) {
        let redundant = hostname.as_deref().is_some_and(|h| {
            parent_domains(h).iter().any(|parent| blocked.contains(parent))
        });

        if redundant {
            stats.redundant_removed += 1;
            log::trace!("Redundant rule removed: {}", preview_compact(line, 120));
        } else {
            result.push(line.clone());
        }
    }

    (result, stats)
}
