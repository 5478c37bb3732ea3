//! pattern 改写
//! - `||domain.com/` -> `||domain.com^`
//! - 开头 `||*`（含 `||*.`）-> `||`
//! - 结尾 `*^` -> `^`

use crate::core::ParsedRule;
use crate::grammar::RuleGrammar;
use crate::hostname::is_hostname_syntax;
use crate::optimizer::OptimizationStats;

pub fn optimize_patterns(
    lines: Vec<String>,
    mut stats: OptimizationStats,
) -> (Vec<String>, OptimizationStats) {
    let result = lines
        .into_iter()
        .map(|line| {
            let Ok(ParsedRule::Adblock(mut rule)) = RuleGrammar::parse(&line) else {
                return line;
            };
            match optimize_pattern(&rule.pattern) {
                Some(optimized) => {
                    stats.rules_optimized += 1;
                    rule.pattern = optimized;
                    rule.to_rule_text()
                }
                None => line,
            }
        })
        .collect();

    (result, stats)
}

/// 返回 Some 表示发生了改写
pub fn optimize_pattern(pattern: &str) -> Option<String> {
    let mut current = pattern.to_string();

    if let Some(rest) = current.strip_prefix("||*") {
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        current = format!("||{}", rest);
    }

    if let Some(host) = current.strip_prefix("||").and_then(|p| p.strip_suffix('/')) {
        if is_hostname_syntax(&host.to_ascii_lowercase()) {
            current = format!("||{}^", host);
        }
    }

    if let Some(head) = current.strip_suffix("*^") {
        current = format!("{}^", head);
    }

    (current != pattern && current.len() > 2).then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_pattern() {
        assert_eq!(optimize_pattern("||example.com/").as_deref(), Some("||example.com^"));
        assert_eq!(optimize_pattern("||*.example.com^").as_deref(), Some("||example.com^"));
        assert_eq!(optimize_pattern("||*example.com^").as_deref(), Some("||example.com^"));
        assert_eq!(optimize_pattern("||example.com*^").as_deref(), Some("||example.com^"));
        assert_eq!(optimize_pattern("||example.com/path/"), None);
        assert_eq!(optimize_pattern("||example.com^"), None);
    }

    #[test]
    fn test_optimize_patterns_keeps_modifiers() {
        let lines = vec!["@@||example.com/$important".to_string(), "! ||x.com/".to_string()];
        let (output, stats) = optimize_patterns(lines, OptimizationStats::default());
        assert_eq!(output, vec!["@@||example.com^$important", "! ||x.com/"]);
        assert_eq!(stats.rules_optimized, 1);
    }
}
