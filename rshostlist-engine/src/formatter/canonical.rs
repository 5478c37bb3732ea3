//! 规范化：规则流 -> 去重后的主机名集合
//! 例外规则只进入排除集合；最终输出 = 阻止集合 - 排除集合（保持首次出现顺序）

use rustc_hash::FxHashSet;

use crate::core::ParsedRule;
use crate::grammar::RuleGrammar;
use crate::hostname::{extract_hostname, is_hostname_syntax, is_ip};

/// 规范化记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub hostname: String,
    pub is_exception: bool,
}

/// 单行 -> 规范化记录（注释、空行、正则及非主机名形态返回空）
pub fn to_records(line: &str) -> Vec<CanonicalRecord> {
    let trimmed = line.trim();
    if RuleGrammar::is_comment_or_empty(trimmed) {
        return Vec::new();
    }

    if RuleGrammar::is_plain_domain(trimmed) && !is_ip(trimmed) {
        return vec![CanonicalRecord {
            hostname: trimmed.to_ascii_lowercase(),
            is_exception: false,
        }];
    }

    match RuleGrammar::parse(trimmed) {
        Ok(ParsedRule::Hosts(rule)) => rule
            .hostnames
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .filter(|h| is_hostname_syntax(h) && !is_ip(h))
            .map(|hostname| CanonicalRecord {
                hostname,
                is_exception: false,
            })
            .collect(),
        Ok(ParsedRule::Adblock(rule)) => extract_hostname(&rule.pattern)
            .filter(|h| !is_ip(h))
            .map(|hostname| {
                vec![CanonicalRecord {
                    hostname,
                    is_exception: rule.is_exception,
                }]
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// 规则流 -> 最终主机名列表
pub fn canonicalize(rules: &[String]) -> Vec<String> {
    let mut blocked: Vec<String> = Vec::new();
    let mut blocked_seen: FxHashSet<String> = FxHashSet::default();
    let mut exceptions: FxHashSet<String> = FxHashSet::default();

    for record in rules.iter().flat_map(|line| to_records(line)) {
        if record.is_exception {
            exceptions.insert(record.hostname);
        } else if blocked_seen.insert(record.hostname.clone()) {
            blocked.push(record.hostname);
        }
    }

    blocked.retain(|h| !exceptions.contains(h));
    blocked
}
