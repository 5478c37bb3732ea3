//! 规则校验器
//! 1. 单条规则的纯判定：`RuleValidator::is_valid`
//! 2. 整表校验：自后向前扫描，被删除规则之前紧邻的注释/空行一并删除（级联）

use crate::core::{AdblockRule, HostsRule};
use crate::grammar::RuleGrammar;
use crate::hostname::{is_public_suffix, is_valid_hostname, split_domain_anchor};
use crate::transform::cascade::retain_with_cascade;
use crate::utils::preview_compact;

/// 允许出现的修饰符
const ALLOWED_MODIFIERS: [&str; 8] = [
    "important",
    "~important",
    "ctag",
    "dnstype",
    "dnsrewrite",
    "denyallow",
    "badfilter",
    "client",
];

/// 限定作用范围的修饰符：出现时允许屏蔽整个公共后缀
const LIMIT_MODIFIERS: [&str; 3] = ["denyallow", "badfilter", "client"];

/// pattern 最短长度
const MIN_PATTERN_LEN: usize = 5;

/// 规则校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator {
    allow_ip: bool,
}

impl RuleValidator {
    pub fn new(allow_ip: bool) -> Self {
        Self { allow_ip }
    }

    /// 单条规则判定（注释与空行恒为合法）
    pub fn is_valid(&self, line: &str) -> bool {
        if RuleGrammar::is_comment_or_empty(line) {
            return true;
        }

        if RuleGrammar::is_hosts_rule(line) {
            return match RuleGrammar::parse_hosts(line) {
                Ok(rule) => self.is_valid_hosts_rule(&rule),
                Err(_) => false,
            };
        }

        match RuleGrammar::parse_adblock(line) {
            Ok(rule) => self.is_valid_adblock_rule(&rule),
            Err(e) => {
                log::trace!("Dropping unparsable rule: {}", e);
                false
            }
        }
    }

    /// hosts 规则：每个主机名都必须合法，且不能是完整公共后缀
    pub fn is_valid_hosts_rule(&self, rule: &HostsRule) -> bool {
        if rule.hostnames.is_empty() {
            return false;
        }

        rule.hostnames.iter().all(|hostname| {
            is_valid_hostname(hostname, self.allow_ip) && !is_public_suffix(hostname)
        })
    }

    /// adblock 规则：修饰符白名单 + 长度 + 字符集 + 域名锚点策略
    pub fn is_valid_adblock_rule(&self, rule: &AdblockRule) -> bool {
        let mut has_limit_modifier = false;
        for option in &rule.options {
            if !ALLOWED_MODIFIERS.contains(&option.name.as_str()) {
                return false;
            }
            if LIMIT_MODIFIERS.contains(&option.name.as_str()) {
                has_limit_modifier = true;
            }
        }

        let pattern = rule.pattern.as_str();
        if pattern.len() < MIN_PATTERN_LEN {
            return false;
        }

        // 正则规则 `/.../` 跳过字符集与域名检查
        if pattern.len() > 1 && pattern.starts_with('/') && pattern.ends_with('/') {
            return true;
        }

        let to_check = pattern.strip_prefix("://").unwrap_or(pattern);
        if !to_check.bytes().all(is_pattern_byte) {
            return false;
        }

        match split_domain_anchor(pattern) {
            Some((domain, rest)) => self.is_valid_domain_anchor(domain, rest, has_limit_modifier),
            None => true,
        }
    }

    /// `||domain^` 形态的附加检查
    fn is_valid_domain_anchor(&self, domain: &str, rest: &str, has_limit_modifier: bool) -> bool {
        // `^` 之后只允许紧跟一个 `|`
        if !(rest.is_empty() || rest == "|") {
            return false;
        }

        if domain.contains('*') {
            // 通配 TLD：`||*.org^` 仍需校验裸 TLD；非完整公共后缀的通配形式直接放行
            return match domain.strip_prefix("*.") {
                Some(tail) if !tail.contains('*') && is_public_suffix(tail) => has_limit_modifier,
                _ => true,
            };
        }

        if is_public_suffix(domain) {
            return has_limit_modifier;
        }

        is_valid_hostname(domain, self.allow_ip)
    }

    /// 整表校验（自后向前级联删除孤立注释）
    pub fn validate(&self, lines: Vec<String>) -> Vec<String> {
        let total = lines.len();
        let kept = retain_with_cascade(lines, RuleGrammar::is_comment_or_empty, |_, line| {
            let valid = self.is_valid(line);
            if !valid {
                log::trace!("Invalid rule removed: {}", preview_compact(line, 120));
            }
            valid
        });

        log::debug!(
            "Validation completed | allow_ip: {} | input: {} | kept: {} | removed: {}",
            self.allow_ip,
            total,
            kept.len(),
            total - kept.len()
        );
        kept
    }
}

/// pattern 允许的字符：`[a-zA-Z0-9\-.*|^]`
fn is_pattern_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'*' | b'|' | b'^')
}

/// 便捷函数：单条规则判定
pub fn valid(line: &str, allow_ip: bool) -> bool {
    RuleValidator::new(allow_ip).is_valid(line)
}

/// 便捷函数：整表校验
pub fn validate(lines: Vec<String>, allow_ip: bool) -> Vec<String> {
    RuleValidator::new(allow_ip).validate(lines)
}
