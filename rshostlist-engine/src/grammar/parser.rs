//! 单行规则解析
//! 负责识别注释/空行，并在 adblock 与 `/etc/hosts` 两套语法之间做判定

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{AdblockRule, HostsRule, ParsedRule, RuleOption};
use crate::error::{CoreError, CoreResult};

/// `/etc/hosts` 行形态：`<ip>[%zone] <hostname> [hostname...] [# comment]`
static HOSTS_RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-fA-F0-9.:\[\]]+)(%[a-zA-Z0-9]+)?\s+([^#]+)(#.*)?$")
        .expect("hosts rule regex is valid")
});

/// 纯域名行（无任何 adblock 语法）
static PLAIN_DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_](?:[a-zA-Z0-9\-_.]*[a-zA-Z0-9_])?\.[a-zA-Z0-9\-]{2,}$")
        .expect("plain domain regex is valid")
});

const EXCEPTION_PREFIX: &str = "@@";
const OPTIONS_DELIMITER: char = '$';

/// 规则语法解析器（无状态工具类）
pub struct RuleGrammar;

impl RuleGrammar {
    /// `!` / `#` 开头的真注释
    pub fn is_comment(line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed.starts_with('!') || trimmed.starts_with('#')
    }

    pub fn is_empty(line: &str) -> bool {
        line.trim().is_empty()
    }

    /// 校验器/优化器记账用：注释与空行统一视为"注释或空行"
    pub fn is_comment_or_empty(line: &str) -> bool {
        Self::is_comment(line) || Self::is_empty(line)
    }

    pub fn is_exception(line: &str) -> bool {
        line.trim_start().starts_with(EXCEPTION_PREFIX)
    }

    pub fn is_hosts_rule(line: &str) -> bool {
        HOSTS_RULE_RE.is_match(line.trim())
    }

    pub fn is_plain_domain(line: &str) -> bool {
        PLAIN_DOMAIN_RE.is_match(line.trim())
    }

    /// 解析一行：注释 / 空行 / hosts 规则 / adblock 规则
    pub fn parse(line: &str) -> CoreResult<ParsedRule> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(ParsedRule::Empty);
        }
        if Self::is_comment(trimmed) {
            return Ok(ParsedRule::Comment(trimmed.to_string()));
        }
        if Self::is_hosts_rule(trimmed) {
            return Self::parse_hosts(trimmed).map(ParsedRule::Hosts);
        }
        Self::parse_adblock(trimmed).map(ParsedRule::Adblock)
    }

    /// 解析 `/etc/hosts` 规则
    pub fn parse_hosts(line: &str) -> CoreResult<HostsRule> {
        let trimmed = line.trim();
        let caps = HOSTS_RULE_RE
            .captures(trimmed)
            .ok_or_else(|| CoreError::RuleParseError(format!("not an /etc/hosts rule: {}", trimmed)))?;

        let ip = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let hostnames: Vec<String> = caps
            .get(3)
            .map_or("", |m| m.as_str())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if hostnames.is_empty() {
            return Err(CoreError::RuleParseError(format!(
                "/etc/hosts rule has no hostnames: {}",
                trimmed
            )));
        }

        Ok(HostsRule { ip, hostnames })
    }

    /// 解析 adblock 规则
    /// 失败时返回 RuleParseError，调用方按"非合法 adblock 规则"处理
    pub fn parse_adblock(line: &str) -> CoreResult<AdblockRule> {
        let trimmed = line.trim();
        let (is_exception, body) = match trimmed.strip_prefix(EXCEPTION_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (pattern, options_text) = split_options(body);
        if pattern.is_empty() {
            return Err(CoreError::RuleParseError(format!(
                "cannot extract pattern: {}",
                trimmed
            )));
        }

        let options = match options_text {
            Some(text) => parse_options(text)
                .map_err(|e| CoreError::RuleParseError(format!("{}: {}", e, trimmed)))?,
            None => Vec::new(),
        };

        Ok(AdblockRule {
            is_exception,
            pattern: pattern.to_string(),
            options,
        })
    }

    /// 序列化：parse 的逆过程
    pub fn serialize(rule: &ParsedRule) -> String {
        rule.to_string()
    }
}

/// 以最后一个 `$` 切分 pattern 与修饰符列表
/// `/regex$/` 形式中的 `$` 属于正则本身，不作为分隔符
fn split_options(body: &str) -> (&str, Option<&str>) {
    let Some(idx) = body.rfind(OPTIONS_DELIMITER) else {
        return (body, None);
    };

    let options = &body[idx + 1..];
    if body.starts_with('/') && options.ends_with('/') {
        return (body, None);
    }

    (&body[..idx], Some(options))
}

/// 解析逗号分隔的修饰符，支持 `\,` 转义
fn parse_options(text: &str) -> Result<Vec<RuleOption>, String> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut options = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => {
                options.push(parse_single_option(&current)?);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    options.push(parse_single_option(&current)?);

    Ok(options)
}

fn parse_single_option(raw: &str) -> Result<RuleOption, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty modifier".to_string());
    }

    match raw.split_once('=') {
        Some((name, _)) if name.is_empty() => Err(format!("modifier without name: {}", raw)),
        Some((name, value)) => Ok(RuleOption::new(name, Some(value.to_string()))),
        None => Ok(RuleOption::flag(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_predicates() {
        assert!(RuleGrammar::is_comment("! comment"));
        assert!(RuleGrammar::is_comment("  # hosts comment"));
        assert!(!RuleGrammar::is_comment(""));
        assert!(RuleGrammar::is_comment_or_empty("   "));
        assert!(!RuleGrammar::is_comment_or_empty("||example.org^"));
    }

    #[test]
    fn test_parse_adblock_rule() {
        let rule = RuleGrammar::parse_adblock("@@||example.org^$important,dnstype=A").unwrap();
        assert!(rule.is_exception);
        assert_eq!(rule.pattern, "||example.org^");
        assert_eq!(
            rule.options,
            vec![
                RuleOption::flag("important"),
                RuleOption::new("dnstype", Some("A".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_escaped_comma() {
        let rule = RuleGrammar::parse_adblock(r"||example.org^$dnsrewrite=a\,b").unwrap();
        assert_eq!(rule.options.len(), 1);
        assert_eq!(rule.options[0].value.as_deref(), Some("a,b"));
        assert_eq!(rule.to_rule_text(), r"||example.org^$dnsrewrite=a\,b");
    }

    #[test]
    fn test_parse_regex_rule_dollar() {
        let rule = RuleGrammar::parse_adblock("/ads[0-9]+$/").unwrap();
        assert_eq!(rule.pattern, "/ads[0-9]+$/");
        assert!(rule.options.is_empty());

        let rule = RuleGrammar::parse_adblock("/ads[0-9]+$/$important").unwrap();
        assert_eq!(rule.pattern, "/ads[0-9]+$/");
        assert_eq!(rule.options, vec![RuleOption::flag("important")]);
    }

    #[test]
    fn test_parse_failures() {
        assert!(RuleGrammar::parse_adblock("@@").is_err());
        assert!(RuleGrammar::parse_adblock("$important").is_err());
        assert!(RuleGrammar::parse_adblock("||example.org^$important,,ctag=x").is_err());
    }

    #[test]
    fn test_parse_hosts_rule() {
        let rule = RuleGrammar::parse_hosts("0.0.0.0 ads.example.com tracker.example.com # inline").unwrap();
        assert_eq!(rule.ip, "0.0.0.0");
        assert_eq!(rule.hostnames, vec!["ads.example.com", "tracker.example.com"]);

        let rule = RuleGrammar::parse_hosts("::1\tlocalhost").unwrap();
        assert_eq!(rule.ip, "::1");
        assert_eq!(rule.hostnames, vec!["localhost"]);

        assert!(RuleGrammar::parse_hosts("0.0.0.0").is_err());
    }

    #[test]
    fn test_parse_dispatch() {
        assert_eq!(RuleGrammar::parse("").unwrap(), ParsedRule::Empty);
        assert!(matches!(RuleGrammar::parse("! c").unwrap(), ParsedRule::Comment(_)));
        assert!(matches!(RuleGrammar::parse("127.0.0.1 example.org").unwrap(), ParsedRule::Hosts(_)));
        assert!(matches!(RuleGrammar::parse("||example.org^").unwrap(), ParsedRule::Adblock(_)));
    }

    #[test]
    fn test_round_trip() {
        let lines = [
            "||example.org^",
            "@@||example.org^$important",
            "||example.org^$domain=a.com|~b.com,client=127.0.0.1",
            "|https://example.org/path",
            "/banner\\d+/$important",
            "0.0.0.0 a.example.org b.example.org",
        ];
        for line in lines {
            let parsed = RuleGrammar::parse(line).unwrap();
            assert_eq!(RuleGrammar::serialize(&parsed), line);
        }
    }

    #[test]
    fn test_plain_domain() {
        assert!(RuleGrammar::is_plain_domain("example.org"));
        assert!(RuleGrammar::is_plain_domain("ads.example.co.uk"));
        assert!(!RuleGrammar::is_plain_domain("||example.org^"));
        assert!(!RuleGrammar::is_plain_domain("example"));
        assert!(!RuleGrammar::is_plain_domain("0.0.0.0 example.org"));
    }
}
