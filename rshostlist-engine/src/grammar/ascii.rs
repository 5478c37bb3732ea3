//! 非 ASCII 域名转换（IDNA / punycode）
//! 覆盖范围：主 pattern 中的域名片段，以及 `domain=` / `denyallow=` / `client=` 修饰符值
//! （值可以是 `|` 分隔的域名列表，单项可带 `~` 否定前缀）

use crate::core::{AdblockRule, ParsedRule};
use crate::grammar::RuleGrammar;

/// 值为域名列表的修饰符
const DOMAIN_LIST_MODIFIERS: [&str; 3] = ["domain", "denyallow", "client"];

/// 将规则中的非 ASCII 域名标签转换为 punycode
/// 纯 ASCII 行与注释原样返回；无法解析的行退化为逐片段转换
pub fn convert_rule_to_ascii(line: &str) -> String {
    if line.is_ascii() || RuleGrammar::is_comment_or_empty(line) {
        return line.to_string();
    }

    match RuleGrammar::parse(line) {
        Ok(ParsedRule::Hosts(mut rule)) => {
            rule.hostnames = rule.hostnames.iter().map(|h| domain_to_ascii(h)).collect();
            rule.to_string()
        }
        Ok(ParsedRule::Adblock(rule)) => convert_adblock_rule(rule).to_string(),
        _ => convert_text(line),
    }
}

fn convert_adblock_rule(mut rule: AdblockRule) -> AdblockRule {
    rule.pattern = convert_text(&rule.pattern);

    for option in rule.options.iter_mut() {
        if !DOMAIN_LIST_MODIFIERS.contains(&option.name.as_str()) {
            continue;
        }
        if let Some(value) = option.value.as_mut() {
            if value.is_ascii() {
                continue;
            }
            *value = value
                .split('|')
                .map(|item| match item.strip_prefix('~') {
                    Some(domain) => format!("~{}", domain_to_ascii(domain)),
                    None => domain_to_ascii(item),
                })
                .collect::<Vec<_>>()
                .join("|");
        }
    }

    rule
}

/// 在任意文本中定位由"域名字符"组成的连续片段，仅转换含非 ASCII 字符的片段
fn convert_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len() * 2);
    let mut segment = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '.' {
            segment.push(ch);
        } else {
            flush_segment(&mut segment, &mut output);
            output.push(ch);
        }
    }
    flush_segment(&mut segment, &mut output);

    output
}

fn flush_segment(segment: &mut String, output: &mut String) {
    if segment.is_empty() {
        return;
    }
    if segment.is_ascii() {
        output.push_str(segment);
    } else {
        output.push_str(&domain_to_ascii(segment));
    }
    segment.clear();
}

/// 单个域名转 ASCII；转换失败时保留原文
pub fn domain_to_ascii(domain: &str) -> String {
    if domain.is_ascii() {
        return domain.to_string();
    }
    match idna::domain_to_ascii(domain) {
        Ok(ascii) => ascii,
        Err(e) => {
            log::debug!("IDNA conversion failed for {}: {:?}", domain, e);
            domain.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_pattern() {
        assert_eq!(convert_rule_to_ascii("||пример.рф^"), "||xn--e1afmkfd.xn--p1ai^");
        assert_eq!(convert_rule_to_ascii("@@||пример.рф^$important"), "@@||xn--e1afmkfd.xn--p1ai^$important");
    }

    #[test]
    fn test_convert_modifier_values() {
        assert_eq!(
            convert_rule_to_ascii("||example.org^$domain=пример.рф|~example.com"),
            "||example.org^$domain=xn--e1afmkfd.xn--p1ai|~example.com"
        );
        assert_eq!(
            convert_rule_to_ascii("||example.org^$denyallow=~пример.рф"),
            "||example.org^$denyallow=~xn--e1afmkfd.xn--p1ai"
        );
    }

    #[test]
    fn test_convert_hosts_rule() {
        assert_eq!(convert_rule_to_ascii("0.0.0.0 пример.рф"), "0.0.0.0 xn--e1afmkfd.xn--p1ai");
    }

    #[test]
    fn test_ascii_untouched() {
        assert_eq!(convert_rule_to_ascii("||example.org^"), "||example.org^");
        assert_eq!(convert_rule_to_ascii("! комментарий"), "! комментарий");
    }
}
