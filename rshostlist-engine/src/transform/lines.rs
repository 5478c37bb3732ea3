//! 逐行无状态转换

use crate::core::ParsedRule;
use crate::grammar::{convert_rule_to_ascii, RuleGrammar};

pub fn trim_lines(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().map(|line| line.trim().to_string()).collect()
}

/// 删除 `!` / `#` 注释（空行保留，由 RemoveEmptyLines 负责）
pub fn remove_comments(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().filter(|line| !RuleGrammar::is_comment(line)).collect()
}

pub fn remove_empty_lines(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().filter(|line| !RuleGrammar::is_empty(line)).collect()
}

/// 序列非空且末行不是空行时追加一个空行
pub fn insert_final_newline(mut lines: Vec<String>) -> Vec<String> {
    if lines.last().is_some_and(|last| !RuleGrammar::is_empty(last)) {
        lines.push(String::new());
    }
    lines
}

pub fn convert_to_ascii(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().map(|line| convert_rule_to_ascii(&line)).collect()
}

/// 阻止规则反转为放行规则：注释、hosts 规则、已是例外的规则不动
pub fn invert_allow(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            if RuleGrammar::is_comment_or_empty(&line)
                || RuleGrammar::is_hosts_rule(&line)
                || RuleGrammar::is_exception(&line)
            {
                line
            } else {
                format!("@@{}", line)
            }
        })
        .collect()
}

/// 去掉 adblock 规则的全部修饰符（保留例外标记）
pub fn remove_modifiers(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| match RuleGrammar::parse(&line) {
            Ok(ParsedRule::Adblock(mut rule)) if rule.has_options() => {
                rule.options.clear();
                rule.to_rule_text()
            }
            _ => line,
        })
        .collect()
}
