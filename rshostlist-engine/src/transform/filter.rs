//! 排除 / 包含过滤器
//! 三种过滤器形态：字面子串、`/regex/`、含 `*` 的通配符
//! 外部过滤器列表由外壳层拉取后逐行构造为同一形态

use regex::{Regex, RegexBuilder};

use crate::error::CoreResult;
use crate::grammar::RuleGrammar;

/// 单个过滤器
#[derive(Debug, Clone)]
pub enum Wildcard {
    /// 字面子串匹配
    Substring(String),
    /// `*` 通配（整行匹配，不区分大小写）
    Glob(Regex),
    /// `/regex/` 正则
    Regex(Regex),
}

impl Wildcard {
    pub fn new(pattern: &str) -> CoreResult<Self> {
        if pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/') {
            let body = &pattern[1..pattern.len() - 1];
            return Ok(Wildcard::Regex(Regex::new(body)?));
        }

        if pattern.contains('*') {
            let escaped = regex::escape(pattern).replace(r"\*", ".*");
            let re = RegexBuilder::new(&format!("^{}$", escaped))
                .case_insensitive(true)
                .build()?;
            return Ok(Wildcard::Glob(re));
        }

        Ok(Wildcard::Substring(pattern.to_string()))
    }

    pub fn matches(&self, line: &str) -> bool {
        match self {
            Wildcard::Substring(s) => line.contains(s.as_str()),
            Wildcard::Glob(re) | Wildcard::Regex(re) => re.is_match(line),
        }
    }
}

/// 批量构造过滤器（空行与 `!` / `#` 注释行跳过）
pub fn build_wildcards<'a>(patterns: impl IntoIterator<Item = &'a str>) -> CoreResult<Vec<Wildcard>> {
    patterns
        .into_iter()
        .map(str::trim)
        .filter(|p| !RuleGrammar::is_comment_or_empty(p))
        .map(Wildcard::new)
        .collect()
}

/// 排除：删除命中任一过滤器的行（注释行同样参与匹配）
pub fn exclude(lines: Vec<String>, exclusions: &[Wildcard]) -> Vec<String> {
    if exclusions.is_empty() {
        return lines;
    }

    let total = lines.len();
    let mut filtered = lines;
    filtered.retain(|line| !exclusions.iter().any(|w| w.matches(line)));
    log::debug!("Exclusions applied | removed {} of {} lines", total - filtered.len(), total);
    filtered
}

/// 包含：仅保留命中任一过滤器的行
pub fn include(lines: Vec<String>, inclusions: &[Wildcard]) -> Vec<String> {
    if inclusions.is_empty() {
        return lines;
    }

    let total = lines.len();
    let mut filtered = lines;
    filtered.retain(|line| inclusions.iter().any(|w| w.matches(line)));
    log::debug!("Inclusions applied | kept {} of {} lines", filtered.len(), total);
    filtered
}
