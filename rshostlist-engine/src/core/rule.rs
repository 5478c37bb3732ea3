//! 规则数据模型
//! 两套互相竞争的语法：adblock 风格（`||domain^$opts`、`@@` 例外）与 `/etc/hosts` 风格（`ip host...`）
use std::fmt;

/// adblock 规则修饰符（`$` 之后逗号分隔的一项）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleOption {
    pub name: String,
    pub value: Option<String>,
}

impl RuleOption {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

impl fmt::Display for RuleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            // 值中的逗号需要转义，否则会被当作修饰符分隔符
            write!(f, "={}", value.replace(',', "\\,"))?;
        }
        Ok(())
    }
}

/// adblock 风格规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdblockRule {
    pub is_exception: bool,
    pub pattern: String,
    pub options: Vec<RuleOption>,
}

impl AdblockRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            is_exception: false,
            pattern: pattern.into(),
            options: Vec::new(),
        }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// 按名称查找第一个修饰符
    pub fn option(&self, name: &str) -> Option<&RuleOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// 序列化回规则文本
    pub fn to_rule_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AdblockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exception {
            f.write_str("@@")?;
        }
        f.write_str(&self.pattern)?;
        if !self.options.is_empty() {
            f.write_str("$")?;
            for (idx, option) in self.options.iter().enumerate() {
                if idx > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", option)?;
            }
        }
        Ok(())
    }
}

/// `/etc/hosts` 风格规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsRule {
    pub ip: String,
    pub hostnames: Vec<String>,
}

impl fmt::Display for HostsRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ip)?;
        for hostname in &self.hostnames {
            write!(f, " {}", hostname)?;
        }
        Ok(())
    }
}

/// 单行解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRule {
    /// `!` 或 `#` 开头的注释
    Comment(String),
    /// 空行（仅含空白）
    Empty,
    Adblock(AdblockRule),
    Hosts(HostsRule),
}

impl ParsedRule {
    pub fn is_comment_or_empty(&self) -> bool {
        matches!(self, ParsedRule::Comment(_) | ParsedRule::Empty)
    }
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedRule::Comment(text) => f.write_str(text),
            ParsedRule::Empty => Ok(()),
            ParsedRule::Adblock(rule) => write!(f, "{}", rule),
            ParsedRule::Hosts(rule) => write!(f, "{}", rule),
        }
    }
}
