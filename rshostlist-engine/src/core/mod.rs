// 核心数据结构：规则模型
pub mod rule;

pub use rule::{AdblockRule, HostsRule, ParsedRule, RuleOption};
