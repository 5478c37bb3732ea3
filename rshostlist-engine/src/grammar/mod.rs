// 规则语法：解析 / 序列化 / 非 ASCII 转换
pub mod ascii;
pub mod parser;

pub use ascii::{convert_rule_to_ascii, domain_to_ascii};
pub use parser::RuleGrammar;
