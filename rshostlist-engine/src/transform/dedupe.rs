//! 精确去重：保留首次出现，删除后续重复行及其前紧邻的纯注释

use rustc_hash::FxHashMap;

use crate::grammar::RuleGrammar;
use crate::transform::cascade::retain_with_cascade;

pub fn deduplicate(lines: Vec<String>) -> Vec<String> {
    // 每条规则首次出现的下标；注释与空行不参与去重
    let mut first_seen: FxHashMap<String, usize> = FxHashMap::default();
    for (index, line) in lines.iter().enumerate() {
        if !RuleGrammar::is_comment_or_empty(line) {
            first_seen.entry(line.clone()).or_insert(index);
        }
    }

    let total = lines.len();
    let result = retain_with_cascade(lines, RuleGrammar::is_comment, |index, line| {
        RuleGrammar::is_empty(line) || first_seen.get(line).map_or(true, |&first| first == index)
    });

    log::debug!("Deduplicate completed | removed {} of {} lines", total - result.len(), total);
    result
}
