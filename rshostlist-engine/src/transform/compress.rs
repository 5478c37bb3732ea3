//! Compress：hosts 规则与纯域名转为 `||hostname^`，并删除被父域规则覆盖的子域规则

use rustc_hash::FxHashSet;

use crate::core::ParsedRule;
use crate::grammar::RuleGrammar;
use crate::hostname::{extract_hostname, is_hostname_syntax, is_ip, parent_domains};

enum Entry {
    /// 可压缩的阻止规则（已规范化为 `||hostname^`）
    Blocking(String),
    /// 注释、例外、带修饰符或非域名形态的规则，原样保留
    Passthrough(String),
}

pub fn compress(lines: Vec<String>) -> Vec<String> {
    let total = lines.len();
    let mut entries: Vec<Entry> = Vec::with_capacity(total);
    let mut blocked: FxHashSet<String> = FxHashSet::default();

    for line in lines {
        for entry in to_entries(line) {
            match entry {
                Entry::Blocking(hostname) => {
                    // 同一主机名只保留第一次出现
                    if blocked.insert(hostname.clone()) {
                        entries.push(Entry::Blocking(hostname));
                    }
                }
                passthrough => entries.push(passthrough),
            }
        }
    }

    let result: Vec<String> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Entry::Blocking(hostname) => {
                let covered = parent_domains(&hostname)
                    .iter()
                    .any(|parent| blocked.contains(*parent));
                (!covered).then(|| format!("||{}^", hostname))
            }
            Entry::Passthrough(line) => Some(line),
        })
        .collect();

    log::debug!("Compress completed | input: {} | output: {}", total, result.len());
    result
}

fn to_entries(line: String) -> Vec<Entry> {
    if RuleGrammar::is_comment_or_empty(&line) {
        return vec![Entry::Passthrough(line)];
    }

    match RuleGrammar::parse(&line) {
        Ok(ParsedRule::Hosts(rule)) => rule
            .hostnames
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .filter(|h| is_hostname_syntax(h) && !is_ip(h))
            .map(Entry::Blocking)
            .collect(),
        Ok(ParsedRule::Adblock(rule)) if !rule.is_exception && !rule.has_options() => {
            let trimmed = line.trim();
            if RuleGrammar::is_plain_domain(trimmed) && !is_ip(trimmed) {
                return vec![Entry::Blocking(trimmed.to_ascii_lowercase())];
            }
            match extract_hostname(&rule.pattern) {
                Some(hostname) if rule.pattern.eq_ignore_ascii_case(&format!("||{}^", hostname)) => {
                    vec![Entry::Blocking(hostname)]
                }
                _ => vec![Entry::Passthrough(line)],
            }
        }
        _ => vec![Entry::Passthrough(line)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hosts_and_plain_domains_converted() {
        let input = strings(&["0.0.0.0 a.example.org b.example.com", "c.example.net"]);
        assert_eq!(
            compress(input),
            strings(&["||a.example.org^", "||b.example.com^", "||c.example.net^"])
        );
    }

    #[test]
    fn test_duplicates_and_subdomains_removed() {
        let input = strings(&[
            "||ads.example.org^",
            "0.0.0.0 example.org",
            "||example.org^",
            "||tracker.other.com^",
        ]);
        assert_eq!(compress(input), strings(&["||example.org^", "||tracker.other.com^"]));
    }

    #[test]
    fn test_passthrough_untouched() {
        let input = strings(&[
            "! comment",
            "||ads.example.org^$important",
            "@@||ads.example.org^",
            "||example.org^",
            "/regex/",
        ]);
        assert_eq!(compress(input.clone()), input);
    }

    #[test]
    fn test_bare_ip_line_passes_through() {
        let input = strings(&["10.0.0.10", "ads.example.org"]);
        assert_eq!(compress(input), strings(&["10.0.0.10", "||ads.example.org^"]));
    }
}
