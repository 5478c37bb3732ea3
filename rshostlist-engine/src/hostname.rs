//! 主机名策略：语法校验、公共后缀、IP 字面量、父域遍历、域名锚点提取

use std::net::IpAddr;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// 是否为 IP 字面量（支持 `[::1]` 形式）
pub fn is_ip(hostname: &str) -> bool {
    let trimmed = hostname
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(hostname);
    trimmed.parse::<IpAddr>().is_ok()
}

/// 仅做语法层面的主机名检查（长度、标签、字符集）
pub fn is_hostname_syntax(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

/// 公共后缀（依据公共后缀表；未收录的 TLD 按默认 `*` 规则取最后一个标签）
pub fn public_suffix(hostname: &str) -> Option<String> {
    let lower = hostname.to_ascii_lowercase();
    psl::suffix_str(&lower).map(str::to_string)
}

/// 主机名本身是否就是一个完整的公共后缀（如 `com`、`co.uk`）
pub fn is_public_suffix(hostname: &str) -> bool {
    let lower = hostname.to_ascii_lowercase();
    match psl::suffix_str(&lower) {
        Some(suffix) => suffix == lower,
        None => false,
    }
}

/// 合法主机名：语法正确、可识别出公共后缀之下的可注册域
/// IP 字面量仅在 allow_ip 时合法
pub fn is_valid_hostname(hostname: &str, allow_ip: bool) -> bool {
    if hostname.is_empty() {
        return false;
    }
    if is_ip(hostname) {
        return allow_ip;
    }

    let lower = hostname.to_ascii_lowercase();
    if !is_hostname_syntax(&lower) {
        return false;
    }

    psl::suffix_str(&lower).is_some() && psl::domain_str(&lower).is_some()
}

/// 父域列表（由近及远）：逐级去掉最左标签，不含自身，也不含公共后缀及更短的后缀
pub fn parent_domains(hostname: &str) -> Vec<&str> {
    let suffix_len = psl::suffix_str(hostname).map_or(0, str::len);
    let mut parents = Vec::new();
    let mut rest = hostname;

    while let Some(idx) = rest.find('.') {
        rest = &rest[idx + 1..];
        if rest.len() <= suffix_len {
            break;
        }
        parents.push(rest);
    }

    parents
}

/// 从 `||domain^` 形态的 pattern 中提取域名部分以及 `^` 之后的剩余内容
/// 返回 None 表示不是域名锚点规则
pub fn split_domain_anchor(pattern: &str) -> Option<(&str, &str)> {
    let body = pattern.strip_prefix("||")?;
    let sep_idx = body.find('^')?;
    Some((&body[..sep_idx], &body[sep_idx + 1..]))
}

/// 从规则 pattern 中剥离锚点/通配符，得到裸主机名
/// 返回 None 表示 pattern 不是"单一主机名"形态（如路径、正则、中间通配）
pub fn extract_hostname(pattern: &str) -> Option<String> {
    if pattern.starts_with('/') && pattern.ends_with('/') && pattern.len() > 1 {
        return None;
    }

    let mut host = pattern
        .trim_start_matches("||")
        .trim_start_matches('|')
        .trim_start_matches("://");
    host = host.strip_prefix("*.").unwrap_or(host);
    host = host.trim_start_matches('*').trim_start_matches('.');

    // 截断到第一个分隔符
    if let Some(idx) = host.find(['^', '/', '$', '|']) {
        host = &host[..idx];
    }
    let host = host.trim_end_matches('*').trim_end_matches('.');

    if host.is_empty() || host.contains('*') || host.contains(':') {
        return None;
    }

    let lower = host.to_ascii_lowercase();
    if is_hostname_syntax(&lower) || is_ip(&lower) {
        Some(lower)
    } else {
        None
    }
}
