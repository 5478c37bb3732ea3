//! 源标识分类与 `!#include` 路径解析

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::CompilerResult;

/// Windows 盘符形式：`C:\` / `C:/`
static DRIVE_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]:[\\/]").expect("drive letter regex is valid"));

/// `http://` / `https://` 开头即为远程源
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().get(..8).unwrap_or(source).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 绝对路径：`/` 开头、盘符形式或完整 URL
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || DRIVE_LETTER_RE.is_match(path) || is_remote(path)
}

/// 解析 include 路径
/// 1. 已是绝对路径 / URL：原样返回
/// 2. base 为 URL：按标准 URL 相对解析（支持 `../`）
/// 3. base 为文件路径：替换最后一个分隔符之后的部分，不做 `..` 归一化
pub fn resolve_include_path(include_path: &str, base: &str) -> CompilerResult<String> {
    if is_absolute(include_path) {
        return Ok(include_path.to_string());
    }

    if is_remote(base) {
        let resolved = Url::parse(base)?.join(include_path)?;
        return Ok(resolved.to_string());
    }

    Ok(match base.rfind(['/', '\\']) {
        Some(idx) => format!("{}{}", &base[..=idx], include_path),
        None => include_path.to_string(),
    })
}
