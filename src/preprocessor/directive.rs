//! 指令识别 + 条件块展开（纯同步）
//! 展开结果中只剩普通行与 `!#include` 行，include 由下载器异步处理

use rshostlist_engine::ExpressionEvaluator;

use crate::error::{CompilerError, CompilerResult};

const IF: &str = "!#if";
const ELSE: &str = "!#else";
const ENDIF: &str = "!#endif";
const INCLUDE: &str = "!#include";
const SAFARI_AFFINITY: &str = "!#safari_cb_affinity";

/// 带行号（从 1 开始）的原始行
pub type NumberedLine<'a> = (usize, &'a str);

/// 指令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    If(&'a str),
    Else,
    Endif,
    Include(&'a str),
    /// `!#safari_cb_affinity(...)` 开启标记
    SafariAffinityStart,
    /// 精确匹配的 `!#safari_cb_affinity` 结束标记
    SafariAffinityEnd,
    /// 非指令行
    Line,
}

impl<'a> Directive<'a> {
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with("!#") {
            return Directive::Line;
        }

        if trimmed == SAFARI_AFFINITY {
            return Directive::SafariAffinityEnd;
        }
        if trimmed.starts_with(SAFARI_AFFINITY) {
            return Directive::SafariAffinityStart;
        }
        if trimmed == ELSE {
            return Directive::Else;
        }
        if trimmed == ENDIF {
            return Directive::Endif;
        }
        if let Some(path) = strip_keyword(trimmed, INCLUDE) {
            return Directive::Include(path);
        }
        if let Some(condition) = strip_keyword(trimmed, IF) {
            return Directive::If(condition);
        }

        Directive::Line
    }
}

/// 关键字后必须是空白、`(` 或行尾
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() || c == '(' => Some(rest.trim()),
        Some(_) => None,
    }
}

/// 展开条件块、跳过 Safari 专属块
pub fn resolve_conditionals<'a>(
    source_id: &str,
    text: &'a str,
    evaluator: &ExpressionEvaluator,
) -> CompilerResult<Vec<NumberedLine<'a>>> {
    let lines: Vec<NumberedLine<'a>> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
    let mut output = Vec::with_capacity(lines.len());
    resolve_block(source_id, &lines, evaluator, &mut output)?;
    Ok(output)
}

fn resolve_block<'a>(
    source_id: &str,
    lines: &[NumberedLine<'a>],
    evaluator: &ExpressionEvaluator,
    output: &mut Vec<NumberedLine<'a>>,
) -> CompilerResult<()> {
    let mut i = 0;
    while i < lines.len() {
        let (line_no, line) = lines[i];
        match Directive::classify(line) {
            Directive::If(condition) => {
                let block = collect_if_block(source_id, lines, i)?;
                if evaluator.evaluate(condition) {
                    resolve_block(source_id, &block.then_lines, evaluator, output)?;
                } else if !block.else_lines.is_empty() {
                    resolve_block(source_id, &block.else_lines, evaluator, output)?;
                }
                i = block.end + 1;
            }
            Directive::Else | Directive::Endif => {
                return Err(CompilerError::PreprocessorError {
                    source_id: source_id.to_string(),
                    line: line_no,
                    message: format!("`{}` without a matching `!#if`", line.trim()),
                });
            }
            Directive::SafariAffinityStart => {
                // 跳到精确结束标记之后；缺少结束标记时吞掉剩余全部行
                i += 1;
                while i < lines.len() && Directive::classify(lines[i].1) != Directive::SafariAffinityEnd {
                    i += 1;
                }
                i += 1;
            }
            Directive::SafariAffinityEnd => i += 1,
            Directive::Include(_) | Directive::Line => {
                output.push((line_no, line));
                i += 1;
            }
        }
    }
    Ok(())
}

struct IfBlock<'a> {
    then_lines: Vec<NumberedLine<'a>>,
    else_lines: Vec<NumberedLine<'a>>,
    /// `!#endif` 所在下标
    end: usize,
}

/// 自 `!#if` 所在下标起向后扫描，按嵌套深度定位配对的 `!#endif`
fn collect_if_block<'a>(source_id: &str, lines: &[NumberedLine<'a>], start: usize) -> CompilerResult<IfBlock<'a>> {
    let mut depth = 1usize;
    let mut in_else = false;
    let mut then_lines = Vec::new();
    let mut else_lines = Vec::new();

    for (idx, &(line_no, line)) in lines.iter().enumerate().skip(start + 1) {
        match Directive::classify(line) {
            Directive::If(_) => depth += 1,
            Directive::Endif => {
                depth -= 1;
                if depth == 0 {
                    return Ok(IfBlock {
                        then_lines,
                        else_lines,
                        end: idx,
                    });
                }
            }
            Directive::Else if depth == 1 => {
                in_else = !in_else;
                continue;
            }
            _ => {}
        }

        if in_else {
            else_lines.push((line_no, line));
        } else {
            then_lines.push((line_no, line));
        }
    }

    Err(CompilerError::PreprocessorError {
        source_id: source_id.to_string(),
        line: lines[start].0,
        message: "unterminated `!#if` block (missing `!#endif`)".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str, platform: Option<&str>) -> CompilerResult<Vec<String>> {
        let evaluator = ExpressionEvaluator::new(platform);
        resolve_conditionals("test.txt", text, &evaluator)
            .map(|lines| lines.into_iter().map(|(_, l)| l.to_string()).collect())
    }

    #[test]
    fn test_classify() {
        assert_eq!(Directive::classify("!#if windows"), Directive::If("windows"));
        assert_eq!(Directive::classify("  !#if (mac || ios)"), Directive::If("(mac || ios)"));
        assert_eq!(Directive::classify("!#else"), Directive::Else);
        assert_eq!(Directive::classify("!#endif"), Directive::Endif);
        assert_eq!(Directive::classify("!#include sub/list.txt"), Directive::Include("sub/list.txt"));
        assert_eq!(
            Directive::classify("!#safari_cb_affinity(general,privacy)"),
            Directive::SafariAffinityStart
        );
        assert_eq!(Directive::classify("!#safari_cb_affinity"), Directive::SafariAffinityEnd);
        assert_eq!(Directive::classify("!#iffy"), Directive::Line);
        assert_eq!(Directive::classify("! comment"), Directive::Line);
        assert_eq!(Directive::classify("||example.org^"), Directive::Line);
    }

    #[test]
    fn test_if_else() {
        let text = "a\n!#if windows\nwin\n!#else\nother\n!#endif\nb";
        assert_eq!(resolve(text, Some("windows")).unwrap(), vec!["a", "win", "b"]);
        assert_eq!(resolve(text, Some("mac")).unwrap(), vec!["a", "other", "b"]);
        assert_eq!(resolve(text, None).unwrap(), vec!["a", "other", "b"]);
    }

    #[test]
    fn test_false_without_else_emits_nothing() {
        let text = "!#if false\nhidden\n!#endif\nshown";
        assert_eq!(resolve(text, None).unwrap(), vec!["shown"]);
    }

    #[test]
    fn test_nested_blocks() {
        let text = "\
!#if true
outer
!#if mac
mac-only
!#else
not-mac
!#endif
!#else
never
!#endif";
        assert_eq!(resolve(text, Some("windows")).unwrap(), vec!["outer", "not-mac"]);
        assert_eq!(resolve(text, Some("mac")).unwrap(), vec!["outer", "mac-only"]);
    }

    #[test]
    fn test_safari_affinity_skipped() {
        let text = "a\n!#safari_cb_affinity(privacy)\nsafari\n!#safari_cb_affinity\nb";
        assert_eq!(resolve(text, None).unwrap(), vec!["a", "b"]);

        let unterminated = "a\n!#safari_cb_affinity(privacy)\nsafari\n!#safari_cb_affinity(x)\nrest";
        assert_eq!(resolve(unterminated, None).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_passthrough_keeps_comments_and_blanks() {
        let text = "! comment\n\n!#include other.txt\n||x.org^";
        assert_eq!(
            resolve(text, None).unwrap(),
            vec!["! comment", "", "!#include other.txt", "||x.org^"]
        );
    }

    #[test]
    fn test_unterminated_if_reports_line() {
        let err = resolve("a\nb\n!#if true\nc", None).unwrap_err();
        match err {
            CompilerError::PreprocessorError { line, source_id, .. } => {
                assert_eq!(line, 3);
                assert_eq!(source_id, "test.txt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stray_endif() {
        let err = resolve("a\n!#endif", None).unwrap_err();
        assert!(matches!(err, CompilerError::PreprocessorError { line: 2, .. }));
    }
}
