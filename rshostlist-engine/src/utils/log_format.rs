use std::fmt::{self, Write};

// ======================== 日志预览：零堆分配截断 ========================
/// 空白字符折叠 + 截断，用于在日志中展示超长规则文本
/// 连续空白折叠为单个空格，超长时以省略号结尾
#[inline(always)]
pub fn preview_compact(s: &str, max_len: usize) -> impl fmt::Display + '_ {
    struct CompactView<'a> {
        source: &'a str,
        max_length: usize,
    }

    impl fmt::Display for CompactView<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut char_count = 0;
            let mut last_was_whitespace = false;

            for ch in self.source.chars() {
                if char_count >= self.max_length {
                    f.write_str("…")?;
                    break;
                }

                if ch.is_whitespace() {
                    if !last_was_whitespace {
                        f.write_char(' ')?;
                        char_count += 1;
                        last_was_whitespace = true;
                    }
                } else {
                    f.write_char(ch)?;
                    char_count += 1;
                    last_was_whitespace = false;
                }
            }
            Ok(())
        }
    }

    CompactView {
        source: s,
        max_length: max_len,
    }
}

// ======================== 衍生：规则列表日志格式化 ========================
/// 格式：[rule1, rule2, ...] (total: N)
pub fn preview_lines(lines: &[String]) -> String {
    let total_count = lines.len();
    if total_count == 0 {
        return "[empty]".to_string();
    }

    const MAX_COUNT: usize = 5;
    const MAX_LINE_LEN: usize = 60;

    let mut result = String::with_capacity(MAX_COUNT * (MAX_LINE_LEN + 2) + 20);
    result.push('[');
    for (idx, line) in lines.iter().take(MAX_COUNT).enumerate() {
        if idx > 0 {
            result.push_str(", ");
        }
        let _ = write!(result, "{}", preview_compact(line, MAX_LINE_LEN));
    }
    if total_count > MAX_COUNT {
        let _ = write!(result, ", … (total: {})", total_count);
    }
    result.push(']');

    result
}
