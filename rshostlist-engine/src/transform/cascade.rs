//! 自后向前的级联删除
//! 规则被删除时，紧邻其前的"注释"行一并删除；遇到被保留的规则行后级联标志复位。
//! 校验、去重、排除三处共用。

/// 按 `keep` 判定保留行，并级联删除被删行之前的注释行
///
/// - `is_annotation`：判定一行是否为注释（注释行本身不参与 `keep` 判定）
/// - `keep(index, line)`：对非注释行给出保留与否，index 为原序列中的下标
pub fn retain_with_cascade<A, K>(lines: Vec<String>, is_annotation: A, mut keep: K) -> Vec<String>
where
    A: Fn(&str) -> bool,
    K: FnMut(usize, &str) -> bool,
{
    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    let mut prev_removed = false;

    for (index, line) in lines.into_iter().enumerate().rev() {
        if is_annotation(&line) {
            if !prev_removed {
                kept.push(line);
            }
            continue;
        }

        if keep(index, &line) {
            prev_removed = false;
            kept.push(line);
        } else {
            prev_removed = true;
        }
    }

    kept.reverse();
    kept
}
