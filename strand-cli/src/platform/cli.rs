//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和源码上下文打印。

use std::fmt::Write;

use strand_api::StrandError;

/// 错误行前后显示的上下文行数
const CONTEXT_LINES: usize = 5;

/// 打印错误并显示源代码上下文
pub fn print_error_with_source(e: &StrandError, source: &str) {
    eprintln!("❌ {}", e);

    if let (Some(line), Some(col)) = (e.line(), e.column()) {
        if let Some(context) = render_source_context(source, line, col) {
            eprint!("{}", context);
        }
    }
}

/// 渲染源代码上下文（错误行前后几行，错误列下方带 `^`）
///
/// 行号越界时返回 None。
pub fn render_source_context(source: &str, error_line: usize, error_col: usize) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return None;
    }

    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(lines.len());
    let width = end_line.to_string().len();

    let separator = "-".repeat(width + 1);
    let mut out = String::new();
    let _ = writeln!(out, "{}|--", separator);

    for line_idx in start_line..=end_line {
        let _ = writeln!(out, "{:>width$} | {}", line_idx, lines[line_idx - 1]);
        if line_idx == error_line {
            let marker = " ".repeat(error_col.saturating_sub(1));
            let _ = writeln!(out, "{} | {}^", " ".repeat(width), marker);
        }
    }

    let _ = writeln!(out, "{}|--", separator);
    Some(out)
}
