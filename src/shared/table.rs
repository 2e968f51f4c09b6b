//! Table and text layout helpers used by the CLI.
//! Keeps ANSI-aware width calculations and simple table rendering in one place.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Render a simple text table. Column widths are auto-computed from the widest
/// cell (header or row) using display lengths that ignore ANSI color codes.
/// Columns without an entry in `align` are left-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>], align: &[Align]) -> Vec<String> {
    if headers.is_empty() {
        return Vec::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_len(cell));
        }
    }

    let header = format_row(headers, &widths, align);
    let mut out = vec![header.clone(), "-".repeat(display_len(&header))];
    for row in rows {
        out.push(format_row(row, &widths, align));
    }
    out
}

fn format_row(row: &[String], widths: &[usize], align: &[Align]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (i, (cell, width)) in row.iter().zip(widths.iter()).enumerate() {
        let plain_len = display_len(cell);
        match align.get(i).copied().unwrap_or(Align::Left) {
            Align::Left => parts.push(pad_field(cell, *width, plain_len)),
            Align::Right => {
                let padding = width.saturating_sub(plain_len);
                parts.push(format!("{}{}", " ".repeat(padding), cell));
            }
        }
    }
    parts.join("  ").trim_end().to_string()
}

/// Right-pad a field based on visible length (ignoring ANSI codes).
pub fn pad_field(display: &str, target: usize, plain_len: usize) -> String {
    let mut out = display.to_string();
    let padding = target.saturating_sub(plain_len);
    out.push_str(&" ".repeat(padding));
    out
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let len = text.chars().count();
    if len <= max_width {
        return text.to_string();
    }
    if max_width == 1 {
        return "…".to_string();
    }
    let mut out = text.chars().take(max_width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

/// Compute visible length of a string, ignoring ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let headers = vec!["Category".to_string(), "Items".to_string()];
        let rows = vec![
            vec!["Ops".to_string(), "12".to_string()],
            vec!["Writing".to_string(), "3".to_string()],
        ];
        let lines = render_table(&headers, &rows, &[Align::Left, Align::Right]);
        assert_eq!(lines[0], "Category  Items");
        assert_eq!(lines[1], "-".repeat(15));
        assert_eq!(lines[2], "Ops          12");
        assert_eq!(lines[3], "Writing       3");
    }

    #[test]
    fn widths_ignore_ansi() {
        assert_eq!(display_len("\x1b[1mbold\x1b[0m"), 4);
        assert_eq!(pad_field("\x1b[1mab\x1b[0m", 4, 2).len(), "\x1b[1mab\x1b[0m".len() + 2);
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_with_ellipsis("abc", 4), "abc");
        assert_eq!(truncate_with_ellipsis("abc", 1), "…");
        assert_eq!(truncate_with_ellipsis("abc", 0), "");
    }
}
