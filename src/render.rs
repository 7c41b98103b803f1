//! Plain-text elastic table for CLI output.

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let widths = column_widths(headers, rows);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();

    let mut output = String::new();
    output.push_str(&format_row(headers, &widths));
    output.push('\n');
    output.push_str(&format_row(&rule, &widths));
    output.push('\n');
    for row in rows {
        output.push_str(&format_row(row, &widths));
        output.push('\n');
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    widths
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{:<width$}", sanitize(cell)))
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line
}

fn sanitize(cell: &str) -> String {
    cell.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let headers = vec!["col".to_string(), "value".to_string()];
        let rows = vec![
            vec!["a".to_string(), "short".to_string()],
            vec!["widest-cell".to_string(), "x".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("col"));
        assert!(lines[1].starts_with("---"));
        assert!(lines[3].starts_with("widest-cell"));
    }

    #[test]
    fn control_characters_are_blanked() {
        let headers = vec!["h".to_string()];
        let rows = vec![vec!["a\tb\nc".to_string()]];
        let rendered = render_table(&headers, &rows);
        assert!(!rendered.contains('\t'));
        assert_eq!(rendered.lines().count(), 3);
    }
}
