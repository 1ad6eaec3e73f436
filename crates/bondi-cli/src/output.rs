//! Rendering of command results for humans or for scripts.

use serde::Serialize;

use crate::cli::OutputMode;

/// Printer chosen by `--output-mode`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Print a value as JSON, or as a table of rows built by `rows`.
    pub fn collection<T, F>(&self, items: &[T], headers: &[&str], rows: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> Vec<String>,
    {
        if self.is_json() {
            return print_json(items);
        }
        let rows: Vec<Vec<String>> = items.iter().map(rows).collect();
        println!("{}", render_table(headers, &rows));
        Ok(())
    }

    /// Print a single value as JSON, or as `name: value` lines.
    pub fn record<T: Serialize>(&self, item: &T, fields: Vec<(&str, String)>) -> anyhow::Result<()> {
        if self.is_json() {
            return print_json(item);
        }
        println!("{}", render_record(&fields));
        Ok(())
    }

    /// Report a finished action. Silent in JSON mode.
    pub fn done(&self, message: &str) {
        if !self.is_json() {
            println!("{}", message);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Left-aligned table with a header row and a separator.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

pub fn render_record(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(name, value)| format!("{:<width$}  {}", format!("{}:", name), value, width = width + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "libpng".to_string()],
            vec!["1024".to_string(), "zlib".to_string()],
        ];
        let table = render_table(&["ID", "Name"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID    Name");
        assert_eq!(lines[1], "----  ------");
        assert_eq!(lines[2], "1     libpng");
        assert_eq!(lines[3], "1024  zlib");
    }

    #[test]
    fn test_render_table_empty() {
        let table = render_table(&["ID"], &[]);
        assert_eq!(table, "ID\n--");
    }

    #[test]
    fn test_render_record() {
        let record = render_record(&[("id", "7".to_string()), ("name", "png".to_string())]);
        assert_eq!(record, "id:    7\nname:  png");
    }
}
