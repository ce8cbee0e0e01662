use serde::Serialize;
use std::path::Path;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Write pretty JSON to `path` atomically.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    trainlog_core::io::atomic_write(path, json.as_bytes())?;
    Ok(())
}

/// Hours rendered the way the flight log writes them.
pub fn hours(h: f64) -> String {
    trainlog_core::duration::format_duration(h)
}

/// Columns whose header is listed in `right` are right-aligned.
pub fn print_table(headers: &[&str], right: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                let is_right = headers.get(i).is_some_and(|h| right.contains(h));
                if is_right {
                    format!("{:>width$}", cell, width = w)
                } else {
                    format!("{:<width$}", cell, width = w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_row: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    println!("{}", render(&header_row));
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));
    for row in &rows {
        println!("{}", render(row));
    }
}
