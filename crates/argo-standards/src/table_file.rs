//! Pipe-separated table files.
//!
//! Every specification side table (reference vocabularies, parameter names,
//! units) uses the same layout: one record per line, columns separated by
//! `|`, no quoting. Blank lines and lines starting with `//` are skipped.

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::{Result, StandardsError};

/// Reads all records of a table file. Columns are trimmed.
pub fn read_table(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    parse_table(path, &String::from_utf8_lossy(&bytes))
}

/// Like [`read_table`], but a missing file yields `None`.
pub fn read_optional_table(path: &Path) -> Result<Option<Vec<Vec<String>>>> {
    if !path.is_file() {
        return Ok(None);
    }
    read_table(path).map(Some)
}

pub(crate) fn parse_table(path: &Path, text: &str) -> Result<Vec<Vec<String>>> {
    let content: String = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("//")
        })
        .map(|line| format!("{line}\n"))
        .collect();

    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StandardsError::csv(path, &e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "// header\n\nAPEX | Teledyne apex float\n  // indented comment\nARVOR|nke\n";
        let rows = parse_table(Path::new("t"), text).expect("parse");
        assert_eq!(
            rows,
            vec![
                vec!["APEX".to_string(), "Teledyne apex float".to_string()],
                vec!["ARVOR".to_string(), "nke".to_string()],
            ]
        );
    }

    #[test]
    fn keeps_quotes_literal() {
        let rows = parse_table(Path::new("t"), "a \"b|c\n").expect("parse");
        assert_eq!(rows[0], vec!["a \"b".to_string(), "c".to_string()]);
    }
}
