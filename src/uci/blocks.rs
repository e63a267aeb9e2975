//! Line-level helpers shared by the UCI parsers.

use crate::constants::uci::COMMENT_MARKER;
use crate::error::{HspfError, Result};
use std::fs;
use std::path::Path;

/// Read a UCI file into lines truncated to `width` columns and right trimmed
pub fn read_uci_lines(path: &Path, width: usize) -> Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content
        .lines()
        .map(|line| truncate(line, width).trim_end().to_string())
        .collect())
}

/// First `width` characters of a line
pub fn truncate(line: &str, width: usize) -> &str {
    match line.char_indices().nth(width) {
        Some((index, _)) => &line[..index],
        None => line,
    }
}

/// Fixed-width field `[start, end)`; short lines yield a short or empty field
pub fn field(line: &str, start: usize, end: usize) -> &str {
    let begin = line.char_indices().nth(start).map(|(i, _)| i);
    let Some(begin) = begin else {
        return "";
    };
    let finish = line
        .char_indices()
        .nth(end)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[begin..finish]
}

/// Non-blank line without a comment marker
pub fn is_data_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.contains(COMMENT_MARKER)
}

/// Lines from the exact `start` marker through the first `end` marker after
/// it, both included.
pub fn find_block<'a>(
    path: &Path,
    lines: &'a [String],
    start: &str,
    end: &str,
) -> Result<&'a [String]> {
    let missing = |block: &str| HspfError::MissingBlock {
        path: path.to_path_buf(),
        block: block.trim().to_string(),
    };

    let first = lines
        .iter()
        .position(|line| line == start)
        .ok_or_else(|| missing(start))?;
    let last = lines[first..]
        .iter()
        .position(|line| line == end)
        .map(|offset| first + offset)
        .ok_or_else(|| missing(end))?;

    Ok(&lines[first..=last])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_slicing() {
        let line = "  101     FOREST";
        assert_eq!(field(line, 0, 5), "  101");
        assert_eq!(field(line, 5, 10), "     ");
        assert_eq!(field(line, 10, 30), "FOREST");
        assert_eq!(field(line, 40, 50), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }

    #[test]
    fn test_is_data_line() {
        assert!(is_data_line("PERLND   1"));
        assert!(!is_data_line("   "));
        assert!(!is_data_line("<Name>  # *** comment"));
    }

    #[test]
    fn test_find_block() {
        let lines: Vec<String> = ["GLOBAL", "END GLOBAL", "PERLND", "  x", "END PERLND"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let block = find_block(Path::new("t.uci"), &lines, "PERLND", "END PERLND").unwrap();
        assert_eq!(block.len(), 3);

        let missing = find_block(Path::new("t.uci"), &lines, "SCHEMATIC", "END SCHEMATIC");
        assert!(matches!(missing, Err(HspfError::MissingBlock { block, .. }) if block == "SCHEMATIC"));
    }
}
