//! Line normalization.
//!
//! Turns raw declaration text into the logical lines the parser reads:
//! trimmed, non-empty, and not a comment. Only whole-line comments are
//! recognized; a `#` after a declaration stays part of that line.

use crate::core::dialect::Dialect;

/// Normalize a sequence of raw lines.
///
/// Lines may still carry their `\n`/`\r\n` terminators.
pub fn normalize_lines<I, S>(lines: I, dialect: &Dialect) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| normalize_line(line.as_ref(), dialect))
        .collect()
}

/// Normalize a single string with embedded line breaks.
pub fn normalize_text(text: &str, dialect: &Dialect) -> Vec<String> {
    normalize_lines(text.lines(), dialect)
}

/// Like [`normalize_text`], but each kept line is paired with its 1-based
/// line number in `text`.
pub fn normalize_numbered(text: &str, dialect: &Dialect) -> Vec<(usize, String)> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| normalize_line(line, dialect).map(|l| (idx + 1, l)))
        .collect()
}

fn normalize_line(line: &str, dialect: &Dialect) -> Option<String> {
    let expanded;
    let line = if dialect.expand_tabs && line.contains('\t') {
        expanded = line.replace('\t', " ");
        expanded.as_str()
    } else {
        line
    };

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(dialect.comment_marker) {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dialect::{BERKSFILE, METADATA};

    #[test]
    fn test_strips_blanks_and_comments() {
        let text = "\n# comment\nname 'web'\n\n   # indented comment\nversion '1.0.0'\n";
        assert_eq!(
            normalize_text(text, &METADATA),
            vec!["name 'web'", "version '1.0.0'"]
        );
    }

    #[test]
    fn test_keeps_inline_comments() {
        let lines = normalize_text("cookbook 'apt' # pinned below\n", &BERKSFILE);
        assert_eq!(lines, vec!["cookbook 'apt' # pinned below"]);
    }

    #[test]
    fn test_lines_and_text_agree() {
        let text = "source 'https://a'\r\n\r\nmetadata\r\n";
        let raw: Vec<&str> = text.split_inclusive('\n').collect();
        assert_eq!(
            normalize_lines(raw, &BERKSFILE),
            normalize_text(text, &BERKSFILE)
        );
    }

    #[test]
    fn test_tabs_expanded_for_metadata() {
        let lines = normalize_text("depends\t'apt'\n", &METADATA);
        assert_eq!(lines, vec!["depends 'apt'"]);

        let lines = normalize_text("cookbook\t'apt'\n", &BERKSFILE);
        assert_eq!(lines, vec!["cookbook\t'apt'"]);
    }

    #[test]
    fn test_numbered_keeps_file_line_numbers() {
        let text = "# header\n\nsource 'https://a'\r\n\n  # note\ncookbook 'x'\n";
        assert_eq!(
            normalize_numbered(text, &BERKSFILE),
            vec![
                (3, "source 'https://a'".to_string()),
                (6, "cookbook 'x'".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_text("", &METADATA).is_empty());
        assert!(normalize_lines(Vec::<String>::new(), &BERKSFILE).is_empty());
    }
}
