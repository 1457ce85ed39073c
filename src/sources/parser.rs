//! Line-oriented parsing of `NAME=VALUE` files.
//!
//! The grammar is deliberately small: blank lines, `#` comments, and plain
//! assignments. There is no escape processing, no `${...}` interpolation, and
//! no inline-comment stripping, so a value is exactly what appears after the
//! `=` (minus surrounding whitespace and one optional pair of quotes). A line
//! that fits none of the three forms fails the whole file with
//! [`ResolveError::MalformedLine`]; errors carry the file and 1-based line
//! number but never the line's text, which may be sensitive.

use crate::error::{ResolveError, Result};
use crate::sources::ConfigSource;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Parsed contents of a single source file.
pub type SourceMap = BTreeMap<String, String>;

/// Read `source` from disk and parse it.
///
/// Absence is interpreted through the source's role: an optional file that is
/// not on disk contributes an empty map, while a missing required file fails
/// with [`ResolveError::MissingRequiredSource`]. Any other read failure is
/// surfaced as an IO error.
pub(crate) fn load_source(source: &ConfigSource) -> Result<SourceMap> {
    let content = match std::fs::read_to_string(source.path()) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            if source.required() {
                return Err(ResolveError::MissingRequiredSource {
                    file_name: source.file_name().to_string(),
                    path: source.path().to_path_buf(),
                });
            }
            debug!(source = source.file_name(), "optional source absent, skipped");
            return Ok(SourceMap::new());
        }
        Err(err) => return Err(err.into()),
    };
    let map = parse_str(&content, source.path())?;
    debug!(
        source = source.file_name(),
        variables = map.len(),
        "loaded source"
    );
    Ok(map)
}

/// Parse dotenv-style `content` into a name/value map.
///
/// `path` is used for error reporting only. Within one file a later
/// assignment to the same name wins.
pub(crate) fn parse_str(content: &str, path: &Path) -> Result<SourceMap> {
    // A BOM at the start of the file is tolerated; anywhere else it is
    // ordinary (invalid-name) content.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut map = SourceMap::new();
    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            return Err(malformed(path, index));
        };
        let name = name.trim();
        if !is_valid_name(name) {
            return Err(malformed(path, index));
        }
        let value = unquote(value.trim());
        if map.insert(name.to_string(), value.to_string()).is_some() {
            debug!(
                file = %path.display(),
                name,
                line = index + 1,
                "duplicate assignment, later line wins"
            );
        }
    }
    Ok(map)
}

fn malformed(path: &Path, index: usize) -> ResolveError {
    ResolveError::MalformedLine {
        path: path.to_path_buf(),
        line: index + 1,
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one matching pair of surrounding quotes, if present.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<SourceMap> {
        parse_str(content, &PathBuf::from(".env.test"))
    }

    #[test]
    fn test_parses_plain_assignments() {
        let map = parse("HOST=localhost\nPORT=8080\n").unwrap();
        assert_eq!(map["HOST"], "localhost");
        assert_eq!(map["PORT"], "8080");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ignores_blank_lines_and_comments() {
        let content = "\n  \n# top comment\n   # indented comment\nKEY=value\n";
        let map = parse(content).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["KEY"], "value");
    }

    #[test]
    fn test_trims_whitespace_around_name_and_value() {
        let map = parse("  SPACED_KEY  =  spaced value  \n").unwrap();
        assert_eq!(map["SPACED_KEY"], "spaced value");
    }

    #[test]
    fn test_strips_one_pair_of_matching_quotes() {
        let map = parse(
            "DOUBLE=\"quoted value\"\nSINGLE='single'\nNESTED=\"'inner'\"\nEMPTY=\"\"\n",
        )
        .unwrap();
        assert_eq!(map["DOUBLE"], "quoted value");
        assert_eq!(map["SINGLE"], "single");
        assert_eq!(map["NESTED"], "'inner'");
        assert_eq!(map["EMPTY"], "");
    }

    #[test]
    fn test_mismatched_quotes_are_kept_verbatim() {
        let map = parse("A=\"unterminated\nB='mixed\"\nC=\"\n").unwrap();
        assert_eq!(map["A"], "\"unterminated");
        assert_eq!(map["B"], "'mixed\"");
        assert_eq!(map["C"], "\"");
    }

    #[test]
    fn test_quoted_value_preserves_inner_whitespace() {
        let map = parse("PADDED=\"  keep me  \"\n").unwrap();
        assert_eq!(map["PADDED"], "  keep me  ");
    }

    #[test]
    fn test_no_escape_or_interpolation_processing() {
        let map = parse("RAW=a\\nb\nREF=${OTHER}\nHASH=value # not a comment\n").unwrap();
        assert_eq!(map["RAW"], "a\\nb");
        assert_eq!(map["REF"], "${OTHER}");
        assert_eq!(map["HASH"], "value # not a comment");
    }

    #[test]
    fn test_empty_value_is_preserved() {
        let map = parse("EMPTY=\n").unwrap();
        assert_eq!(map["EMPTY"], "");
    }

    #[test]
    fn test_value_may_contain_equals_signs() {
        let map = parse("DSN=postgres://u:p@host/db?sslmode=require\n").unwrap();
        assert_eq!(map["DSN"], "postgres://u:p@host/db?sslmode=require");
    }

    #[test]
    fn test_later_duplicate_wins_within_a_file() {
        let map = parse("KEY=first\nKEY=second\n").unwrap();
        assert_eq!(map["KEY"], "second");
    }

    #[test]
    fn test_line_without_equals_is_malformed() {
        let err = parse("GOOD=1\nNOT_AN_ASSIGNMENT\n").unwrap_err();
        match err {
            ResolveError::MalformedLine { path, line } => {
                assert_eq!(path, PathBuf::from(".env.test"));
                assert_eq!(line, 2);
            }
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_names_are_malformed() {
        for content in ["1KEY=x\n", "=x\n", "KEY NAME=x\n", "KE-Y=x\n", "ключ=x\n"] {
            let err = parse(content).unwrap_err();
            assert!(
                matches!(err, ResolveError::MalformedLine { line: 1, .. }),
                "{content:?} should be malformed, got {err:?}"
            );
        }
    }

    #[test]
    fn test_malformed_error_counts_all_lines() {
        // Blank and comment lines still advance the reported line number.
        let err = parse("# header\n\nKEY=ok\n???\n").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLine { line: 4, .. }));
    }

    #[test]
    fn test_leading_bom_is_stripped() {
        let map = parse("\u{feff}FIRST=1\n").unwrap();
        assert_eq!(map["FIRST"], "1");
    }

    #[test]
    fn test_crlf_line_endings() {
        let map = parse("A=1\r\nB=2\r\n").unwrap();
        assert_eq!(map["A"], "1");
        assert_eq!(map["B"], "2");
    }

    #[test]
    fn test_underscore_prefixed_names_are_valid() {
        let map = parse("_PRIVATE=1\n__DOUBLE=2\n").unwrap();
        assert_eq!(map.len(), 2);
    }

    proptest! {
        // Any well-formed assignment of a valid name to quote-free text must
        // parse back to the trimmed value.
        #[test]
        fn prop_plain_assignments_round_trip(
            name in "[A-Za-z_][A-Za-z0-9_]{0,15}",
            value in "[ a-zA-Z0-9_./:@-]{0,24}",
        ) {
            let map = parse_str(
                &format!("{name}={value}\n"),
                &PathBuf::from(".env"),
            ).unwrap();
            prop_assert_eq!(map.get(&name).map(String::as_str), Some(value.trim()));
        }

        // Parsing never panics on arbitrary input; it either produces a map
        // or reports a located error.
        #[test]
        fn prop_parser_is_total(content in "\\PC{0,200}") {
            let _ = parse_str(&content, &PathBuf::from(".env"));
        }
    }
}
