//! Needle-set construction: turn a dictionary file or `-s` arguments into
//! the searchable index.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::bytes;
use crate::reader::LineReader;
use crate::trie::Trie;

/// Build the index from a line-oriented dictionary file.
///
/// One needle per line, after stripping the trailing `\n` and `\r` runs.
/// Empty lines contribute nothing. Needles are ASCII-lowercased when
/// `case_insensitive` is set, so the matcher can probe with a lowered view.
///
/// Returns the index and the number of needles inserted.
pub fn build_from_file(path: &Path, case_insensitive: bool) -> Result<(Trie, usize)> {
    let file =
        File::open(path).with_context(|| format!("No access to file {}", path.display()))?;
    let mut reader = LineReader::new(file);
    let mut trie = Trie::new();
    let mut count = 0usize;
    let mut lower = Vec::new();
    loop {
        let line = reader
            .next_line()
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if line.is_empty() {
            break;
        }
        let needle = bytes::trim_trailing(bytes::trim_trailing(line, b'\n'), b'\r');
        if needle.is_empty() {
            continue;
        }
        if case_insensitive {
            bytes::to_lower_into(needle, &mut lower);
            trie.insert(&lower);
        } else {
            trie.insert(needle);
        }
        count += 1;
    }
    Ok((trie, count))
}

/// Build the index from `-s/--substring` arguments. Empty values contribute
/// nothing. No trimming: the shell already delimited the values.
pub fn build_from_args(substrings: &[String], case_insensitive: bool) -> (Trie, usize) {
    let mut trie = Trie::new();
    let mut count = 0usize;
    let mut lower = Vec::new();
    for substring in substrings {
        let needle = substring.as_bytes();
        if needle.is_empty() {
            continue;
        }
        if case_insensitive {
            bytes::to_lower_into(needle, &mut lower);
            trie.insert(&lower);
        } else {
            trie.insert(needle);
        }
        count += 1;
    }
    (trie, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn needle_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_one_needle_per_line() {
        let file = needle_file(b"foo\nbar\n");
        let (trie, count) = build_from_file(file.path(), false).unwrap();
        assert_eq!(count, 2);
        assert!(trie.has_prefix_match(b"foo"));
        assert!(trie.has_prefix_match(b"bar"));
        assert!(!trie.has_prefix_match(b"baz"));
    }

    #[test]
    fn skips_empty_lines_and_crlf() {
        let file = needle_file(b"foo\r\n\n\r\nbar");
        let (trie, count) = build_from_file(file.path(), false).unwrap();
        assert_eq!(count, 2);
        assert!(trie.has_prefix_match(b"foo"));
        assert!(trie.has_prefix_match(b"bar"));
        // The \r\n never became part of a needle.
        assert!(!trie.has_prefix_match(b"\r"));
        assert!(!trie.has_prefix_match(b"\n"));
    }

    #[test]
    fn lowercases_needles_when_case_insensitive() {
        let file = needle_file(b"FooBar\n");
        let (trie, _) = build_from_file(file.path(), true).unwrap();
        assert!(trie.has_prefix_match(b"foobar"));
        assert!(!trie.has_prefix_match(b"FooBar"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = build_from_file(Path::new("/no/such/dictionary"), false).unwrap_err();
        assert!(err.to_string().contains("/no/such/dictionary"));
    }

    #[test]
    fn args_skip_empty_values() {
        let (trie, count) =
            build_from_args(&["foo".into(), String::new(), "bar".into()], false);
        assert_eq!(count, 2);
        assert!(trie.has_prefix_match(b"foo"));
        assert!(trie.has_prefix_match(b"bar"));
    }

    #[test]
    fn args_respect_case_insensitive() {
        let (trie, _) = build_from_args(&["MiXeD".into()], true);
        assert!(trie.has_prefix_match(b"mixed"));
    }
}
