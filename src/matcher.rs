//! The streaming match loop.
//!
//! One line at a time: decide whether any needle occurs anywhere in the
//! line, then emit or suppress the original bytes. The match view and the
//! emit view are distinct: under case-insensitive mode the probe sees a
//! lowered copy in a scratch buffer, while emission always reaches for the
//! unmodified line.

use std::io::{Read, Write};

use anyhow::{Context, Result};

use crate::bytes;
use crate::progress::Progress;
use crate::reader::LineReader;
use crate::trie::Trie;

/// Match-phase switches, fixed for the lifetime of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Probe a lowered copy of each line; the needles were lowered at
    /// build time to match.
    pub case_insensitive: bool,
    /// Emit the lines that contain no needle instead.
    pub invert: bool,
}

/// True iff any inserted needle occurs anywhere in `line`.
///
/// The trailing `\n` and `\r` runs are invisible to the probe, so CRLF
/// input matches the same needles as LF input, and so does the final
/// unterminated line.
pub fn contains_any_needle(trie: &Trie, line: &[u8]) -> bool {
    let line = bytes::trim_trailing(line, b'\n');
    let line = bytes::trim_trailing(line, b'\r');
    (0..line.len()).any(|i| trie.has_prefix_match(&line[i..]))
}

/// Stream `reader` to `sink`: emit each line whose match result XOR
/// `invert` is set, byte-for-byte in input order. Returns the number of
/// input bytes consumed.
pub fn run<R: Read, W: Write>(
    trie: &Trie,
    reader: &mut LineReader<R>,
    sink: &mut W,
    opts: MatchOptions,
    mut progress: Option<&mut Progress>,
) -> Result<u64> {
    let mut lower = Vec::new();
    let mut processed: u64 = 0;
    loop {
        let line = reader.next_line().context("Failed to read input")?;
        if line.is_empty() {
            break;
        }

        let matched = if opts.case_insensitive {
            bytes::to_lower_into(line, &mut lower);
            contains_any_needle(trie, &lower)
        } else {
            contains_any_needle(trie, line)
        };

        if matched != opts.invert {
            sink.write_all(line).context("Failed to write")?;
        }

        processed += line.len() as u64;
        if let Some(p) = progress.as_deref_mut() {
            p.report(processed, false);
        }
    }
    sink.flush().context("Failed to write")?;

    if let Some(p) = progress.as_deref_mut() {
        p.finish(processed);
    }
    Ok(processed)
}
