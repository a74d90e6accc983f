//! Top-level driver: the implicit root and the public entry points.
//!
//! The root behaves like an open-ended block with no matchers of its own and
//! the caller's top-level [`Nesting`] as its children. It differs from an
//! ordinary block in three ways: a line no child claims is skipped rather
//! than ending anything, each root-level commit runs as soon as its subtree
//! closes (the root can never fail, so there is nothing left to defer), and
//! the consumed prefix of the buffer is dropped after every step to bound
//! memory.

use std::fs;
use std::path::Path;

use crate::definition::Nesting;
use crate::error::ParseError;
use crate::line::ParseSummary;
use crate::matching::Matcher;
use crate::parsing::{try_children, ChildState};
use crate::source::LineSource;

/// Run the definition over a lazy sequence of lines.
///
/// Lines arrive already split, terminators stripped. The same definition
/// value can be reused across runs; usage counts and matcher memos are
/// per-run state.
pub fn parse_stream<I>(lines: I, spec: &Nesting) -> Result<ParseSummary, ParseError>
where
    I: IntoIterator<Item = String>,
{
    spec.reset_memos();
    let mut children = ChildState::from_nesting(spec);
    let mut src = LineSource::new(lines.into_iter());
    let mut blocks_committed = 0usize;
    let mut tails: Vec<&[Matcher]> = Vec::new();

    loop {
        if let Some(commit) = try_children(&mut children, &mut src, &mut tails)? {
            blocks_committed += commit.run()?;
            src.drop_consumed();
            continue;
        }
        match src.next_line() {
            Some(line) => {
                log::trace!("no block claims gLN {}, skipping", line.number);
                src.drop_consumed();
            }
            None => break,
        }
    }

    Ok(ParseSummary {
        lines_seen: src.lines_seen(),
        blocks_committed,
    })
}

/// Convenience wrapper: run the definition over the lines of a file.
pub fn parse_file(path: impl AsRef<Path>, spec: &Nesting) -> Result<ParseSummary, ParseError> {
    let text = fs::read_to_string(path)?;
    parse_stream(text.lines().map(str::to_string), spec)
}
