//! Plain data types shared by the whole engine.
//!
//! A [`Line`] pairs the text of one input line with its global line number.
//! Global line numbers (gLN) are 1-based and assigned by the driver in
//! arrival order; they never repeat and never decrease. Local line numbers
//! (lLN) are not stored here: they are a property of a single block
//! attempt, counting only the lines that attempt actually matched.

use std::fmt;

/// One input line: global line number plus text.
///
/// The text has its line terminator stripped. The engine treats it as an
/// opaque string; matchers decide what it means.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Line {
    /// Global line number, 1-based over the whole input stream.
    pub number: u64,

    /// Line content without the trailing terminator.
    pub text: String,
}

impl Line {
    pub fn new(number: u64, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4} | {}", self.number, self.text)
    }
}

/// What a completed run looked like from the outside.
///
/// Returned by [`parse_stream`](crate::parse_stream) and
/// [`parse_file`](crate::parse_file) so callers and tests can observe a run
/// without instrumenting every action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseSummary {
    /// Total lines pulled from the input stream.
    pub lines_seen: u64,

    /// Blocks whose commit ran, counting every block in each committed
    /// subtree.
    pub blocks_committed: usize,
}
