//! # stanza-parser
//!
//! A streaming, nested, backtracking line-block parser.
//!
//! The caller declares *blocks*: contiguous or loosely contiguous groups
//! of lines identified by head, body, and tail matchers, an optional fixed
//! length, and optional nested sub-blocks. The engine consumes a lazy
//! sequence of lines, recognizes the declared blocks, and defers every
//! user-visible effect into a commit thunk that only runs once all
//! enclosing blocks have succeeded. A failed attempt rewinds the input
//! cursor to exactly where it started and leaves no trace.
//!
//! ```
//! use stanza_parser::{parse_stream, BlockDef, Matcher, Nesting};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let found = Rc::new(RefCell::new(Vec::new()));
//! let sink = found.clone();
//!
//! let entry = BlockDef::named("entry")
//!     .head(Matcher::pattern(r"^BEGIN").unwrap())
//!     .body(Matcher::pattern(r"^  ").unwrap())
//!     .tail(Matcher::pattern(r"^END").unwrap())
//!     .action(move |m| {
//!         let sink = sink.clone();
//!         let lines: Vec<String> = m.lines.iter().map(|l| l.text.clone()).collect();
//!         Ok(Some(Box::new(move || {
//!             sink.borrow_mut().push(lines);
//!             Ok(())
//!         })))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let input = ["noise", "BEGIN", "  one", "  two", "END"]
//!     .iter()
//!     .map(|s| s.to_string());
//! let summary = parse_stream(input, &Nesting::one(entry)).unwrap();
//!
//! assert_eq!(summary.blocks_committed, 1);
//! assert_eq!(found.borrow()[0], ["BEGIN", "  one", "  two", "END"]);
//! ```
//!
//! Module layout:
//! - [`matching`]: per-line matchers (regex, literal, line-number set,
//!   catch-all) with per-line memoization.
//! - [`definition`]: the declarative [`BlockDef`] / [`Nesting`] model and
//!   its validating builder.
//! - [`source`]: the buffered line window with cursor, rewind, and prefix
//!   dropping.
//! - [`parsing`]: the recursive recognizer and deferred commits.
//! - [`driver`]: the implicit root and the [`parse_stream`] /
//!   [`parse_file`] entry points.

pub mod definition;
pub mod driver;
pub mod error;
pub mod line;
pub mod matching;
mod parsing;
pub mod source;

pub use definition::{Action, BlockBuilder, BlockDef, BlockMatch, Commit, Nesting};
pub use driver::{parse_file, parse_stream};
pub use error::{ActionError, DefinitionError, ParseError};
pub use line::{Line, ParseSummary};
pub use matching::{line_set::LineSet, Capture, MatchEvent, MatchHook, Matcher};
