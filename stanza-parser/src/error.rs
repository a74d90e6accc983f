//! Error types surfaced by the engine.
//!
//! Only two kinds of failure ever reach the caller: definition errors at
//! construction time and action errors at run time. Match failures are the
//! normal currency of a backtracking recognizer and are absorbed internally;
//! a truncated stream fails the affected attempt silently.

use std::fmt;
use std::io;

/// Errors raised while building a block definition.
///
/// All of these are caller mistakes in the declarative definition and are
/// reported before any input is read.
#[derive(Debug)]
pub enum DefinitionError {
    /// A head/body/tail pattern failed to compile.
    InvalidPattern {
        pattern: String,
        error: regex::Error,
    },
    /// `tail` and `line_count` were both given; the two termination rules
    /// contradict each other.
    TailWithLineCount { block: String },
    /// A catch-all matcher appeared in `head` or `tail`.
    CatchAllOutsideBody { block: String },
    /// A catch-all matcher was not the single final matcher of `body`.
    CatchAllNotLast { block: String },
    /// A catch-all matcher was used in a block with an empty `head`, which
    /// leaves the block with no way to anchor its start.
    CatchAllWithoutHead { block: String },
    /// The definition has no matchers at all and can never match anything.
    EmptyDefinition { block: String },
    /// `line_count` or `usage_limit` was zero.
    ZeroOption {
        block: String,
        option: &'static str,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::InvalidPattern { pattern, error } => {
                write!(f, "invalid pattern {:?}: {}", pattern, error)
            }
            DefinitionError::TailWithLineCount { block } => {
                write!(
                    f,
                    "block '{}' declares both a tail and a line_count; the two termination rules contradict each other",
                    block
                )
            }
            DefinitionError::CatchAllOutsideBody { block } => {
                write!(
                    f,
                    "block '{}' places a catch-all matcher outside its body",
                    block
                )
            }
            DefinitionError::CatchAllNotLast { block } => {
                write!(
                    f,
                    "block '{}' must use a single catch-all matcher in final body position",
                    block
                )
            }
            DefinitionError::CatchAllWithoutHead { block } => {
                write!(
                    f,
                    "block '{}' uses a catch-all matcher but has no head to anchor its start",
                    block
                )
            }
            DefinitionError::EmptyDefinition { block } => {
                write!(f, "block '{}' has no head, body, or tail matchers", block)
            }
            DefinitionError::ZeroOption { block, option } => {
                write!(f, "block '{}': {} must be positive", block, option)
            }
        }
    }
}

impl std::error::Error for DefinitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DefinitionError::InvalidPattern { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A fault raised inside a user action or commit thunk.
///
/// The engine does not continue after one of these: it propagates out of
/// [`parse_stream`](crate::parse_stream) unchanged.
#[derive(Debug)]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action error: {}", self.message)
    }
}

impl std::error::Error for ActionError {}

/// Run-time errors surfaced by the driver entry points.
#[derive(Debug)]
pub enum ParseError {
    /// A user action or commit thunk failed.
    Action(ActionError),
    /// `parse_file` could not read its input.
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Action(e) => write!(f, "{}", e),
            ParseError::Io(e) => write!(f, "input error: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Action(e) => Some(e),
            ParseError::Io(e) => Some(e),
        }
    }
}

impl From<ActionError> for ParseError {
    fn from(e: ActionError) -> Self {
        ParseError::Action(e)
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}
