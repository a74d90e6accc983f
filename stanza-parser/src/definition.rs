//! Declarative block definitions.
//!
//! A [`BlockDef`] is the caller-built recipe for one kind of block: matcher
//! lists for its head, body, and tail lines, optional termination and usage
//! options, an optional action, and a [`Nesting`] describing its children.
//! Definitions are immutable once built; all run state lives in the parser.
//!
//! Construction goes through [`BlockBuilder`], which validates the
//! definition as a whole (see [`DefinitionError`]) and stamps each matcher
//! with its owning block's name so hooks can report it.

pub mod builder;

use std::fmt;

use crate::error::{ActionError, DefinitionError};
use crate::line::Line;
use crate::matching::Matcher;

pub use builder::BlockBuilder;

/// The captured outcome of one successful block, handed to its action.
#[derive(Debug, Clone)]
pub struct BlockMatch {
    /// Name of the definition that matched.
    pub block: String,
    /// Snapshot of the matched lines, in order. Lines skipped in loose mode
    /// are not included.
    pub lines: Vec<Line>,
    /// 1-based occurrence index of this success within the run.
    pub occurrence: u32,
}

/// The deferred user-visible effect of a successful block.
///
/// Returned by an action and executed only once every enclosing block has
/// also succeeded; a failed ancestor simply drops the thunk, so there is
/// nothing to roll back.
pub type Commit = Box<dyn FnOnce() -> Result<(), ActionError>>;

/// A block's action: receives the captured lines and may return a commit.
///
/// The action itself runs when the block closes, while the enclosing blocks
/// are still provisional; anything user-visible belongs in the returned
/// [`Commit`], not in the action body.
pub type Action = Box<dyn Fn(BlockMatch) -> Result<Option<Commit>, ActionError>>;

/// How child definitions compose under a parent.
pub enum Nesting {
    /// No children.
    None,
    /// A single child, attemptable while its usage limit allows.
    One(Box<BlockDef>),
    /// Priority-ordered alternatives; each is independently usable and the
    /// first success at the cursor wins. Default usage limit per
    /// alternative is 1.
    Choice(Vec<BlockDef>),
    /// A fixed order; only the current element is ever attempted, and the
    /// position advances when it closes. Usage limits are ignored.
    Sequence(Vec<BlockDef>),
}

impl fmt::Debug for Nesting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nesting::None => write!(f, "None"),
            Nesting::One(def) => f.debug_tuple("One").field(def).finish(),
            Nesting::Choice(defs) => f.debug_tuple("Choice").field(defs).finish(),
            Nesting::Sequence(defs) => f.debug_tuple("Sequence").field(defs).finish(),
        }
    }
}

impl Nesting {
    pub fn one(def: BlockDef) -> Self {
        Nesting::One(Box::new(def))
    }

    pub fn choice(defs: Vec<BlockDef>) -> Self {
        Nesting::Choice(defs)
    }

    pub fn sequence(defs: Vec<BlockDef>) -> Self {
        Nesting::Sequence(defs)
    }

    pub(crate) fn reset_memos(&self) {
        match self {
            Nesting::None => {}
            Nesting::One(def) => def.reset_memos(),
            Nesting::Choice(defs) | Nesting::Sequence(defs) => {
                for def in defs {
                    def.reset_memos();
                }
            }
        }
    }
}

/// An immutable declarative definition of one block.
pub struct BlockDef {
    name: String,
    head: Vec<Matcher>,
    body: Vec<Matcher>,
    tail: Vec<Matcher>,
    line_count: Option<u64>,
    usage_limit: Option<u32>,
    strict: bool,
    priority: i32,
    action: Option<Action>,
    nested: Nesting,
}

impl BlockDef {
    /// Start a builder with an explicit name.
    pub fn named(name: impl Into<String>) -> BlockBuilder {
        BlockBuilder::new(Some(name.into()))
    }

    /// Start a builder with an auto-generated name (`Block1`, `Block2`, …).
    pub fn builder() -> BlockBuilder {
        BlockBuilder::new(None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn head(&self) -> &[Matcher] {
        &self.head
    }

    pub(crate) fn body(&self) -> &[Matcher] {
        &self.body
    }

    pub(crate) fn tail(&self) -> &[Matcher] {
        &self.tail
    }

    pub(crate) fn line_count(&self) -> Option<u64> {
        self.line_count
    }

    pub(crate) fn usage_limit(&self) -> Option<u32> {
        self.usage_limit
    }

    pub(crate) fn strict(&self) -> bool {
        self.strict
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub(crate) fn nested(&self) -> &Nesting {
        &self.nested
    }

    /// A block has an ending condition when a tail or a line count bounds
    /// it; without one it is open-ended and closes on the first line that
    /// does not belong.
    pub(crate) fn has_ending(&self) -> bool {
        !self.tail.is_empty() || self.line_count.is_some()
    }

    pub(crate) fn reset_memos(&self) {
        for matcher in self.head.iter().chain(&self.body).chain(&self.tail) {
            matcher.reset_memo();
        }
        self.nested.reset_memos();
    }

    pub(crate) fn from_parts(
        name: String,
        head: Vec<Matcher>,
        body: Vec<Matcher>,
        tail: Vec<Matcher>,
        line_count: Option<u64>,
        usage_limit: Option<u32>,
        strict: bool,
        priority: i32,
        action: Option<Action>,
        nested: Nesting,
    ) -> Self {
        Self {
            name,
            head,
            body,
            tail,
            line_count,
            usage_limit,
            strict,
            priority,
            action,
            nested,
        }
    }
}

impl std::fmt::Debug for BlockDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDef")
            .field("name", &self.name)
            .field("head", &self.head.len())
            .field("body", &self.body.len())
            .field("tail", &self.tail.len())
            .field("line_count", &self.line_count)
            .field("usage_limit", &self.usage_limit)
            .field("strict", &self.strict)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Validation helper shared by the builder: checks catch-all placement.
pub(crate) fn check_catch_all(
    name: &str,
    head: &[Matcher],
    body: &[Matcher],
    tail: &[Matcher],
) -> Result<(), DefinitionError> {
    if head.iter().chain(tail).any(Matcher::is_all_others) {
        return Err(DefinitionError::CatchAllOutsideBody {
            block: name.to_string(),
        });
    }
    let catch_alls = body.iter().filter(|m| m.is_all_others()).count();
    if catch_alls == 0 {
        return Ok(());
    }
    let last_is_catch_all = body.last().is_some_and(Matcher::is_all_others);
    if catch_alls > 1 || !last_is_catch_all {
        return Err(DefinitionError::CatchAllNotLast {
            block: name.to_string(),
        });
    }
    if head.is_empty() {
        return Err(DefinitionError::CatchAllWithoutHead {
            block: name.to_string(),
        });
    }
    Ok(())
}
