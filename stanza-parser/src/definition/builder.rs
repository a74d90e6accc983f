//! The validating builder for block definitions.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::definition::{check_catch_all, Action, BlockDef, BlockMatch, Commit, Nesting};
use crate::error::{ActionError, DefinitionError};
use crate::matching::Matcher;

/// Process-wide counter for auto-generated block names. Only consulted at
/// construction time.
static NEXT_AUTO_ID: AtomicUsize = AtomicUsize::new(1);

fn auto_name() -> String {
    format!("Block{}", NEXT_AUTO_ID.fetch_add(1, Ordering::Relaxed))
}

/// Builds one [`BlockDef`], validating the whole definition at
/// [`build`](BlockBuilder::build) time.
///
/// `head`, `body`, and `tail` accumulate matchers in call order; the order
/// is significant, since the first matching entry of a list wins.
pub struct BlockBuilder {
    name: Option<String>,
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

impl BlockBuilder {
    pub(crate) fn new(name: Option<String>) -> Self {
        Self {
            name,
            head: Vec::new(),
            body: Vec::new(),
            tail: Vec::new(),
            line_count: None,
            usage_limit: None,
            strict: false,
            priority: 1,
            action: None,
            nested: Nesting::None,
        }
    }

    /// Append a matcher to the head list.
    pub fn head(mut self, matcher: Matcher) -> Self {
        self.head.push(matcher);
        self
    }

    /// Append a matcher to the body list.
    pub fn body(mut self, matcher: Matcher) -> Self {
        self.body.push(matcher);
        self
    }

    /// Append a matcher to the tail list.
    pub fn tail(mut self, matcher: Matcher) -> Self {
        self.tail.push(matcher);
        self
    }

    /// Close the block after exactly `count` matched lines. Mutually
    /// exclusive with a non-empty tail.
    pub fn line_count(mut self, count: u64) -> Self {
        self.line_count = Some(count);
        self
    }

    /// Allow at most `limit` successful matches in the enclosing scope.
    pub fn usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// In strict mode a non-matching line inside a block with an ending
    /// condition aborts the attempt instead of being skipped.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Ordering among siblings in a choice-set; smaller is tried earlier.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The block's action. Runs when the block closes; the returned
    /// [`Commit`] is deferred until the whole enclosing subtree succeeds.
    pub fn action(
        mut self,
        action: impl Fn(BlockMatch) -> Result<Option<Commit>, ActionError> + 'static,
    ) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// The child specification.
    pub fn nested(mut self, nested: Nesting) -> Self {
        self.nested = nested;
        self
    }

    /// Validate and freeze the definition.
    pub fn build(mut self) -> Result<BlockDef, DefinitionError> {
        let name = self.name.take().unwrap_or_else(auto_name);

        if self.head.is_empty() && self.body.is_empty() && self.tail.is_empty() {
            return Err(DefinitionError::EmptyDefinition { block: name });
        }
        if !self.tail.is_empty() && self.line_count.is_some() {
            return Err(DefinitionError::TailWithLineCount { block: name });
        }
        if self.line_count == Some(0) {
            return Err(DefinitionError::ZeroOption {
                block: name,
                option: "line_count",
            });
        }
        if self.usage_limit == Some(0) {
            return Err(DefinitionError::ZeroOption {
                block: name,
                option: "usage_limit",
            });
        }
        check_catch_all(&name, &self.head, &self.body, &self.tail)?;

        for matcher in self
            .head
            .iter_mut()
            .chain(&mut self.body)
            .chain(&mut self.tail)
        {
            matcher.bind_owner(&name);
        }

        Ok(BlockDef::from_parts(
            name,
            self.head,
            self.body,
            self.tail,
            self.line_count,
            self.usage_limit,
            self.strict,
            self.priority,
            self.action,
            self.nested,
        ))
    }
}
