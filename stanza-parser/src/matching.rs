//! Per-line matchers.
//!
//! A matcher tests one line and optionally captures something from it. Four
//! variants cover the declarative surface:
//!
//! - `Pattern`: a compiled regex; the capture is the group list.
//! - `Literal`: a substring test.
//! - `LineNo`: membership of the line number in an integer set, keyed on the
//!   global or the local line number.
//! - `AllOthers`: the catch-all; matches anything. Only legal as the final
//!   body matcher of a block with a non-empty head.
//!
//! Every matcher memoizes its last evaluation keyed on the global line
//! number, so sibling matchers (and re-attempts after backtracking) never
//! re-run an expensive check against the same line. The memo is scoped to
//! the matcher itself and is cleared at the start of every run.

pub mod line_set;

use std::cell::RefCell;
use std::fmt;

use regex::Regex;

use crate::error::DefinitionError;
use crate::line::Line;
use line_set::LineSet;

/// What a successful match captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// A plain hit with nothing to extract (literal, line-number, catch-all).
    Hit,
    /// Regex capture groups; index 0 is the whole match.
    Groups(Vec<Option<String>>),
}

/// Everything a match hook gets to see.
pub struct MatchEvent<'a> {
    /// Name of the block the matcher belongs to.
    pub block: &'a str,
    /// Name of the matcher that fired.
    pub matcher: &'a str,
    /// Global line number of the matched line.
    pub gln: u64,
    /// Local line number the line received inside the attempt.
    pub lln: u64,
    /// The matched line.
    pub line: &'a Line,
    /// What the matcher captured.
    pub capture: &'a Capture,
}

/// Hook invoked when a matcher accepts a line.
pub type MatchHook = Box<dyn Fn(&MatchEvent<'_>)>;

enum MatcherKind {
    Pattern(Regex),
    Literal(String),
    LineNo { set: LineSet, global: bool },
    AllOthers,
}

struct Memo {
    gln: u64,
    lln: u64,
    capture: Option<Capture>,
}

/// A per-line predicate with optional capture and an optional hook.
pub struct Matcher {
    name: String,
    kind: MatcherKind,
    on_match: Option<MatchHook>,
    /// Name of the owning block, stamped when the definition is built.
    owner: String,
    memo: RefCell<Option<Memo>>,
}

impl Matcher {
    /// A regex matcher. The pattern is compiled eagerly; a bad pattern is a
    /// definition error.
    pub fn pattern(pattern: &str) -> Result<Self, DefinitionError> {
        let regex = Regex::new(pattern).map_err(|error| DefinitionError::InvalidPattern {
            pattern: pattern.to_string(),
            error,
        })?;
        Ok(Self::new(format!("/{}/", pattern), MatcherKind::Pattern(regex)))
    }

    /// A substring matcher.
    pub fn literal(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        Self::new(format!("\"{}\"", needle), MatcherKind::Literal(needle))
    }

    /// A line-number matcher. `spec` accepts a single number, a list, or a
    /// spec string like `"3, 7-9, 12"`; see [`line_set`]. With `global` the
    /// set is keyed on the global line number, otherwise on the local one.
    pub fn line_no(spec: impl Into<LineSet>, global: bool) -> Self {
        let set = spec.into();
        let scope = if global { "global" } else { "local" };
        Self::new(
            format!("lines[{}:{}]", scope, set),
            MatcherKind::LineNo { set, global },
        )
    }

    /// The catch-all matcher. Accepts every line it is allowed to see; the
    /// parser withholds lines that an enclosing block's tail would claim.
    pub fn all_others() -> Self {
        Self::new("all-others".to_string(), MatcherKind::AllOthers)
    }

    fn new(name: String, kind: MatcherKind) -> Self {
        Self {
            name,
            kind,
            on_match: None,
            owner: String::new(),
            memo: RefCell::new(None),
        }
    }

    /// Replace the auto-generated name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a hook fired every time this matcher accepts a line.
    pub fn on_match(mut self, hook: impl Fn(&MatchEvent<'_>) + 'static) -> Self {
        self.on_match = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bind_owner(&mut self, block: &str) {
        self.owner = block.to_string();
    }

    pub(crate) fn is_all_others(&self) -> bool {
        matches!(self.kind, MatcherKind::AllOthers)
    }

    /// Test a line, consulting the memo first.
    ///
    /// The memo key is the global line number; the local number participates
    /// only for local `LineNo` matchers, whose verdict depends on it.
    pub fn match_line(&self, gln: u64, lln: u64, line: &str) -> bool {
        if let Some(memo) = self.memo.borrow().as_ref() {
            if memo.gln == gln && (self.lln_independent() || memo.lln == lln) {
                return memo.capture.is_some();
            }
        }
        let capture = self.evaluate(gln, lln, line);
        let hit = capture.is_some();
        *self.memo.borrow_mut() = Some(Memo { gln, lln, capture });
        hit
    }

    /// Invoke the hook with the memoed capture of the line just matched.
    /// No-op without a hook.
    pub(crate) fn fire_on_match(&self, gln: u64, lln: u64, line: &Line) {
        let Some(hook) = &self.on_match else {
            return;
        };
        let memo = self.memo.borrow();
        if let Some(Memo {
            capture: Some(capture),
            ..
        }) = memo.as_ref()
        {
            hook(&MatchEvent {
                block: &self.owner,
                matcher: &self.name,
                gln,
                lln,
                line,
                capture,
            });
        }
    }

    /// Raw evaluation that bypasses the memo entirely.
    ///
    /// Used by the catch-all's ancestor-tail probe, which must not disturb
    /// memo state that belongs to other attempts. The local line number of
    /// the probed block is unknown here, so local `LineNo` matchers report
    /// no match.
    pub(crate) fn probe(&self, gln: u64, line: &str) -> bool {
        match &self.kind {
            MatcherKind::Pattern(regex) => regex.is_match(line),
            MatcherKind::Literal(needle) => line.contains(needle.as_str()),
            MatcherKind::LineNo { set, global: true } => set.contains(gln),
            MatcherKind::LineNo { global: false, .. } => false,
            MatcherKind::AllOthers => true,
        }
    }

    pub(crate) fn reset_memo(&self) {
        *self.memo.borrow_mut() = None;
    }

    fn lln_independent(&self) -> bool {
        !matches!(self.kind, MatcherKind::LineNo { global: false, .. })
    }

    fn evaluate(&self, gln: u64, lln: u64, line: &str) -> Option<Capture> {
        match &self.kind {
            MatcherKind::Pattern(regex) => regex.captures(line).map(|caps| {
                Capture::Groups(
                    caps.iter()
                        .map(|group| group.map(|m| m.as_str().to_string()))
                        .collect(),
                )
            }),
            MatcherKind::Literal(needle) => line.contains(needle.as_str()).then_some(Capture::Hit),
            MatcherKind::LineNo { set, global } => {
                let key = if *global { gln } else { lln };
                set.contains(key).then_some(Capture::Hit)
            }
            MatcherKind::AllOthers => Some(Capture::Hit),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// First matcher in the list that accepts the line, if any.
pub(crate) fn first_match<'m>(
    matchers: &'m [Matcher],
    gln: u64,
    lln: u64,
    line: &str,
) -> Option<&'m Matcher> {
    matchers.iter().find(|m| m.match_line(gln, lln, line))
}
