//! The recursive block recognizer.
//!
//! [`attempt`] tries to recognize one block at the current cursor. It is a
//! small state machine driven by the local line number: zero means the
//! attempt is still fresh (looking for its first own line), anything higher
//! means the block is in progress. Before consuming any line the attempt
//! offers it to its nested children; a child success contributes a pending
//! commit and consumes input without advancing the parent's local count.
//!
//! Failure is silent and total: the cursor returns exactly to where the
//! attempt began, provisional usage and sequence state of the subtree rolls
//! back, and the pending commits are dropped unrun. Success yields a
//! [`PendingCommit`] for the caller to keep, or to drop should the caller
//! itself fail later.

pub(crate) mod commit;
pub(crate) mod state;

use crate::definition::BlockMatch;
use crate::error::ActionError;
use crate::line::Line;
use crate::matching::{first_match, Matcher};
use crate::source::LineSource;

pub(crate) use commit::PendingCommit;
pub(crate) use state::{ChildState, DefState};

enum Step {
    Fail,
    Close,
}

/// Attempt one block at the cursor. `Ok(None)` is a clean failure with the
/// cursor restored; `Ok(Some(_))` is a success whose effects are pending.
pub(crate) fn attempt<'d, I>(
    state: &mut DefState<'d>,
    src: &mut LineSource<I>,
    ancestor_tails: &mut Vec<&'d [Matcher]>,
) -> Result<Option<PendingCommit>, ActionError>
where
    I: Iterator<Item = String>,
{
    let def = state.def;
    let start_gln = src.cursor_gln();
    let snapshot = state.snapshot();
    let mut lln: u64 = 0;
    let mut captured: Vec<Line> = Vec::new();
    let mut pending: Vec<PendingCommit> = Vec::new();

    log::trace!("attempting '{}' at gLN {}", def.name(), start_gln);

    let outcome = loop {
        // Children get first claim on every position, before the head too.
        ancestor_tails.push(def.tail());
        let child = try_children(&mut state.children, src, ancestor_tails);
        ancestor_tails.pop();
        if let Some(child_commit) = child? {
            pending.push(child_commit);
            continue;
        }

        let next_lln = lln + 1;
        let Some(line) = src.next_line() else {
            // EOF: an in-progress open-ended block keeps what it has;
            // a fresh attempt or one still waiting on its ending fails.
            if lln > 0 && !def.has_ending() {
                break Step::Close;
            }
            break Step::Fail;
        };
        let gln = line.number;

        if lln == 0 {
            // First own line: head if there is one, body otherwise.
            let entry = if def.head().is_empty() {
                def.body()
            } else {
                def.head()
            };
            match first_match(entry, gln, next_lln, &line.text) {
                Some(matcher) => {
                    matcher.fire_on_match(gln, next_lln, &line);
                    captured.push(line);
                    lln = next_lln;
                    if def.line_count() == Some(lln) {
                        break Step::Close;
                    }
                }
                None => break Step::Fail,
            }
            continue;
        }

        if let Some(matcher) = first_match(def.tail(), gln, next_lln, &line.text) {
            matcher.fire_on_match(gln, next_lln, &line);
            captured.push(line);
            break Step::Close;
        }

        if let Some(matcher) = first_body_match(def.body(), gln, next_lln, &line.text, ancestor_tails)
        {
            matcher.fire_on_match(gln, next_lln, &line);
            captured.push(line);
            lln = next_lln;
            if def.line_count() == Some(lln) {
                break Step::Close;
            }
            continue;
        }

        if def.has_ending() {
            if def.strict() {
                break Step::Fail;
            }
            // Loose mode tolerates interleaved content: the line stays
            // consumed but uncaptured, and the local count stands still.
            continue;
        }

        // Open-ended: this line does not belong. Put it back and close.
        src.rewind(1);
        break Step::Close;
    };

    match outcome {
        Step::Fail => {
            let consumed = (src.cursor_gln() - start_gln) as usize;
            src.rewind(consumed);
            state.restore(&snapshot);
            log::trace!("'{}' failed, cursor back at gLN {}", def.name(), start_gln);
            Ok(None)
        }
        Step::Close => {
            let occurrence = state.uses() + 1;
            let own = match def.action() {
                Some(action) => action(BlockMatch {
                    block: def.name().to_string(),
                    lines: captured,
                    occurrence,
                })?,
                None => None,
            };
            state.record_use();
            log::debug!(
                "closed '{}' (occurrence {}, {} child commits)",
                def.name(),
                occurrence,
                pending.len()
            );
            Ok(Some(PendingCommit::new(
                def.name().to_string(),
                pending,
                own,
            )))
        }
    }
}

/// Offer the current position to a nested child specification.
///
/// At most one child succeeds per call. A failed child leaves the cursor
/// untouched, so the caller can simply fall through to its own matching.
pub(crate) fn try_children<'d, I>(
    children: &mut ChildState<'d>,
    src: &mut LineSource<I>,
    ancestor_tails: &mut Vec<&'d [Matcher]>,
) -> Result<Option<PendingCommit>, ActionError>
where
    I: Iterator<Item = String>,
{
    match children {
        ChildState::None => Ok(None),
        ChildState::One(child) => {
            if child.usable() {
                attempt(child, src, ancestor_tails)
            } else {
                Ok(None)
            }
        }
        ChildState::Choice(alternatives) => {
            for alternative in alternatives.iter_mut() {
                if !alternative.usable() {
                    continue;
                }
                if let Some(child_commit) = attempt(alternative, src, ancestor_tails)? {
                    return Ok(Some(child_commit));
                }
            }
            Ok(None)
        }
        ChildState::Sequence { items, index } => {
            let Some(current) = items.get_mut(*index) else {
                return Ok(None);
            };
            match attempt(current, src, ancestor_tails)? {
                Some(child_commit) => {
                    *index += 1;
                    Ok(Some(child_commit))
                }
                None => Ok(None),
            }
        }
    }
}

/// Body matching with the catch-all's ancestor-tail probe: the catch-all
/// declines any line that the tail of an enclosing in-progress block would
/// claim, so an open-ended child cannot swallow its parent's terminator.
fn first_body_match<'m>(
    body: &'m [Matcher],
    gln: u64,
    lln: u64,
    line: &str,
    ancestor_tails: &[&[Matcher]],
) -> Option<&'m Matcher> {
    body.iter().find(|matcher| {
        if matcher.is_all_others() && tail_would_claim(ancestor_tails, gln, line) {
            return false;
        }
        matcher.match_line(gln, lln, line)
    })
}

fn tail_would_claim(ancestor_tails: &[&[Matcher]], gln: u64, line: &str) -> bool {
    ancestor_tails
        .iter()
        .any(|tail| tail.iter().any(|matcher| matcher.probe(gln, line)))
}
