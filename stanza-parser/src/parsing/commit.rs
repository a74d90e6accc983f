//! Deferred commits.
//!
//! Every successful block yields a [`PendingCommit`] holding its children's
//! commits (in capture order) and its own optional thunk. Nothing runs until
//! an ancestor that can no longer fail (the root driver) invokes `run`,
//! which executes the subtree post-order: descendants first, the block's own
//! effect last. A failed ancestor drops the value instead, and no user code
//! ever observes the aborted subtree.

use crate::definition::Commit;
use crate::error::ActionError;

pub(crate) struct PendingCommit {
    block: String,
    children: Vec<PendingCommit>,
    own: Option<Commit>,
}

impl PendingCommit {
    pub fn new(block: String, children: Vec<PendingCommit>, own: Option<Commit>) -> Self {
        Self {
            block,
            children,
            own,
        }
    }

    /// Run descendants' commits, then this block's own. Returns the number
    /// of blocks committed in the subtree.
    pub fn run(self) -> Result<usize, ActionError> {
        let mut count = 1;
        for child in self.children {
            count += child.run()?;
        }
        if let Some(thunk) = self.own {
            thunk()?;
        }
        log::debug!("committed '{}'", self.block);
        Ok(count)
    }
}
