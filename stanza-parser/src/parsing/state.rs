//! Run state layered over the immutable definition tree.
//!
//! Definitions stay declarative; the usage counts and sequence positions
//! that change during a run live in a parallel tree of [`DefState`] nodes
//! built once per run. Attempts snapshot the subtree on
//! entry and restore it on failure, which is what makes a provisional child
//! success disappear again when an enclosing block gives up.

use crate::definition::{BlockDef, Nesting};

pub(crate) struct DefState<'d> {
    pub def: &'d BlockDef,
    /// Effective usage limit in this position: the definition's own limit,
    /// defaulted by context (choice alternatives default to 1, sequence
    /// elements are unlimited).
    limit: Option<u32>,
    uses: u32,
    pub children: ChildState<'d>,
}

pub(crate) enum ChildState<'d> {
    None,
    One(Box<DefState<'d>>),
    /// Sorted by ascending priority, declaration order preserved among
    /// equals.
    Choice(Vec<DefState<'d>>),
    Sequence {
        items: Vec<DefState<'d>>,
        index: usize,
    },
}

/// Flattened usage counts and sequence positions of one subtree.
pub(crate) struct StateSnapshot(Vec<u64>);

impl<'d> DefState<'d> {
    fn new(def: &'d BlockDef, limit: Option<u32>) -> Self {
        Self {
            def,
            limit,
            uses: 0,
            children: ChildState::from_nesting(def.nested()),
        }
    }

    pub fn usable(&self) -> bool {
        self.limit.is_none_or(|limit| self.uses < limit)
    }

    pub fn uses(&self) -> u32 {
        self.uses
    }

    pub fn record_use(&mut self) {
        self.uses += 1;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let mut values = Vec::new();
        self.record(&mut values);
        StateSnapshot(values)
    }

    pub fn restore(&mut self, snapshot: &StateSnapshot) {
        let mut values = snapshot.0.iter().copied();
        self.restore_from(&mut values);
    }

    fn record(&self, out: &mut Vec<u64>) {
        out.push(self.uses as u64);
        self.children.record(out);
    }

    fn restore_from(&mut self, values: &mut impl Iterator<Item = u64>) {
        self.uses = values.next().unwrap_or(0) as u32;
        self.children.restore_from(values);
    }
}

impl<'d> ChildState<'d> {
    pub fn from_nesting(nested: &'d Nesting) -> Self {
        match nested {
            Nesting::None => ChildState::None,
            Nesting::One(def) => ChildState::One(Box::new(DefState::new(def, def.usage_limit()))),
            Nesting::Choice(defs) => {
                let mut items: Vec<DefState<'d>> = defs
                    .iter()
                    .map(|def| DefState::new(def, def.usage_limit().or(Some(1))))
                    .collect();
                items.sort_by_key(|state| state.def.priority());
                ChildState::Choice(items)
            }
            Nesting::Sequence(defs) => ChildState::Sequence {
                items: defs.iter().map(|def| DefState::new(def, None)).collect(),
                index: 0,
            },
        }
    }

    fn record(&self, out: &mut Vec<u64>) {
        match self {
            ChildState::None => {}
            ChildState::One(child) => child.record(out),
            ChildState::Choice(items) => {
                for item in items {
                    item.record(out);
                }
            }
            ChildState::Sequence { items, index } => {
                out.push(*index as u64);
                for item in items {
                    item.record(out);
                }
            }
        }
    }

    fn restore_from(&mut self, values: &mut impl Iterator<Item = u64>) {
        match self {
            ChildState::None => {}
            ChildState::One(child) => child.restore_from(values),
            ChildState::Choice(items) => {
                for item in items {
                    item.restore_from(values);
                }
            }
            ChildState::Sequence { items, index } => {
                *index = values.next().unwrap_or(0) as usize;
                for item in items {
                    item.restore_from(values);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Matcher;

    fn def(name: &str, priority: i32) -> BlockDef {
        BlockDef::named(name)
            .body(Matcher::literal("x"))
            .priority(priority)
            .build()
            .unwrap()
    }

    #[test]
    fn test_choice_alternatives_sort_by_priority_stably() {
        let nesting = Nesting::choice(vec![def("late", 5), def("a", 2), def("b", 2)]);
        let state = ChildState::from_nesting(&nesting);
        match state {
            ChildState::Choice(items) => {
                let names: Vec<_> = items.iter().map(|s| s.def.name()).collect();
                assert_eq!(names, ["a", "b", "late"]);
            }
            _ => panic!("expected choice state"),
        }
    }

    #[test]
    fn test_choice_defaults_usage_limit_to_one() {
        let nesting = Nesting::choice(vec![def("only", 1)]);
        let mut state = ChildState::from_nesting(&nesting);
        match &mut state {
            ChildState::Choice(items) => {
                assert!(items[0].usable());
                items[0].record_use();
                assert!(!items[0].usable());
            }
            _ => panic!("expected choice state"),
        }
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let inner = def("inner", 1);
        let outer = BlockDef::named("outer")
            .body(Matcher::literal("x"))
            .nested(Nesting::one(inner))
            .build()
            .unwrap();
        let nesting = Nesting::one(outer);
        let mut state = ChildState::from_nesting(&nesting);

        let ChildState::One(root) = &mut state else {
            panic!("expected one state");
        };
        let snapshot = root.snapshot();
        root.record_use();
        if let ChildState::One(child) = &mut root.children {
            child.record_use();
            child.record_use();
        }
        root.restore(&snapshot);
        assert_eq!(root.uses(), 0);
        if let ChildState::One(child) = &root.children {
            assert_eq!(child.uses(), 0);
        }
    }
}
