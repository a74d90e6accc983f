//! Property-based tests: the engine never panics on arbitrary input, a
//! run is deterministic and repeatable, and line-set parsing is total.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use stanza_parser::{parse_stream, BlockDef, LineSet, Matcher, Nesting};

type Trace = Rc<RefCell<Vec<(String, u32, Vec<String>)>>>;

/// Lines drawn from the fence alphabet plus free-form noise, so generated
/// streams contain whole blocks, truncated blocks, and garbage.
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("BEGIN".to_string()),
        Just("END".to_string()),
        Just("  body".to_string()),
        "[a-z ]{0,12}",
    ]
}

fn stream_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 0..40)
}

fn traced_fence(trace: &Trace) -> Nesting {
    let trace = trace.clone();
    let block = BlockDef::named("fence")
        .head(Matcher::pattern("^BEGIN$").unwrap())
        .body(Matcher::pattern("^  ").unwrap())
        .tail(Matcher::pattern("^END$").unwrap())
        .strict(true)
        .action(move |m| {
            let trace = trace.clone();
            let entry = (
                m.block.clone(),
                m.occurrence,
                m.lines.iter().map(|l| l.text.clone()).collect::<Vec<_>>(),
            );
            Ok(Some(Box::new(move || {
                trace.borrow_mut().push(entry);
                Ok(())
            })))
        })
        .build()
        .unwrap();
    Nesting::one(block)
}

proptest! {
    #[test]
    fn test_run_terminates_and_accounts_for_every_line(input in stream_strategy()) {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let spec = traced_fence(&trace);
        let summary = parse_stream(input.clone(), &spec).unwrap();

        prop_assert_eq!(summary.lines_seen, input.len() as u64);
        prop_assert_eq!(summary.blocks_committed, trace.borrow().len());
    }

    #[test]
    fn test_same_input_twice_gives_identical_action_sequences(input in stream_strategy()) {
        let first: Trace = Rc::new(RefCell::new(Vec::new()));
        let spec = traced_fence(&first);
        let summary_a = parse_stream(input.clone(), &spec).unwrap();

        let second: Trace = Rc::new(RefCell::new(Vec::new()));
        let spec_b = traced_fence(&second);
        let summary_b = parse_stream(input, &spec_b).unwrap();

        prop_assert_eq!(summary_a, summary_b);
        prop_assert_eq!(&*first.borrow(), &*second.borrow());
    }

    #[test]
    fn test_reusing_one_definition_is_idempotent(input in stream_strategy()) {
        // Same definition value run twice: memos and usage counts are
        // per-run, so the traces must match exactly.
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let spec = traced_fence(&trace);

        parse_stream(input.clone(), &spec).unwrap();
        let first_run = trace.borrow().clone();
        trace.borrow_mut().clear();

        parse_stream(input, &spec).unwrap();
        prop_assert_eq!(&first_run, &*trace.borrow());
    }

    #[test]
    fn test_captured_blocks_are_well_formed(input in stream_strategy()) {
        // Every committed fence starts with BEGIN, ends with END, and has
        // only body lines between them; the strict flag admits nothing
        // else.
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let spec = traced_fence(&trace);
        parse_stream(input, &spec).unwrap();

        for (_, _, lines) in trace.borrow().iter() {
            prop_assert!(lines.len() >= 2);
            prop_assert_eq!(lines.first().map(String::as_str), Some("BEGIN"));
            prop_assert_eq!(lines.last().map(String::as_str), Some("END"));
            for middle in &lines[1..lines.len() - 1] {
                prop_assert!(middle.starts_with("  "));
            }
        }
    }

    #[test]
    fn test_line_set_parsing_is_total(spec in "[0-9a-z,~ -]{0,30}") {
        // Arbitrary spec strings never panic; malformed fragments just
        // vanish.
        let _ = LineSet::parse(&spec);
    }

    #[test]
    fn test_line_set_ranges_are_inclusive_and_normalized(a in 1u64..200, b in 1u64..200) {
        let set = LineSet::parse(&format!("{}-{}", a, b));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert_eq!(set.len(), (hi - lo + 1) as usize);
        prop_assert!(set.contains(lo));
        prop_assert!(set.contains(hi));
        prop_assert!(!set.contains(hi + 1));
    }
}
