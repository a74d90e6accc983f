//! Integer sets for line-number matchers.
//!
//! A [`LineSet`] is built from a single number, a list of numbers, or a spec
//! string like `"3, 7-9, 12"`. Range fragments use `-` or `~` and are
//! inclusive; reversed endpoints are normalized. A fragment that does not
//! parse is discarded with a warning while the rest of the string survives;
//! a wholly unparseable string yields the empty set, which never matches.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static RANGE_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*[-~]\s*(\d+)$").expect("range fragment regex"));

/// An immutable set of 1-based line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    numbers: BTreeSet<u64>,
}

impl LineSet {
    pub fn contains(&self, number: u64) -> bool {
        self.numbers.contains(&number)
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Parse a comma-separated spec of numbers and inclusive ranges.
    pub fn parse(spec: &str) -> Self {
        let mut numbers = BTreeSet::new();
        for fragment in spec.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            if let Ok(number) = fragment.parse::<u64>() {
                numbers.insert(number);
                continue;
            }
            if let Some(caps) = RANGE_FRAGMENT.captures(fragment) {
                let a: u64 = caps[1].parse().unwrap_or(0);
                let b: u64 = caps[2].parse().unwrap_or(0);
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                numbers.extend(lo..=hi);
                continue;
            }
            log::warn!("discarding malformed line-number fragment {:?}", fragment);
        }
        Self { numbers }
    }
}

impl fmt::Display for LineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for number in &self.numbers {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", number)?;
            first = false;
        }
        Ok(())
    }
}

impl From<u64> for LineSet {
    fn from(number: u64) -> Self {
        let mut numbers = BTreeSet::new();
        numbers.insert(number);
        Self { numbers }
    }
}

impl From<Vec<u64>> for LineSet {
    fn from(list: Vec<u64>) -> Self {
        Self {
            numbers: list.into_iter().collect(),
        }
    }
}

impl From<&[u64]> for LineSet {
    fn from(list: &[u64]) -> Self {
        Self {
            numbers: list.iter().copied().collect(),
        }
    }
}

impl From<&str> for LineSet {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3,7-9,12", &[3, 7, 8, 9, 12])]
    #[case("3, 7-9, 12", &[3, 7, 8, 9, 12])]
    #[case("7~9", &[7, 8, 9])]
    #[case("9-7", &[7, 8, 9])]
    #[case("5", &[5])]
    #[case("5,5,5", &[5])]
    fn test_spec_parsing(#[case] spec: &str, #[case] expected: &[u64]) {
        let set = LineSet::parse(spec);
        assert_eq!(set.len(), expected.len());
        for n in expected {
            assert!(set.contains(*n), "{} missing from {:?}", n, spec);
        }
    }

    #[test]
    fn test_malformed_fragment_is_discarded_alone() {
        let set = LineSet::parse("3, x-y, 12");
        assert!(set.contains(3));
        assert!(set.contains(12));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_unparseable_spec_yields_empty_set() {
        let set = LineSet::parse("first..last");
        assert!(set.is_empty());
        assert!(!set.contains(1));
    }

    #[test]
    fn test_display_round_trips_sorted() {
        let set = LineSet::parse("12,3,7-8");
        assert_eq!(format!("{}", set), "3,7,8,12");
    }
}
