// FibSlicer: Rule-level equivalence classes of forwarding tables
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use std::collections::BTreeSet;

use maplit::btreeset;
use pretty_assertions::assert_eq;
use quickcheck::{Arbitrary, Gen};
use test_log::test;

use super::{blocks, qc, r, TestRange};
use crate::{rule_match::RuleMatch, types::AddressRange};

fn m(ranges: &[&str]) -> RuleMatch {
    ranges.iter().map(|s| r(s)).collect()
}

fn set(ranges: &[&str]) -> BTreeSet<AddressRange> {
    ranges.iter().map(|s| r(s)).collect()
}

#[test]
fn subtract_self_is_empty() {
    let mut x = RuleMatch::from(r("10.0.0.0/24"));
    x.subtract(&r("10.0.0.0/24"));
    assert!(x.is_empty());
    assert_eq!(x.len(), 0);
}

#[test]
fn add_siblings_merges() {
    let mut x = RuleMatch::new();
    x.add(r("10.0.0.0/25")).add(r("10.0.0.128/25"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/24"]));

    // merging is applied recursively
    let mut x = RuleMatch::new();
    x.add(r("10.0.0.0/26"))
        .add(r("10.0.0.128/25"))
        .add(r("10.0.0.64/26"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/24"]));
}

#[test]
fn add_covered_is_noop() {
    let mut x = m(&["10.0.0.0/16"]);
    x.add(r("10.0.1.0/24"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/16"]));
    x.add(r("10.0.0.0/16"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/16"]));
}

#[test]
fn add_covering_replaces() {
    let mut x = m(&["10.0.1.0/24", "10.0.3.0/24", "10.1.0.0/24"]);
    x.add(r("10.0.0.0/16"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/16", "10.1.0.0/24"]));
}

#[test]
fn subtract_partition() {
    let mut x = m(&["10.0.0.0/24"]);
    x.subtract(&r("10.0.0.128/25"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/25"]));

    let mut x = m(&["10.0.0.0/24"]);
    x.subtract(&r("10.0.0.0/8"));
    assert!(x.is_empty());

    let mut x = m(&["10.0.0.0/22"]);
    x.subtract(&r("10.0.1.0/24"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/24", "10.0.2.0/23"]));
}

#[test]
fn subtract_unrelated_is_noop() {
    let mut x = m(&["10.0.0.0/24", "10.0.2.0/24"]);
    x.subtract(&r("10.0.1.0/24"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/24", "10.0.2.0/24"]));
}

#[test]
fn subtract_then_add_restores() {
    let mut x = m(&["10.0.0.0/16"]);
    x.subtract(&r("10.0.42.0/24"));
    assert_eq!(x.len(), 8);
    assert!(!x.overlaps(&r("10.0.42.0/24")));
    assert!(x.overlaps(&r("10.0.42.0/23")));
    x.add(r("10.0.42.0/24"));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/16"]));
}

#[test]
fn add_and_subtract_match() {
    let mut x = m(&["10.0.0.0/24"]);
    x.add_match(&m(&["10.0.1.0/24", "10.0.2.0/23"]));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/22"]));
    x.subtract_match(&m(&["10.0.0.0/24", "10.0.3.0/24"]));
    assert_eq!(x.as_ranges(), &set(&["10.0.1.0/24", "10.0.2.0/24"]));
}

#[test]
fn intersect() {
    // covered ranges are kept
    let mut x = m(&["10.0.1.0/24", "10.1.0.0/24"]);
    x.intersect(&m(&["10.0.0.0/16"]));
    assert_eq!(x.as_ranges(), &set(&["10.0.1.0/24"]));

    // partial overlaps are replaced by all ranges of other that lie within
    let mut x = m(&["10.0.0.0/16"]);
    x.intersect(&m(&["10.0.1.0/24", "10.0.3.0/24", "10.1.0.0/16"]));
    assert_eq!(x.as_ranges(), &set(&["10.0.1.0/24", "10.0.3.0/24"]));

    // the result is merged
    let mut x = m(&["10.0.0.0/16"]);
    x.intersect(&m(&["10.0.0.0/25", "10.0.0.128/25"]));
    assert_eq!(x.as_ranges(), &set(&["10.0.0.0/24"]));

    let mut x = m(&["10.0.0.0/16"]);
    x.intersect(&RuleMatch::new());
    assert!(x.is_empty());
}

#[test]
fn covers_and_overlaps() {
    let x = m(&["10.0.0.0/24", "10.0.4.0/22"]);
    assert!(x.covers(&r("10.0.0.0/25")));
    assert!(x.covers(&r("10.0.5.0/24")));
    assert!(!x.covers(&r("10.0.0.0/16")));
    assert!(x.overlaps(&r("10.0.0.0/16")));
    assert!(!x.overlaps(&r("10.0.1.0/24")));
    assert_eq!(
        x.iter().copied().collect::<BTreeSet<_>>(),
        btreeset! {r("10.0.0.0/24"), r("10.0.4.0/22")}
    );
}

#[test]
fn display() {
    assert_eq!(RuleMatch::new().to_string(), "[rule_match: empty]");
    assert_eq!(
        m(&["10.0.0.0/24", "10.0.2.0/24"]).to_string(),
        "[rule_match: 10.0.0.0/24, 10.0.2.0/24]"
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchOp {
    Add(TestRange),
    Subtract(TestRange),
    Intersect(TestRange, TestRange),
}

impl Arbitrary for MatchOp {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 5 {
            0 | 1 => Self::Add(TestRange::arbitrary(g)),
            2 | 3 => Self::Subtract(TestRange::arbitrary(g)),
            _ => Self::Intersect(TestRange::arbitrary(g), TestRange::arbitrary(g)),
        }
    }
}

fn all_blocks(x: &RuleMatch) -> BTreeSet<u32> {
    x.iter().flat_map(blocks).collect()
}

/// No two ranges overlap, and no two ranges can be merged.
fn is_minimal(x: &RuleMatch) -> bool {
    let ranges: Vec<AddressRange> = x.iter().copied().collect();
    ranges.iter().enumerate().all(|(i, a)| {
        ranges[i + 1..]
            .iter()
            .all(|b| !a.overlaps(b) && a.sibling() != Some(*b))
    })
}

fn rule_match_matches_model(ops: Vec<MatchOp>) -> bool {
    let mut x = RuleMatch::new();
    let mut model: BTreeSet<u32> = BTreeSet::new();
    for op in ops {
        match op {
            MatchOp::Add(TestRange(a)) => {
                x.add(a);
                model.extend(blocks(&a));
            }
            MatchOp::Subtract(TestRange(a)) => {
                x.subtract(&a);
                model = model.difference(&blocks(&a)).copied().collect();
            }
            MatchOp::Intersect(TestRange(a), TestRange(b)) => {
                let other: RuleMatch = [a, b].into_iter().collect();
                x.intersect(&other);
                let other_blocks: BTreeSet<u32> = blocks(&a).union(&blocks(&b)).copied().collect();
                model = model.intersection(&other_blocks).copied().collect();
            }
        }
        if all_blocks(&x) != model {
            return false;
        }
    }
    is_minimal(&x)
}

fn no_overlap_after_subtract((adds, subs): (Vec<TestRange>, Vec<TestRange>)) -> bool {
    let mut x: RuleMatch = adds.iter().map(|t| t.0).collect();
    for s in subs.iter() {
        x.subtract(&s.0);
        let ranges: Vec<AddressRange> = x.iter().copied().collect();
        let disjoint = ranges
            .iter()
            .enumerate()
            .all(|(i, a)| ranges[i + 1..].iter().all(|b| !a.overlaps(b)));
        if !disjoint || x.overlaps(&s.0) {
            return false;
        }
    }
    true
}

qc!(prop_rule_match_matches_model, rule_match_matches_model);
qc!(prop_no_overlap_after_subtract, no_overlap_after_subtract);
