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

//! # Rule Match
//!
//! A set of address ranges that pairwise never overlap. It describes the packets that actually
//! reach a rule, after accounting for all other rules installed on the same switch.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::types::AddressRange;

/// Set of non-overlapping address ranges, supporting union, subtraction and intersection.
///
/// After each [`RuleMatch::add`], sibling ranges are coalesced into their common parent, such
/// that the representation is minimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleMatch {
    ranges: BTreeSet<AddressRange>,
}

impl RuleMatch {
    /// Create an empty match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no packet matches.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The number of ranges in the match.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Get the set of ranges. No two ranges overlap, and no two ranges are siblings.
    pub fn as_ranges(&self) -> &BTreeSet<AddressRange> {
        &self.ranges
    }

    /// Iterate over all ranges.
    pub fn iter(&self) -> impl Iterator<Item = &AddressRange> {
        self.ranges.iter()
    }

    /// Returns `true` if any range of the match overlaps with `range`.
    pub fn overlaps(&self, range: &AddressRange) -> bool {
        self.ranges.iter().any(|r| r.overlaps(range))
    }

    /// Returns `true` if `range` is entirely matched.
    pub fn covers(&self, range: &AddressRange) -> bool {
        self.ranges.iter().any(|r| r.contains(range))
    }

    /// Add `range` to the match. If it is already covered, nothing changes. All ranges that are
    /// covered by `range` are replaced by it. Afterwards, sibling ranges are merged until no more
    /// merges apply.
    pub fn add(&mut self, range: AddressRange) -> &mut Self {
        if self.covers(&range) {
            return self;
        }
        self.ranges.retain(|r| !range.contains(r));
        self.ranges.insert(range);
        self.merge();
        self
    }

    /// Remove `range` from the match. Ranges covered by `range` are removed entirely, and ranges
    /// that contain `range` are replaced by their complement of `range`.
    pub fn subtract(&mut self, range: &AddressRange) -> &mut Self {
        let mut to_add = Vec::new();
        self.ranges.retain(|r| {
            if range.contains(r) {
                false
            } else if r.contains(range) {
                to_add.extend(r.difference(range));
                false
            } else {
                true
            }
        });
        self.ranges.extend(to_add);
        self
    }

    /// Add all ranges of `other`.
    pub fn add_match(&mut self, other: &RuleMatch) -> &mut Self {
        for r in other.iter() {
            self.add(*r);
        }
        self
    }

    /// Remove all ranges of `other`.
    pub fn subtract_match(&mut self, other: &RuleMatch) -> &mut Self {
        for r in other.iter() {
            self.subtract(r);
        }
        self
    }

    /// Keep only the part that also matches `other`. Ranges of `self` that are covered by `other`
    /// are kept. Ranges that only partially overlap are replaced by the ranges of `other` that lie
    /// within them.
    pub fn intersect(&mut self, other: &RuleMatch) -> &mut Self {
        let mut result = BTreeSet::new();
        for r in self.ranges.iter() {
            if other.covers(r) {
                result.insert(*r);
            } else {
                result.extend(other.iter().filter(|o| r.contains(o)).copied());
            }
        }
        self.ranges = result;
        self.merge();
        self
    }

    /// Merge sibling ranges into their parent, until a fixpoint is reached.
    fn merge(&mut self) {
        loop {
            let pair = self.ranges.iter().find_map(|r| {
                let sibling = r.sibling()?;
                let parent = r.parent()?;
                self.ranges.contains(&sibling).then_some((*r, sibling, parent))
            });
            match pair {
                Some((a, b, parent)) => {
                    self.ranges.remove(&a);
                    self.ranges.remove(&b);
                    self.ranges.insert(parent);
                }
                None => break,
            }
        }
    }
}

impl From<AddressRange> for RuleMatch {
    fn from(range: AddressRange) -> Self {
        Self {
            ranges: BTreeSet::from([range]),
        }
    }
}

impl FromIterator<AddressRange> for RuleMatch {
    fn from_iter<I: IntoIterator<Item = AddressRange>>(iter: I) -> Self {
        let mut m = Self::new();
        for r in iter {
            m.add(r);
        }
        m
    }
}

impl<'a> IntoIterator for &'a RuleMatch {
    type Item = &'a AddressRange;
    type IntoIter = std::collections::btree_set::Iter<'a, AddressRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl std::fmt::Display for RuleMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ranges.is_empty() {
            f.write_str("[rule_match: empty]")
        } else {
            write!(f, "[rule_match: {}]", self.ranges.iter().join(", "))
        }
    }
}
