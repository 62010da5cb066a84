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

//! Module containing the definition of an equivalence class (slice).

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::types::{RuleId, SwitchId};

/// # Equivalence Class
///
/// A sequence of switches together with the set of rules used at each of them. All packets of the
/// class traverse exactly this path and are handled by exactly these rules. The path and the rule
/// sets always have the same length, and no switch appears twice on the path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquivalentClass {
    path: VecDeque<SwitchId>,
    rules: VecDeque<BTreeSet<RuleId>>,
}

impl EquivalentClass {
    /// Create an empty equivalence class.
    pub fn new() -> Self {
        Self::default()
    }

    /// The path of switches, starting at the origin.
    pub fn path(&self) -> Vec<SwitchId> {
        self.path.iter().copied().collect()
    }

    /// Iterate over the path.
    pub fn switches(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.path.iter().copied()
    }

    /// The rule sets, one per switch on the path.
    pub fn rules(&self) -> impl Iterator<Item = &BTreeSet<RuleId>> {
        self.rules.iter()
    }

    /// Iterate over pairs of switches and the rules used on them.
    pub fn hops(&self) -> impl Iterator<Item = (SwitchId, &BTreeSet<RuleId>)> {
        self.path.iter().copied().zip(self.rules.iter())
    }

    /// The rules used on `switch`, or `None` if the switch is not on the path.
    pub fn rules_at(&self, switch: SwitchId) -> Option<&BTreeSet<RuleId>> {
        self.path
            .iter()
            .position(|s| *s == switch)
            .and_then(|i| self.rules.get(i))
    }

    /// Length of the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns `true` if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Number of rules used at the first hop, or 0 if the class is empty.
    pub fn size(&self) -> usize {
        self.rules.front().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of rules used at each hop.
    pub fn hop_sizes(&self) -> Vec<usize> {
        self.rules.iter().map(|r| r.len()).collect()
    }

    /// Returns `true` if the switch is on the path.
    pub fn contains(&self, switch: SwitchId) -> bool {
        self.path.contains(&switch)
    }

    /// Append a hop at the end of the path. Returns `false` (and does nothing) if the switch is
    /// already on the path.
    pub fn push_back(&mut self, switch: SwitchId, rules: BTreeSet<RuleId>) -> bool {
        if self.contains(switch) {
            return false;
        }
        self.path.push_back(switch);
        self.rules.push_back(rules);
        true
    }

    /// Prepend a hop at the beginning of the path. Returns `false` (and does nothing) if the
    /// switch is already on the path.
    pub fn push_front(&mut self, switch: SwitchId, rules: BTreeSet<RuleId>) -> bool {
        if self.contains(switch) {
            return false;
        }
        self.path.push_front(switch);
        self.rules.push_front(rules);
        true
    }
}
