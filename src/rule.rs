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

//! Module containing the definition of a forwarding rule.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::{
    rule_match::RuleMatch,
    types::{AddressRange, NextHop, RuleId, SwitchId},
};

/// # Forwarding Rule
///
/// A single entry in the FIB of a switch. The match key and the next hop never change after the
/// rule was added to a switch. The `local_match` is updated by the switch whenever another rule
/// is installed that overlaps with this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    id: RuleId,
    range: AddressRange,
    next_hop: NextHop,
    local_match: RuleMatch,
}

impl Rule {
    /// Create a new rule, matching exactly its own range.
    pub(crate) fn new(id: RuleId, range: AddressRange, next_hop: NextHop) -> Self {
        Self {
            id,
            range,
            next_hop,
            local_match: RuleMatch::from(range),
        }
    }

    /// Identifier of the rule.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The switch on which this rule is installed.
    pub fn switch(&self) -> SwitchId {
        self.id.switch()
    }

    /// The match key of the rule.
    pub fn range(&self) -> AddressRange {
        self.range
    }

    /// The next-hop descriptor
    pub fn next_hop(&self) -> NextHop {
        self.next_hop
    }

    /// The next-hop IP address, or `None` if the rule is terminal.
    pub fn next_hop_ip(&self) -> Option<Ipv4Addr> {
        self.next_hop.ip()
    }

    /// The set of packets handled by this rule, given all other rules on the same switch.
    pub fn local_match(&self) -> &RuleMatch {
        &self.local_match
    }

    /// Get the match of the rule without considering any other rules.
    pub fn default_match(&self) -> RuleMatch {
        RuleMatch::from(self.range)
    }

    /// Returns `true` if the rule is less specific than `other`.
    pub fn is_less_specific(&self, other: &Rule) -> bool {
        self.range.mask() < other.range.mask()
    }

    /// Remove `range` from the local match.
    pub(crate) fn subtract_local_match(&mut self, range: &AddressRange) {
        self.local_match.subtract(range);
    }
}
