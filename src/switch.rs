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

//! # Switch
//!
//! A switch stores its interfaces and its forwarding rules. Rules are indexed in a
//! [`PrefixTrie`], which is used both to derive the local match of each rule and to answer which
//! rules a set of packets reaches on this switch.

use std::{
    collections::{BTreeSet, HashMap},
    net::Ipv4Addr,
};

use log::*;

use crate::{
    config::AnalyzerConfig,
    interface::{Interface, InterfaceAddr},
    rule::Rule,
    trie::PrefixTrie,
    types::{AddressRange, FibError, InterfaceId, NextHop, RuleId, SwitchId},
};

/// # Switch
///
/// Holds the forwarding rules and interfaces of a single device. The local match of every rule
/// always reflects longest-prefix matching among all rules installed on this switch.
#[derive(Debug, Clone)]
pub struct Switch {
    id: SwitchId,
    name: String,
    interfaces: Vec<Interface>,
    if_ids: HashMap<u32, usize>,
    if_names: HashMap<String, usize>,
    if_ips: HashMap<Ipv4Addr, usize>,
    destinations: HashMap<(Ipv4Addr, u8), usize>,
    rules: Vec<Rule>,
    rule_ranges: HashMap<AddressRange, RuleId>,
    trie: PrefixTrie<RuleId>,
}

impl Switch {
    /// Create a new switch without any interface or rule.
    pub fn new(id: SwitchId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            interfaces: Vec::new(),
            if_ids: HashMap::new(),
            if_names: HashMap::new(),
            if_ips: HashMap::new(),
            destinations: HashMap::new(),
            rules: Vec::new(),
            rule_ranges: HashMap::new(),
            trie: PrefixTrie::new(),
        }
    }

    /// Identifier of the switch.
    pub fn id(&self) -> SwitchId {
        self.id
    }

    /// Name of the switch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a new interface to the switch. If an interface with the same id already exists, the new
    /// one is ignored and `None` is returned. If another interface is already attached to one of
    /// the destinations, the old interface stays responsible for that destination.
    pub fn add_interface(
        &mut self,
        id: u32,
        name: impl Into<String>,
        addrs: Vec<InterfaceAddr>,
        config: &AnalyzerConfig,
    ) -> Option<InterfaceId> {
        let name = name.into();
        if self.if_ids.contains_key(&id) {
            warn!("{}: ignore duplicated interface: {}", self.name, name);
            return None;
        }

        let idx = self.interfaces.len();
        let iid = InterfaceId::new(self.id, id);
        self.if_ids.insert(id, idx);
        self.if_names.insert(name.clone(), idx);
        for addr in addrs.iter() {
            match self.if_ips.entry(addr.local_addr) {
                std::collections::hash_map::Entry::Occupied(_) => {
                    if config.show_warnings {
                        warn!(
                            "{}: duplicate local address found: {}",
                            self.name, addr.local_addr
                        );
                    }
                }
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(idx);
                }
            }
            match self.destinations.entry(addr.destination_key()) {
                std::collections::hash_map::Entry::Occupied(_) => {
                    if config.show_warnings {
                        warn!(
                            "{}: duplicate destination address found: {}",
                            self.name,
                            addr.destination_range()
                        );
                    }
                }
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(idx);
                }
            }
        }
        self.interfaces.push(Interface::new(iid, name, addrs));
        Some(iid)
    }

    /// All interfaces of the switch, in the order in which they were added.
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Get the interface with the given numeric id.
    pub fn interface_by_id(&self, id: u32) -> Option<&Interface> {
        self.if_ids.get(&id).map(|i| &self.interfaces[*i])
    }

    /// Get the interface with the given name.
    pub fn interface_by_name(&self, name: &str) -> Option<&Interface> {
        self.if_names.get(name).map(|i| &self.interfaces[*i])
    }

    /// Get the interface that owns the local address `ip`.
    pub fn interface_by_ip(&self, ip: Ipv4Addr) -> Option<&Interface> {
        self.if_ips.get(&ip).map(|i| &self.interfaces[*i])
    }

    /// Get the interface attached to the subnet `destination/mask_len`.
    pub fn interface_by_destination(&self, destination: Ipv4Addr, mask_len: u8) -> Option<&Interface> {
        self.destinations
            .get(&(destination, mask_len))
            .map(|i| &self.interfaces[*i])
    }

    /// Install a new rule on the switch.
    ///
    /// The local match of the new rule starts as its own range. Then, for every rule currently
    /// overlapping with it, the more specific range is subtracted from the local match of the less
    /// specific rule. Installing a second rule with the same range fails with
    /// `FibError::DuplicateRule`, and the first one is kept.
    pub fn add_rule(&mut self, range: AddressRange, next_hop: NextHop) -> Result<RuleId, FibError> {
        if self.rule_ranges.contains_key(&range) {
            warn!("{}: fail to insert duplicate rule {}", self.name, range);
            return Err(FibError::DuplicateRule(self.id, range));
        }

        let id = RuleId::new(self.id, self.rules.len());
        let mut rule = Rule::new(id, range, next_hop);

        let overlapping: Vec<RuleId> = self.trie.search_match(&range).into_iter().copied().collect();
        for other in overlapping {
            let other = &mut self.rules[other.index()];
            if other.is_less_specific(&rule) {
                // the new rule shadows part of the old one
                other.subtract_local_match(&range);
            } else if rule.is_less_specific(other) {
                rule.subtract_local_match(&other.range());
            }
        }

        self.trie.insert(range, id);
        self.rule_ranges.insert(range, id);
        self.rules.push(rule);
        trace!("{}: added rule {} -> {}", self.name, range, next_hop);
        Ok(id)
    }

    /// All rules, in the order in which they were installed.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules on the switch.
    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Get a rule by its id. Returns `None` if the rule belongs to another switch.
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        if id.switch() != self.id {
            return None;
        }
        self.rules.get(id.index())
    }

    /// Get the rule with exactly the given match key.
    pub fn rule_by_range(&self, range: &AddressRange) -> Option<&Rule> {
        self.rule_ranges.get(range).map(|id| &self.rules[id.index()])
    }

    /// Get the rule that would forward a packet destined to `addr`.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<&Rule> {
        self.trie
            .get_lpm(&AddressRange::from(addr))
            .map(|(_, id)| &self.rules[id.index()])
    }

    /// Get all rules that handle some part of `range`.
    pub fn match_rules(&self, range: &AddressRange) -> BTreeSet<RuleId> {
        self.trie.search_match(range).into_iter().copied().collect()
    }

    /// Get all rules that handle some part of any of the `ranges`.
    pub fn match_rules_many<'a, I>(&self, ranges: I) -> BTreeSet<RuleId>
    where
        I: IntoIterator<Item = &'a AddressRange>,
    {
        self.trie.search_match_many(ranges).into_iter().copied().collect()
    }
}

impl std::fmt::Display for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "name='{}', {} interfaces, {} rules",
            self.name,
            self.interfaces.len(),
            self.rules.len()
        )
    }
}
