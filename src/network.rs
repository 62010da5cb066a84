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

//! # Network
//!
//! The registry of all switches. Switches are built independently (and in parallel) from their
//! snapshots, and are then registered one after the other. Registration builds the global
//! indices: switch names, interface addresses and the physical links between switches.

use std::{
    collections::{hash_map::Entry, HashMap},
    net::Ipv4Addr,
};

use log::*;
use petgraph::graphmap::DiGraphMap;
use rayon::prelude::*;

use crate::{
    config::AnalyzerConfig,
    interface::Interface,
    rule::Rule,
    snapshot::SwitchSnapshot,
    switch::Switch,
    types::{FibError, InterfaceId, RuleId, SwitchId},
};

/// Physical links between switches. Two switches are connected if they have an interface attached
/// to the same subnet.
pub type Links = DiGraphMap<SwitchId, ()>;

/// # Network
///
/// Stores all switches, indexed by their id (which is their position in the network), and
/// provides the lookups required to resolve a next-hop IP to the switch that owns it. Once all
/// switches are registered, the network is treated as immutable.
#[derive(Debug, Clone, Default)]
pub struct Network {
    switches: Vec<Switch>,
    names: HashMap<String, SwitchId>,
    ips: HashMap<Ipv4Addr, InterfaceId>,
    destinations: HashMap<(Ipv4Addr, u8), SwitchId>,
    links: Links,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the network from a list of switch snapshots. The switch ids are assigned in the order
    /// of `snapshots`. Each switch is built in its own task, and all switches are registered
    /// sequentially once every task has finished.
    pub fn from_snapshots(
        snapshots: Vec<SwitchSnapshot>,
        config: &AnalyzerConfig,
    ) -> Result<Self, FibError> {
        let switches: Vec<Switch> = snapshots
            .into_par_iter()
            .enumerate()
            .map(|(id, snapshot)| snapshot.build(SwitchId::from(id), config))
            .collect::<Result<_, _>>()?;

        let mut net = Self::new();
        for switch in switches {
            net.add_switch(switch, config)?;
        }
        info!(
            "loaded {} switches with {} interfaces and {} rules",
            net.switches.len(),
            net.num_interfaces(),
            net.num_rules()
        );
        Ok(net)
    }

    /// The id that the next registered switch must have.
    pub fn next_switch_id(&self) -> SwitchId {
        SwitchId::from(self.switches.len())
    }

    /// Register a switch. Its id must be equal to [`Network::next_switch_id`], and its name must be
    /// unique. This updates the name index, the interface address index and the physical links.
    pub fn add_switch(
        &mut self,
        switch: Switch,
        config: &AnalyzerConfig,
    ) -> Result<SwitchId, FibError> {
        let id = switch.id();
        let expected = self.next_switch_id();
        if id != expected {
            return Err(FibError::UnexpectedSwitchId {
                expected,
                found: id,
            });
        }
        if self.names.contains_key(switch.name()) {
            return Err(FibError::DuplicateSwitch(switch.name().to_string()));
        }

        self.names.insert(switch.name().to_string(), id);
        self.links.add_node(id);

        for iface in switch.interfaces() {
            for addr in iface.addrs() {
                match self.ips.entry(addr.local_addr) {
                    Entry::Occupied(e) => {
                        if config.show_warnings {
                            warn!(
                                "{}: local address {} is already used by {}",
                                switch.name(),
                                addr.local_addr,
                                self.switches
                                    .get(e.get().switch().index())
                                    .map(|s| s.name())
                                    .unwrap_or(switch.name())
                            );
                        }
                    }
                    Entry::Vacant(e) => {
                        e.insert(iface.id());
                    }
                }
                match self.destinations.get(&addr.destination_key()) {
                    Some(other) if *other != id => {
                        self.links.add_edge(id, *other, ());
                        self.links.add_edge(*other, id, ());
                    }
                    Some(_) => {}
                    None => {
                        self.destinations.insert(addr.destination_key(), id);
                    }
                }
            }
        }

        debug!("registered switch {:?}: {}", id, switch);
        self.switches.push(switch);
        Ok(id)
    }

    /// Get the switch with the given id.
    pub fn switch(&self, id: SwitchId) -> Result<&Switch, FibError> {
        self.switches
            .get(id.index())
            .ok_or(FibError::SwitchNotFound(id))
    }

    /// Get the switch with the given name.
    pub fn switch_by_name(&self, name: &str) -> Result<&Switch, FibError> {
        self.names
            .get(name)
            .map(|id| &self.switches[id.index()])
            .ok_or_else(|| FibError::SwitchNameNotFound(name.to_string()))
    }

    /// Get the name of a switch.
    pub fn switch_name(&self, id: SwitchId) -> Result<&str, FibError> {
        self.switch(id).map(|s| s.name())
    }

    /// All switches, ordered by their id.
    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    /// Iterate over all switch ids.
    pub fn switch_ids(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.switches.iter().map(|s| s.id())
    }

    /// Number of switches.
    pub fn num_switches(&self) -> usize {
        self.switches.len()
    }

    /// Get a rule by its id.
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.switches.get(id.switch().index())?.rule(id)
    }

    /// Get the interface that owns the local address `ip`.
    pub fn interface_by_ip(&self, ip: Ipv4Addr) -> Option<&Interface> {
        let iid = self.ips.get(&ip)?;
        self.switches
            .get(iid.switch().index())?
            .interface_by_id(iid.id())
    }

    /// Get the physical links between switches.
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Get all switches that are physically connected to `id`.
    pub fn neighbors(&self, id: SwitchId) -> Vec<SwitchId> {
        if !self.links.contains_node(id) {
            return Vec::new();
        }
        let mut neighbors: Vec<SwitchId> = self.links.neighbors(id).collect();
        neighbors.sort();
        neighbors
    }

    /// Total number of rules over all switches.
    pub fn num_rules(&self) -> usize {
        self.switches.iter().map(|s| s.num_rules()).sum()
    }

    /// Total number of interfaces over all switches.
    pub fn num_interfaces(&self) -> usize {
        self.switches.iter().map(|s| s.interfaces().len()).sum()
    }
}
