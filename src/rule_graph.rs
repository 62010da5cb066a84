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

//! # Rule Graph
//!
//! Directed graph of forwarding dependencies between rules of different switches. There is an
//! edge `r -> o` if some packet handled by `r` is sent to the switch of `o`, where it is handled
//! by `o`. Rules without predecessor are *ingress* rules, rules without successor are *egress*
//! rules.

use std::collections::{BTreeMap, BTreeSet};

use log::*;

use crate::{config::AnalyzerConfig, formatter::NetworkFormatter, network::Network, types::RuleId};

/// # Rule Graph
///
/// Built once from a [`Network`] by [`RuleGraph::build`], and read-only afterwards. All sets are
/// ordered, such that every traversal of the graph is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleGraph {
    rules: BTreeSet<RuleId>,
    next: BTreeMap<RuleId, BTreeSet<RuleId>>,
    prev: BTreeMap<RuleId, BTreeSet<RuleId>>,
    ingress: BTreeSet<RuleId>,
    egress: BTreeSet<RuleId>,
    empty: BTreeSet<RuleId>,
}

impl RuleGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for all rules of the network.
    ///
    /// Rules without next-hop IP, and rules whose next hop does not belong to any known interface
    /// are egress rules. For all other rules, the local match is looked up on the switch owning
    /// the next hop, and an edge is added to every rule found there. If no rule is found, the
    /// packets are dropped on the next switch, and the rule is an egress rule as well. Rules that
    /// do not handle any packet (empty local match) are not part of the graph.
    pub fn build(net: &Network, config: &AnalyzerConfig) -> Self {
        let mut graph = Self::new();

        for switch in net.switches() {
            for rule in switch.rules() {
                if rule.local_match().is_empty() {
                    trace!("{}: skip shadowed rule {}", switch.name(), rule.range());
                    continue;
                }

                let ip = match rule.next_hop_ip() {
                    Some(ip) => ip,
                    None => {
                        graph.add_output_rule(rule.id());
                        continue;
                    }
                };

                let iface = match net.interface_by_ip(ip) {
                    Some(iface) => iface,
                    None => {
                        if config.show_unknown_next_hops {
                            warn!("switch '{}': next hop ip {} not found", switch.name(), ip);
                        }
                        graph.add_output_rule(rule.id());
                        continue;
                    }
                };

                let matches = match net.switch(iface.switch()) {
                    Ok(dst) => dst.match_rules_many(rule.local_match()),
                    Err(_) => BTreeSet::new(),
                };

                if matches.is_empty() {
                    graph.add_output_rule(rule.id());
                    continue;
                }

                if matches.len() > 1 && config.show_multiple_next_hops {
                    for m in matches.iter() {
                        info!("multiple match: {} -> {}", rule.id().fmt(net), m.fmt(net));
                    }
                }

                for m in matches {
                    if !graph.add_next_hop(rule.id(), m) {
                        warn!(
                            "insert duplicate next hop: {} -> {}",
                            rule.id().fmt(net),
                            m.fmt(net)
                        );
                    }
                }
            }
        }

        info!("{}", graph);
        graph
    }

    /// Add a dependency `prev -> next`. Returns `false` if the edge already exists, in which case
    /// the graph is not modified.
    pub fn add_next_hop(&mut self, prev: RuleId, next: RuleId) -> bool {
        if !self.next.entry(prev).or_default().insert(next) {
            return false;
        }
        self.prev.entry(next).or_default().insert(prev);

        self.rules.insert(prev);
        self.rules.insert(next);

        self.egress.remove(&prev);
        if !self.prev.contains_key(&prev) {
            self.ingress.insert(prev);
        }
        self.ingress.remove(&next);
        if !self.next.contains_key(&next) {
            self.egress.insert(next);
        }
        true
    }

    /// Add a rule that does not forward packets to any other rule.
    pub fn add_output_rule(&mut self, rule: RuleId) {
        self.rules.insert(rule);
        self.egress.insert(rule);
        if !self.prev.contains_key(&rule) {
            self.ingress.insert(rule);
        }
    }

    /// Get all rules that `rule` forwards packets to.
    pub fn next_hops(&self, rule: RuleId) -> &BTreeSet<RuleId> {
        self.next.get(&rule).unwrap_or(&self.empty)
    }

    /// Get all rules that forward packets to `rule`.
    pub fn prev_hops(&self, rule: RuleId) -> &BTreeSet<RuleId> {
        self.prev.get(&rule).unwrap_or(&self.empty)
    }

    /// All rules that are part of the graph.
    pub fn rules(&self) -> &BTreeSet<RuleId> {
        &self.rules
    }

    /// Rules without any predecessor.
    pub fn ingress_rules(&self) -> &BTreeSet<RuleId> {
        &self.ingress
    }

    /// Rules without any successor.
    pub fn egress_rules(&self) -> &BTreeSet<RuleId> {
        &self.egress
    }

    /// Returns `true` if `rule` is part of the graph.
    pub fn contains(&self, rule: RuleId) -> bool {
        self.rules.contains(&rule)
    }

    /// Number of rules in the graph.
    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Number of edges in the graph.
    pub fn num_dependencies(&self) -> usize {
        self.next.values().map(|n| n.len()).sum()
    }
}

impl std::fmt::Display for RuleGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rule graph [{} rules, {} ingress rules, {} egress rules, {} next hop dependencies]",
            self.rules.len(),
            self.ingress.len(),
            self.egress.len(),
            self.num_dependencies()
        )
    }
}
