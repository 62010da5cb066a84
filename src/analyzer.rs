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

//! # Switch Rule Analyzer
//!
//! Computes the equivalence classes that originate at a single switch. The analysis happens in
//! two phases:
//!
//! 1. **Expansion**: Starting with all ingress rules of the origin, the [`RuleGraph`] is followed
//!    hop by hop. All rules reached on the same next switch (along the same path) are grouped into
//!    one node of a tree. Rules without successor are the *leaf* rules of their node. A branch
//!    that would visit a switch twice is a forwarding loop, and is pruned.
//! 2. **Collection**: For every node with leaf rules, the rules used on each hop are recovered by
//!    walking back to the root. On each step, only the rules of the parent node that are a
//!    predecessor of the current rule set are kept.
//!
//! The tree only lives during a single call to [`SwitchRuleAnalyzer::analyze`]. Nodes are stored
//! in a table and refer to each other by index.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AnalyzerConfig,
    equivalence_class::EquivalentClass,
    formatter::NetworkFormatter,
    network::Network,
    rule_graph::RuleGraph,
    types::{RuleId, SwitchId},
};

/// Set of rules reached on `switch` along `path`.
#[derive(Debug, Clone)]
struct RulesNode {
    switch: SwitchId,
    rules: BTreeSet<RuleId>,
    leaf: BTreeSet<RuleId>,
    /// Path from the origin up to (and including) `switch`.
    path: Vec<SwitchId>,
    children: BTreeMap<SwitchId, usize>,
    parent: Option<usize>,
}

impl RulesNode {
    fn new(switch: SwitchId, path: Vec<SwitchId>, parent: Option<usize>) -> Self {
        Self {
            switch,
            rules: BTreeSet::new(),
            leaf: BTreeSet::new(),
            path,
            children: BTreeMap::new(),
            parent,
        }
    }
}

/// A raw slice: the leaf rules of a node in the tree, together with the path to that node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slice {
    /// The rules at the last switch of the path that do not forward packets any further.
    pub rules: BTreeSet<RuleId>,
    /// The path from the origin.
    pub path: Vec<SwitchId>,
}

/// Result of analyzing a single switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// The origin switch.
    pub switch: SwitchId,
    /// All equivalence classes originating at the switch.
    pub classes: Vec<EquivalentClass>,
    /// All raw slices, in the same order in which the classes were found.
    pub slices: Vec<Slice>,
}

/// Statistics of the analysis of a single switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwitchSummary {
    /// The origin switch.
    pub switch: SwitchId,
    /// Sum of the number of rules over all slices.
    pub used_rules: usize,
    /// Number of slices.
    pub total_slices: usize,
    /// Average number of rules per slice.
    pub avg_slice_size: f64,
    /// Average path length per slice.
    pub avg_path_len: f64,
}

impl Analysis {
    /// Compute the statistics of the analysis. Averages are 0 if there are no slices.
    pub fn summary(&self) -> SwitchSummary {
        let used_rules: usize = self.slices.iter().map(|s| s.rules.len()).sum();
        let total_path_len: usize = self.slices.iter().map(|s| s.path.len()).sum();
        let total_slices = self.slices.len();
        let (avg_slice_size, avg_path_len) = if total_slices == 0 {
            (0.0, 0.0)
        } else {
            (
                used_rules as f64 / total_slices as f64,
                total_path_len as f64 / total_slices as f64,
            )
        };
        SwitchSummary {
            switch: self.switch,
            used_rules,
            total_slices,
            avg_slice_size,
            avg_path_len,
        }
    }
}

/// # Switch Rule Analyzer
///
/// Computes all equivalence classes originating at one switch. The analyzer never modifies the
/// network or the rule graph, so multiple analyzers can run in parallel.
#[derive(Debug, Clone, Copy)]
pub struct SwitchRuleAnalyzer<'a> {
    net: &'a Network,
    graph: &'a RuleGraph,
    config: &'a AnalyzerConfig,
    switch: SwitchId,
}

impl<'a> SwitchRuleAnalyzer<'a> {
    /// Create a new analyzer for the origin `switch`.
    pub fn new(
        net: &'a Network,
        graph: &'a RuleGraph,
        config: &'a AnalyzerConfig,
        switch: SwitchId,
    ) -> Self {
        Self {
            net,
            graph,
            config,
            switch,
        }
    }

    /// The origin switch.
    pub fn switch(&self) -> SwitchId {
        self.switch
    }

    /// Run the analysis.
    pub fn analyze(&self) -> Analysis {
        let nodes = self.expand();
        let mut analysis = Analysis {
            switch: self.switch,
            classes: Vec::new(),
            slices: Vec::new(),
        };

        // pre-order traversal, visiting the children ordered by their switch.
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &nodes[idx];
            if !node.leaf.is_empty() {
                if let Some(ec) = self.backtrace(&nodes, idx) {
                    analysis.classes.push(ec);
                }
                analysis.slices.push(Slice {
                    rules: node.leaf.clone(),
                    path: node.path.clone(),
                });
            }
            stack.extend(node.children.values().rev().copied());
        }

        debug!(
            "{}: found {} equivalence classes in a tree of {} nodes",
            self.switch.fmt(self.net),
            analysis.classes.len(),
            nodes.len()
        );

        analysis
    }

    /// Build the tree of rule nodes, starting with the ingress rules of the origin.
    fn expand(&self) -> Vec<RulesNode> {
        let mut root = RulesNode::new(self.switch, vec![self.switch], None);
        root.rules = self
            .graph
            .ingress_rules()
            .iter()
            .filter(|r| r.switch() == self.switch)
            .copied()
            .collect();

        let mut nodes = vec![root];
        let mut queue = VecDeque::from([0]);

        while let Some(idx) = queue.pop_front() {
            let rules: Vec<RuleId> = nodes[idx].rules.iter().copied().collect();
            for rule in rules {
                let next_hops = self.graph.next_hops(rule);
                if next_hops.is_empty() {
                    nodes[idx].leaf.insert(rule);
                    continue;
                }
                for next in next_hops.iter().copied() {
                    let dst = next.switch();
                    let existing = nodes[idx].children.get(&dst).copied();
                    let child = match existing {
                        Some(child) => child,
                        None => {
                            if nodes[idx].path.contains(&dst) {
                                if self.config.show_forwarding_loops {
                                    warn!(
                                        "loop detected on {}, current path is: [{}, {}]",
                                        next.fmt(self.net),
                                        nodes[idx].path.fmt(self.net),
                                        dst.fmt(self.net),
                                    );
                                }
                                continue;
                            }
                            let mut path = nodes[idx].path.clone();
                            path.push(dst);
                            let child = nodes.len();
                            nodes.push(RulesNode::new(dst, path, Some(idx)));
                            nodes[idx].children.insert(dst, child);
                            queue.push_back(child);
                            child
                        }
                    };
                    nodes[child].rules.insert(next);
                }
            }
        }

        nodes
    }

    /// Create the equivalence class for the leaf rules of node `idx`. Returns `None` if the class
    /// would visit a switch twice.
    fn backtrace(&self, nodes: &[RulesNode], idx: usize) -> Option<EquivalentClass> {
        let mut ec = EquivalentClass::new();
        let mut node = &nodes[idx];
        let mut rules = node.leaf.clone();
        loop {
            if !ec.push_front(node.switch, rules.clone()) {
                warn!(
                    "loops detected in the equivalence class of {} towards {}, drop it!",
                    self.switch.fmt(self.net),
                    node.path.fmt(self.net)
                );
                return None;
            }
            let parent = match node.parent {
                Some(parent) => &nodes[parent],
                None => break,
            };
            rules = rules
                .iter()
                .flat_map(|r| self.graph.prev_hops(*r).iter())
                .filter(|r| parent.rules.contains(*r))
                .copied()
                .collect();
            node = parent;
        }
        Some(ec)
    }
}

/// Analyze all switches of the network in parallel. The result is ordered by the switch id.
pub fn analyze_all(
    net: &Network,
    graph: &RuleGraph,
    config: &AnalyzerConfig,
) -> Vec<(SwitchId, Analysis)> {
    net.switch_ids()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|sw| (sw, SwitchRuleAnalyzer::new(net, graph, config, sw).analyze()))
        .collect()
}
