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

//! # FibSlicer: Rule-level equivalence classes of forwarding tables
//!
//! This library reads the forwarding tables (FIBs) of a set of switches, and computes for every
//! switch which groups of packets (*equivalence classes*, or *slices*) traverse the network along
//! the same sequence of switches, being handled by the same rules at each hop.
//!
//! ## Structure
//! - The [`network`] module stores all switches ([`switch::Switch`]) with their interfaces and
//!   rules. Each switch indexes its rules in a [`trie::PrefixTrie`], and derives for each rule
//!   the set of packets it actually handles ([`rule_match::RuleMatch`]).
//! - The [`rule_graph`] module connects rules of different switches: rule `r` points to rule `o`
//!   if packets handled by `r` are forwarded to the switch of `o`, and handled there by `o`.
//! - The [`analyzer`] module walks the rule graph starting at a switch, and produces the list of
//!   [`equivalence_class::EquivalentClass`].
//! - Equivalence classes can be filtered ([`filter`]) and emitted ([`emitter`]).
//!
//! ## Example
//!
//! ```
//! use fib_slicer::prelude::*;
//!
//! # fn main() -> Result<(), FibError> {
//! let snapshots = vec![
//!     SwitchSnapshot::new("s1")
//!         .with_interface(1, "eth0")
//!         .with_addr("10.1.0.0/30".parse()?, "10.1.0.1".parse().unwrap())
//!         .with_rule("10.0.0.0/24".parse()?, NextHop::Ip("10.1.0.2".parse().unwrap())),
//!     SwitchSnapshot::new("s2")
//!         .with_interface(1, "eth0")
//!         .with_addr("10.1.0.0/30".parse()?, "10.1.0.2".parse().unwrap())
//!         .with_rule("10.0.0.0/24".parse()?, NextHop::Discard),
//! ];
//! let config = AnalyzerConfig::default();
//! let net = Network::from_snapshots(snapshots, &config)?;
//! let graph = RuleGraph::build(&net, &config);
//!
//! let s1 = net.switch_by_name("s1")?.id();
//! let analysis = SwitchRuleAnalyzer::new(&net, &graph, &config, s1).analyze();
//! assert_eq!(analysis.classes.len(), 1);
//! assert_eq!(analysis.classes[0].hop_sizes(), vec![1, 1]);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod analyzer;
pub mod config;
pub mod emitter;
pub mod equivalence_class;
pub mod filter;
pub mod formatter;
pub mod interface;
pub mod network;
pub mod prelude;
pub mod rule;
pub mod rule_graph;
pub mod rule_match;
pub mod snapshot;
pub mod switch;
pub mod trie;
pub mod types;

#[cfg(test)]
mod test;
