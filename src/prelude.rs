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

//! Convenience re-export of common members.

pub use crate::analyzer::{analyze_all, Analysis, Slice, SwitchRuleAnalyzer, SwitchSummary};
pub use crate::config::AnalyzerConfig;
pub use crate::emitter::{CollectEmitter, EcEmitter, SummaryEmitter};
pub use crate::equivalence_class::EquivalentClass;
pub use crate::filter::{EcFilter, FilterChain, MinLengthFilter};
pub use crate::formatter::NetworkFormatter;
pub use crate::network::Network;
pub use crate::rule::Rule;
pub use crate::rule_graph::RuleGraph;
pub use crate::rule_match::RuleMatch;
pub use crate::snapshot::SwitchSnapshot;
pub use crate::switch::Switch;
pub use crate::trie::PrefixTrie;
pub use crate::types::{AddressRange, FibError, InterfaceId, NextHop, RuleId, SwitchId};
