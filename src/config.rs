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

//! Configuration of the diagnostics reported while building and analyzing the model.

use serde::{Deserialize, Serialize};

/// Which anomalies should be reported in the log. All reports are disabled by default. The
/// configuration is passed explicitly to every stage that may report something.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Report inconsistencies while ingesting switches, like duplicate destination addresses.
    pub show_warnings: bool,
    /// Report rules whose next-hop IP does not belong to any known interface.
    pub show_unknown_next_hops: bool,
    /// Report rules whose match space reaches multiple rules on the next switch.
    pub show_multiple_next_hops: bool,
    /// Report forwarding loops found while traversing the rule graph.
    pub show_forwarding_loops: bool,
}

impl AnalyzerConfig {
    /// Create a configuration that reports nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration that reports everything.
    pub fn verbose() -> Self {
        Self {
            show_warnings: true,
            show_unknown_next_hops: true,
            show_multiple_next_hops: true,
            show_forwarding_loops: true,
        }
    }
}
