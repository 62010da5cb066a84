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

//! Module that introduces a formatter to display all types containing `SwitchId` or `RuleId`.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::{
    analyzer::Slice,
    equivalence_class::EquivalentClass,
    network::Network,
    rule::Rule,
    types::{RuleId, SwitchId},
};

/// Trait to format a type that contains switch or rule ids, using the names of the switches.
pub trait NetworkFormatter<'a, 'n> {
    /// Type that is returned, which implements `std::fmt::Display`.
    type Formatter;

    /// Return a struct that can be formatted and displayed. Unknown ids are rendered as `?`.
    fn fmt(&'a self, net: &'n Network) -> Self::Formatter;
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for SwitchId {
    type Formatter = &'n str;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        net.switch_name(*self).unwrap_or("?")
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for Rule {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!(
            "{}: {} -> {}",
            self.switch().fmt(net),
            self.range(),
            self.next_hop()
        )
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for RuleId {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        match net.rule(*self) {
            Some(rule) => rule.fmt(net),
            None => format!("{}: ?", self.switch().fmt(net)),
        }
    }
}

//
// Paths
//
impl<'a, 'n> NetworkFormatter<'a, 'n> for Vec<SwitchId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        self.iter().map(|s| s.fmt(net)).join(", ")
    }
}

//
// Sets
//
impl<'a, 'n> NetworkFormatter<'a, 'n> for BTreeSet<SwitchId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|s| s.fmt(net)).join(", "))
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for BTreeSet<RuleId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|r| r.fmt(net)).join(", "))
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for EquivalentClass {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!(
            "[{}]",
            self.hops()
                .map(|(s, rules)| format!("{}: {}", s.fmt(net), rules.fmt(net)))
                .join(", ")
        )
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for Slice {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("path=[{}], size={}", self.path.fmt(net), self.rules.len())
    }
}
