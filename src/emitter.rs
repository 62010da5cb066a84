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

//! # Emitters
//!
//! An emitter consumes equivalence classes, e.g., to write them into a report. Every emitter
//! applies its own [`FilterChain`] before handling a class.

use itertools::Itertools;
use log::*;

use crate::{
    equivalence_class::EquivalentClass,
    filter::{EcFilter, FilterChain},
    formatter::NetworkFormatter,
    network::Network,
};

/// Id of the first slice in a report. Slice tables are numbered from one.
pub const FIRST_SLICE_ID: usize = 1;

/// Consumer of equivalence classes.
pub trait EcEmitter {
    /// Handle the class. Returns `false` if the emitter failed. A class dropped by a filter is not
    /// a failure.
    fn emit(&mut self, ec: &EquivalentClass) -> bool;

    /// Emit all classes, and return the number of failures.
    fn emit_all<'a, I>(&mut self, classes: I) -> usize
    where
        I: IntoIterator<Item = &'a EquivalentClass>,
        Self: Sized,
    {
        classes.into_iter().filter(|ec| !self.emit(ec)).count()
    }
}

/// Keeps all classes that pass the filter in memory.
#[derive(Debug, Default)]
pub struct CollectEmitter {
    filters: FilterChain,
    classes: Vec<EquivalentClass>,
}

impl CollectEmitter {
    /// Create a new emitter with the given filters.
    pub fn new(filters: FilterChain) -> Self {
        Self {
            filters,
            classes: Vec::new(),
        }
    }

    /// All classes that were emitted so far.
    pub fn classes(&self) -> &[EquivalentClass] {
        &self.classes
    }

    /// Take all collected classes.
    pub fn into_classes(self) -> Vec<EquivalentClass> {
        self.classes
    }
}

impl EcEmitter for CollectEmitter {
    fn emit(&mut self, ec: &EquivalentClass) -> bool {
        if let Some(ec) = self.filters.filter(ec.clone()) {
            self.classes.push(ec);
        }
        true
    }
}

/// Writes a single line per class to the log, with the switches on the path and the number of
/// rules on each hop. Slices are numbered consecutively, starting at the given id.
#[derive(Debug)]
pub struct SummaryEmitter<'n> {
    net: &'n Network,
    filters: FilterChain,
    slice_id: usize,
}

impl<'n> SummaryEmitter<'n> {
    /// Create a new emitter. The first slice is numbered `start_id`.
    pub fn new(net: &'n Network, filters: FilterChain, start_id: usize) -> Self {
        Self {
            net,
            filters,
            slice_id: start_id,
        }
    }

    /// The id of the next slice.
    pub fn next_id(&self) -> usize {
        self.slice_id
    }
}

impl<'n> EcEmitter for SummaryEmitter<'n> {
    fn emit(&mut self, ec: &EquivalentClass) -> bool {
        let ec = match self.filters.filter(ec.clone()) {
            Some(ec) => ec,
            None => return true,
        };
        info!(
            "slice {}: path=[{}], size=[{}]",
            self.slice_id,
            ec.switches().map(|s| s.fmt(self.net)).join(", "),
            ec.hop_sizes().iter().join(", ")
        );
        for (sw, rules) in ec.hops() {
            debug!("    {} [size={}]: {}", sw.fmt(self.net), rules.len(), rules.fmt(self.net));
        }
        self.slice_id += 1;
        true
    }
}
