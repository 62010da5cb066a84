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

//! Filters applied to equivalence classes before they are emitted.

use crate::equivalence_class::EquivalentClass;

/// A filter can keep, drop or rewrite an equivalence class.
pub trait EcFilter: std::fmt::Debug + Send + Sync {
    /// Return the (possibly modified) class, or `None` to drop it.
    fn filter(&self, ec: EquivalentClass) -> Option<EquivalentClass>;
}

/// Default minimum path length of [`MinLengthFilter`].
pub const DEFAULT_MIN_LEN: usize = 3;

/// Drops all equivalence classes whose path is shorter than `min_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinLengthFilter {
    /// Minimum number of switches on the path.
    pub min_len: usize,
}

impl MinLengthFilter {
    /// Create a new filter.
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl Default for MinLengthFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LEN)
    }
}

impl EcFilter for MinLengthFilter {
    fn filter(&self, ec: EquivalentClass) -> Option<EquivalentClass> {
        (ec.len() >= self.min_len).then_some(ec)
    }
}

/// Sequence of filters, applied in the order in which they were added. The chain stops at the
/// first filter that drops the class.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn EcFilter>>,
}

impl FilterChain {
    /// Create an empty chain, which keeps every class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the chain.
    pub fn push(&mut self, filter: impl EcFilter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Append a filter, and return the chain.
    pub fn with(mut self, filter: impl EcFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl EcFilter for FilterChain {
    fn filter(&self, ec: EquivalentClass) -> Option<EquivalentClass> {
        self.filters.iter().try_fold(ec, |ec, f| f.filter(ec))
    }
}
