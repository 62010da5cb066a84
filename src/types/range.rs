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

//! This module contains the definition of an IPv4 address range (address and CIDR mask).

use std::{net::Ipv4Addr, str::FromStr};

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use super::FibError;

/// # Address Range
///
/// An IPv4 address block, given by an address and a mask. The mask is always a run of ones,
/// followed by a run of zeros (CIDR). The address is stored with all host bits cleared, such that
/// two ranges describing the same block compare equal.
///
/// The specificity of a range is given by the number of bits in the mask. A range `a` is less
/// specific than `b` if `a.mask() < b.mask()`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Ipv4Net", into = "Ipv4Net")]
pub struct AddressRange {
    addr: u32,
    mask: u32,
}

impl AddressRange {
    /// The range that covers the entire address space (`0.0.0.0/0`).
    pub const ALL: Self = Self { addr: 0, mask: 0 };

    /// Create a new address range from an address and a bit mask. The mask must be a contiguous
    /// run of ones starting at the most significant bit. Otherwise, `FibError::InvalidMask` is
    /// returned. Host bits of `addr` are cleared.
    pub fn new(addr: u32, mask: u32) -> Result<Self, FibError> {
        if mask.leading_ones() + mask.trailing_zeros() != 32 {
            return Err(FibError::InvalidMask(mask));
        }
        Ok(Self::raw(addr, mask))
    }

    /// Create a new address range from an address and a prefix length (at most 32).
    pub fn from_len(addr: u32, len: u8) -> Result<Self, FibError> {
        if len > 32 {
            return Err(FibError::InvalidMaskLength(len));
        }
        Ok(Self::raw(addr, len_to_mask(len)))
    }

    /// Create a new range without checking the mask. Only used for masks derived from valid ones.
    #[inline(always)]
    pub(crate) fn raw(addr: u32, mask: u32) -> Self {
        Self {
            addr: addr & mask,
            mask,
        }
    }

    /// The (masked) network address of the range.
    pub fn addr(&self) -> u32 {
        self.addr
    }

    /// The bit mask of the range.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// The prefix length, i.e., the number of bits set in the mask.
    pub fn len(&self) -> u8 {
        self.mask.count_ones() as u8
    }

    /// Returns `true` if the range covers the entire address space.
    pub fn is_default(&self) -> bool {
        self.mask == 0
    }

    /// Returns `true` if `self` is equal to `other`, or if it is less specific and contains
    /// `other` entirely.
    pub fn contains(&self, other: &Self) -> bool {
        self.mask <= other.mask && (other.addr & self.mask) == self.addr
    }

    /// Returns `true` if the address lies within the range.
    pub fn contains_addr(&self, addr: Ipv4Addr) -> bool {
        (u32::from(addr) & self.mask) == self.addr
    }

    /// Returns `true` if the two ranges share at least one address. For CIDR ranges, this is the
    /// case if and only if one contains the other.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// Returns the bit at position `depth` (counted from the most significant bit) of the address.
    #[inline(always)]
    pub(crate) fn bit(&self, depth: u8) -> usize {
        ((self.addr >> (31 - depth as u32)) & 1) as usize
    }

    /// Returns the child range at `depth + 1`, where `depth` must be `self.len()`.
    pub(crate) fn child(&self, bit: usize) -> Self {
        let depth = self.len() as u32;
        let new_bit = 1u32 << (31 - depth);
        Self {
            addr: if bit == 0 {
                self.addr
            } else {
                self.addr | new_bit
            },
            mask: self.mask | new_bit,
        }
    }

    /// Returns the range that differs from `self` only in the last bit of the mask. Returns `None`
    /// for `0.0.0.0/0`.
    pub fn sibling(&self) -> Option<Self> {
        if self.mask == 0 {
            return None;
        }
        let lowest = self.mask & self.mask.wrapping_neg();
        Some(Self {
            addr: self.addr ^ lowest,
            mask: self.mask,
        })
    }

    /// Returns the range with one bit less in the mask that contains `self`. Returns `None` for
    /// `0.0.0.0/0`.
    pub fn parent(&self) -> Option<Self> {
        if self.mask == 0 {
            return None;
        }
        Some(Self::raw(self.addr, self.mask << 1))
    }

    /// Compute the set of ranges covering `self` without `inner`. If `inner` is not contained in
    /// `self`, then `self` is returned unchanged. If `inner` covers `self`, the result is empty.
    ///
    /// The result contains one range per mask level between `self` and `inner`, each one being
    /// the sibling of the block that still contains `inner`.
    pub fn difference(&self, inner: &Self) -> Vec<Self> {
        if inner.contains(self) {
            return Vec::new();
        }
        if !self.contains(inner) {
            return vec![*self];
        }
        let mut result = Vec::with_capacity((inner.len() - self.len()) as usize);
        let mut cur = *inner;
        while cur.mask != self.mask {
            match (cur.sibling(), cur.parent()) {
                (Some(sibling), Some(parent)) => {
                    result.push(sibling);
                    cur = parent;
                }
                _ => break,
            }
        }
        result
    }

    /// Get the network address as an `Ipv4Addr`.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.addr)
    }
}

/// Transform a prefix length into a bit mask.
#[inline(always)]
pub(crate) fn len_to_mask(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - len.min(32) as u32)
    }
}

impl Default for AddressRange {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network(), self.len())
    }
}

impl std::fmt::Debug for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network(), self.len())
    }
}

impl From<Ipv4Net> for AddressRange {
    fn from(value: Ipv4Net) -> Self {
        Self::raw(u32::from(value.network()), u32::from(value.netmask()))
    }
}

impl From<AddressRange> for Ipv4Net {
    fn from(value: AddressRange) -> Self {
        // the prefix length is at most 32 by construction.
        Ipv4Net::new(value.network(), value.len()).unwrap_or_else(|_| value.network().into())
    }
}

impl From<Ipv4Addr> for AddressRange {
    fn from(value: Ipv4Addr) -> Self {
        Self::raw(u32::from(value), u32::MAX)
    }
}

impl FromStr for AddressRange {
    type Err = FibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            Ok(Ipv4Net::from_str(s)?.into())
        } else {
            Ok(Ipv4Addr::from_str(s)
                .map_err(|_| FibError::InvalidRange(s.to_string()))?
                .into())
        }
    }
}
