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

//! Module containing all type definitions

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod range;
pub use range::AddressRange;
pub(crate) use range::len_to_mask;

/// Switch Identification (and index into the list of switches of a `Network`)
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct SwitchId(pub(crate) u32);

impl SwitchId {
    /// Get the index of the switch.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for SwitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SwitchId({})", self.0)
    }
}

impl From<u32> for SwitchId {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl From<usize> for SwitchId {
    fn from(x: usize) -> Self {
        Self(x as u32)
    }
}

/// Rule Identification. A rule is identified by the switch that owns it and by its position in
/// the list of rules of that switch. The ordering of `RuleId` first compares the switch, and then
/// the insertion order.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RuleId {
    switch: SwitchId,
    index: u32,
}

impl RuleId {
    /// Create a new rule id.
    pub(crate) fn new(switch: SwitchId, index: usize) -> Self {
        Self {
            switch,
            index: index as u32,
        }
    }

    /// The switch that owns this rule.
    pub fn switch(&self) -> SwitchId {
        self.switch
    }

    /// Position of the rule in the rule table of its switch.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Interface Identification. An interface is identified by its owning switch and by the numeric
/// id assigned by the device.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InterfaceId {
    switch: SwitchId,
    id: u32,
}

impl InterfaceId {
    /// Create a new interface id.
    pub(crate) fn new(switch: SwitchId, id: u32) -> Self {
        Self { switch, id }
    }

    /// The switch that owns this interface.
    pub fn switch(&self) -> SwitchId {
        self.switch
    }

    /// The numeric id of the interface on its switch.
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Next-hop descriptor of a forwarding rule.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextHop {
    /// Forward the packet to the device that owns this interface address.
    Ip(Ipv4Addr),
    /// Silently drop the packet.
    Discard,
    /// Drop the packet and notify the sender.
    Deny,
    /// The next hop could not be resolved by the parser.
    Unresolved,
}

impl NextHop {
    /// Returns the next-hop IP address, or `None` if the rule is terminal.
    pub fn ip(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            _ => None,
        }
    }

    /// Returns `true` if the next hop is a terminal marker (no next-hop IP).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ip(_))
    }
}

impl std::fmt::Display for NextHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::Discard => f.write_str("discard"),
            Self::Deny => f.write_str("deny"),
            Self::Unresolved => f.write_str("unknown"),
        }
    }
}

/// Errors raised while building the network model.
#[derive(Error, Debug)]
pub enum FibError {
    /// The bit mask is not a contiguous run of ones starting at the most significant bit.
    #[error("Invalid mask: {0:#010x} is not a contiguous CIDR mask")]
    InvalidMask(u32),
    /// The prefix length is larger than 32.
    #[error("Invalid mask length: {0}")]
    InvalidMaskLength(u8),
    /// The string cannot be parsed as an address range.
    #[error("Cannot parse address range: {0}")]
    InvalidRange(String),
    /// The string cannot be parsed as an address range.
    #[error("Cannot parse address range: {0}")]
    ParseRange(#[from] ipnet::AddrParseError),
    /// Switch is not present in the network.
    #[error("Switch was not found in the network: {0:?}")]
    SwitchNotFound(SwitchId),
    /// Switch name is not present in the network.
    #[error("Switch name was not found in the network: {0}")]
    SwitchNameNotFound(String),
    /// Two switches with the same name were added to the network.
    #[error("Duplicate switch: {0}")]
    DuplicateSwitch(String),
    /// The switch id does not match the position at which it is registered.
    #[error("Switch {found:?} cannot be registered at position {expected:?}")]
    UnexpectedSwitchId {
        /// The id that the next switch must have.
        expected: SwitchId,
        /// The id of the switch that was passed.
        found: SwitchId,
    },
    /// A rule with the same address range already exists on that switch.
    #[error("Duplicate rule on {0:?}: {1}")]
    DuplicateRule(SwitchId, AddressRange),
    /// IO Error while reading a snapshot.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Json error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
