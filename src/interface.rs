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

//! Network interfaces of a switch.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::types::{len_to_mask, AddressRange, FibError, InterfaceId, SwitchId};

/// A single address configured on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceAddr {
    /// Network address of the attached subnet.
    pub destination: Ipv4Addr,
    /// Prefix length of the attached subnet.
    pub mask_len: u8,
    /// Address of this interface within the subnet.
    pub local_addr: Ipv4Addr,
}

impl InterfaceAddr {
    /// Create a new interface address. Returns an error if `mask_len` is larger than 32.
    pub fn new(destination: Ipv4Addr, mask_len: u8, local_addr: Ipv4Addr) -> Result<Self, FibError> {
        if mask_len > 32 {
            return Err(FibError::InvalidMaskLength(mask_len));
        }
        Ok(Self {
            destination,
            mask_len,
            local_addr,
        })
    }

    /// The attached subnet as an address range.
    pub fn destination_range(&self) -> AddressRange {
        AddressRange::raw(u32::from(self.destination), len_to_mask(self.mask_len))
    }

    /// The key used to find interfaces attached to the same subnet.
    pub(crate) fn destination_key(&self) -> (Ipv4Addr, u8) {
        (self.destination, self.mask_len)
    }
}

/// # Interface
///
/// A named port of a switch with one or more addresses. The local addresses are used to resolve
/// next-hop IPs of forwarding rules to the switch that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    id: InterfaceId,
    name: String,
    addrs: Vec<InterfaceAddr>,
}

impl Interface {
    /// Create a new interface.
    pub(crate) fn new(id: InterfaceId, name: String, addrs: Vec<InterfaceAddr>) -> Self {
        Self { id, name, addrs }
    }

    /// Identifier of the interface.
    pub fn id(&self) -> InterfaceId {
        self.id
    }

    /// The switch owning the interface.
    pub fn switch(&self) -> SwitchId {
        self.id.switch()
    }

    /// Name of the interface
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All addresses configured on the interface.
    pub fn addrs(&self) -> &[InterfaceAddr] {
        &self.addrs
    }

    /// Returns `true` if `ip` is a local address of this interface.
    pub fn has_local_addr(&self, ip: Ipv4Addr) -> bool {
        self.addrs.iter().any(|a| a.local_addr == ip)
    }
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id='{}', name='{}'", self.id.id(), self.name)?;
        if let Some(addr) = self.addrs.first() {
            write!(
                f,
                ", destination='{}', local addr='{}'",
                addr.destination_range(),
                addr.local_addr
            )?;
        }
        Ok(())
    }
}
