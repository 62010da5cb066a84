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

//! # Snapshots
//!
//! Records describing the forwarding table and the interfaces of a switch, as produced by an
//! external parser of the device output. A network snapshot is a list of [`SwitchSnapshot`],
//! stored as JSON:
//!
//! ```json
//! [
//!   {
//!     "name": "s1",
//!     "interfaces": [
//!       {
//!         "id": 1,
//!         "name": "eth0",
//!         "addrs": [{"destination": "10.1.0.0", "mask_len": 30, "local_addr": "10.1.0.1"}]
//!       }
//!     ],
//!     "rules": [
//!       {"prefix": "10.0.0.0/24", "next_hop": {"ip": "10.1.0.2"}},
//!       {"prefix": "0.0.0.0/0", "next_hop": "discard"}
//!     ]
//!   }
//! ]
//! ```

use std::{fs::File, io::BufReader, io::Read, net::Ipv4Addr, path::Path};

use ipnet::Ipv4Net;
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AnalyzerConfig,
    interface::InterfaceAddr,
    switch::Switch,
    types::{AddressRange, FibError, NextHop, SwitchId},
};

/// Snapshot of a single switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSnapshot {
    /// Name of the switch. Must be unique in the network.
    pub name: String,
    /// All interfaces of the switch.
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
    /// The forwarding table of the switch.
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

/// A single interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// Numeric id of the interface on the device.
    pub id: u32,
    /// Name of the interface.
    pub name: String,
    /// Addresses configured on the interface.
    #[serde(default)]
    pub addrs: Vec<InterfaceAddrRecord>,
}

/// A single address of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddrRecord {
    /// Network address of the attached subnet.
    pub destination: Ipv4Addr,
    /// Prefix length of the attached subnet.
    pub mask_len: u8,
    /// Address of the interface.
    pub local_addr: Ipv4Addr,
}

/// A single forwarding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// The match key. Host bits are ignored.
    pub prefix: Ipv4Net,
    /// Where to send matching packets.
    pub next_hop: NextHop,
}

impl TryFrom<InterfaceAddrRecord> for InterfaceAddr {
    type Error = FibError;

    fn try_from(value: InterfaceAddrRecord) -> Result<Self, Self::Error> {
        InterfaceAddr::new(value.destination, value.mask_len, value.local_addr)
    }
}

impl SwitchSnapshot {
    /// Create an empty snapshot for a switch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a rule to the snapshot.
    pub fn with_rule(mut self, prefix: Ipv4Net, next_hop: NextHop) -> Self {
        self.rules.push(RuleRecord { prefix, next_hop });
        self
    }

    /// Add an interface without any address.
    pub fn with_interface(mut self, id: u32, name: impl Into<String>) -> Self {
        self.interfaces.push(InterfaceRecord {
            id,
            name: name.into(),
            addrs: Vec::new(),
        });
        self
    }

    /// Add an address to the last interface. If there is no interface yet, a new one is created
    /// with id 0.
    pub fn with_addr(mut self, destination: Ipv4Net, local_addr: Ipv4Addr) -> Self {
        let addr = InterfaceAddrRecord {
            destination: destination.network(),
            mask_len: destination.prefix_len(),
            local_addr,
        };
        match self.interfaces.last_mut() {
            Some(iface) => iface.addrs.push(addr),
            None => self.interfaces.push(InterfaceRecord {
                id: 0,
                name: String::from("eth0"),
                addrs: vec![addr],
            }),
        }
        self
    }

    /// Build the switch with the given id. Interfaces are added before the rules. Duplicate rules
    /// are skipped, while malformed interface addresses result in an error.
    pub fn build(self, id: SwitchId, config: &AnalyzerConfig) -> Result<Switch, FibError> {
        let mut switch = Switch::new(id, self.name);

        for iface in self.interfaces {
            let addrs = iface
                .addrs
                .into_iter()
                .map(InterfaceAddr::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            switch.add_interface(iface.id, iface.name, addrs, config);
        }

        for rule in self.rules {
            match switch.add_rule(AddressRange::from(rule.prefix), rule.next_hop) {
                Ok(_) | Err(FibError::DuplicateRule(_, _)) => {}
                Err(e) => return Err(e),
            }
        }

        debug!("built switch {}", switch);
        Ok(switch)
    }
}

/// Read a network snapshot from a JSON file.
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<SwitchSnapshot>, FibError> {
    let file = File::open(path.as_ref())?;
    read_json(BufReader::new(file))
}

/// Read a network snapshot from any reader that yields JSON.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<SwitchSnapshot>, FibError> {
    Ok(serde_json::from_reader(reader)?)
}
