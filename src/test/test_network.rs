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

use pretty_assertions::assert_eq;
use test_log::test;

use super::{build_net, ip, r, rid, switch, via};
use crate::{
    config::AnalyzerConfig,
    network::Network,
    snapshot::SwitchSnapshot,
    switch::Switch,
    types::{FibError, NextHop, SwitchId},
};

/// s1 -- s2 -- s3, and s4 is isolated.
fn line() -> Network {
    build_net(vec![
        switch("s1", &[("10.255.0.0/30", "10.255.0.1")])
            .with_rule("10.0.0.0/24".parse().unwrap(), via("10.255.0.2")),
        switch(
            "s2",
            &[("10.255.0.0/30", "10.255.0.2"), ("10.255.0.4/30", "10.255.0.5")],
        )
        .with_rule("10.0.0.0/24".parse().unwrap(), via("10.255.0.6"))
        .with_rule("10.0.1.0/24".parse().unwrap(), NextHop::Discard),
        switch("s3", &[("10.255.0.4/30", "10.255.0.6")])
            .with_rule("10.0.0.0/24".parse().unwrap(), NextHop::Discard),
        switch("s4", &[("10.255.1.0/30", "10.255.1.1")]),
    ])
}

#[test]
fn from_snapshots() {
    let net = line();
    assert_eq!(net.num_switches(), 4);
    assert_eq!(net.num_rules(), 4);
    assert_eq!(net.num_interfaces(), 5);
    assert_eq!(
        net.switch_ids().collect::<Vec<_>>(),
        vec![SwitchId::from(0u32), SwitchId::from(1u32), SwitchId::from(2u32), SwitchId::from(3u32)]
    );
    assert_eq!(
        net.switches().iter().map(|s| s.name()).collect::<Vec<_>>(),
        vec!["s1", "s2", "s3", "s4"]
    );
    assert_eq!(net.switch_name(2u32.into()).unwrap(), "s3");
    assert_eq!(net.switch_by_name("s2").unwrap().id(), SwitchId::from(1u32));
    assert_eq!(net.next_switch_id(), SwitchId::from(4u32));
}

#[test]
fn unknown_switch() {
    let net = line();
    assert!(matches!(
        net.switch(7u32.into()),
        Err(FibError::SwitchNotFound(id)) if id == SwitchId::from(7u32)
    ));
    assert!(matches!(
        net.switch_by_name("s7"),
        Err(FibError::SwitchNameNotFound(name)) if name == "s7"
    ));
    assert!(net.switch_name(7u32.into()).is_err());
}

#[test]
fn links() {
    let net = line();
    assert_eq!(net.neighbors(0u32.into()), vec![SwitchId::from(1u32)]);
    assert_eq!(net.neighbors(1u32.into()), vec![SwitchId::from(0u32), SwitchId::from(2u32)]);
    assert_eq!(net.neighbors(2u32.into()), vec![SwitchId::from(1u32)]);
    assert_eq!(net.neighbors(3u32.into()), Vec::<SwitchId>::new());
    assert_eq!(net.neighbors(9u32.into()), Vec::<SwitchId>::new());
    assert_eq!(net.links().edge_count(), 4);
    assert!(net.links().contains_edge(0u32.into(), 1u32.into()));
    assert!(net.links().contains_edge(1u32.into(), 0u32.into()));
    assert!(!net.links().contains_edge(0u32.into(), 2u32.into()));
}

#[test]
fn resolve_rules_and_interfaces() {
    let net = line();
    let iface = net.interface_by_ip(ip("10.255.0.6")).unwrap();
    assert_eq!(iface.switch(), SwitchId::from(2u32));
    assert_eq!(iface.name(), "eth0");
    let iface = net.interface_by_ip(ip("10.255.0.5")).unwrap();
    assert_eq!(iface.switch(), SwitchId::from(1u32));
    assert_eq!(iface.name(), "eth1");
    assert!(net.interface_by_ip(ip("10.255.0.3")).is_none());

    let rule = net.rule(rid(1, 1)).unwrap();
    assert_eq!(rule.range(), r("10.0.1.0/24"));
    assert_eq!(rule.next_hop(), NextHop::Discard);
    assert!(net.rule(rid(1, 2)).is_none());
    assert!(net.rule(rid(8, 0)).is_none());
}

#[test]
fn duplicate_switch_name() {
    let res = Network::from_snapshots(
        vec![SwitchSnapshot::new("s1"), SwitchSnapshot::new("s1")],
        &AnalyzerConfig::default(),
    );
    assert!(matches!(res, Err(FibError::DuplicateSwitch(name)) if name == "s1"));
}

#[test]
fn unexpected_switch_id() {
    let config = AnalyzerConfig::default();
    let mut net = Network::new();
    assert_eq!(net.add_switch(Switch::new(0u32.into(), "s1"), &config).unwrap(), SwitchId::from(0u32));
    assert!(matches!(
        net.add_switch(Switch::new(2u32.into(), "s3"), &config),
        Err(FibError::UnexpectedSwitchId { expected, found })
            if expected == SwitchId::from(1u32) && found == SwitchId::from(2u32)
    ));
    assert_eq!(net.add_switch(Switch::new(1u32.into(), "s2"), &config).unwrap(), SwitchId::from(1u32));
    assert_eq!(net.num_switches(), 2);
}

#[test]
fn shared_subnet_links_to_first_switch() {
    let net = build_net(vec![
        switch("a", &[("10.255.0.0/29", "10.255.0.1")]),
        switch("b", &[("10.255.0.0/29", "10.255.0.2")]),
        switch("c", &[("10.255.0.0/29", "10.255.0.3")]),
    ]);
    assert_eq!(net.neighbors(0u32.into()), vec![SwitchId::from(1u32), SwitchId::from(2u32)]);
    assert_eq!(net.neighbors(1u32.into()), vec![SwitchId::from(0u32)]);
    assert_eq!(net.neighbors(2u32.into()), vec![SwitchId::from(0u32)]);
}

#[test]
fn duplicate_local_address_keeps_first_owner() {
    let net = build_net(vec![
        switch("a", &[("10.9.0.0/30", "10.9.0.2")]),
        switch("b", &[("10.9.0.0/30", "10.9.0.2")]),
    ]);
    let iface = net.interface_by_ip(ip("10.9.0.2")).unwrap();
    assert_eq!(iface.switch(), SwitchId::from(0u32));
    assert_eq!(net.switch_name(iface.switch()).unwrap(), "a");
}
