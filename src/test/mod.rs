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

//! Test module

use std::{collections::BTreeSet, fmt::Debug, net::Ipv4Addr};

use quickcheck::{Arbitrary, Gen};

use crate::{
    config::AnalyzerConfig,
    network::Network,
    snapshot::SwitchSnapshot,
    types::{AddressRange, NextHop, RuleId, SwitchId},
};

mod test_network;
mod test_range;
mod test_rule_match;

/// Parse an address range.
pub(crate) fn r(s: &str) -> AddressRange {
    s.parse().unwrap()
}

/// Parse an IP address.
pub(crate) fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

/// Next hop pointing to an IP address
pub(crate) fn via(s: &str) -> NextHop {
    NextHop::Ip(ip(s))
}

pub(crate) fn rid(switch: u32, index: usize) -> RuleId {
    RuleId::new(SwitchId::from(switch), index)
}

/// Build the network with all reports enabled.
pub(crate) fn build_net(snapshots: Vec<SwitchSnapshot>) -> Network {
    Network::from_snapshots(snapshots, &AnalyzerConfig::verbose()).unwrap()
}

/// Switch snapshot with one interface per `(subnet, local_addr)`.
pub(crate) fn switch(name: &str, addrs: &[(&str, &str)]) -> SwitchSnapshot {
    let mut s = SwitchSnapshot::new(name);
    for (i, (subnet, local)) in addrs.iter().enumerate() {
        s = s
            .with_interface(i as u32, format!("eth{i}"))
            .with_addr(subnet.parse().unwrap(), ip(local));
    }
    s
}

/// The /24 blocks within `10.0.0.0/16` covered by `range`. The range must be at least as specific
/// as `/16` and at most as specific as `/24`.
pub(crate) fn blocks(range: &AddressRange) -> BTreeSet<u32> {
    assert!(range.len() >= 16 && range.len() <= 24);
    let start = (range.addr() >> 8) & 0xff;
    let count = 1u32 << (24 - range.len());
    (start..start + count).collect()
}

/// Random range in `10.0.0.0/16` with a prefix length between 16 and 24.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TestRange(pub AddressRange);

impl Debug for TestRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Arbitrary for TestRange {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = 16 + u8::arbitrary(g) % 9;
        let addr = (10u32 << 24) | ((u8::arbitrary(g) as u32) << 8);
        Self(AddressRange::from_len(addr, len).unwrap())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let parent = self.0.parent().filter(|p| p.len() >= 16).map(Self);
        Box::new(parent.into_iter())
    }
}

const DEFAULT_NUM_TESTS: usize = 1000;
const DEFAULT_GEN_SIZE: usize = 50;

pub(crate) fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        if !f(input.clone()) {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        if !f(i.clone()) {
            shrink_failure(f, i)
        }
    }
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            crate::test::proptest_runner($f)
        }
    };
}
pub(crate) use qc;
