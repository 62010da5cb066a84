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

use super::{ip, r};
use crate::types::{AddressRange, FibError};

#[test]
fn new_checks_mask() {
    assert!(AddressRange::new(0x0a000000, 0xffffff00).is_ok());
    assert!(AddressRange::new(0x0a000000, 0).is_ok());
    assert!(AddressRange::new(0x0a000000, u32::MAX).is_ok());
    assert!(matches!(
        AddressRange::new(0x0a000000, 0xff00ff00),
        Err(FibError::InvalidMask(0xff00ff00))
    ));
    assert!(matches!(
        AddressRange::new(0x0a000000, 0x00ffffff),
        Err(FibError::InvalidMask(_))
    ));
    assert!(matches!(
        AddressRange::from_len(0, 33),
        Err(FibError::InvalidMaskLength(33))
    ));
}

#[test]
fn host_bits_are_cleared() {
    let a = AddressRange::from_len(0x0a0000ff, 24).unwrap();
    assert_eq!(a, r("10.0.0.0/24"));
    assert_eq!(r("10.0.0.17/24"), r("10.0.0.0/24"));
    assert_eq!(a.addr(), 0x0a000000);
    assert_eq!(a.mask(), 0xffffff00);
    assert_eq!(a.len(), 24);
}

#[test]
fn parse_and_display() {
    assert_eq!(r("10.0.0.0/24").to_string(), "10.0.0.0/24");
    assert_eq!(r("0.0.0.0/0").to_string(), "0.0.0.0/0");
    assert_eq!(r("10.0.0.1").to_string(), "10.0.0.1/32");
    assert!(r("0.0.0.0/0").is_default());
    assert!("10.0.0.0/33".parse::<AddressRange>().is_err());
    assert!("foo".parse::<AddressRange>().is_err());
}

#[test]
fn containment() {
    let a = r("10.0.0.0/16");
    let b = r("10.0.1.0/24");
    let c = r("10.1.0.0/24");
    assert!(a.contains(&a));
    assert!(a.contains(&b));
    assert!(!b.contains(&a));
    assert!(!a.contains(&c));
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
    assert!(!a.overlaps(&c));
    assert!(AddressRange::ALL.contains(&c));
    assert!(b.contains_addr(ip("10.0.1.200")));
    assert!(!b.contains_addr(ip("10.0.2.0")));
}

#[test]
fn sibling_and_parent() {
    assert_eq!(r("10.0.0.0/25").sibling(), Some(r("10.0.0.128/25")));
    assert_eq!(r("10.0.0.128/25").sibling(), Some(r("10.0.0.0/25")));
    assert_eq!(r("10.0.0.128/25").parent(), Some(r("10.0.0.0/24")));
    assert_eq!(r("128.0.0.0/1").sibling(), Some(r("0.0.0.0/1")));
    assert_eq!(r("128.0.0.0/1").parent(), Some(AddressRange::ALL));
    assert_eq!(AddressRange::ALL.sibling(), None);
    assert_eq!(AddressRange::ALL.parent(), None);
}

#[test]
fn difference() {
    assert_eq!(
        r("10.0.0.0/24").difference(&r("10.0.0.128/25")),
        vec![r("10.0.0.0/25")]
    );
    assert_eq!(
        r("10.0.0.0/22").difference(&r("10.0.1.0/24")),
        vec![r("10.0.0.0/24"), r("10.0.2.0/23")]
    );
    assert_eq!(r("10.0.0.0/24").difference(&r("10.0.0.0/8")), Vec::<AddressRange>::new());
    assert_eq!(r("10.0.0.0/24").difference(&r("10.0.0.0/24")), Vec::<AddressRange>::new());
    assert_eq!(
        r("10.0.0.0/24").difference(&r("10.1.0.0/24")),
        vec![r("10.0.0.0/24")]
    );
}

#[test]
fn serde_as_string() {
    let a = r("10.0.1.0/24");
    let s = serde_json::to_string(&a).unwrap();
    assert_eq!(s, "\"10.0.1.0/24\"");
    let b: AddressRange = serde_json::from_str(&s).unwrap();
    assert_eq!(a, b);
}
