//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use super::*;

#[test]
fn decode_struct_with_tlv_tail() {
    let mut attr = vec![230, 14, 0x00, 0x2a, 192, 0, 2, 1, 1, 6];
    attr.extend(b"opt1");

    let (list, consumed) = decode_one(&attr);
    assert_eq!(consumed, 14);
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].name(), "Test-Struct-Version");
    assert_eq!(list[0].value, Value::Uint16(42));
    assert_eq!(list[1].name(), "Test-Struct-Address");
    assert_eq!(list[1].value, Value::Ipv4Addr(ip4!("192.0.2.1")));
    assert_eq!(list[2].name(), "Test-Option-Name");
    assert_eq!(list[2].value, Value::String("opt1".to_owned()));
}

#[test]
fn struct_keeps_fields_on_bad_tail() {
    // The TLV tail is malformed; the fixed fields stay and the tail
    // is attached as unknown octets.
    let attr = [230, 10, 0x00, 0x2a, 192, 0, 2, 1, 1, 200];
    let (list, consumed) = decode_one(&attr);
    assert_eq!(consumed, 10);
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].value, Value::Uint16(42));
    assert_eq!(list[1].value, Value::Ipv4Addr(ip4!("192.0.2.1")));
    assert!(list[2].da.is_unknown());
    assert_eq!(list[2].value, Value::Octets(vec![1, 200]));
}

#[test]
fn truncated_struct_degrades_to_octets() {
    let (list, consumed) = decode_one(&[230, 5, 0x00, 0x2a, 192]);
    assert_eq!(consumed, 5);
    assert_eq!(list.len(), 1);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].value, Value::Octets(vec![0x00, 0x2a, 192]));
}

#[test]
fn decode_combo_address() {
    // Four octets resolve to the IPv4 variant.
    let (list, _) = decode_one(&[231, 6, 10, 0, 0, 1]);
    assert_eq!(list[0].da.attr_type, AttrType::Ipv4Addr);
    assert_eq!(list[0].value, Value::Ipv4Addr(ip4!("10.0.0.1")));

    // Sixteen octets resolve to the IPv6 variant.
    let mut attr = vec![231, 18];
    attr.extend(ip6!("2001:db8::1").octets());
    let (list, _) = decode_one(&attr);
    assert_eq!(list[0].da.attr_type, AttrType::Ipv6Addr);
    assert_eq!(list[0].value, Value::Ipv6Addr(ip6!("2001:db8::1")));

    // Anything in between is raw.
    let (list, _) = decode_one(&[231, 7, 1, 2, 3, 4, 5]);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].value, Value::Octets(vec![1, 2, 3, 4, 5]));
}
