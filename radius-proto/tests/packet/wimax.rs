//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use super::*;

#[test]
fn decode_wimax_single_fragment() {
    // WiMAX-Capability TLV with a single release sub-TLV.
    let mut attr = vec![26, 15, 0, 0, 0x60, 0xb5, 1, 9, 0x00, 1, 6];
    attr.extend(b"r1.0");

    let (list, consumed) = decode_one(&attr);
    assert_eq!(consumed, 15);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "WiMAX-Release");
    assert_eq!(list[0].value, Value::String("r1.0".to_owned()));
}

#[test]
fn decode_wimax_fragmented() {
    // One logical value split across two Vendor-Specifics.
    let mut data = vec![26, 15, 0, 0, 0x60, 0xb5, 5, 9, 0x80];
    data.extend(b"012345");
    data.extend([26, 13, 0, 0, 0x60, 0xb5, 5, 7, 0x00]);
    data.extend(b"6789");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 28);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "WiMAX-AAA-Session-Id");
    assert_eq!(list[0].value, Value::Octets(b"0123456789".to_vec()));
}

#[test]
fn wimax_missing_final_fragment() {
    // Continuation set at the end of the packet: the whole value
    // degrades to raw octets.
    let mut data = vec![26, 15, 0, 0, 0x60, 0xb5, 5, 9, 0x80];
    data.extend(b"012345");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 15);
    assert_eq!(list.len(), 1);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].value, Value::Octets(data[2..].to_vec()));
}

#[test]
fn wimax_length_mismatch() {
    // The WiMAX length plus the PEN must exactly fill the attribute.
    let mut data = vec![26, 16, 0, 0, 0x60, 0xb5, 5, 9, 0x00];
    data.extend(b"0123456");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 16);
    assert_eq!(list.len(), 1);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].value, Value::Octets(data[2..].to_vec()));
}
