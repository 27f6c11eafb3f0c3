//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use super::*;

#[test]
fn decode_short_extended() {
    let (list, consumed) = decode_one(&[241, 7, 1, 0, 0, 0, 2]);
    assert_eq!(consumed, 7);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "Frag-Status");
    assert_eq!(list[0].value, Value::Uint32(2));
}

#[test]
fn decode_unknown_extended_type() {
    let (list, consumed) = decode_one(&[241, 6, 99, 1, 2, 3]);
    assert_eq!(consumed, 6);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].name(), "Attr-241.99");
    assert_eq!(list[0].value, Value::Octets(vec![1, 2, 3]));
}

#[test]
fn decode_long_extended_in_place() {
    // Long-extended with the continuation bit clear.
    let mut data = vec![245, 9, 1, 0x00];
    data.extend(b"hello");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 9);
    assert_eq!(list[0].name(), "SAML-Assertion");
    assert_eq!(list[0].value, Value::String("hello".to_owned()));
}

#[test]
fn decode_long_extended_fragmented() {
    let mut data = vec![245, 10, 1, 0x80];
    data.extend(b"hello ");
    data.extend([245, 9, 1, 0x00]);
    data.extend(b"world");

    let (list, consumed) = decode_one(&data);
    // Both attribute headers are consumed by the one call.
    assert_eq!(consumed, 19);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "SAML-Assertion");
    assert_eq!(list[0].value, Value::String("hello world".to_owned()));
}

#[test]
fn long_extended_chain_stops_at_foreign_attribute() {
    // Continuation set, but the next attribute is not a fragment: the
    // chain ends and the first fragment decodes alone.
    let mut data = vec![245, 10, 1, 0x80];
    data.extend(b"hello ");
    data.extend([1, 5]);
    data.extend(b"bob");

    let list = decode_all(&data);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].value, Value::String("hello ".to_owned()));
    assert_eq!(list[1].name(), "User-Name");
}

#[test]
fn decode_unknown_long_extended_fragmented() {
    // The fragment path applies even when the extended type has to be
    // fabricated.
    let mut data = vec![245, 10, 99, 0x80];
    data.extend(b"hello ");
    data.extend([245, 9, 99, 0x00]);
    data.extend(b"world");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 19);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].value, Value::Octets(b"hello world".to_vec()));
}

#[test]
fn decode_extended_vendor_specific() {
    let mut data = vec![241, 11, 26, 0, 0, 0, 9, 1];
    data.extend(b"abc");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 11);
    assert_eq!(list[0].name(), "Cisco-AVPair");
    assert_eq!(list[0].value, Value::String("abc".to_owned()));
}

#[test]
fn decode_extended_vendor_specific_unknown_vendor() {
    let mut data = vec![241, 11, 26, 0, 0, 0x10, 0x92, 7];
    data.extend(b"abc");

    let (list, consumed) = decode_one(&data);
    assert_eq!(consumed, 11);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].value, Value::Octets(b"abc".to_vec()));
}
