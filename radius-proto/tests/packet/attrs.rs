//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use super::*;

#[test]
fn decode_user_name() {
    let (list, consumed) =
        decode_one(&[0x01, 0x07, 0x62, 0x6f, 0x62, 0x62, 0x79]);
    assert_eq!(consumed, 7);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "User-Name");
    assert_eq!(list[0].value, Value::String("bobby".to_owned()));
    assert_eq!(list[0].tag, None);
    assert!(list[0].tainted);
}

#[test]
fn decode_user_password() {
    let mut cipher = b"hello".to_vec();
    crypt::encode_password(&mut cipher, SECRET, &VECTOR);
    let mut attr = vec![0x02, (2 + cipher.len()) as u8];
    attr.extend(&cipher);

    let (list, consumed) = decode_one(&attr);
    assert_eq!(consumed, 18);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "User-Password");
    assert_eq!(list[0].value, Value::String("hello".to_owned()));
}

#[test]
fn decode_tunnel_password() {
    let mut cipher = b"s3cret".to_vec();
    crypt::encode_tunnel_password(&mut cipher, [0x80, 0x01], SECRET, &VECTOR);
    let mut attr = vec![69, (2 + 1 + cipher.len()) as u8, 0x01];
    attr.extend(&cipher);

    let (list, consumed) = decode_one(&attr);
    assert_eq!(consumed, attr.len());
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].tag, Some(1));
    assert_eq!(list[0].value, Value::String("s3cret".to_owned()));
}

#[test]
fn decode_tagged_integer() {
    // The tag rides in the integer's high octet.
    let (list, consumed) = decode_one(&[64, 6, 0x01, 0x00, 0x00, 0x03]);
    assert_eq!(consumed, 6);
    assert_eq!(list[0].tag, Some(1));
    assert_eq!(list[0].value, Value::Uint32(3));
}

#[test]
fn decode_tagged_string() {
    let mut attr = vec![66, 12, 0x02];
    attr.extend(b"192.0.2.1");
    let (list, _) = decode_one(&attr);
    assert_eq!(list[0].tag, Some(2));
    assert_eq!(list[0].value, Value::String("192.0.2.1".to_owned()));
}

#[test]
fn decode_untagged_string() {
    // First octet outside 0x01..0x1f: no tag.
    let mut attr = vec![66, 5];
    attr.extend(b"abc");
    let (list, _) = decode_one(&attr);
    assert_eq!(list[0].tag, None);
    assert_eq!(list[0].value, Value::String("abc".to_owned()));
}

#[test]
fn decode_nas_ip_address() {
    let (list, _) = decode_one(&[4, 6, 192, 0, 2, 1]);
    assert_eq!(list[0].value, Value::Ipv4Addr(ip4!("192.0.2.1")));
}

#[test]
fn decode_event_timestamp() {
    let (list, _) = decode_one(&[55, 6, 0x60, 0x00, 0x00, 0x00]);
    assert_eq!(
        list[0].value,
        Value::Date(DateTime::from_timestamp(0x6000_0000, 0).unwrap())
    );
}

#[test]
fn decode_framed_ipv6_prefix() {
    let (list, _) =
        decode_one(&[97, 12, 0, 64, 0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0]);
    assert_eq!(list[0].value, Value::Ipv6Prefix(net6!("2001:db8::/64")));
}

#[test]
fn decode_empty_cui() {
    let (list, consumed) = decode_one(&[89, 2]);
    assert_eq!(consumed, 2);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "Chargeable-User-Identity");
    assert_eq!(list[0].value, Value::Octets(vec![]));
}

#[test]
fn decode_empty_attribute_skipped() {
    let (list, consumed) = decode_one(&[1, 2]);
    assert_eq!(consumed, 2);
    assert!(list.is_empty());
}

#[test]
fn decode_unknown_attribute() {
    let (list, consumed) = decode_one(&[200, 5, 1, 2, 3]);
    assert_eq!(consumed, 5);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].name(), "Attr-200");
    assert_eq!(list[0].value, Value::Octets(vec![1, 2, 3]));
}

#[test]
fn malformed_value_degrades_to_octets() {
    // NAS-IP-Address wants exactly 4 octets.
    let (list, consumed) = decode_one(&[4, 5, 10, 0, 0]);
    assert_eq!(consumed, 5);
    assert_eq!(list.len(), 1);
    assert!(list[0].da.is_unknown());
    assert_eq!(list[0].da.attr_type, AttrType::Octets);
    assert_eq!(list[0].value, Value::Octets(vec![10, 0, 0]));
}

#[test]
fn header_errors() {
    let cxt = decode_cxt();
    let mut list = PairList::new();
    // Header underflow.
    assert_eq!(
        decode_pair(&mut list, &DICT, &[1], &cxt),
        Err(DecodeError::InsufficientData)
    );
    // Declared length under the header size.
    assert_eq!(
        decode_pair(&mut list, &DICT, &[1, 1, 0], &cxt),
        Err(DecodeError::InsufficientData)
    );
    // Declared length past the end of the packet.
    assert_eq!(
        decode_pair(&mut list, &DICT, &[1, 10, 0x61], &cxt),
        Err(DecodeError::InsufficientData)
    );
    assert!(list.is_empty());
}

#[test]
fn decode_concat_eap_message() {
    let mut data = vec![79, 5, 1, 2, 3, 79, 4, 4, 5];
    // A different attribute stops the run.
    data.extend([1, 3, 0x78]);

    let mut list = PairList::new();
    let consumed =
        decode_pair(&mut list, &DICT, &data, &decode_cxt()).unwrap();
    assert_eq!(consumed, 9);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name(), "EAP-Message");
    assert_eq!(list[0].value, Value::Octets(vec![1, 2, 3, 4, 5]));
}

#[test]
fn pairs_preserve_packet_order() {
    let mut data = vec![0x01, 0x05];
    data.extend(b"bob");
    data.extend([4, 6, 192, 0, 2, 1]);
    data.extend([89, 2]);

    let list = decode_all(&data);
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].name(), "User-Name");
    assert_eq!(list[1].name(), "NAS-IP-Address");
    assert_eq!(list[2].name(), "Chargeable-User-Identity");
}
