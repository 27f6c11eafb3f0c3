//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod attrs;
mod extended;
mod structs;
mod wimax;

use std::sync::LazyLock as Lazy;

use chrono::DateTime;
use const_addrs::{ip4, ip6, net6};
use radius_proto::packet::consts::{AUTH_VECTOR_LEN, VENDORPEC_CISCO};
use radius_proto::packet::crypt;
use radius_proto::packet::decode::decode_pair;
use radius_proto::packet::dict::{AttrType, Dict};
use radius_proto::packet::error::DecodeError;
use radius_proto::packet::value::Value;
use radius_proto::packet::{DecodeCxt, PairList};

//
// Shared secret and request authenticator used by every scenario.
//

pub const SECRET: &[u8] = b"testing123";
pub const VECTOR: [u8; AUTH_VECTOR_LEN] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    0x0c, 0x0d, 0x0e, 0x0f,
];

//
// Test dictionary: the standard registry plus a few attributes for the
// struct, combo and Extended-Vendor-Specific paths.
//

pub static DICT: Lazy<Dict> = Lazy::new(|| {
    let mut dict = Dict::base();
    let root = dict.root().clone();

    // Fixed-layout compound attribute with a TLV tail.
    let test_struct =
        dict.attr_register(&root, 230, "Test-Struct", AttrType::Struct);
    dict.attr_register(&test_struct, 1, "Test-Struct-Version", AttrType::Uint16);
    dict.attr_register(&test_struct, 2, "Test-Struct-Address", AttrType::Ipv4Addr);
    let options =
        dict.attr_register(&test_struct, 3, "Test-Struct-Options", AttrType::Tlv);
    dict.attr_register(&options, 1, "Test-Option-Name", AttrType::String);

    // Combo attribute resolved by value length.
    dict.attr_register(&root, 231, "Test-Combo", AttrType::ComboIpAddr);

    // Cisco under Extended-Vendor-Specific-1.
    let ext1 = dict.child_by_num(&root, 241).unwrap();
    let evs1 = dict.child_by_num(&ext1, 26).unwrap();
    let cisco =
        dict.vendor_register(&evs1, VENDORPEC_CISCO, "Cisco", 1, 1, false);
    dict.attr_register(&cisco, 1, "Cisco-AVPair", AttrType::String);

    dict
});

//
// Helper functions.
//

pub fn decode_cxt() -> DecodeCxt {
    DecodeCxt::new(SECRET.to_vec(), VECTOR, false)
}

// Decodes one top-level attribute, asserting success.
pub fn decode_one(data: &[u8]) -> (PairList, usize) {
    let mut list = PairList::new();
    let consumed = decode_pair(&mut list, &DICT, data, &decode_cxt()).unwrap();
    (list, consumed)
}

// Decodes every attribute in the buffer.
pub fn decode_all(data: &[u8]) -> PairList {
    let mut list = PairList::new();
    let cxt = decode_cxt();
    let mut off = 0;
    while off < data.len() {
        let consumed =
            decode_pair(&mut list, &DICT, &data[off..], &cxt).unwrap();
        off += consumed;
    }
    assert_eq!(off, data.len());
    list
}
