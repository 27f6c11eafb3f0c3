//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod consts;
pub mod crypt;
pub mod decode;
pub mod dict;
pub mod error;
pub mod value;

use std::sync::Arc;

use derive_new::new;

use crate::packet::consts::AUTH_VECTOR_LEN;
use crate::packet::dict::DictAttr;
use crate::packet::value::Value;

//
// RADIUS attribute.
//
// Encoding format:
//
//  0                   1                   2
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |    Length     |  Value ...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// "Length" covers the two header octets, so an empty attribute has
// length 2. Vendor-Specific, Extended and WiMAX attributes nest
// further headers inside the value field.
//
pub const ATTR_HDR_SIZE: usize = 2;

//
// Decode context.
//
// Carries the per-packet secrets needed to unwrap obfuscated
// attributes. Immutable for the duration of a single decode.
//
#[derive(Clone, Debug)]
#[derive(new)]
pub struct DecodeCxt {
    // Shared secret between client and server.
    pub secret: Vec<u8>,
    // Request Authenticator of the packet (or of the matching request).
    pub vector: [u8; AUTH_VECTOR_LEN],
    // Require zero padding past the embedded Tunnel-Password length.
    pub tunnel_password_zeros: bool,
}

//
// Attribute/value pair.
//
// The decoder's output unit: a dictionary descriptor bound to a typed
// value, plus the RFC 2868 grouping tag when one was present on the
// wire. Everything decoded from the network is marked tainted.
//
#[derive(Clone, Debug)]
#[derive(new)]
pub struct Pair {
    pub da: Arc<DictAttr>,
    pub tag: Option<u8>,
    pub value: Value,
    #[new(value = "true")]
    pub tainted: bool,
}

// Ordered, append-only list of attribute/value pairs.
//
// Sub-decoders stage their output in a local list and merge it into
// the caller's list only on full success, so a malformed child never
// leaves half of a container behind.
#[derive(Clone, Debug, Default)]
pub struct PairList(Vec<Pair>);

// ===== impl Pair =====

impl Pair {
    // Returns the pair's attribute name, qualified by its lineage.
    pub fn name(&self) -> &str {
        &self.da.name
    }
}

// ===== impl PairList =====

impl PairList {
    pub fn new() -> PairList {
        PairList::default()
    }

    // Appends one pair at the tail.
    pub fn append(&mut self, pair: Pair) {
        self.0.push(pair);
    }

    // Splices the contents of `other` onto the tail, preserving order.
    pub fn merge(&mut self, other: PairList) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for PairList {
    type Item = Pair;
    type IntoIter = std::vec::IntoIter<Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::ops::Index<usize> for PairList {
    type Output = Pair;

    fn index(&self, index: usize) -> &Pair {
        &self.0[index]
    }
}
