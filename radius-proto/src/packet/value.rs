//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{Buf, Bytes};
use chrono::{DateTime, Utc};
use ipnetwork::{Ipv4Network, Ipv6Network};
use radius_utils::bytes::BytesExt;
use radius_utils::mac_addr::MacAddr;
use serde::{Deserialize, Serialize};

use crate::packet::consts::ABINARY_FILTER_LEN;
use crate::packet::dict::AttrType;
use crate::packet::error::{DecodeError, DecodeResult};

// Typed attribute value.
//
// One variant per leaf semantic type. Container types (TLV, VSA,
// struct, extended) never carry a value of their own; their children
// do.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum Value {
    String(String),
    Octets(Vec<u8>),
    Ipv4Addr(Ipv4Addr),
    Ipv6Addr(Ipv6Addr),
    Ipv4Prefix(Ipv4Network),
    Ipv6Prefix(Ipv6Network),
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Date(DateTime<Utc>),
    TimeDelta(i32),
    Ethernet(MacAddr),
    Ifid([u8; 8]),
    Size(u64),
    Abinary(Vec<u8>),
}

// ===== impl Value =====

impl Value {
    // Returns the semantic type this value was decoded as.
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::String(_) => AttrType::String,
            Value::Octets(_) => AttrType::Octets,
            Value::Ipv4Addr(_) => AttrType::Ipv4Addr,
            Value::Ipv6Addr(_) => AttrType::Ipv6Addr,
            Value::Ipv4Prefix(_) => AttrType::Ipv4Prefix,
            Value::Ipv6Prefix(_) => AttrType::Ipv6Prefix,
            Value::Bool(_) => AttrType::Bool,
            Value::Uint8(_) => AttrType::Uint8,
            Value::Uint16(_) => AttrType::Uint16,
            Value::Uint32(_) => AttrType::Uint32,
            Value::Uint64(_) => AttrType::Uint64,
            Value::Int8(_) => AttrType::Int8,
            Value::Int16(_) => AttrType::Int16,
            Value::Int32(_) => AttrType::Int32,
            Value::Int64(_) => AttrType::Int64,
            Value::Float32(_) => AttrType::Float32,
            Value::Float64(_) => AttrType::Float64,
            Value::Date(_) => AttrType::Date,
            Value::TimeDelta(_) => AttrType::TimeDelta,
            Value::Ethernet(_) => AttrType::Ethernet,
            Value::Ifid(_) => AttrType::Ifid,
            Value::Size(_) => AttrType::Size,
            Value::Abinary(_) => AttrType::Abinary,
        }
    }

    // Parses a leaf value from network byte order. The caller has
    // already validated the value length against the per-type bounds.
    pub(crate) fn from_network(
        attr_type: AttrType,
        data: &[u8],
    ) -> DecodeResult<Value> {
        let mut buf = Bytes::copy_from_slice(data);
        let value = match attr_type {
            AttrType::String => {
                Value::String(String::from_utf8_lossy(data).to_string())
            }
            AttrType::Octets => Value::Octets(data.to_vec()),
            AttrType::Ipv4Addr => Value::Ipv4Addr(buf.try_get_ipv4()?),
            AttrType::Ipv6Addr => Value::Ipv6Addr(buf.try_get_ipv6()?),
            AttrType::Ipv4Prefix => parse_ipv4_prefix(data)?,
            AttrType::Ipv6Prefix => parse_ipv6_prefix(data)?,
            AttrType::Bool => Value::Bool(buf.try_get_u8()? != 0),
            AttrType::Uint8 => Value::Uint8(buf.try_get_u8()?),
            AttrType::Uint16 => Value::Uint16(buf.try_get_u16()?),
            AttrType::Uint32 => Value::Uint32(buf.try_get_u32()?),
            AttrType::Uint64 => Value::Uint64(buf.try_get_u64()?),
            AttrType::Int8 => Value::Int8(buf.try_get_i8()?),
            AttrType::Int16 => Value::Int16(buf.try_get_i16()?),
            AttrType::Int32 => Value::Int32(buf.try_get_i32()?),
            AttrType::Int64 => Value::Int64(buf.try_get_i64()?),
            AttrType::Float32 => Value::Float32(buf.try_get_f32()?),
            AttrType::Float64 => Value::Float64(buf.try_get_f64()?),
            AttrType::Date => {
                let secs = buf.try_get_u32()?;
                Value::Date(DateTime::from_timestamp(secs.into(), 0).unwrap())
            }
            AttrType::TimeDelta => Value::TimeDelta(buf.try_get_i32()?),
            AttrType::Ethernet => Value::Ethernet(MacAddr::try_get(&mut buf)?),
            AttrType::Ifid => {
                let mut bytes = [0; 8];
                buf.try_copy_to_slice(&mut bytes)?;
                Value::Ifid(bytes)
            }
            AttrType::Size => {
                // Variable 2-8 octet width, big-endian.
                let mut bytes = [0; 8];
                bytes[8 - data.len()..].copy_from_slice(data);
                Value::Size(u64::from_be_bytes(bytes))
            }
            AttrType::Abinary => {
                let mut filter = data.to_vec();
                filter.truncate(ABINARY_FILTER_LEN);
                Value::Abinary(filter)
            }
            AttrType::ComboIpAddr
            | AttrType::ComboIpPrefix
            | AttrType::Tlv
            | AttrType::Struct
            | AttrType::Vsa
            | AttrType::Vendor
            | AttrType::Extended => {
                // Container types are resolved by the dispatcher.
                unreachable!()
            }
        };

        Ok(value)
    }
}

// ===== helper functions =====

//
// Magic RADIUS format IPv4 prefix:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |    Reserved   | Prefix-Length |  Prefix ...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//      ... Prefix                 |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// Address octets may be short and are zero-extended. Non-masked bits
// are not required to be zero.
//
fn parse_ipv4_prefix(data: &[u8]) -> DecodeResult<Value> {
    if data[0] != 0 {
        return Err(DecodeError::NonzeroReservedByte);
    }
    let plen = data[1] & 0x3f;
    if plen > 32 {
        return Err(DecodeError::InvalidPrefixLength(data[1]));
    }

    let mut octets = [0; 4];
    octets[..data.len() - 2].copy_from_slice(&data[2..]);
    let addr = Ipv4Addr::from(octets);
    let masked = Ipv4Network::new(addr, plen).unwrap().network();

    Ok(Value::Ipv4Prefix(Ipv4Network::new(masked, plen).unwrap()))
}

//
// Magic RADIUS format IPv6 prefix:
//
//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |   Reserved    | Prefix-Length |  Prefix ...
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//       ... Prefix (up to 16 octets) ...
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// Non-masked bits MUST be zero.
//
fn parse_ipv6_prefix(data: &[u8]) -> DecodeResult<Value> {
    if data[0] != 0 {
        return Err(DecodeError::NonzeroReservedByte);
    }
    let plen = data[1];
    if plen > 128 {
        return Err(DecodeError::InvalidPrefixLength(plen));
    }
    // The present address octets must cover the prefix.
    if (plen as usize).div_ceil(8) > data.len() - 2 {
        return Err(DecodeError::InvalidPrefixLength(plen));
    }

    let mut octets = [0; 16];
    octets[..data.len() - 2].copy_from_slice(&data[2..]);
    let addr = Ipv6Addr::from(octets);
    let masked = Ipv6Network::new(addr, plen).unwrap().network();

    // The prefix data must be the same before and after masking.
    if masked.octets()[..data.len() - 2] != data[2..] {
        return Err(DecodeError::PrefixBitsMismatch);
    }

    Ok(Value::Ipv6Prefix(Ipv6Network::new(masked, plen).unwrap()))
}
