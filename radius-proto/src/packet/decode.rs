//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use bytes::{Buf, Bytes};
use num_traits::FromPrimitive;
use radius_utils::bytes::BytesExt;
use tracing::debug;

use crate::packet::consts::{
    AttributeType, MAX_PAIR_LEN, MAX_STRING_LEN, VENDORPEC_WIMAX,
};
use crate::packet::crypt;
use crate::packet::dict::{
    AttrFlags, AttrType, Dict, DictAttr, DictVendor, Encrypt,
};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::value::Value;
use crate::packet::{DecodeCxt, Pair, PairList};

//
// Vendor-Specific attribute (RFC 2865 section 5.26):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |    Length     |         Vendor-Id ...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//      ... Vendor-Id              |  Sub-attributes ...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// The sub-attribute header layout is vendor-declared: 1, 2 or 4
// octets of type and 0, 1 or 2 octets of length. Long-extended
// attributes (RFC 6929) and WiMAX vendor attributes additionally carry
// a continuation octet, letting one logical value span several
// consecutive top-level attributes.
//

// Nesting bound for containers within containers. Nothing in the RFCs
// limits TLVs under VSAs under extended attributes; past this depth
// the value degrades to raw octets.
const MAX_NEST: usize = 10;

// ===== global functions =====

// Checks that a byte range is a well-formed sequence of sub-attribute
// records under the given vendor schema.
pub fn tlv_ok(
    data: &[u8],
    type_width: usize,
    length_width: usize,
) -> DecodeResult<()> {
    if length_width > 2 || !matches!(type_width, 1 | 2 | 4) {
        return Err(DecodeError::InvalidTlvSchema(type_width, length_width));
    }

    let mut rest = data;
    while !rest.is_empty() {
        if rest.len() < type_width + length_width {
            return Err(DecodeError::TlvHeaderOverflow);
        }

        match type_width {
            4 => {
                if rest[..4] == [0; 4] {
                    return Err(DecodeError::ZeroAttrNumber);
                }
                // 24-bit identifiers only.
                if rest[0] != 0 {
                    return Err(DecodeError::AttrNumberTooBig);
                }
            }
            2 => {
                if rest[..2] == [0; 2] {
                    return Err(DecodeError::ZeroAttrNumber);
                }
            }
            _ => {
                // Zero is allowed, because the Colubris people are
                // dumb and use it.
            }
        }

        let rec_len = match length_width {
            // No length octets: a single record fills the container.
            0 => return Ok(()),
            2 => {
                if rest[type_width] != 0 {
                    return Err(DecodeError::TlvRecordTooLong);
                }
                rest[type_width + 1] as usize
            }
            _ => rest[type_width] as usize,
        };

        if rec_len < type_width + length_width {
            return Err(DecodeError::InvalidTlvRecordLength(rec_len as u8));
        }
        if rec_len > rest.len() {
            return Err(DecodeError::TlvRecordOverflow);
        }
        rest = &rest[rec_len..];
    }

    Ok(())
}

// Emits the value verbatim as octets under a fabricated descriptor.
// This is the terminal fallback for anything that cannot be decoded as
// declared; a bad attribute never aborts the rest of the packet.
fn raw_pair(
    list: &mut PairList,
    parent: &Arc<DictAttr>,
    data: &[u8],
) -> DecodeResult<usize> {
    debug!(attr = %parent.name, "reinterpreting attribute as raw octets");
    let unknown = DictAttr::to_raw(parent);
    list.append(Pair::new(unknown, None, Value::Octets(data.to_vec())));
    Ok(data.len())
}

// Gathers a run of consecutive attributes of the same type into one
// octets pair (RFC 2869 "concat" values such as EAP-Message).
//
// `data` starts at the first attribute header; the return value counts
// every header consumed.
fn decode_concat(
    list: &mut PairList,
    parent: &Arc<DictAttr>,
    data: &[u8],
) -> DecodeResult<usize> {
    let attr = data[0];
    let mut total = 0;
    let mut off = 0;

    // See how many consecutive attributes there are.
    while off < data.len() {
        if data.len() - off < 2 {
            return Err(DecodeError::InsufficientData);
        }
        let len = data[off + 1] as usize;
        if len <= 2 {
            return Err(DecodeError::InvalidAttrLength(len));
        }
        if off + len > data.len() {
            return Err(DecodeError::InvalidAttrLength(len));
        }

        total += len - 2;
        off += len;

        if off == data.len() || data[off] != attr {
            break;
        }
    }
    let end = off;

    // Nothing but headers: skip them.
    if total == 0 {
        return Ok(2);
    }

    let mut body = Vec::with_capacity(total);
    let mut off = 0;
    while off < end {
        let len = data[off + 1] as usize;
        body.extend_from_slice(&data[off + 2..off + len]);
        off += len;
    }

    list.append(Pair::new(parent.clone(), None, Value::Octets(body)));
    Ok(end)
}

// Walks a child TLV sequence (one octet of type, one of length),
// recursing into the value decoder for each record. The output is
// staged locally and merged only if every child decodes, so a bad
// record discards the whole container.
fn tlv(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    cxt: &DecodeCxt,
    depth: usize,
) -> DecodeResult<usize> {
    if data.len() < 3 {
        return Err(DecodeError::InvalidAttrLength(data.len()));
    }
    tlv_ok(data, 1, 1)?;

    let mut staged = PairList::new();
    let mut off = 0;
    while off < data.len() {
        let number = data[off] as u32;
        let rec_len = data[off + 1] as usize;

        let child = match dict.child_by_num(parent, number) {
            Some(child) => child,
            None => {
                debug!(parent = %parent.name, %number, "unknown TLV child");
                DictAttr::unknown_from_fields(parent, parent.vendor, number)
            }
        };
        debug!(parent = %parent.name, child = %child.name,
            "decode context changed");

        pair_value(
            &mut staged,
            dict,
            &child,
            &data[off + 2..off + rec_len],
            rec_len - 2,
            cxt,
            depth + 1,
        )?;
        off += rec_len;
    }

    list.merge(staged);
    Ok(data.len())
}

// Reassembles a fragmented long-extended attribute (RFC 6929).
//
// `data` starts at the extended-type octet of the first fragment and
// runs to the end of the packet; `attr_len` is the first attribute's
// declared value length. Fragments must be contiguous and share the
// container type and extended type; the chain ends at the first clear
// continuation bit or at the first shape violation.
//
// Returns the number of bytes consumed, which may exceed `attr_len`.
fn decode_extended(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    attr_len: usize,
    cxt: &DecodeCxt,
    depth: usize,
) -> DecodeResult<usize> {
    if attr_len < 3 {
        return Err(DecodeError::InvalidFragment);
    }

    // No continuation, just decode the attribute in place.
    if data[1] & 0x80 == 0 {
        pair_value(
            list,
            dict,
            parent,
            &data[2..attr_len],
            attr_len - 2,
            cxt,
            depth + 1,
        )?;
        return Ok(attr_len);
    }

    // Scan forward over the fragments. The container number lives two
    // octets before the window, so recover it from the lineage.
    let container = parent.parent().map_or(0, |da| da.number) as u8;
    let ext_type = data[0];
    let mut fraglen = attr_len - 2;
    let mut frag = attr_len;
    let mut end = data.len();
    let mut fragments = 1;
    let mut last_frag = false;

    while frag < end {
        if last_frag
            || end - frag < 4
            || data[frag] != container
            || data[frag + 1] < 4
            || data[frag + 2] != ext_type
            || frag + data[frag + 1] as usize > end
        {
            end = frag;
            break;
        }

        last_frag = (data[frag + 3] & 0x80) == 0;
        fraglen += data[frag + 1] as usize - 4;
        frag += data[frag + 1] as usize;
        fragments += 1;
    }

    debug!(%fragments, total_length = %fraglen,
        "reassembling long-extended attribute");

    // Copy the first fragment, then the rest, each stripped of its
    // four header octets.
    let mut body = Vec::with_capacity(fraglen);
    body.extend_from_slice(&data[2..attr_len]);
    let mut frag = attr_len;
    for _ in 1..fragments {
        let frag_len = data[frag + 1] as usize;
        body.extend_from_slice(&data[frag + 4..frag + frag_len]);
        frag += frag_len;
    }

    pair_value(list, dict, parent, &body, body.len(), cxt, depth + 1)?;
    Ok(end)
}

// Reassembles a WiMAX vendor attribute, whose fragments are packed
// into consecutive top-level Vendor-Specific attributes:
//
//   VSA-1: PEN(4) wimax-type wimax-len continuation data...
//   VSA-2: PEN(4) wimax-type wimax-len continuation data...
//
// `data` starts at the PEN of the first Vendor-Specific and runs to
// the end of the packet. A set continuation bit with no following
// fragment is an error.
fn decode_wimax(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    attr_len: usize,
    cxt: &DecodeCxt,
    depth: usize,
    vendor: u32,
) -> DecodeResult<usize> {
    if attr_len < 8 {
        return Err(DecodeError::InvalidFragment);
    }
    if data[5] < 3 {
        return Err(DecodeError::InvalidFragment);
    }
    // The WiMAX header and data must exactly fill the attribute.
    if data[5] as usize + 4 != attr_len {
        return Err(DecodeError::InvalidFragment);
    }

    let da = match dict.child_by_num(parent, data[4] as u32) {
        Some(da) => da,
        None => DictAttr::unknown_from_fields(parent, vendor, data[4] as u32),
    };
    debug!(parent = %parent.name, child = %da.name, "decode context changed");

    // No continuation, just decode the attribute in place.
    if data[6] & 0x80 == 0 {
        let data_len = data[5] as usize - 3;
        pair_value(
            list,
            dict,
            &da,
            &data[7..7 + data_len],
            data_len,
            cxt,
            depth + 1,
        )?;
        return Ok(attr_len);
    }

    // Walk the fragments. Each follow-up must be a Vendor-Specific
    // with the same PEN and WiMAX attribute, exactly filled by its
    // fragment.
    let mut wimax_len = 0;
    let mut attr = 4;
    let mut end = data.len();

    while attr < end {
        if end - attr < 3 {
            return Err(DecodeError::InvalidFragment);
        }
        if data[attr + 1] <= 3 {
            return Err(DecodeError::InvalidFragment);
        }
        if attr + data[attr + 1] as usize > end {
            return Err(DecodeError::InvalidFragment);
        }

        let more = data[attr + 2] & 0x80 != 0;
        if !more {
            end = attr + data[attr + 1] as usize;
        }
        // Continuation set at the end of the packet: malformed.
        if more && attr + data[attr + 1] as usize == end {
            return Err(DecodeError::InvalidFragment);
        }

        wimax_len += data[attr + 1] as usize - 3;
        attr += data[attr + 1] as usize;
        if !more {
            break;
        }

        // The next fragment's Vendor-Specific wrapper.
        if end - attr < 9 {
            return Err(DecodeError::InvalidFragment);
        }
        if data[attr] != AttributeType::VendorSpecific as u8 {
            return Err(DecodeError::InvalidFragment);
        }
        if data[attr + 1] < 9 {
            return Err(DecodeError::InvalidFragment);
        }
        if attr + data[attr + 1] as usize > end {
            return Err(DecodeError::InvalidFragment);
        }
        if data[attr + 2..attr + 6] != data[..4] {
            return Err(DecodeError::InvalidFragment);
        }
        if data[attr + 1] as usize != data[attr + 7] as usize + 6 {
            return Err(DecodeError::InvalidFragment);
        }
        if data[4] != data[attr + 6] {
            return Err(DecodeError::InvalidFragment);
        }

        // Skip over the Vendor-Specific header and continue with the
        // WiMAX attribute inside.
        attr += 6;
    }

    if wimax_len == 0 {
        return Err(DecodeError::InvalidFragment);
    }

    debug!(total_length = %wimax_len, "reassembling WiMAX attribute");

    // Copy the data over, this time trusting the attribute contents.
    let mut body = Vec::with_capacity(wimax_len);
    let mut attr = 0;
    while attr < end {
        let frag_len = data[attr + 5] as usize;
        body.extend_from_slice(&data[attr + 7..attr + 4 + frag_len]);
        // Skip the PEN, the WiMAX attribute and the next
        // Vendor-Specific header.
        attr += 4 + frag_len + 2;
    }

    pair_value(list, dict, &da, &body, body.len(), cxt, depth + 1)?;
    Ok(end)
}

// Decodes one sub-attribute record under a vendor's schema. `data`
// starts at the record; its shape was already validated by `tlv_ok`.
//
// Returns the record length, header included.
fn decode_vsa_internal(
    list: &mut PairList,
    dict: &Dict,
    vendor_da: &Arc<DictAttr>,
    data: &[u8],
    cxt: &DecodeCxt,
    dv: &DictVendor,
    depth: usize,
) -> DecodeResult<usize> {
    let hdr = dv.type_width + dv.length_width;

    let mut buf = Bytes::copy_from_slice(&data[..dv.type_width]);
    let attribute = match dv.type_width {
        4 => {
            // The leading octet is zero, checked by tlv_ok.
            buf.advance(1);
            buf.try_get_u24()?
        }
        2 => buf.try_get_u16()?.into(),
        1 => buf.try_get_u8()?.into(),
        _ => {
            return Err(DecodeError::InvalidTlvSchema(
                dv.type_width,
                dv.length_width,
            ));
        }
    };

    let rec_len = match dv.length_width {
        2 => {
            // The high octet is zero, checked by tlv_ok.
            data[dv.type_width + 1] as usize
        }
        1 => data[dv.type_width] as usize,
        0 => data.len(),
        _ => {
            return Err(DecodeError::InvalidTlvSchema(
                dv.type_width,
                dv.length_width,
            ));
        }
    };

    let da = match dict.child_by_num(vendor_da, attribute) {
        Some(da) => da,
        None => DictAttr::unknown_from_fields(vendor_da, dv.pen, attribute),
    };
    debug!(vendor = %vendor_da.name, child = %da.name,
        "decode context changed");

    pair_value(
        list,
        dict,
        &da,
        &data[hdr..rec_len],
        rec_len - hdr,
        cxt,
        depth + 1,
    )?;

    Ok(rec_len)
}

// Decodes a top-level Vendor-Specific value: the 4-octet PEN followed
// by one or more sub-attribute records under the vendor's declared
// schema. Unknown vendors are still decoded, under the RFC 1/1 schema.
//
// `data` starts at the PEN and runs to the end of the packet, since
// WiMAX values may continue across several Vendor-Specifics.
fn decode_vsa(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    attr_len: usize,
    cxt: &DecodeCxt,
    depth: usize,
) -> DecodeResult<usize> {
    if attr_len > data.len() {
        return Err(DecodeError::InvalidAttrLength(attr_len));
    }
    // PEN plus at least one octet of value.
    if attr_len < 5 {
        return Err(DecodeError::InvalidAttrLength(attr_len));
    }
    // 24-bit vendor identifiers only.
    if data[0] != 0 {
        return Err(DecodeError::InvalidVendorId(u32::from_be_bytes(
            data[..4].try_into().unwrap(),
        )));
    }

    let pen = u32::from_be_bytes(data[..4].try_into().unwrap());

    let (vendor_da, dv) = match dict.child_by_num(parent, pen) {
        None => {
            // The vendor is unknown, but vendor attributes almost
            // always follow the RFC format, so try to decode the data
            // anyway.
            tlv_ok(&data[4..attr_len], 1, 1)?;

            let vendor_da = DictAttr::unknown_vendor_from_num(parent, pen);
            let dv = DictVendor {
                pen,
                name: vendor_da.name.clone(),
                type_width: 1,
                length_width: 1,
                continuation: false,
            };
            (vendor_da, dv)
        }
        Some(vendor_da) => {
            let dv = dict
                .vendor_by_num(pen)
                .ok_or(DecodeError::InvalidVendorId(pen))?
                .clone();

            // WiMAX craziness.
            if pen == VENDORPEC_WIMAX && dv.continuation {
                return decode_wimax(
                    list, dict, &vendor_da, data, attr_len, cxt, depth, pen,
                );
            }

            tlv_ok(&data[4..attr_len], dv.type_width, dv.length_width)?;
            (vendor_da, dv)
        }
    };
    debug!(parent = %parent.name, vendor = %vendor_da.name,
        "decode context changed");

    // There may be more than one sub-attribute in the Vendor-Specific.
    let mut staged = PairList::new();
    let mut off = 4;
    while off < attr_len {
        let rec_len = decode_vsa_internal(
            &mut staged,
            dict,
            &vendor_da,
            &data[off..attr_len],
            cxt,
            &dv,
            depth,
        )?;
        off += rec_len;
    }

    list.merge(staged);
    Ok(attr_len)
}

// Decodes the leading fixed-width fields of a struct value in child
// order. Stops at a TLV-typed child, returning it along with the
// number of octets consumed so the caller can walk the tail.
fn struct_from_network(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
) -> DecodeResult<(usize, Option<Arc<DictAttr>>)> {
    let mut staged = PairList::new();
    let mut off = 0;
    let mut child_num = 1;

    loop {
        let Some(child) = dict.child_by_num(parent, child_num) else {
            break;
        };
        if child.attr_type == AttrType::Tlv {
            list.merge(staged);
            return Ok((off, Some(child)));
        }

        // Fields are fixed-size leaves, or strings/octets with a
        // pinned width.
        if matches!(
            child.attr_type,
            AttrType::ComboIpAddr
                | AttrType::ComboIpPrefix
                | AttrType::Struct
                | AttrType::Vsa
                | AttrType::Vendor
                | AttrType::Extended
        ) {
            return Err(DecodeError::InvalidStructField(child_num));
        }
        let (min, max) = child.attr_type.wire_sizes();
        let field_len = if min == max && min > 0 {
            min
        } else if child.fixed_len != 0 {
            child.fixed_len as usize
        } else {
            return Err(DecodeError::InvalidStructField(child_num));
        };
        if off + field_len > data.len() {
            return Err(DecodeError::ReadOutOfBounds);
        }

        let value =
            Value::from_network(child.attr_type, &data[off..off + field_len])?;
        staged.append(Pair::new(child, None, value));

        off += field_len;
        child_num += 1;
    }

    list.merge(staged);
    Ok((off, None))
}

// Creates any kind of pair from an attribute value.
//
// `attr_len` is the declared length of this attribute's value; `data`
// may extend to the end of the packet to accommodate continuation
// formats. Malformed content degrades to a raw octets pair; only
// argument-level problems surface as errors.
fn pair_value(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    attr_len: usize,
    cxt: &DecodeCxt,
    depth: usize,
) -> DecodeResult<usize> {
    if attr_len > data.len() || attr_len > MAX_PAIR_LEN {
        return Err(DecodeError::InvalidAttrLength(attr_len));
    }

    // Silently ignore zero-length values.
    if attr_len == 0 {
        return Ok(0);
    }

    // Unbounded container nesting collapses to raw octets.
    if depth > MAX_NEST {
        return raw_pair(list, parent, &data[..attr_len]);
    }

    let mut parent = parent.clone();
    let mut tag = None;
    let mut data_len = attr_len;
    let mut buf: Option<Vec<u8>> = None;

    // Tag handling. If the attribute can carry a grouping tag and
    // there is one (or it's masked as a Tunnel-Password, which is
    // always tag-parsed), strip the tag octet from the value.
    if parent.flags.contains(AttrFlags::HAS_TAG)
        && data_len > 1
        && (data[0] < 0x20 || parent.encrypt == Encrypt::TunnelPassword)
    {
        // Only "short" attributes can be tagged.
        if data_len >= 256 {
            return Err(DecodeError::InvalidAttrLength(data_len));
        }

        match parent.attr_type {
            AttrType::String => {
                tag = (data[0] != 0).then_some(data[0]);
                buf = Some(data[1..attr_len].to_vec());
                data_len -= 1;
            }
            AttrType::Uint32 => {
                // The tag rides in the high octet of the integer.
                let mut copy = data[..attr_len].to_vec();
                tag = (copy[0] != 0).then_some(copy[0]);
                copy[0] = 0;
                buf = Some(copy);
            }
            _ => {
                // Only strings and integers can have tags.
                return Err(DecodeError::InvalidAttrLength(data_len));
            }
        }
    }

    // Unmask the value. Only old-style attributes can be masked;
    // extended attributes cannot.
    if parent.encrypt != Encrypt::None {
        if attr_len > MAX_STRING_LEN {
            return Err(DecodeError::InvalidAttrLength(attr_len));
        }

        let mut copy = buf.take().unwrap_or_else(|| data[..attr_len].to_vec());
        match parent.encrypt {
            Encrypt::UserPassword => {
                crypt::decode_password(&mut copy, &cxt.secret, &cxt.vector);
                if parent.fixed_len != 0 {
                    // MS-CHAP-MPPE-Keys are 24 octets of binary,
                    // so we can't look for trailing zeros.
                    data_len = usize::min(data_len, parent.fixed_len as usize);
                    data_len = usize::min(data_len, copy.len());
                } else {
                    // Take off trailing zeros from the end, so that
                    // passwords may contain a zero octet in the
                    // middle. A password ending in zero octets gets
                    // mashed; there's really no way around that.
                    data_len = copy.len();
                    while data_len > 0 && copy[data_len - 1] == 0 {
                        data_len -= 1;
                    }
                }
            }
            Encrypt::TunnelPassword => {
                match crypt::decode_tunnel_password(
                    &mut copy,
                    &cxt.secret,
                    &cxt.vector,
                    cxt.tunnel_password_zeros,
                ) {
                    Ok(plain_len) => data_len = plain_len,
                    Err(error) => {
                        error.log();
                        return raw_pair(list, &parent, &data[..attr_len]);
                    }
                }
            }
            Encrypt::AscendSecret => {
                copy = crypt::ascend_secret(&cxt.vector, &cxt.secret, &copy);
                data_len =
                    copy.iter().position(|&b| b == 0).unwrap_or(copy.len());
            }
            Encrypt::None => unreachable!(),
        }
        buf = Some(copy);
    }

    // The working view of the (possibly unmasked, untagged) value.
    let mut p: &[u8] = match &buf {
        Some(copy) => &copy[..data_len],
        None => &data[..attr_len],
    };

    // Check the value length against the type's wire bounds.
    let (min, max) = parent.attr_type.wire_sizes();
    if data_len < min || data_len > max {
        debug!(attr = %parent.name, %data_len,
            "value length out of bounds");
        return raw_pair(list, &parent, &data[..attr_len]);
    }

    match parent.attr_type {
        // Combo attributes resolve to the concrete address family by
        // value length.
        AttrType::ComboIpAddr | AttrType::ComboIpPrefix => {
            let wanted = if data_len == min {
                if parent.attr_type == AttrType::ComboIpAddr {
                    AttrType::Ipv4Addr
                } else {
                    AttrType::Ipv4Prefix
                }
            } else if data_len == max {
                if parent.attr_type == AttrType::ComboIpAddr {
                    AttrType::Ipv6Addr
                } else {
                    AttrType::Ipv6Prefix
                }
            } else {
                return raw_pair(list, &parent, &data[..attr_len]);
            };
            match dict.child_by_type(&parent, wanted) {
                Some(child) => parent = child,
                None => return raw_pair(list, &parent, &data[..attr_len]),
            }
        }

        AttrType::Extended => {
            let extra = parent.flags.contains(AttrFlags::EXTRA);
            let min_hdr = 1 + usize::from(extra);
            if data_len <= min_hdr {
                return raw_pair(list, &parent, &data[..attr_len]);
            }

            // The extended type is almost always a known child; use
            // that as the fast path.
            if let Some(child) = dict.child_by_num(&parent, p[0] as u32) {
                if !extra || (p[1] & 0x80) == 0 {
                    // Short extended, or long-extended without the
                    // continuation bit: decode in place.
                    if pair_value(
                        list,
                        dict,
                        &child,
                        &p[min_hdr..],
                        attr_len - min_hdr,
                        cxt,
                        depth + 1,
                    )
                    .is_ok()
                    {
                        return Ok(attr_len);
                    }
                } else if let Ok(consumed) = decode_extended(
                    list, dict, &child, data, attr_len, cxt, depth,
                ) {
                    // May be longer than attr_len.
                    return Ok(consumed);
                }
            }

            // Unknown or undecodable extended type: fabricate an
            // unknown child and keep the contents as octets. The
            // fragment path still applies to long-extended values.
            debug!(parent = %parent.name, ext_type = p[0],
                "unknown extended attribute");
            let child =
                DictAttr::unknown_from_fields(&parent, 0, p[0] as u32);
            if extra {
                if let Ok(consumed) = decode_extended(
                    list, dict, &child, data, attr_len, cxt, depth,
                ) {
                    return Ok(consumed);
                }
            }
            pair_value(
                list,
                dict,
                &child,
                &p[min_hdr..],
                attr_len - min_hdr,
                cxt,
                depth + 1,
            )?;
            return Ok(attr_len);
        }

        AttrType::Vsa => {
            let nested = matches!(
                parent.parent().map(|da| da.attr_type),
                Some(AttrType::Extended)
            );
            if !nested {
                // May be WiMAX, in which case the value doesn't fit
                // into one attribute.
                return match decode_vsa(
                    list, dict, &parent, data, attr_len, cxt, depth,
                ) {
                    Ok(consumed) => Ok(consumed),
                    Err(error) => {
                        error.log();
                        raw_pair(list, &parent, &data[..attr_len])
                    }
                };
            }

            // Extended-Vendor-Specific: a 4-octet PEN and a single
            // octet of vendor type, no length octet.
            if data_len < 6 {
                return raw_pair(list, &parent, &data[..attr_len]);
            }
            let pen = u32::from_be_bytes(p[..4].try_into().unwrap());
            let child = dict
                .child_by_num(&parent, pen)
                .and_then(|vendor| dict.child_by_num(&vendor, p[4] as u32));
            match child {
                Some(child) => {
                    return match pair_value(
                        list,
                        dict,
                        &child,
                        &p[5..],
                        attr_len - 5,
                        cxt,
                        depth + 1,
                    ) {
                        Ok(_) => Ok(attr_len),
                        Err(error) => {
                            error.log();
                            raw_pair(list, &parent, &data[..attr_len])
                        }
                    };
                }
                None => {
                    // Unknown vendor or unknown vendor attribute:
                    // fabricate the lineage and fall through to keep
                    // the remainder as octets.
                    parent =
                        DictAttr::unknown_from_fields(&parent, pen, p[4].into());
                    p = &p[5..];
                    data_len -= 5;
                }
            }
        }

        AttrType::Tlv => {
            // The TLVs either fit into this attribute or have already
            // been reassembled into a contiguous buffer.
            return match tlv(list, dict, &parent, p, cxt, depth) {
                Ok(_) => Ok(attr_len),
                Err(error) => {
                    error.log();
                    raw_pair(list, &parent, &data[..attr_len])
                }
            };
        }

        AttrType::Struct => {
            match struct_from_network(list, dict, &parent, p) {
                Ok((used, tlv_child)) => {
                    // Fixed fields may be followed by a TLV tail. If
                    // the tail doesn't decode, keep the fields and
                    // attach the remainder as unknown octets.
                    if let Some(child) = tlv_child {
                        if used < data_len {
                            if let Err(error) = tlv(
                                list,
                                dict,
                                &child,
                                &p[used..],
                                cxt,
                                depth + 1,
                            ) {
                                error.log();
                                raw_pair(list, &child, &p[used..])?;
                            }
                        }
                    }
                    return Ok(attr_len);
                }
                Err(error) => {
                    error.log();
                    return raw_pair(list, &parent, &data[..attr_len]);
                }
            }
        }

        _ => (),
    }

    // Leaf value.
    match Value::from_network(parent.attr_type, p) {
        Ok(value) => {
            list.append(Pair::new(parent, tag, value));
            Ok(attr_len)
        }
        Err(error) => {
            // Loop prevention: a fabricated descriptor is already
            // octets, so a parse failure under one is a hard error.
            if parent.is_unknown() {
                return Err(error);
            }
            error.log();
            raw_pair(list, &parent, &data[..attr_len])
        }
    }
}

// Decodes one attribute value of a known parent. See `decode_pair`
// for the top-level entry point.
pub fn decode_pair_value(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    attr_len: usize,
    cxt: &DecodeCxt,
) -> DecodeResult<usize> {
    pair_value(list, dict, parent, data, attr_len, cxt, 0)
}

// Decodes a child TLV sequence into zero or more pairs.
pub fn decode_tlv(
    list: &mut PairList,
    dict: &Dict,
    parent: &Arc<DictAttr>,
    data: &[u8],
    cxt: &DecodeCxt,
) -> DecodeResult<usize> {
    tlv(list, dict, parent, data, cxt, 0)
}

// Decodes one top-level attribute from the packet body, appending the
// resulting pairs to `list`.
//
// `data` must start at the attribute header and should run to the end
// of the packet: extended and WiMAX attributes with the continuation
// bit set span more than one attribute. Returns the number of bytes
// consumed, at least 2.
pub fn decode_pair(
    list: &mut PairList,
    dict: &Dict,
    data: &[u8],
    cxt: &DecodeCxt,
) -> DecodeResult<usize> {
    if data.len() < 2 || data[1] < 2 || data[1] as usize > data.len() {
        return Err(DecodeError::InsufficientData);
    }

    let da = match dict.child_by_num(dict.root(), data[0] as u32) {
        Some(da) => da,
        None => {
            debug!(attr = data[0], "unknown attribute");
            DictAttr::unknown_from_fields(dict.root(), 0, data[0] as u32)
        }
    };
    debug!(attr = %da.name, "decoding attribute");

    // Empty attributes are silently ignored, except for CUI. The WiMAX
    // forum allows a zero-length Chargeable-User-Identity even though
    // the RADIUS specs forbid it.
    if data[1] == 2 {
        if AttributeType::from_u8(data[0])
            == Some(AttributeType::ChargeableUserIdentity)
        {
            list.append(Pair::new(da, None, Value::Octets(Vec::new())));
        }
        return Ok(2);
    }

    if da.flags.contains(AttrFlags::CONCAT) {
        return decode_concat(list, &da, data);
    }

    // Pass the whole remaining packet, not just this attribute's
    // declared length: continuation formats consume several headers.
    let consumed =
        pair_value(list, dict, &da, &data[2..], data[1] as usize - 2, cxt, 0)?;
    Ok(2 + consumed)
}
