//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

// Length of the Request/Response Authenticator field.
pub const AUTH_VECTOR_LEN: usize = 16;
// Obfuscation keystream block size.
pub const AUTH_PASS_LEN: usize = AUTH_VECTOR_LEN;
// Maximum User-Password plaintext length (RFC 2865).
pub const MAX_PASS_LEN: usize = 128;
// Maximum length of a single attribute value.
pub const MAX_STRING_LEN: usize = 253;
// Upper bound on a reassembled value handed to the decoder.
pub const MAX_PAIR_LEN: usize = 128 * 1024;
// Ascend binary filter size.
pub const ABINARY_FILTER_LEN: usize = 32;

// Well-known top-level RADIUS attributes.
//
// IANA registry:
// https://www.iana.org/assignments/radius-types/radius-types.xhtml#radius-types-2
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AttributeType {
    UserName = 1,
    UserPassword = 2,
    ChapPassword = 3,
    NasIpAddress = 4,
    NasPort = 5,
    ServiceType = 6,
    FramedIpAddress = 8,
    VendorSpecific = 26,
    SessionTimeout = 27,
    NasIdentifier = 32,
    AcctSessionId = 44,
    EventTimestamp = 55,
    TunnelType = 64,
    TunnelMediumType = 65,
    TunnelClientEndpoint = 66,
    TunnelPassword = 69,
    EapMessage = 79,
    MessageAuthenticator = 80,
    ChargeableUserIdentity = 89,
    NasIpv6Address = 95,
    FramedIpv6Prefix = 97,
    FramedIpv6Address = 168,
    Extended1 = 241,
    Extended2 = 242,
    Extended3 = 243,
    Extended4 = 244,
    LongExtended1 = 245,
    LongExtended2 = 246,
}

// Private Enterprise Numbers of vendors with quirky attribute formats.
pub const VENDORPEC_CISCO: u32 = 9;
pub const VENDORPEC_MICROSOFT: u32 = 311;
pub const VENDORPEC_USR: u32 = 429;
pub const VENDORPEC_ASCEND: u32 = 529;
pub const VENDORPEC_LUCENT: u32 = 4846;
pub const VENDORPEC_STARENT: u32 = 8164;
pub const VENDORPEC_WIMAX: u32 = 24757;

// Extended-Type number carrying Extended-Vendor-Specific data
// (RFC 6929 section 2.4).
pub const EXT_VENDOR_SPECIFIC: u32 = 26;
