//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::TryGetError;
use serde::{Deserialize, Serialize};
use tracing::warn;

// Type aliases.
pub type DecodeResult<T> = Result<T, DecodeError>;

// RADIUS attribute decoding errors.
//
// Inside a value, any of these degrades the attribute to raw octets
// instead of aborting the packet; only the top-level header checks
// surface an error to the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DecodeError {
    ReadOutOfBounds,
    // Top-level attribute header
    InsufficientData,
    InvalidAttrLength(usize),
    // TLV record walks
    InvalidTlvSchema(usize, usize),
    TlvHeaderOverflow,
    ZeroAttrNumber,
    AttrNumberTooBig,
    TlvRecordTooLong,
    InvalidTlvRecordLength(u8),
    TlvRecordOverflow,
    // Vendor-Specific containers
    InvalidVendorId(u32),
    // Fixed-layout compound values
    InvalidStructField(u32),
    // Extended and WiMAX fragment chains
    InvalidFragment,
    // Prefix values
    NonzeroReservedByte,
    InvalidPrefixLength(u8),
    PrefixBitsMismatch,
    // Obfuscated attributes
    TunnelPasswordTooShort,
    SecretMismatch,
    TrailingGarbage,
}

// ===== impl DecodeError =====

impl DecodeError {
    pub(crate) fn log(&self) {
        match self {
            DecodeError::InvalidAttrLength(attr_len) => {
                warn!(%attr_len, "{}", self);
            }
            DecodeError::InvalidTlvSchema(type_width, length_width) => {
                warn!(%type_width, %length_width, "{}", self);
            }
            DecodeError::InvalidTlvRecordLength(rec_len) => {
                warn!(%rec_len, "{}", self);
            }
            DecodeError::InvalidVendorId(pen) => {
                warn!(%pen, "{}", self);
            }
            DecodeError::InvalidPrefixLength(prefix_len) => {
                warn!(%prefix_len, "{}", self);
            }
            _ => {
                warn!("{}", self);
            }
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::ReadOutOfBounds => {
                write!(f, "attempt to read out of bounds")
            }
            DecodeError::InsufficientData => {
                write!(f, "insufficient data for attribute header")
            }
            DecodeError::InvalidAttrLength(attr_len) => {
                write!(f, "invalid attribute length: {attr_len}")
            }
            DecodeError::InvalidTlvSchema(type_width, length_width) => {
                write!(f, "invalid TLV schema: {type_width}/{length_width}")
            }
            DecodeError::TlvHeaderOverflow => {
                write!(f, "TLV record header overflows container")
            }
            DecodeError::ZeroAttrNumber => {
                write!(f, "invalid attribute 0")
            }
            DecodeError::AttrNumberTooBig => {
                write!(f, "invalid attribute > 2^24")
            }
            DecodeError::TlvRecordTooLong => {
                write!(f, "TLV record is longer than 256 octets")
            }
            DecodeError::InvalidTlvRecordLength(rec_len) => {
                write!(f, "TLV record header has invalid length: {rec_len}")
            }
            DecodeError::TlvRecordOverflow => {
                write!(f, "TLV record overflows container")
            }
            DecodeError::InvalidVendorId(pen) => {
                write!(f, "invalid vendor identifier: {pen}")
            }
            DecodeError::InvalidStructField(field) => {
                write!(f, "struct field has no fixed size: {field}")
            }
            DecodeError::InvalidFragment => {
                write!(f, "malformed fragment chain")
            }
            DecodeError::NonzeroReservedByte => {
                write!(f, "prefix reserved byte is not zero")
            }
            DecodeError::InvalidPrefixLength(prefix_len) => {
                write!(f, "invalid prefix length: {prefix_len}")
            }
            DecodeError::PrefixBitsMismatch => {
                write!(f, "prefix has non-zero bits past the prefix length")
            }
            DecodeError::TunnelPasswordTooShort => {
                write!(f, "tunnel password is too short")
            }
            DecodeError::SecretMismatch => {
                write!(
                    f,
                    "tunnel password is too long for the attribute \
                     (shared secret is probably incorrect)"
                )
            }
            DecodeError::TrailingGarbage => {
                write!(
                    f,
                    "trailing garbage in tunnel password \
                     (shared secret is probably incorrect)"
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<TryGetError> for DecodeError {
    fn from(_error: TryGetError) -> DecodeError {
        DecodeError::ReadOutOfBounds
    }
}
