//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use md5::{Digest, Md5};

use crate::packet::consts::{AUTH_PASS_LEN, AUTH_VECTOR_LEN, MAX_PASS_LEN};
use crate::packet::error::{DecodeError, DecodeResult};

//
// RADIUS attribute obfuscation.
//
// Values are XOR-masked with an MD5-derived keystream chained over the
// ciphertext blocks:
//
//   b(1) = MD5(secret + vector)        c(1) = p(1) XOR b(1)
//   b(i) = MD5(secret + c(i-1))        c(i) = p(i) XOR b(i)
//
// Tunnel-Password (RFC 2868) folds a two-octet salt and an embedded
// length octet into the first block. This is not confidentiality in
// any modern sense, but it is what the RFCs require.
//

// ===== global functions =====

// Unmasks a User-Password value in place (RFC 2865 section 5.2).
//
// Returns the C-string length of the plaintext. The buffer keeps the
// full unmasked contents so the caller can apply its own padding
// policy (binary values such as MS-CHAP-MPPE-Keys have a fixed width
// instead of NUL padding).
pub fn decode_password(
    passwd: &mut Vec<u8>,
    secret: &[u8],
    vector: &[u8; AUTH_VECTOR_LEN],
) -> usize {
    // The RFCs say the maximum is 128; longer input is truncated.
    passwd.truncate(MAX_PASS_LEN);
    if passwd.is_empty() {
        return 0;
    }

    let mut ctx_base = Md5::new();
    ctx_base.update(secret);

    let len = passwd.len();
    let mut prev = [0; AUTH_PASS_LEN];
    for start in (0..len).step_by(AUTH_PASS_LEN) {
        let mut ctx = ctx_base.clone();
        if start == 0 {
            ctx.update(vector);
        } else {
            ctx.update(prev);
        }
        let digest = ctx.finalize();

        // Save the ciphertext block before unmasking; it keys the next
        // block.
        let end = usize::min(start + AUTH_PASS_LEN, len);
        prev[..end - start].copy_from_slice(&passwd[start..end]);
        for i in start..end {
            passwd[i] ^= digest[i - start];
        }
    }

    passwd.iter().position(|&b| b == 0).unwrap_or(len)
}

// Masks a User-Password value in place, zero-padding it to a whole
// number of keystream blocks first.
pub fn encode_password(
    passwd: &mut Vec<u8>,
    secret: &[u8],
    vector: &[u8; AUTH_VECTOR_LEN],
) {
    passwd.truncate(MAX_PASS_LEN);
    let blocks = usize::max(passwd.len().div_ceil(AUTH_PASS_LEN), 1);
    passwd.resize(blocks * AUTH_PASS_LEN, 0);

    let mut ctx_base = Md5::new();
    ctx_base.update(secret);

    for start in (0..passwd.len()).step_by(AUTH_PASS_LEN) {
        let mut ctx = ctx_base.clone();
        if start == 0 {
            ctx.update(vector);
        } else {
            ctx.update(&passwd[start - AUTH_PASS_LEN..start]);
        }
        let digest = ctx.finalize();

        for i in 0..AUTH_PASS_LEN {
            passwd[start + i] ^= digest[i];
        }
    }
}

// Unmasks a Tunnel-Password value in place (RFC 2868 section 3.5).
//
// The wire form is a two-octet salt followed by the masked stream,
// whose first octet is the plaintext length. The first keystream block
// is MD5(secret + vector + salt).
//
// Returns the plaintext length on success.
pub fn decode_tunnel_password(
    passwd: &mut Vec<u8>,
    secret: &[u8],
    vector: &[u8; AUTH_VECTOR_LEN],
    tunnel_password_zeros: bool,
) -> DecodeResult<usize> {
    // We need at least a salt.
    if passwd.len() < 2 {
        return Err(DecodeError::TunnelPasswordTooShort);
    }

    // A salt with no password, or a salt and a bare length octet. It's
    // wrong, but at least we can figure out what it means: the
    // password is empty.
    if passwd.len() <= 3 {
        passwd.clear();
        return Ok(0);
    }

    let salt = [passwd[0], passwd[1]];
    let cipher = passwd.split_off(2);
    passwd.clear();

    let mut ctx_base = Md5::new();
    ctx_base.update(secret);

    let mut plain = Vec::with_capacity(cipher.len());
    let mut embedded_len = 0;
    let mut prev: &[u8] = &[];
    for (n, block) in cipher.chunks(AUTH_PASS_LEN).enumerate() {
        let mut ctx = ctx_base.clone();
        if n == 0 {
            ctx.update(vector);
            ctx.update(salt);
        } else {
            ctx.update(prev);
        }
        let digest = ctx.finalize();

        let base = if n == 0 {
            // A quick check: the first plaintext octet is the embedded
            // length. Ensure it's sane.
            embedded_len = (block[0] ^ digest[0]) as usize;
            if embedded_len > cipher.len() {
                return Err(DecodeError::SecretMismatch);
            }
            1
        } else {
            0
        };
        for i in base..block.len() {
            plain.push(block[i] ^ digest[i]);
        }
        prev = block;
    }

    // Check trailing bytes.
    if tunnel_password_zeros
        && plain.iter().skip(embedded_len).any(|&b| b != 0)
    {
        return Err(DecodeError::TrailingGarbage);
    }

    // Tolerate an embedded length one past the unmasked stream.
    plain.resize(embedded_len, 0);
    *passwd = plain;

    Ok(embedded_len)
}

// Masks a Tunnel-Password value in place under the given salt. The
// salt goes out on the wire ahead of the masked stream and should have
// its high bit set per RFC 2868.
pub fn encode_tunnel_password(
    passwd: &mut Vec<u8>,
    salt: [u8; 2],
    secret: &[u8],
    vector: &[u8; AUTH_VECTOR_LEN],
) {
    // Plaintext stream: length octet + password, zero-padded to whole
    // blocks.
    let mut stream = Vec::with_capacity(1 + passwd.len());
    stream.push(passwd.len() as u8);
    stream.append(passwd);
    let blocks = stream.len().div_ceil(AUTH_PASS_LEN);
    stream.resize(blocks * AUTH_PASS_LEN, 0);

    let mut ctx_base = Md5::new();
    ctx_base.update(secret);

    let mut out = Vec::with_capacity(2 + stream.len());
    out.extend_from_slice(&salt);
    for start in (0..stream.len()).step_by(AUTH_PASS_LEN) {
        let mut ctx = ctx_base.clone();
        if start == 0 {
            ctx.update(vector);
            ctx.update(salt);
        } else {
            ctx.update(&out[2 + start - AUTH_PASS_LEN..2 + start]);
        }
        let digest = ctx.finalize();

        for i in 0..AUTH_PASS_LEN {
            out.push(stream[start + i] ^ digest[i]);
        }
    }

    *passwd = out;
}

// Masks or unmasks an Ascend-Send/Receive-Secret value: a single-block
// XOR against MD5(vector + secret). The operation is its own inverse;
// the decode path additionally trims the result at the first NUL.
pub fn ascend_secret(
    vector: &[u8; AUTH_VECTOR_LEN],
    secret: &[u8],
    value: &[u8],
) -> Vec<u8> {
    let mut ctx = Md5::new();
    ctx.update(vector);
    ctx.update(secret);
    let digest = ctx.finalize();

    value
        .iter()
        .take(AUTH_VECTOR_LEN)
        .zip(digest.iter())
        .map(|(value, digest)| value ^ digest)
        .collect()
}
