//! Wire codec
//!
//! Encoding and decoding of backend packets.
//!
//! ## Packet Format
//! ```text
//! ┌──────────┬──────────┬──────────┬────────────────────┬────────────┐
//! │ Code (1) │  Id (1)  │ Len (2)  │ Authenticator (16) │ Attributes │
//! └──────────┴──────────┴──────────┴────────────────────┴────────────┘
//! ```
//!
//! ### Attribute Format
//! ```text
//! ┌───────────┬───────────┬──────────────────┬──────────┬────────────┐
//! │ Flags (1) │ Depth (1) │ Path (4 × depth) │ VLen (2) │   Value    │
//! └───────────┴───────────┴──────────────────┴──────────┴────────────┘
//! ```
//! - Flags: bit 0 = index value, bit 1 = zero-instance leaf
//! - Path: absolute component numbers from the dictionary root, u32 BE each
//! - Value by declared kind: integer u32 BE, other scalars u64 BE,
//!   string/octets raw bytes
//!
//! ### Authentication
//! The authenticator is HMAC-SHA256 over the packet with a zeroed
//! authenticator field, truncated to 16 bytes. Replies additionally mix the
//! request's authenticator into the MAC so a reply cannot be replayed
//! against a different request.

use bytes::{Buf, BufMut, BytesMut};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::dict::{AttrKind, Dictionary};
use crate::error::{BridgeError, Result};
use crate::value::{Role, TypedValue, Value, ValueSet};

type HmacSha256 = Hmac<Sha256>;

/// Header size: code (1) + id (1) + length (2) + authenticator (16)
pub const HEADER_SIZE: usize = 20;

/// Authenticator length in bytes
pub const AUTH_LEN: usize = 16;

/// Maximum packet size
pub const MAX_PACKET_SIZE: usize = 4096;

const FLAG_INDEX: u8 = 0x01;
const FLAG_ZERO_INSTANCE: u8 = 0x02;

/// A decoded packet
#[derive(Debug, Clone)]
pub struct Packet {
    pub code: u8,
    pub id: u8,
    pub values: ValueSet,
}

// =============================================================================
// Packet Encoding
// =============================================================================

/// Encode and sign a request packet
pub fn encode_request(dict: &Dictionary, packet: &Packet, secret: &str) -> Result<Vec<u8>> {
    encode_signed(dict, packet, secret, &[])
}

/// Encode and sign a reply packet, binding it to the request authenticator
///
/// Used by tests standing in for the backend; the bridge itself only
/// decodes replies.
pub fn encode_reply(dict: &Dictionary, packet: &Packet, secret: &str, request_auth: &[u8]) -> Result<Vec<u8>> {
    encode_signed(dict, packet, secret, request_auth)
}

fn encode_signed(dict: &Dictionary, packet: &Packet, secret: &str, extra: &[u8]) -> Result<Vec<u8>> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + 64 * packet.values.len());

    buf.put_u8(packet.code);
    buf.put_u8(packet.id);
    buf.put_u16(0); // length, patched below
    buf.put_bytes(0, AUTH_LEN);

    for tv in &packet.values {
        encode_value(dict, tv, &mut buf)?;
    }

    if buf.len() > MAX_PACKET_SIZE {
        return Err(BridgeError::Wire(format!(
            "packet too large: {} bytes (max {})",
            buf.len(),
            MAX_PACKET_SIZE
        )));
    }

    let len = buf.len() as u16;
    buf[2..4].copy_from_slice(&len.to_be_bytes());

    let auth = compute_auth(&buf, secret, extra);
    buf[4..HEADER_SIZE].copy_from_slice(&auth);

    Ok(buf.to_vec())
}

fn encode_value(dict: &Dictionary, tv: &TypedValue, buf: &mut BytesMut) -> Result<()> {
    let mut flags = 0u8;
    match tv.role {
        Role::Index => flags |= FLAG_INDEX,
        Role::Leaf { zero_instance: true } => flags |= FLAG_ZERO_INSTANCE,
        Role::Leaf { zero_instance: false } => {}
    }
    buf.put_u8(flags);

    let path = dict.node_path(tv.node);
    if path.is_empty() || path.len() > u8::MAX as usize {
        return Err(BridgeError::Wire(format!(
            "attribute \"{}\" has unencodable depth {}",
            dict.label(tv.node),
            path.len()
        )));
    }
    buf.put_u8(path.len() as u8);
    for number in path {
        buf.put_u32(number);
    }

    let value = match &tv.value {
        Value::Integer(n) => n.to_be_bytes().to_vec(),
        Value::Scalar(n) => n.to_be_bytes().to_vec(),
        Value::String(bytes) | Value::Bytes(bytes) => bytes.clone(),
    };
    if value.is_empty() || value.len() > u16::MAX as usize {
        return Err(BridgeError::Wire(format!(
            "attribute \"{}\" has unencodable value length {}",
            dict.label(tv.node),
            value.len()
        )));
    }
    buf.put_u16(value.len() as u16);
    buf.put_slice(&value);

    Ok(())
}

// =============================================================================
// Packet Decoding
// =============================================================================

/// Decode and verify a reply packet
///
/// `request_auth` is the authenticator of the request this reply answers.
pub fn decode_reply(dict: &Dictionary, bytes: &[u8], secret: &str, request_auth: &[u8]) -> Result<Packet> {
    if bytes.len() < HEADER_SIZE {
        return Err(BridgeError::Wire(format!(
            "incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }
    if bytes.len() > MAX_PACKET_SIZE {
        return Err(BridgeError::Wire(format!(
            "packet too large: {} bytes (max {})",
            bytes.len(),
            MAX_PACKET_SIZE
        )));
    }

    let code = bytes[0];
    let id = bytes[1];
    let declared = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
    if declared != bytes.len() {
        return Err(BridgeError::Wire(format!(
            "length mismatch: header says {declared}, datagram has {}",
            bytes.len()
        )));
    }

    // Verify the authenticator before trusting any attribute bytes.
    let mut zeroed = bytes.to_vec();
    zeroed[4..HEADER_SIZE].fill(0);
    let expected = compute_auth(&zeroed, secret, request_auth);
    if expected[..] != bytes[4..HEADER_SIZE] {
        return Err(BridgeError::Wire("authenticator verification failed".to_string()));
    }

    let mut body = &bytes[HEADER_SIZE..];
    let mut values = ValueSet::new();
    while body.has_remaining() {
        values.push(decode_value(dict, &mut body)?);
    }

    Ok(Packet { code, id, values })
}

fn decode_value(dict: &Dictionary, buf: &mut &[u8]) -> Result<TypedValue> {
    if buf.remaining() < 2 {
        return Err(truncated("attribute header"));
    }
    let flags = buf.get_u8();
    let depth = buf.get_u8() as usize;

    if buf.remaining() < depth * 4 {
        return Err(truncated("attribute path"));
    }
    let mut path = Vec::with_capacity(depth);
    for _ in 0..depth {
        path.push(buf.get_u32());
    }

    let node = dict.node_at_path(&path).ok_or_else(|| {
        let dotted: Vec<String> = path.iter().map(|n| n.to_string()).collect();
        BridgeError::Wire(format!("unknown attribute at .{}", dotted.join(".")))
    })?;

    if buf.remaining() < 2 {
        return Err(truncated("value length"));
    }
    let vlen = buf.get_u16() as usize;
    if buf.remaining() < vlen {
        return Err(truncated("value"));
    }
    let mut raw = vec![0u8; vlen];
    buf.copy_to_slice(&mut raw);

    let value = match dict.kind(node) {
        AttrKind::Integer => {
            let arr: [u8; 4] = raw
                .as_slice()
                .try_into()
                .map_err(|_| BridgeError::Wire(format!("integer value has length {vlen}, expected 4")))?;
            Value::Integer(u32::from_be_bytes(arr))
        }
        AttrKind::OtherScalar => {
            let arr: [u8; 8] = raw
                .as_slice()
                .try_into()
                .map_err(|_| BridgeError::Wire(format!("scalar value has length {vlen}, expected 8")))?;
            Value::Scalar(u64::from_be_bytes(arr))
        }
        AttrKind::String => Value::String(raw),
        AttrKind::Bytes => Value::Bytes(raw),
        AttrKind::Group => {
            return Err(BridgeError::Wire(format!(
                "group attribute \"{}\" cannot carry a value",
                dict.label(node)
            )))
        }
    };

    let role = if flags & FLAG_INDEX != 0 {
        Role::Index
    } else {
        Role::Leaf {
            zero_instance: flags & FLAG_ZERO_INSTANCE != 0,
        }
    };

    Ok(TypedValue { node, role, value })
}

// =============================================================================
// Authentication
// =============================================================================

/// Authenticator over a packet with a zeroed authenticator field
fn compute_auth(packet: &[u8], secret: &str, extra: &[u8]) -> [u8; AUTH_LEN] {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(packet);
    mac.update(extra);
    let tag = mac.finalize().into_bytes();

    let mut auth = [0u8; AUTH_LEN];
    auth.copy_from_slice(&tag[..AUTH_LEN]);
    auth
}

/// Authenticator field of an encoded packet
pub fn packet_auth(packet: &[u8]) -> &[u8] {
    &packet[4..HEADER_SIZE]
}

fn truncated(what: &str) -> BridgeError {
    BridgeError::Wire(format!("truncated packet: {what}"))
}
