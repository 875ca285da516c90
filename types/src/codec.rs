//! Byte conversions shared by the commitment layout and the call envelope.
//!
//! Hex is decoded case-insensitively and always rendered lower-case. Round
//! identifiers travel as 8-byte big-endian integers, matching the verifier's
//! `u64::to_be_bytes`.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut};
use commonware_codec::{Error as CodecError, ReadExt, Write};

/// Decode a hex string into bytes.
///
/// Fails with [Error::MalformedInput] on odd length or any non-hex character.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    hex::decode(hex).map_err(|err| match err {
        hex::FromHexError::OddLength => {
            Error::MalformedInput(format!("odd hex length {}", hex.len()))
        }
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            Error::MalformedInput(format!("invalid hex character {c:?} at {index}"))
        }
        other => Error::MalformedInput(other.to_string()),
    })
}

/// Render bytes as two lower-case hex digits per byte.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Encode an integer as an 8-byte big-endian `u64`.
///
/// Accepts any integer the caller parsed; negatives and values above
/// `u64::MAX` are a [Error::Range].
pub fn encode_big_endian_u64(n: i128) -> Result<[u8; 8]> {
    let value = u64::try_from(n).map_err(|_| Error::Range {
        field: "u64",
        value: n.to_string(),
    })?;
    Ok(value.to_be_bytes())
}

/// Decode exactly `N` bytes of hex into a fixed array.
pub fn hex_to_array<const N: usize>(field: &'static str, hex: &str) -> Result<[u8; N]> {
    let bytes = hex_to_bytes(hex)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| Error::MalformedInput(format!("{field} must be {N} bytes, got {len}")))
}

/// Write a string as length-prefixed UTF-8 bytes.
pub fn write_string(s: &str, writer: &mut impl BufMut) {
    write_bytes(s.as_bytes(), writer);
}

/// Read a string from length-prefixed UTF-8 bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> std::result::Result<String, CodecError> {
    let bytes = read_bytes(reader, max_len)?;
    String::from_utf8(bytes).map_err(|_| CodecError::Invalid("String", "invalid UTF-8"))
}

/// Write a byte slice with a `u32` length prefix.
pub fn write_bytes(bytes: &[u8], writer: &mut impl BufMut) {
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Read a `u32` length-prefixed byte vector of at most `max_len` bytes.
pub fn read_bytes(reader: &mut impl Buf, max_len: usize) -> std::result::Result<Vec<u8>, CodecError> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(CodecError::Invalid("Bytes", "too long"));
    }
    if reader.remaining() < len {
        return Err(CodecError::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    Ok(bytes)
}

/// Encoded size of a length-prefixed byte slice.
pub fn bytes_encode_size(bytes: &[u8]) -> usize {
    4 + bytes.len()
}
