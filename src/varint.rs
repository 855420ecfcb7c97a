use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::VarIntError;

/// Longest encoding of a 32-bit value.
pub const MAX_VARINT_LEN: usize = 5;

const SEGMENT_BITS: u8 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Encode `value` as a protocol VarInt (7 bits per byte, low group first).
///
/// Negative values are encoded through their two's-complement bit pattern and
/// always take five bytes.
pub fn encode(value: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    write_varint(&mut buf, value);
    buf
}

/// Append the VarInt encoding of `value` to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !(SEGMENT_BITS as u32) == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value as u8 & SEGMENT_BITS) | CONTINUE_BIT);
        value >>= 7;
    }
}

/// Number of bytes `encode(value)` produces.
pub fn encoded_len(value: i32) -> usize {
    let value = value as u32;
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Read one VarInt from `reader`.
///
/// Never consumes more than five bytes: a fifth byte that still carries the
/// continuation bit is rejected as [`VarIntError::TooLarge`].
pub async fn read_varint<R>(reader: &mut R) -> Result<i32, VarIntError>
where
    R: AsyncRead + Unpin,
{
    let mut value: u32 = 0;
    for position in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8().await.map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => VarIntError::Truncated,
            _ => VarIntError::Io(e),
        })?;
        value |= ((byte & SEGMENT_BITS) as u32) << (7 * position);
        if byte & CONTINUE_BIT == 0 {
            return Ok(value as i32);
        }
    }
    Err(VarIntError::TooLarge)
}
