//! Length-prefixed packet framing and the two client packets a status probe sends.
//!
//! Every packet on the wire is `varint(len) ++ varint(id) ++ payload`, where
//! `len` covers the id and the payload.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProbeError;
use crate::varint::{self, read_varint, write_varint};

/// Protocol version announced in the handshake.
pub const PROTOCOL_VERSION: i32 = 765;
/// Handshake `next state` value selecting the status flow.
pub const NEXT_STATE_STATUS: i32 = 1;

pub const HANDSHAKE_ID: i32 = 0x00;
pub const STATUS_REQUEST_ID: i32 = 0x00;
pub const STATUS_RESPONSE_ID: i32 = 0x00;

/// Largest packet length the protocol allows (three-byte VarInt).
pub const MAX_PACKET_LEN: i32 = 2_097_151;

/// Header of a received packet. The caller reads `payload_len` more bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub id: i32,
    pub payload_len: usize,
}

/// Wrap `payload` with its packet id and total length.
pub fn frame(packet_id: i32, payload: &[u8]) -> Vec<u8> {
    let body_len = varint::encoded_len(packet_id) + payload.len();
    let mut out = Vec::with_capacity(varint::MAX_VARINT_LEN + body_len);
    write_varint(&mut out, body_len as i32);
    write_varint(&mut out, packet_id);
    out.extend_from_slice(payload);
    out
}

/// Build the handshake packet for `host:port`, requesting the status state.
pub fn handshake(host: &str, port: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(host.len() + 16);
    write_varint(&mut data, PROTOCOL_VERSION);
    write_varint(&mut data, host.len() as i32);
    data.extend_from_slice(host.as_bytes());
    data.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut data, NEXT_STATE_STATUS);
    frame(HANDSHAKE_ID, &data)
}

/// Build the (empty) status request packet.
pub fn status_request() -> Vec<u8> {
    frame(STATUS_REQUEST_ID, &[])
}

/// Read a packet's length and id, leaving the payload unread.
pub async fn read_header<R>(reader: &mut R) -> Result<PacketHeader, ProbeError>
where
    R: AsyncRead + Unpin,
{
    let length = read_varint(reader).await?;
    if length > MAX_PACKET_LEN {
        return Err(ProbeError::FrameTooLarge(length));
    }
    if length < 1 {
        return Err(ProbeError::FrameTooShort(length));
    }
    let id = read_varint(reader).await?;
    let id_len = varint::encoded_len(id);
    let payload_len = (length as usize)
        .checked_sub(id_len)
        .ok_or(ProbeError::FrameTooShort(length))?;
    Ok(PacketHeader { id, payload_len })
}

/// Read one whole packet, returning its id and payload.
pub async fn read_packet<R>(reader: &mut R) -> Result<(i32, Vec<u8>), ProbeError>
where
    R: AsyncRead + Unpin,
{
    let header = read_header(reader).await?;
    let mut payload = vec![0u8; header.payload_len];
    reader.read_exact(&mut payload).await?;
    Ok((header.id, payload))
}
