#![allow(dead_code)]

use std::net::SocketAddr;

use mc_scan_rs::packet::{self, HANDSHAKE_ID, PROTOCOL_VERSION, STATUS_REQUEST_ID};
use mc_scan_rs::varint::{self, read_varint};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

/// How the fake server answers a status request.
#[derive(Clone)]
pub enum Reply {
    /// A well-formed status response carrying this JSON text.
    Status(String),
    /// Raw bytes written after the client's packets were read.
    Raw(Vec<u8>),
    /// Read the request, then never answer.
    Silent,
}

/// What the fake server saw in the client's handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub protocol: i32,
    pub host: String,
    pub port: u16,
    pub next_state: i32,
}

/// Status response frame for `json`.
pub fn status_response(json: &str) -> Vec<u8> {
    let mut payload = varint::encode(json.len() as i32);
    payload.extend_from_slice(json.as_bytes());
    packet::frame(0x00, &payload)
}

/// Serve `reply` to every connection on an ephemeral localhost port.
///
/// Handshakes are forwarded on the returned channel.
pub async fn spawn_server(reply: Reply) -> (SocketAddr, tokio::sync::mpsc::UnboundedReceiver<Handshake>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let reply = reply.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = serve_one(stream, reply, tx).await;
            });
        }
    });
    (addr, rx)
}

async fn serve_one(
    mut stream: TcpStream,
    reply: Reply,
    seen: tokio::sync::mpsc::UnboundedSender<Handshake>,
) -> anyhow::Result<()> {
    let (id, payload) = packet::read_packet(&mut stream).await?;
    assert_eq!(id, HANDSHAKE_ID);
    let mut body = payload.as_slice();
    let protocol = read_varint(&mut body).await?;
    let host_len = read_varint(&mut body).await? as usize;
    let host = String::from_utf8(body[..host_len].to_vec())?;
    let port = u16::from_be_bytes([body[host_len], body[host_len + 1]]);
    let mut rest = &body[host_len + 2..];
    let next_state = read_varint(&mut rest).await?;
    let _ = seen.send(Handshake { protocol, host, port, next_state });
    assert_eq!(protocol, PROTOCOL_VERSION);

    let (id, payload) = packet::read_packet(&mut stream).await?;
    assert_eq!(id, STATUS_REQUEST_ID);
    assert!(payload.is_empty());

    match reply {
        Reply::Status(json) => stream.write_all(&status_response(&json)).await?,
        Reply::Raw(bytes) => stream.write_all(&bytes).await?,
        Reply::Silent => {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        }
    }
    stream.flush().await?;
    Ok(())
}
