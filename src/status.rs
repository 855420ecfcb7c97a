use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::error::ProbeError;
use crate::packet::{self, STATUS_RESPONSE_ID};
use crate::sanitize::sanitize;
use crate::varint::{self, read_varint};

/// The JSON object a server returns for a status request.
///
/// Kept as an ordered, untyped map so fields we know nothing about survive a
/// decode/encode cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusDocument(Map<String, Value>);

impl StatusDocument {
    /// Decode a JSON object. Anything other than an object is malformed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProbeError> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Compact single-line JSON, as stored in the results file.
    pub fn to_compact_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatusDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Something that can probe one `host:port` for a status document.
///
/// The scanner only talks to this trait, so tests can swap the network out.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str, port: u16) -> Result<StatusDocument, ProbeError>;
}

/// Speaks the status protocol over TCP.
#[derive(Debug, Clone, Copy)]
pub struct StatusClient {
    timeout: Duration,
}

impl StatusClient {
    /// `timeout` bounds the connect and, separately, the whole exchange after it.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Connect, handshake, request status and decode the reply.
    ///
    /// The exchange deadline starts once the connection is up, so time spent
    /// waiting before the connect never eats into it. The stream is dropped,
    /// and therefore closed, on every return path.
    pub async fn query(&self, host: &str, port: u16) -> Result<StatusDocument, ProbeError> {
        debug!("[{host}:{port}] initiating connection");
        let stream = match time::timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                debug!("[{host}:{port}] connection error: {e}");
                return Err(ProbeError::Connect(e));
            }
            Err(_) => {
                debug!("[{host}:{port}] connection timed out");
                return Err(ProbeError::ConnectTimeout(self.timeout));
            }
        };
        debug!("[{host}:{port}] connection successful");

        let deadline = Instant::now() + self.timeout;
        let doc = time::timeout_at(deadline, exchange(stream, host, port))
            .await
            .map_err(|_| ProbeError::DeadlineExceeded)??;
        debug!("[{host}:{port}] status decoded");
        Ok(doc)
    }
}

#[async_trait]
impl Prober for StatusClient {
    async fn probe(&self, host: &str, port: u16) -> Result<StatusDocument, ProbeError> {
        let mut doc = self.query(host, port).await?;
        sanitize(&mut doc);
        Ok(doc)
    }
}

async fn exchange(mut stream: TcpStream, host: &str, port: u16) -> Result<StatusDocument, ProbeError> {
    stream.write_all(&packet::handshake(host, port)).await?;
    stream.write_all(&packet::status_request()).await?;

    let mut reader = BufReader::new(stream);
    let header = packet::read_header(&mut reader).await?;
    if header.id != STATUS_RESPONSE_ID {
        return Err(ProbeError::UnexpectedPacketId(header.id));
    }

    let json_len = read_varint(&mut reader).await?;
    if json_len <= 0 {
        return Err(ProbeError::InvalidLength(json_len));
    }
    let remaining = header.payload_len.saturating_sub(varint::encoded_len(json_len));
    if json_len as usize > remaining {
        return Err(ProbeError::InvalidLength(json_len));
    }

    let mut payload = vec![0u8; json_len as usize];
    reader.read_exact(&mut payload).await.map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ProbeError::Truncated,
        _ => ProbeError::Io(e),
    })?;

    StatusDocument::from_slice(&payload).inspect_err(|e| {
        debug!("[{host}:{port}] JSON decode error: {e}");
    })
}
