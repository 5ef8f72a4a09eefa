//! Transport-neutral connection halves.
//!
//! A [`Session`](crate::Session) talks to its peer through one
//! [`FrameSource`] (owned by the reader loop) and one [`FrameSink`] (owned by
//! the writer loop). Concrete transports live with the server; the
//! [`testing`](crate::testing) module provides an in-memory pair.

use async_trait::async_trait;

use crate::frame::OutputFrame;

/// One inbound frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame: either a JSON control envelope or raw keystrokes.
    Text(String),
    /// A binary frame: always raw keystrokes.
    Binary(Vec<u8>),
}

impl Inbound {
    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Inbound::Text(text) => text.len(),
            Inbound::Binary(bytes) => bytes.len(),
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fatal transport failures. Timeouts are not errors and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is gone without an orderly close.
    #[error("connection closed abnormally")]
    Closed,
    /// An I/O error from the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The peer violated the wire protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// The receiving half of a connection.
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// Wait for the next inbound frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection in an orderly
    /// way. Must be cancel-safe: the reader loop wraps it in a deadline.
    async fn recv(&mut self) -> Result<Option<Inbound>, TransportError>;
}

/// The sending half of a connection.
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Write one whole frame.
    async fn send(&mut self, frame: &OutputFrame) -> Result<(), TransportError>;

    /// Close the connection. Called once, during shutdown.
    async fn close(&mut self) -> Result<(), TransportError>;
}
