//! Raw terminal transport over a plain TCP stream.
//!
//! Whatever one read returns is one keystroke frame; there is no envelope
//! layer, so geometry comes from configuration instead of the client.

use async_trait::async_trait;
use termfolio_core::{FrameSink, FrameSource, Inbound, OutputFrame, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

const READ_BUFFER: usize = 1024;

/// Split an accepted connection into session halves.
pub fn split(stream: TcpStream) -> (TcpSource, TcpSink) {
    let (reader, writer) = stream.into_split();
    (
        TcpSource {
            reader,
            buf: vec![0; READ_BUFFER],
        },
        TcpSink { writer },
    )
}

pub struct TcpSource {
    reader: OwnedReadHalf,
    buf: Vec<u8>,
}

pub struct TcpSink {
    writer: OwnedWriteHalf,
}

#[async_trait]
impl FrameSource for TcpSource {
    async fn recv(&mut self) -> Result<Option<Inbound>, TransportError> {
        let n = self.reader.read(&mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(Inbound::Binary(self.buf[..n].to_vec())))
    }
}

#[async_trait]
impl FrameSink for TcpSink {
    async fn send(&mut self, frame: &OutputFrame) -> Result<(), TransportError> {
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
