//! Web-socket transport.
//!
//! Text messages carry either JSON control envelopes or keystrokes, binary
//! messages always carry keystrokes. Every repaint goes out as one text
//! message.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::debug;
use termfolio_core::{FrameSink, FrameSource, Inbound, OutputFrame, TransportError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::{header, StatusCode};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::WebSocketStream;

/// Which upgrade requests are accepted.
#[derive(Debug, Clone)]
pub struct UpgradePolicy {
    /// Request path that serves sessions.
    pub path: String,
    /// Accepted `Origin` values; empty accepts any origin.
    pub allowed_origins: Vec<String>,
}

/// Why an upgrade request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    WrongPath(String),
    MissingOrigin,
    ForbiddenOrigin(String),
}

impl Rejection {
    fn status(&self) -> StatusCode {
        match self {
            Rejection::WrongPath(_) => StatusCode::NOT_FOUND,
            Rejection::MissingOrigin | Rejection::ForbiddenOrigin(_) => StatusCode::FORBIDDEN,
        }
    }

    fn into_response(self) -> ErrorResponse {
        let body = match &self {
            Rejection::WrongPath(path) => format!("no endpoint at {path}"),
            Rejection::MissingOrigin => "origin header required".to_string(),
            Rejection::ForbiddenOrigin(origin) => format!("origin {origin} not allowed"),
        };
        let mut response = ErrorResponse::new(Some(body));
        *response.status_mut() = self.status();
        response
    }
}

impl UpgradePolicy {
    /// Check an upgrade request against the path and origin rules.
    pub fn check(&self, request: &Request) -> Result<(), Rejection> {
        let path = request.uri().path();
        if path != self.path {
            return Err(Rejection::WrongPath(path.to_string()));
        }
        if self.allowed_origins.is_empty() {
            return Ok(());
        }
        let origin = request
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .ok_or(Rejection::MissingOrigin)?;
        if self.allowed_origins.iter().any(|allowed| allowed == origin) {
            Ok(())
        } else {
            Err(Rejection::ForbiddenOrigin(origin.to_string()))
        }
    }
}

/// Perform the server side of the web-socket handshake on `stream` and
/// split the connection into session halves.
pub async fn accept<S>(
    stream: S,
    policy: &UpgradePolicy,
) -> Result<(WsSource<S>, WsSink<S>), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let callback = |request: &Request, response: Response| {
        policy
            .check(request)
            .map(|()| response)
            .map_err(Rejection::into_response)
    };
    let socket = tokio_tungstenite::accept_hdr_async(stream, callback)
        .await
        .map_err(transport_error)?;
    let (sink, stream) = socket.split();
    Ok((WsSource { stream }, WsSink { sink }))
}

/// Receiving half of a web-socket connection.
pub struct WsSource<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

/// Sending half of a web-socket connection.
pub struct WsSink<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
}

#[async_trait]
impl<S> FrameSource for WsSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn recv(&mut self) -> Result<Option<Inbound>, TransportError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(None);
            };
            match message.map_err(transport_error)? {
                Message::Text(text) => return Ok(Some(Inbound::Text(text.as_str().to_owned()))),
                Message::Binary(data) => return Ok(Some(Inbound::Binary(data.to_vec()))),
                Message::Close(frame) => {
                    debug!("peer sent close: {frame:?}");
                    return Ok(None);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

#[async_trait]
impl<S> FrameSink for WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, frame: &OutputFrame) -> Result<(), TransportError> {
        self.sink
            .send(Message::text(frame.as_str().to_owned()))
            .await
            .map_err(transport_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.sink.close().await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(err) => Err(transport_error(err)),
        }
    }
}

fn transport_error(err: tungstenite::Error) -> TransportError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        }
        tungstenite::Error::Io(err) => TransportError::Io(err),
        other => TransportError::Protocol(other.to_string()),
    }
}
