//! Classification of inbound frames into control messages or raw input.
//!
//! Text frames may carry a JSON envelope `{"type": ..., "data": ...}`. Only a
//! successfully parsed envelope of a known kind with a valid payload becomes
//! a [`ControlMessage`]; every other frame, binary frames included, is raw
//! terminal input. Classification is total and never reports an error.

use serde::Deserialize;
use serde_json::Value;

use crate::event::Geometry;
use crate::transport::Inbound;

/// Out-of-band instructions from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// The client terminal changed size.
    Resize(Geometry),
}

/// A decoded structured envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// A known control message with a valid payload.
    Control(ControlMessage),
    /// Valid envelope JSON whose kind or payload is not understood.
    Other {
        /// The declared `type` field.
        kind: String,
    },
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Dispatch to resize handling.
    Control(ControlMessage),
    /// Dispatch to the input decoder.
    Raw(&'a [u8]),
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct ResizePayload {
    cols: u64,
    rows: u64,
}

/// Parse `text` as a structured envelope.
///
/// Returns `None` when the text is not envelope-shaped JSON at all.
pub fn parse_envelope(text: &str) -> Option<Envelope> {
    let raw: RawEnvelope = serde_json::from_str(text).ok()?;
    let envelope = match raw.kind.as_str() {
        "resize" => match resize_geometry(raw.data) {
            Some(geometry) => Envelope::Control(ControlMessage::Resize(geometry)),
            None => Envelope::Other { kind: raw.kind },
        },
        _ => Envelope::Other { kind: raw.kind },
    };
    Some(envelope)
}

fn resize_geometry(data: Value) -> Option<Geometry> {
    let payload: ResizePayload = serde_json::from_value(data).ok()?;
    Geometry::try_new(payload.cols, payload.rows)
}

/// Decide how an inbound frame is dispatched.
pub fn classify(frame: &Inbound) -> Classified<'_> {
    match frame {
        Inbound::Text(text) => match parse_envelope(text) {
            Some(Envelope::Control(msg)) => Classified::Control(msg),
            _ => Classified::Raw(text.as_bytes()),
        },
        Inbound::Binary(bytes) => Classified::Raw(bytes),
    }
}
