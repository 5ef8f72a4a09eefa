//! Session bridge for serving an Elm-style terminal program to remote clients.
//!
//! `termfolio-core` takes one long-lived duplex connection and connects it to
//! a [`Model`]: inbound frames are classified into resize control messages
//! or raw keystrokes, keystrokes are decoded into [`InputEvent`]s, and the
//! model's view is rendered off-screen, serialized to ANSI text and written
//! back as whole-screen repaints through a bounded [`OutputQueue`].
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | The served program (init / update / view / resize) |
//! | [`Component`] | Reusable sub-model that renders into a [`ratatui::layout::Rect`] |
//! | [`Command`] | A follow-up effect returned from `update` |
//! | [`Session`] | Owns one program instance and runs the reader, render and writer loops |
//! | [`FrameSource`] / [`FrameSink`] | Transport halves a session talks through |
//! | [`TestProgram`](testing::TestProgram) | Headless harness for unit-testing a [`Model`] |
//!
//! # Data flow
//!
//! 1. **read** -- [`Session::run`] receives an [`Inbound`] frame with a rolling
//!    deadline and hands it to [`classify`].
//! 2. **dispatch** -- resize envelopes go to [`Session::handle_resize`];
//!    everything else is decoded with [`decode`] and goes to
//!    [`Session::handle_input_event`].
//! 3. **update** -- the program processes the message; follow-up commands are
//!    resolved with a bounded depth.
//! 4. **render** -- a forced render (and a slow heartbeat) draws the view and
//!    pushes an [`OutputFrame`] onto the queue.
//! 5. **write** -- the writer loop sends queued frames, in order, one at a time.
//!
//! # Quick example
//!
//! ```ignore
//! use termfolio_core::{Session, SessionOptions};
//!
//! let session = Session::<MyProgram>::new(flags, SessionOptions::default());
//! session.serve(source, sink).await?;
//! ```

pub mod command;
pub mod component;
pub mod control;
pub mod decoder;
pub mod event;
pub mod frame;
pub mod model;
pub mod queue;
pub mod session;
pub mod testing;
pub mod transport;

pub use command::Command;
pub use component::Component;
pub use control::{classify, parse_envelope, Classified, ControlMessage, Envelope};
pub use decoder::decode;
pub use event::{Geometry, InputEvent};
pub use frame::{buffer_to_ansi, render_model, OutputFrame, RenderError};
pub use model::Model;
pub use queue::{Enqueued, OutputQueue};
pub use session::{Session, SessionError, SessionOptions, MAX_EFFECT_DEPTH};
pub use transport::{FrameSink, FrameSource, Inbound, TransportError};
