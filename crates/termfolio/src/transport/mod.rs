//! Concrete connection transports.
//!
//! | Module | Wire format |
//! |--------|-------------|
//! | [`ws`] | Web-socket messages: JSON control envelopes or keystrokes |
//! | [`tcp`] | A raw byte stream from a terminal client |

pub mod tcp;
pub mod ws;
