//! **termfolio** -- a terminal portfolio served to remote clients.
//!
//! Each connection, whether a browser terminal over web sockets or a raw
//! terminal over TCP, gets its own [`Portfolio`](app::Portfolio) program
//! driven by a [`termfolio_core::Session`].
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`app`] | The menu-driven portfolio program |
//! | [`content`] | The commands and their text |
//! | [`theme`] | Semantic style tags and palettes |
//! | [`config`] | Layered configuration |
//! | [`transport`] | Web-socket and raw TCP connection halves |
//! | [`server`] | Listeners, accept loops and shutdown |

pub mod app;
pub mod config;
pub mod content;
pub mod server;
pub mod theme;
pub mod transport;

pub use app::{Flags, Portfolio};
pub use config::{ConfigError, Settings};
pub use server::{Server, ServerError};
pub use theme::{Palette, StyleTag, Theme};
