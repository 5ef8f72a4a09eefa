//! Ready-made components for **termfolio** programs.
//!
//! Every widget in this crate implements [`termfolio_core::Component`], so it
//! can be embedded inside any [`termfolio_core::Model`] and drawn into an
//! arbitrary [`ratatui`] area.
//!
//! # Widgets
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`help`] | Short and full key-binding help |
//! | [`menu`] | Sectioned menu with a clamped cursor |
//! | [`viewport`] | Scrollable, width-wrapped content area |
//!
//! # Utilities
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`key`] | [`Binding`](key::Binding) and the [`KeyMap`](key::KeyMap) trait |
//! | [`selection`] | Clamped cursor state shared by list-like widgets |
//! | [`wrap`] | Display-width aware line wrapping |

pub mod help;
pub mod key;
pub mod menu;
pub mod selection;
pub mod viewport;
pub mod wrap;
