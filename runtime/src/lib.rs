//! dynjump runtime library: Chromium host adapter, preferences and CLI.
//!
//! This library crate exposes the runtime modules for integration testing.

pub mod cli;
pub mod page_feed;
pub mod preferences;
pub mod renderer;

pub use dynjump;
