//! vodprep - Asset preparation and seek previews for HLS video-on-demand
//!
//! This library crate exposes the core functionality for integration testing.

pub mod batch;
pub mod config;
pub mod images;
pub mod preview;
