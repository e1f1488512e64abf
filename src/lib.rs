//! flvscope - audio/video timestamp sync analyzer for FLV streams
//!
//! This library crate exposes the session machinery for the binary and for
//! integration testing.

pub mod analysis;
pub mod config;
pub mod presentation;
pub mod session;
pub mod source;
