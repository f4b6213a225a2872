//! RenoVision backend: a relay that restyles interior photos.
//!
//! Uploads are normalized to a 1024×1024 PNG control image and forwarded with
//! a generated prompt to the Stability AI structure-control API.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod normalize;
pub mod params;
pub mod ports;
pub mod prompt;
pub mod relay;
pub mod server;
