//! Realtime messaging (RTM).
//!
//! `rtm.start` hands out a WebSocket URL; the socket then delivers JSON
//! frames and accepts small JSON messages tagged with a numeric id.

mod client;
#[cfg(feature = "rtm")]
mod connector;
mod socket;
mod types;

pub use client::*;
#[cfg(feature = "rtm")]
pub use connector::*;
pub use socket::*;
pub use types::*;
