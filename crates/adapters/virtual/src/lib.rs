//! # minilink-adapter-virtual
//!
//! In-memory implementations of both ports:
//!
//! - [`VirtualBoard`] — a scriptable [`Transport`](minilink_core::Transport)
//!   that captures outbound frames and can echo power commands back as state
//!   reports, the way the real firmware confirms a relay write.
//! - [`RecordingHub`] — a [`HubLink`](minilink_core::HubLink) that records
//!   service calls and lets tests fire subscribed callbacks by hand.
//!
//! Used by the daemon's `virtual` transport mode and by integration tests.
//!
//! ## Dependency rule
//! Depends on `minilink-core` (ports) and `minilink-protocol` (frame
//! vocabulary for the echo) only.

mod board;
mod hub;

pub use board::VirtualBoard;
pub use hub::RecordingHub;
