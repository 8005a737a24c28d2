//! # minilink-core
//!
//! Dispatch layer — the bridge state machine and **port definitions**
//! (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - [`Transport`] — byte stream to and from the board
//!   - [`HubLink`] — service calls and state subscriptions on the hub
//!   - capability handles ([`device`]) — entity publishes per device category
//! - Hold the [`DeviceRegistry`] mapping communication ids to handles
//! - Drive the [`Bridge`] state machine: accumulate, parse, dispatch,
//!   announce synchronization once, encode control requests onto the wire
//! - Provide the in-process control channel ([`BridgeHandle`])
//!
//! ## Dependency rule
//! Depends on `minilink-protocol` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod bridge;
pub mod control;
pub mod device;
pub mod ports;
pub mod registry;

pub use bridge::{Bridge, DecodeMode};
pub use control::{BridgeHandle, ControlRequest};
pub use ports::{HubLink, ServiceCall, StateCallback, Transport};
pub use registry::{ConnectedLight, DeviceRegistry};
