//! Port traits implemented by adapter crates.

use std::collections::BTreeMap;

/// Byte transport to the board.
///
/// The wire is treated as reliable and opaque: there is no acknowledgement,
/// retry, or checksum at this layer. Writes are fire-and-forget; adapters
/// absorb and log IO failures instead of surfacing them here.
pub trait Transport: Send {
    /// Next received byte, or `None` once the receive buffer is drained.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8);

    /// Queue a whole frame for transmission.
    ///
    /// Adapters that can hand the frame to their writer in one piece should
    /// override this.
    fn write_frame(&mut self, frame: &[u8]) {
        for byte in frame {
            self.write_byte(*byte);
        }
    }
}

/// Callback invoked with the new value of a subscribed hub entity state.
pub type StateCallback = Box<dyn Fn(String) + Send + Sync>;

/// A named hub service invocation with string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
    pub service: String,
    pub params: BTreeMap<String, String>,
}

impl ServiceCall {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            params: BTreeMap::new(),
        }
    }

    /// Attach one parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Link to the home automation hub.
///
/// Calls are fire-and-forget: the hub side absorbs and logs failures, the
/// dispatcher never retries.
pub trait HubLink: Send {
    /// Invoke a hub service.
    fn call_service(&self, call: ServiceCall);

    /// Subscribe to state changes of a hub entity.
    ///
    /// An `attribute` of `None` follows the entity's main state.
    fn subscribe_state(&self, entity_id: &str, attribute: Option<&str>, callback: StateCallback);
}
