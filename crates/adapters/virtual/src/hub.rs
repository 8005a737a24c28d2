//! Recording stand-in for the hub link.

use std::sync::{Arc, Mutex, PoisonError};

use minilink_core::{HubLink, ServiceCall, StateCallback};

struct Subscription {
    entity_id: String,
    attribute: Option<String>,
    callback: StateCallback,
}

#[derive(Default)]
struct Inner {
    calls: Mutex<Vec<ServiceCall>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Hub link that records service calls and subscriptions.
///
/// Clones share the same recordings, so a test can keep one handle while the
/// bridge owns another. [`RecordingHub::fire`] drives subscribed callbacks by
/// hand, standing in for a hub-side state change.
#[derive(Default, Clone)]
pub struct RecordingHub {
    inner: Arc<Inner>,
}

impl RecordingHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every service call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every callback subscribed to `(entity_id, attribute)` with
    /// `value`; returns how many fired.
    pub fn fire(&self, entity_id: &str, attribute: Option<&str>, value: &str) -> usize {
        let subscriptions = self
            .inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut fired = 0;
        for subscription in subscriptions.iter() {
            if subscription.entity_id == entity_id
                && subscription.attribute.as_deref() == attribute
            {
                (subscription.callback)(value.to_string());
                fired += 1;
            }
        }
        fired
    }
}

impl HubLink for RecordingHub {
    fn call_service(&self, call: ServiceCall) {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn subscribe_state(&self, entity_id: &str, attribute: Option<&str>, callback: StateCallback) {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                entity_id: entity_id.to_string(),
                attribute: attribute.map(ToString::to_string),
                callback,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_record_service_calls_in_order() {
        let hub = RecordingHub::new();
        hub.call_service(ServiceCall::new("tts.speak").with("message", "hello"));
        hub.call_service(ServiceCall::new("media.play_url").with("url", "http://x"));

        let calls = hub.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].service, "tts.speak");
        assert_eq!(calls[1].service, "media.play_url");
    }

    #[test]
    fn should_share_recordings_between_clones() {
        let hub = RecordingHub::new();
        let observer = hub.clone();
        hub.call_service(ServiceCall::new("light.turn_on"));

        assert_eq!(observer.calls().len(), 1);
    }

    #[test]
    fn should_fire_matching_subscriptions_only() {
        let hub = RecordingHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        hub.subscribe_state(
            "light.desk",
            None,
            Box::new(move |value| sink.lock().unwrap().push(value)),
        );
        let sink = Arc::clone(&seen);
        hub.subscribe_state(
            "light.desk",
            Some("brightness"),
            Box::new(move |value| sink.lock().unwrap().push(value)),
        );

        assert_eq!(hub.fire("light.desk", None, "on"), 1);
        assert_eq!(hub.fire("light.desk", Some("brightness"), "128"), 1);
        assert_eq!(hub.fire("light.other", None, "on"), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["on".to_string(), "128".to_string()]);
        assert_eq!(hub.subscription_count(), 2);
    }
}
