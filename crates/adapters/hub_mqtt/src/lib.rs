//! # minilink-adapter-hub-mqtt
//!
//! MQTT hub-link adapter. Three jobs:
//!
//! - [`MqttHub`] implements the [`HubLink`] port: service calls become JSON
//!   publishes under `{base}/service/…`, state subscriptions watch the hub's
//!   own entity topics under `{hub_topic}/…`.
//! - [`MqttEntityHandle`] implements every capability handle by publishing
//!   retained state topics under `{base}/{slug}/…`.
//! - A command router watches `{base}/{slug}/set[/…]` topics and feeds parsed
//!   [`ControlRequest`]s into the bridge task.
//!
//! The connection is retried with a delay on loss; everything in flight
//! during an outage is dropped, consistent with the wire's own best-effort
//! semantics.
//!
//! ## Dependency rule
//! Depends on `minilink-core` (ports, control channel) and
//! `minilink-protocol` (wire vocabulary) only.

mod config;
mod entity;
mod error;
mod router;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use minilink_core::{BridgeHandle, HubLink, ServiceCall, StateCallback};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tracing::{debug, info, warn};

pub use config::MqttConfig;
pub use entity::MqttEntityHandle;
pub use error::MqttError;
pub use router::CommandRoute;

type Subscriptions = Arc<Mutex<HashMap<String, StateCallback>>>;
type Routes = Arc<Mutex<HashMap<String, CommandRoute>>>;

/// Hub link over an MQTT broker.
pub struct MqttHub {
    client: AsyncClient,
    base_topic: String,
    hub_topic: String,
    subscriptions: Subscriptions,
    routes: Routes,
}

impl MqttHub {
    /// Connect to the broker and spawn the event loop task.
    ///
    /// `bridge` receives every parsed command from the `set` topics.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Config`] for an invalid configuration. Connection
    /// failures are not errors here: the event loop task retries them.
    pub fn connect(config: &MqttConfig, bridge: BridgeHandle) -> Result<Self, MqttError> {
        config.validate()?;
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        let (client, event_loop) = AsyncClient::new(options, 64);

        let subscriptions: Subscriptions = Arc::default();
        let routes: Routes = Arc::default();
        tokio::spawn(run_event_loop(
            event_loop,
            Arc::clone(&subscriptions),
            Arc::clone(&routes),
            bridge,
        ));

        Ok(Self {
            client,
            base_topic: config.base_topic.clone(),
            hub_topic: config.hub_topic.clone(),
            subscriptions,
            routes,
        })
    }

    /// Handle publishing state for the device at `slug`.
    #[must_use]
    pub fn entity(&self, slug: &str) -> MqttEntityHandle {
        MqttEntityHandle::new(self.client.clone(), format!("{}/{slug}", self.base_topic))
    }

    /// Watch the `set` topics of `slug` and route commands per `route`.
    pub fn route(&self, slug: &str, route: CommandRoute) {
        let device_topic = format!("{}/{slug}", self.base_topic);
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device_topic.clone(), route);
        // The multi-level wildcard also matches the bare set topic.
        if let Err(error) = self
            .client
            .try_subscribe(format!("{device_topic}/set/#"), QoS::AtLeastOnce)
        {
            warn!(%error, slug, "failed to subscribe command topic");
        }
    }
}

impl HubLink for MqttHub {
    fn call_service(&self, call: ServiceCall) {
        let topic = format!("{}/service/{}", self.base_topic, call.service);
        let payload = match serde_json::to_string(&call.params) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, service = call.service, "failed to encode service call");
                return;
            }
        };
        debug!(topic, payload, "calling hub service");
        if let Err(error) = self
            .client
            .try_publish(topic.as_str(), QoS::AtLeastOnce, false, payload)
        {
            warn!(%error, topic, "failed to publish service call");
        }
    }

    fn subscribe_state(&self, entity_id: &str, attribute: Option<&str>, callback: StateCallback) {
        let topic = match attribute {
            Some(attribute) => format!("{}/{entity_id}/{attribute}", self.hub_topic),
            None => format!("{}/{entity_id}", self.hub_topic),
        };
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic.clone(), callback);
        if let Err(error) = self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
            warn!(%error, topic, "failed to subscribe hub state topic");
        }
    }
}

async fn run_event_loop(
    mut event_loop: EventLoop,
    subscriptions: Subscriptions,
    routes: Routes,
    bridge: BridgeHandle,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => info!("connected to MQTT broker"),
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                handle_publish(&publish.topic, payload, &subscriptions, &routes, &bridge);
            }
            Ok(_) => {}
            Err(error) => {
                warn!(%error, "MQTT connection lost, retrying");
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}

/// Route one incoming publish: hub state subscriptions first, then device
/// command topics. Unmatched topics and unparsable payloads are dropped.
fn handle_publish(
    topic: &str,
    payload: String,
    subscriptions: &Subscriptions,
    routes: &Routes,
    bridge: &BridgeHandle,
) {
    if let Some(callback) = subscriptions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(topic)
    {
        callback(payload);
        return;
    }

    let Some((device_topic, suffix)) = topic.split_once("/set") else {
        return;
    };
    let attribute = suffix.trim_start_matches('/');
    let route = routes
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(device_topic)
        .copied();
    let Some(route) = route else {
        return;
    };
    match router::parse_command(route, attribute, &payload) {
        Some(request) => bridge.send(request),
        None => debug!(topic, payload, "unparsable command payload"),
    }
}

#[cfg(test)]
mod tests {
    use minilink_core::ControlRequest;
    use minilink_protocol::CommunicationId;

    use super::*;

    fn subscriptions() -> Subscriptions {
        Arc::default()
    }

    fn routes_with(topic: &str, route: CommandRoute) -> Routes {
        let routes: Routes = Arc::default();
        routes.lock().unwrap().insert(topic.to_string(), route);
        routes
    }

    #[test]
    fn should_fire_state_callback_for_subscribed_topic() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let subscriptions = subscriptions();
        subscriptions.lock().unwrap().insert(
            "minilink/hub/light.desk".to_string(),
            Box::new(move |value| sink.lock().unwrap().push(value)),
        );
        let (bridge, mut requests) = BridgeHandle::channel();

        handle_publish(
            "minilink/hub/light.desk",
            "on".to_string(),
            &subscriptions,
            &Arc::default(),
            &bridge,
        );

        assert_eq!(*received.lock().unwrap(), vec!["on".to_string()]);
        assert!(requests.try_recv().is_err());
    }

    #[test]
    fn should_route_command_topic_to_bridge() {
        let routes = routes_with(
            "minilink/desk_switch",
            CommandRoute::Switch {
                id: CommunicationId::new(7),
            },
        );
        let (bridge, mut requests) = BridgeHandle::channel();

        handle_publish(
            "minilink/desk_switch/set",
            "ON".to_string(),
            &subscriptions(),
            &routes,
            &bridge,
        );

        assert_eq!(
            requests.try_recv(),
            Ok(ControlRequest::SetPower {
                id: CommunicationId::new(7),
                on: true,
            })
        );
    }

    #[test]
    fn should_route_attribute_command_topic() {
        let routes = routes_with(
            "minilink/tv",
            CommandRoute::Television {
                id: CommunicationId::new(6),
            },
        );
        let (bridge, mut requests) = BridgeHandle::channel();

        handle_publish(
            "minilink/tv/set/volume",
            "35".to_string(),
            &subscriptions(),
            &routes,
            &bridge,
        );

        assert_eq!(
            requests.try_recv(),
            Ok(ControlRequest::SetVolume {
                id: CommunicationId::new(6),
                volume: 35,
            })
        );
    }

    #[test]
    fn should_drop_publish_for_unknown_topic() {
        let (bridge, mut requests) = BridgeHandle::channel();

        handle_publish(
            "minilink/unknown/set",
            "ON".to_string(),
            &subscriptions(),
            &Arc::default(),
            &bridge,
        );
        handle_publish(
            "other/topic",
            "ON".to_string(),
            &subscriptions(),
            &Arc::default(),
            &bridge,
        );

        assert!(requests.try_recv().is_err());
    }

    #[test]
    fn should_drop_unparsable_command_payload() {
        let routes = routes_with(
            "minilink/desk_switch",
            CommandRoute::Switch {
                id: CommunicationId::new(7),
            },
        );
        let (bridge, mut requests) = BridgeHandle::channel();

        handle_publish(
            "minilink/desk_switch/set",
            "sideways".to_string(),
            &subscriptions(),
            &routes,
            &bridge,
        );

        assert!(requests.try_recv().is_err());
    }
}
