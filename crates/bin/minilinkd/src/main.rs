//! # minilinkd — minilink daemon
//!
//! Composition root that wires the adapters to the bridge and runs the loop.
//!
//! ## Responsibilities
//! - Load configuration (TOML file, env var overrides)
//! - Connect the MQTT hub link and create one entity handle per device
//! - Populate the device registry and the command routes
//! - Subscribe connected lights to hub state, per attribute surface
//! - Open the transport and drive the bridge:
//!   poll on inbound bytes, apply control requests, exit on ctrl-c
//!
//! ## Dependency rule
//! This is the **only** crate that depends on concrete adapters.
//! It is the wiring layer — no protocol logic belongs here.

mod config;

use std::sync::Arc;

use minilink_adapter_hub_mqtt::{CommandRoute, MqttHub};
use minilink_adapter_transport_serial::SerialTransport;
use minilink_adapter_virtual::VirtualBoard;
use minilink_core::device::{ConnectedLightKind, LauncherPart};
use minilink_core::{
    Bridge, BridgeHandle, ControlRequest, DecodeMode, DeviceRegistry, HubLink,
};
use minilink_protocol::{CommunicationId, Rgb};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LightKind, TransportMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let (handle, requests) = BridgeHandle::channel();
    let hub = MqttHub::connect(&config.mqtt, handle.clone())?;
    let registry = build_registry(&hub, &config);
    subscribe_connected_lights(&hub, &config, &handle);

    let mode = if config.protocol.strict {
        DecodeMode::Strict
    } else {
        DecodeMode::Lenient
    };
    let bridge = Bridge::new(hub, registry).with_decode_mode(mode);

    match config.transport.mode {
        TransportMode::Serial => run_serial(bridge, requests, &config).await?,
        TransportMode::Virtual => run_virtual(bridge, requests).await,
    }
    info!("minilinkd stopped");
    Ok(())
}

/// Register every configured device with the registry and wire its MQTT
/// entity handle and command route.
fn build_registry(hub: &MqttHub, config: &Config) -> DeviceRegistry {
    let mut registry = DeviceRegistry::new();

    for entry in &config.devices.switches {
        let id = CommunicationId::new(entry.communication_id);
        registry.register_switch(id, Arc::new(hub.entity(&entry.name)));
        hub.route(&entry.name, CommandRoute::Switch { id });
    }
    for entry in &config.devices.binary_sensors {
        let id = CommunicationId::new(entry.communication_id);
        registry.register_binary_sensor(id, Arc::new(hub.entity(&entry.name)));
    }
    for entry in &config.devices.analog_sensors {
        let id = CommunicationId::new(entry.communication_id);
        registry.register_analog_sensor(id, Arc::new(hub.entity(&entry.name)));
    }
    for entry in &config.devices.alarms {
        let id = CommunicationId::new(entry.communication_id);
        registry.register_alarm(id, Arc::new(hub.entity(&entry.name)));
        hub.route(&entry.name, CommandRoute::Alarm { id });
        if entry.launcher {
            let parts = [
                (LauncherPart::Base, "base"),
                (LauncherPart::Elevation, "elevation"),
                (LauncherPart::MissilesRemaining, "missiles"),
                (LauncherPart::Trigger, "trigger"),
            ];
            for (part, suffix) in parts {
                let slug = format!("{}_{suffix}", entry.name);
                registry.register_launcher_part(id, part, Arc::new(hub.entity(&slug)));
            }
            hub.route(&format!("{}_launcher", entry.name), CommandRoute::Launcher { id });
        }
    }
    for entry in &config.devices.televisions {
        let id = CommunicationId::new(entry.communication_id);
        registry.register_television(id, Arc::new(hub.entity(&entry.name)));
        hub.route(&entry.name, CommandRoute::Television { id });
    }
    for entry in &config.devices.rgb_strips {
        let id = CommunicationId::new(entry.communication_id);
        registry.register_rgb_strip(id, Arc::new(hub.entity(&entry.name)));
        hub.route(&entry.name, CommandRoute::RgbStrip { id });
    }
    for entry in &config.devices.connected_lights {
        let kind = match entry.kind {
            LightKind::Binary => ConnectedLightKind::Binary,
            LightKind::Temperature => ConnectedLightKind::TemperatureVariable,
            LightKind::Color => ConnectedLightKind::ColorVariable,
        };
        let id = CommunicationId::new(entry.communication_id);
        registry.register_connected_light(id, entry.entity_id.clone(), kind);
    }
    registry
}

/// Subscribe each connected light to the hub attributes its kind carries;
/// every state change becomes a control request forwarding it to the board.
fn subscribe_connected_lights(hub: &impl HubLink, config: &Config, handle: &BridgeHandle) {
    for light in &config.devices.connected_lights {
        let entity_id = light.entity_id.clone();

        let bridge = handle.clone();
        let target = entity_id.clone();
        hub.subscribe_state(
            &entity_id,
            None,
            Box::new(move |value| {
                let on = matches!(value.trim().to_ascii_lowercase().as_str(), "on" | "1" | "true");
                bridge.send(ControlRequest::LightPower {
                    entity_id: target.clone(),
                    on,
                });
            }),
        );

        if matches!(light.kind, LightKind::Temperature | LightKind::Color) {
            let bridge = handle.clone();
            let target = entity_id.clone();
            hub.subscribe_state(
                &entity_id,
                Some("brightness"),
                Box::new(move |value| {
                    if let Ok(brightness) = value.trim().parse() {
                        bridge.send(ControlRequest::LightBrightness {
                            entity_id: target.clone(),
                            brightness,
                        });
                    }
                }),
            );

            let bridge = handle.clone();
            let target = entity_id.clone();
            hub.subscribe_state(
                &entity_id,
                Some("color_temp"),
                Box::new(move |value| {
                    if let Ok(kelvin) = value.trim().parse() {
                        bridge.send(ControlRequest::LightTemperature {
                            entity_id: target.clone(),
                            kelvin,
                        });
                    }
                }),
            );
        }

        if light.kind == LightKind::Color {
            let bridge = handle.clone();
            let target = entity_id.clone();
            hub.subscribe_state(
                &entity_id,
                Some("rgb_color"),
                Box::new(move |value| {
                    if let Some(color) = parse_color(&value) {
                        bridge.send(ControlRequest::LightColor {
                            entity_id: target.clone(),
                            color,
                        });
                    }
                }),
            );
        }
    }
}

fn parse_color(value: &str) -> Option<Rgb> {
    let mut channels = value.trim().splitn(3, ',');
    let red = channels.next()?.trim().parse().ok()?;
    let green = channels.next()?.trim().parse().ok()?;
    let blue = channels.next()?.trim().parse().ok()?;
    Some(Rgb::new(red, green, blue))
}

async fn run_serial(
    mut bridge: Bridge<MqttHub>,
    mut requests: UnboundedReceiver<ControlRequest>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut transport = SerialTransport::open(&config.serial)?;
    info!(path = %config.serial.path, "bridge running over serial");
    loop {
        tokio::select! {
            ready = transport.readable() => {
                ready?;
                bridge.poll(&mut transport);
            }
            Some(request) = requests.recv() => bridge.apply(&mut transport, request),
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}

async fn run_virtual(
    mut bridge: Bridge<MqttHub>,
    mut requests: UnboundedReceiver<ControlRequest>,
) {
    let mut board = VirtualBoard::new().with_echo();
    let mut tick = tokio::time::interval(std::time::Duration::from_millis(50));
    info!("bridge running over the virtual board");
    loop {
        tokio::select! {
            _ = tick.tick() => bridge.poll(&mut board),
            Some(request) = requests.recv() => bridge.apply(&mut board, request),
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }
}
