//! Command topic routing.
//!
//! Every mirrored device gets a `{base}/{slug}/set[/{attribute}]` topic tree.
//! Payload conventions follow the usual MQTT home-automation shape: `ON` /
//! `OFF` flags, plain decimal numbers, `r,g,b` color triples. Anything that
//! does not parse is dropped; the hub re-publishes on the next user action.

use minilink_core::ControlRequest;
use minilink_protocol::{ArmMode, CommunicationId, Rgb};

/// How command payloads for one device slug translate into requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRoute {
    Switch { id: CommunicationId },
    Alarm { id: CommunicationId },
    Television { id: CommunicationId },
    RgbStrip { id: CommunicationId },
    Launcher { id: CommunicationId },
}

/// Translate one command publish into a bridge request.
///
/// `attribute` is the topic remainder after `/set` (empty for the bare set
/// topic). Returns `None` for unknown attributes or unparsable payloads.
#[must_use]
pub fn parse_command(
    route: CommandRoute,
    attribute: &str,
    payload: &str,
) -> Option<ControlRequest> {
    match route {
        CommandRoute::Switch { id } => match attribute {
            "" => Some(ControlRequest::SetPower {
                id,
                on: parse_flag(payload)?,
            }),
            _ => None,
        },
        CommandRoute::Alarm { id } => match attribute {
            "" => Some(ControlRequest::SetAlarmMode {
                id,
                mode: parse_mode(payload)?,
            }),
            _ => None,
        },
        CommandRoute::Television { id } => match attribute {
            "" => Some(ControlRequest::SetPower {
                id,
                on: parse_flag(payload)?,
            }),
            "mute" => Some(ControlRequest::SetMuted {
                id,
                muted: parse_flag(payload)?,
            }),
            "volume" => match payload.trim() {
                v if v.eq_ignore_ascii_case("up") => Some(ControlRequest::VolumeUp { id }),
                v if v.eq_ignore_ascii_case("down") => Some(ControlRequest::VolumeDown { id }),
                v => Some(ControlRequest::SetVolume {
                    id,
                    volume: v.parse().ok()?,
                }),
            },
            _ => None,
        },
        CommandRoute::RgbStrip { id } => match attribute {
            "" => Some(ControlRequest::SetPower {
                id,
                on: parse_flag(payload)?,
            }),
            "color" => Some(ControlRequest::SetStripColor {
                id,
                color: parse_color(payload)?,
            }),
            "effect" => Some(ControlRequest::SetStripEffect {
                id,
                effect: payload.trim().parse().ok()?,
            }),
            _ => None,
        },
        CommandRoute::Launcher { id } => match attribute {
            "base" => Some(ControlRequest::PointLauncherBase {
                id,
                angle: payload.trim().parse().ok()?,
            }),
            "elevation" => Some(ControlRequest::PointLauncherElevation {
                id,
                angle: payload.trim().parse().ok()?,
            }),
            "fire" => Some(ControlRequest::FireMissiles {
                id,
                count: payload.trim().parse().ok()?,
            }),
            _ => None,
        },
    }
}

fn parse_flag(payload: &str) -> Option<bool> {
    let payload = payload.trim();
    if payload.eq_ignore_ascii_case("on") || payload == "1" {
        Some(true)
    } else if payload.eq_ignore_ascii_case("off") || payload == "0" {
        Some(false)
    } else {
        None
    }
}

fn parse_mode(payload: &str) -> Option<ArmMode> {
    match payload.trim() {
        "disarm" | "disarmed" => Some(ArmMode::Disarm),
        "arm_home" => Some(ArmMode::ArmHome),
        "arm_away" => Some(ArmMode::ArmAway),
        "arm_night" => Some(ArmMode::ArmNight),
        _ => None,
    }
}

/// Parse a `r,g,b` decimal triple.
fn parse_color(payload: &str) -> Option<Rgb> {
    let mut channels = payload.trim().splitn(3, ',');
    let red = channels.next()?.trim().parse().ok()?;
    let green = channels.next()?.trim().parse().ok()?;
    let blue = channels.next()?.trim().parse().ok()?;
    Some(Rgb::new(red, green, blue))
}
