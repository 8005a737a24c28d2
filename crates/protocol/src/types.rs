//! Wire-level vocabulary shared by inbound and outbound messages.

use std::fmt;

/// Two-digit device address on the serial wire.
///
/// The protocol layer does not range-check: encoding an id above 99 widens
/// the field and corrupts framing, exactly as the wire format dictates.
/// Configuration validates ids before they reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommunicationId(u8);

impl CommunicationId {
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Build from a decoded two-digit wire field, wrapping into range.
    #[must_use]
    pub fn from_wire(value: u32) -> Self {
        Self(u8::try_from(value % 100).unwrap_or(0))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Address of the companion slot directly after this one.
    #[must_use]
    pub const fn companion(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u8> for CommunicationId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for CommunicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build from decoded three-digit wire fields, saturating each channel.
    #[must_use]
    pub fn from_wire(red: u32, green: u32, blue: u32) -> Self {
        Self {
            red: saturate_channel(red),
            green: saturate_channel(green),
            blue: saturate_channel(blue),
        }
    }
}

fn saturate_channel(value: u32) -> u8 {
    u8::try_from(value.min(255)).unwrap_or(u8::MAX)
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.red, self.green, self.blue)
    }
}

/// Requested power transition for a hub-owned light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Off,
    On,
    Toggle,
}

impl PowerAction {
    /// Wire digit to action; anything else is unknown.
    #[must_use]
    pub const fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }
}

/// Alarm arming mode carried on the control path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmMode {
    Disarm,
    ArmHome,
    ArmAway,
    ArmNight,
}

impl ArmMode {
    /// Wire digit for the mode field.
    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Disarm => 0,
            Self::ArmHome => 1,
            Self::ArmAway => 2,
            Self::ArmNight => 3,
        }
    }
}

/// Extended alarm panel state as reported by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Disarmed,
    ArmedHome,
    ArmedAway,
    ArmedNight,
    Pending,
    Arming,
    Triggered,
}

impl AlarmState {
    /// Wire digit to state; anything else is unknown.
    #[must_use]
    pub const fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Self::Disarmed),
            1 => Some(Self::ArmedHome),
            2 => Some(Self::ArmedAway),
            3 => Some(Self::ArmedNight),
            4 => Some(Self::Pending),
            5 => Some(Self::Arming),
            6 => Some(Self::Triggered),
            _ => None,
        }
    }

    /// Hub-facing state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "disarmed",
            Self::ArmedHome => "armed_home",
            Self::ArmedAway => "armed_away",
            Self::ArmedNight => "armed_night",
            Self::Pending => "pending",
            Self::Arming => "arming",
            Self::Triggered => "triggered",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
