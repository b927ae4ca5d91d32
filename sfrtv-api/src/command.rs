//! Command vocabulary understood by the STB7 remote service

use std::fmt;

use serde::{Serialize, Serializer};

/// A positional command argument
///
/// The box accepts either text or integers; an unused slot is sent as an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Argument {
    #[default]
    Empty,
    Text(String),
    Number(i64),
}

impl Argument {
    pub fn is_empty(&self) -> bool {
        matches!(self, Argument::Empty)
    }
}

impl Serialize for Argument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Argument::Empty => serializer.serialize_str(""),
            Argument::Text(s) => serializer.serialize_str(s),
            Argument::Number(n) => serializer.serialize_i64(*n),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Empty => Ok(()),
            Argument::Text(s) => f.write_str(s),
            Argument::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Number(value)
    }
}

/// Remote-control buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Power,
    Ok,
    VolumeUp,
    VolumeDown,
    Mute,
    PlayPause,
    Stop,
    Forward,
    Rewind,
}

impl Key {
    /// Wire name of the button
    pub fn name(&self) -> &'static str {
        match self {
            Key::Power => "POWER",
            Key::Ok => "OK",
            Key::VolumeUp => "VUP",
            Key::VolumeDown => "VDOWN",
            Key::Mute => "MUTE",
            Key::PlayPause => "PLAYPAUSE",
            Key::Stop => "STOP",
            Key::Forward => "FORWARD",
            Key::Rewind => "REWIND",
        }
    }
}

/// A command sent to the box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Status poll; the box answers with a session status report
    GetInfo,
    /// Simulated remote-control key press
    ButtonEvent(Key),
    /// Absolute volume, 0..=100
    SetVolume(u8),
    /// Change channel to the given device channel identifier
    Zap(Argument),
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetInfo => "GETINFO",
            Command::ButtonEvent(_) => "BUTTONEVENT",
            Command::SetVolume(_) => "SETVOLUME",
            Command::Zap(_) => "ZAP",
        }
    }

    /// The two positional arguments carried on the wire
    pub fn arguments(&self) -> (Argument, Argument) {
        match self {
            Command::GetInfo => (Argument::Empty, Argument::Empty),
            Command::ButtonEvent(key) => (Argument::from(key.name()), Argument::Empty),
            Command::SetVolume(level) => (Argument::Number(i64::from(*level)), Argument::Empty),
            Command::Zap(channel) => (channel.clone(), Argument::Empty),
        }
    }

    /// Commands allowed through while a power-off is settling.
    ///
    /// Anything else could wake the box back up mid-shutdown.
    pub fn bypasses_quiet_period(&self) -> bool {
        matches!(self, Command::GetInfo | Command::ButtonEvent(Key::Power))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (arg1, arg2) = self.arguments();
        write!(f, "{} {} {}", self.name(), arg1, arg2)
    }
}
