//! Locally reconciled view of the box

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Whether the box is powered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerState {
    #[default]
    Unknown,
    On,
    Off,
}

/// Playback of the live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Unknown,
    Playing,
    Paused,
    Stopped,
}

/// Single media-player state as a host would display it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaState {
    Unknown,
    Off,
    On,
    Playing,
    Paused,
}

impl MediaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaState::Unknown => "unknown",
            MediaState::Off => "off",
            MediaState::On => "on",
            MediaState::Playing => "playing",
            MediaState::Paused => "paused",
        }
    }
}

/// Snapshot of everything known about the box
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub power: PowerState,
    pub playback: PlaybackState,
    /// Current channel, only ever a name from the source catalog
    pub current_source: Option<String>,
    /// Last channel requested through `select_source`
    pub requested_source: Option<String>,
    /// Channel name exactly as the box last reported it
    pub media_description: Option<String>,
    pub muted: bool,
    /// End of the post turn-off quiet period
    pub power_off_deadline: Option<Instant>,
}

impl DeviceState {
    /// True while a turn-off is still settling at `now`
    pub fn is_powering_off(&self, now: Instant) -> bool {
        self.power_off_deadline.is_some_and(|deadline| deadline > now)
    }

    pub fn media_state(&self) -> MediaState {
        match (self.power, self.playback) {
            (PowerState::Off, _) => MediaState::Off,
            (PowerState::Unknown, _) => MediaState::Unknown,
            (PowerState::On, PlaybackState::Playing) => MediaState::Playing,
            (PowerState::On, PlaybackState::Paused) => MediaState::Paused,
            (PowerState::On, _) => MediaState::On,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_initial_state() {
        let state = DeviceState::default();
        assert_eq!(state.power, PowerState::Unknown);
        assert_eq!(state.playback, PlaybackState::Unknown);
        assert!(state.current_source.is_none());
        assert!(!state.muted);
        assert_eq!(state.media_state(), MediaState::Unknown);
    }

    #[test]
    fn test_media_state_mapping() {
        let mut state = DeviceState {
            power: PowerState::On,
            ..Default::default()
        };
        assert_eq!(state.media_state(), MediaState::On);

        state.playback = PlaybackState::Playing;
        assert_eq!(state.media_state(), MediaState::Playing);

        state.playback = PlaybackState::Paused;
        assert_eq!(state.media_state(), MediaState::Paused);

        state.power = PowerState::Off;
        assert_eq!(state.media_state(), MediaState::Off);
        assert_eq!(state.media_state().as_str(), "off");
    }

    #[test]
    fn test_is_powering_off() {
        let now = Instant::now();
        let mut state = DeviceState::default();
        assert!(!state.is_powering_off(now));

        state.power_off_deadline = Some(now + Duration::from_secs(4));
        assert!(state.is_powering_off(now));
        assert!(!state.is_powering_off(now + Duration::from_secs(5)));
    }
}
