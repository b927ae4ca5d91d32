//! Device state reconciler
//!
//! `SfrTvDevice` turns media-player operations into commands and folds the
//! outcome of every round trip back into a [`DeviceState`]. Operations never
//! fail from the caller's point of view: transport and protocol errors
//! become power-state transitions plus a dropped session.

use std::collections::BTreeMap;
use std::thread;
use std::time::Instant;

use sfrtv_api::{Command, Connector, Key, Remote, RemoteError, ResponseRecord, TcpConnector};
use tracing::{debug, info, trace, warn};

use crate::config::DeviceConfig;
use crate::state::{DeviceState, PlaybackState, PowerState};

/// Attribute key carrying the channel name the box reported
pub const ATTR_MEDIA_DESCRIPTION: &str = "media_description";

/// Content type of everything the box plays
pub const MEDIA_TYPE_CHANNEL: &str = "channel";

/// Media-player capabilities exposed to a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    TurnOn,
    TurnOff,
    Play,
    Pause,
    Stop,
    NextTrack,
    PreviousTrack,
    VolumeStep,
    VolumeSet,
    VolumeMute,
    SelectSource,
}

const SUPPORTED_FEATURES: &[Feature] = &[
    Feature::TurnOn,
    Feature::TurnOff,
    Feature::Play,
    Feature::Pause,
    Feature::Stop,
    Feature::NextTrack,
    Feature::PreviousTrack,
    Feature::VolumeStep,
    Feature::VolumeSet,
    Feature::VolumeMute,
    Feature::SelectSource,
];

/// A public operation, for hosts that dispatch by value
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    TurnOn,
    TurnOff,
    VolumeUp,
    VolumeDown,
    /// Volume level in `0.0..=1.0`
    SetVolume(f32),
    Mute(bool),
    Play,
    Pause,
    Stop,
    NextTrack,
    PreviousTrack,
    SelectSource(String),
    Refresh,
}

/// One SFR STB7 box
///
/// All operations block the caller for the whole command and status round
/// trip, including the fixed settle delays. Only one operation may run at a
/// time; wrap the device in a [`SharedDevice`](crate::SharedDevice) to share
/// it between threads.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use sfrtv_sdk::{DeviceConfig, SfrTvDevice, SourceCatalog};
///
/// let sources = SourceCatalog::from_json(r#"{"TF1": 192}"#)?;
/// let config = DeviceConfig::new("192.168.1.20", 7682, "Salon", Duration::from_secs(20), sources);
/// let mut device = SfrTvDevice::new(config);
///
/// device.turn_on();
/// device.select_source("TF1");
/// println!("{:?}", device.state().media_state());
/// # Ok::<(), sfrtv_sdk::SdkError>(())
/// ```
pub struct SfrTvDevice<C: Connector + Clone = TcpConnector> {
    config: DeviceConfig,
    connector: C,
    remote: Option<Remote<C>>,
    state: DeviceState,
}

impl SfrTvDevice<TcpConnector> {
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_connector(config, TcpConnector::new())
    }
}

impl<C: Connector + Clone> SfrTvDevice<C> {
    pub fn with_connector(config: DeviceConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            remote: None,
            state: DeviceState::default(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Snapshot of the reconciled state
    pub fn state(&self) -> DeviceState {
        self.state.clone()
    }

    /// Selectable channel names, in catalog order
    pub fn source_list(&self) -> Vec<String> {
        self.config.sources.names().map(str::to_string).collect()
    }

    pub fn media_content_type(&self) -> &'static str {
        MEDIA_TYPE_CHANNEL
    }

    pub fn supported_features(&self) -> &'static [Feature] {
        SUPPORTED_FEATURES
    }

    /// Extra attributes for display; empty while the box is off
    pub fn attributes(&self) -> BTreeMap<&'static str, String> {
        let mut attributes = BTreeMap::new();
        if self.state.power == PowerState::Off {
            return attributes;
        }
        if let Some(description) = &self.state.media_description {
            attributes.insert(ATTR_MEDIA_DESCRIPTION, description.clone());
        }
        attributes
    }

    /// True while a live session is open
    pub fn is_connected(&self) -> bool {
        self.remote.as_ref().is_some_and(Remote::is_connected)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Dispatch an operation by value
    pub fn issue(&mut self, operation: Operation) {
        match operation {
            Operation::TurnOn => self.turn_on(),
            Operation::TurnOff => self.turn_off(),
            Operation::VolumeUp => self.volume_up(),
            Operation::VolumeDown => self.volume_down(),
            Operation::SetVolume(level) => self.set_volume(level),
            Operation::Mute(mute) => self.mute_volume(mute),
            Operation::Play => self.media_play(),
            Operation::Pause => self.media_pause(),
            Operation::Stop => self.media_stop(),
            Operation::NextTrack => self.media_next_track(),
            Operation::PreviousTrack => self.media_previous_track(),
            Operation::SelectSource(name) => self.select_source(&name),
            Operation::Refresh => self.refresh(),
        }
    }

    /// Poll the session status; meant to be called on a fixed interval
    pub fn refresh(&mut self) {
        self.send_command(Command::GetInfo);
    }

    /// Press power, wait for the box to wake, then confirm with OK
    pub fn turn_on(&mut self) {
        debug!("Turning on {}", self.name());
        self.send_command(Command::ButtonEvent(Key::Power));
        thread::sleep(self.config.timing.power_on_delay);
        self.send_command(Command::ButtonEvent(Key::Ok));
    }

    /// Press power and hold back other commands for the quiet period
    pub fn turn_off(&mut self) {
        debug!("Turning off {}", self.name());
        self.state.power_off_deadline =
            Some(Instant::now() + self.config.timing.power_off_quiet_period);
        self.send_command(Command::ButtonEvent(Key::Power));
    }

    pub fn volume_up(&mut self) {
        self.send_command(Command::ButtonEvent(Key::VolumeUp));
    }

    pub fn volume_down(&mut self) {
        self.send_command(Command::ButtonEvent(Key::VolumeDown));
    }

    /// Set the absolute volume from a `0.0..=1.0` level
    pub fn set_volume(&mut self, level: f32) {
        let scaled = (level.clamp(0.0, 1.0) * 100.0).round() as u8;
        self.send_command(Command::SetVolume(scaled));
    }

    /// The box only has a mute toggle; `mute` records the intended state
    pub fn mute_volume(&mut self, mute: bool) {
        if self.send_command(Command::ButtonEvent(Key::Mute)) {
            self.state.muted = mute;
        }
    }

    pub fn media_play(&mut self) {
        self.send_command(Command::ButtonEvent(Key::PlayPause));
    }

    pub fn media_pause(&mut self) {
        self.send_command(Command::ButtonEvent(Key::PlayPause));
    }

    pub fn media_stop(&mut self) {
        self.send_command(Command::ButtonEvent(Key::Stop));
    }

    pub fn media_next_track(&mut self) {
        self.send_command(Command::ButtonEvent(Key::Forward));
    }

    pub fn media_previous_track(&mut self) {
        self.send_command(Command::ButtonEvent(Key::Rewind));
    }

    /// Zap to a catalog channel; unknown names are ignored
    pub fn select_source(&mut self, name: &str) {
        let Some(channel) = self.config.sources.get(name).cloned() else {
            debug!("Ignoring unknown source '{}'", name);
            return;
        };
        if self.send_command(Command::Zap(channel)) {
            self.state.requested_source = Some(name.to_string());
        }
    }

    // ========================================================================
    // Round trip
    // ========================================================================

    /// Run one command round trip. Returns false when the quiet period
    /// suppressed the command.
    fn send_command(&mut self, command: Command) -> bool {
        debug!("Sending command: {}", command);
        if self.quiet_period_active() && !command.bypasses_quiet_period() {
            info!("Box is powering off, not sending command: {}", command.name());
            return false;
        }

        let outcome = self.remote().control(&command);
        if let Err(error) = &outcome {
            self.handle_failure(error);
        }
        self.apply_quiet_period();

        // The status message belonged to the dropped session
        if outcome.is_ok() {
            thread::sleep(self.config.timing.settle_delay);
            self.read_status();
            self.apply_quiet_period();
        }
        true
    }

    fn remote(&mut self) -> &mut Remote<C> {
        self.remote.get_or_insert_with(|| {
            Remote::with_connector(self.config.remote_config(), self.connector.clone())
        })
    }

    fn handle_failure(&mut self, error: &RemoteError) {
        let reachable = match error {
            // Something answered, so the box is on
            RemoteError::UnhandledResponse(_) | RemoteError::AccessDenied | RemoteError::Codec(_) => {
                true
            }
            // Commands sent too fast make the box drop the socket
            RemoteError::Transport(e) if e.is_broken_pipe() => true,
            RemoteError::ConnectionClosed | RemoteError::Transport(_) => false,
        };

        self.state.power = if reachable {
            PowerState::On
        } else {
            PowerState::Off
        };
        warn!(
            "Round trip to {} failed ({}), marking power {:?}",
            self.config.host, error, self.state.power
        );
        self.drop_session();
    }

    fn read_status(&mut self) {
        match self.remote().read_response() {
            Ok(record) => self.apply_status(&record),
            Err(error) => self.handle_failure(&error),
        }
    }

    fn apply_status(&mut self, record: &ResponseRecord) {
        if !record.is_session_status() {
            trace!("Ignoring {:?} response", record.action);
            return;
        }
        if !record.code.is_ok() {
            self.state.power = PowerState::Off;
            self.state.playback = PlaybackState::Stopped;
            return;
        }

        let Some(live) = record.live_session() else {
            warn!("Session status from {} carried no live session", self.config.host);
            return;
        };
        self.state.power = PowerState::On;
        self.state.playback = if live.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };
        self.state.current_source = self
            .config
            .sources
            .contains(&live.channel_name)
            .then(|| live.channel_name.clone());
        self.state.media_description = Some(live.channel_name);
    }

    /// Clears an expired deadline as a side effect
    fn quiet_period_active(&mut self) -> bool {
        if self.state.is_powering_off(Instant::now()) {
            return true;
        }
        self.state.power_off_deadline = None;
        false
    }

    fn apply_quiet_period(&mut self) {
        if self.quiet_period_active() {
            self.state.power = PowerState::Off;
        }
    }

    fn drop_session(&mut self) {
        self.remote = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceCatalog;
    use sfrtv_api::protocol::decode_response;
    use std::time::Duration;
    use stb_transport::mock::ScriptedConnector;

    fn device() -> SfrTvDevice<ScriptedConnector> {
        let sources = SourceCatalog::from_json(r#"{"TF1": 192, "BBC1": "101"}"#).unwrap();
        let config =
            DeviceConfig::new("10.0.0.2", 7682, "Salon", Duration::from_millis(50), sources);
        SfrTvDevice::with_connector(config, ScriptedConnector::new())
    }

    fn status(code: &str, channel: &str, speed: i32) -> ResponseRecord {
        decode_response(
            format!(
                r#"{{"Action":"GetSessionsStatus","RemoteResponseCode":"{}","Data":{{"LiveSession":{{"LiveItem":{{"CurrentChannel":{{"Name":"{}"}}}},"Speed":{}}}}}}}"#,
                code, channel, speed
            )
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_status_outside_catalog_keeps_description_only() {
        let mut device = device();
        device.apply_status(&status("OK", "Canal+", 1));

        let state = device.state();
        assert_eq!(state.power, PowerState::On);
        assert!(state.current_source.is_none());
        assert_eq!(state.media_description.as_deref(), Some("Canal+"));
    }

    #[test]
    fn test_status_error_code_turns_off() {
        let mut device = device();
        device.apply_status(&status("OK", "TF1", 1));
        device.apply_status(&status("NOT_READY", "TF1", 1));

        let state = device.state();
        assert_eq!(state.power, PowerState::Off);
        assert_eq!(state.playback, PlaybackState::Stopped);
        assert!(device.attributes().is_empty());
    }

    #[test]
    fn test_status_without_live_session_is_ignored() {
        let mut device = device();
        let record = decode_response(
            br#"{"Action":"GetSessionsStatus","RemoteResponseCode":"OK","Data":{}}"#,
        )
        .unwrap();
        device.apply_status(&record);
        assert_eq!(device.state(), DeviceState::default());
    }

    #[test]
    fn test_attributes_expose_reported_channel() {
        let mut device = device();
        device.apply_status(&status("OK", "TF1", 0));

        let attributes = device.attributes();
        assert_eq!(attributes.get(ATTR_MEDIA_DESCRIPTION).map(String::as_str), Some("TF1"));
    }

    #[test]
    fn test_expired_deadline_is_cleared() {
        let mut device = device();
        device.state.power_off_deadline = Some(Instant::now() - Duration::from_millis(1));
        assert!(!device.quiet_period_active());
        assert!(device.state().power_off_deadline.is_none());
    }

    #[test]
    fn test_static_accessors() {
        let device = device();
        assert_eq!(device.name(), "Salon");
        assert_eq!(device.source_list(), vec!["TF1".to_string(), "BBC1".to_string()]);
        assert_eq!(device.media_content_type(), "channel");
        assert!(device.supported_features().contains(&Feature::SelectSource));
        assert!(!device.is_connected());
    }
}
