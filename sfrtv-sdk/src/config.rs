//! Device configuration and the source catalog
//!
//! Everything here is built once at startup and read-only afterwards.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use sfrtv_api::{Argument, ClientIdentity, RemoteConfig, DEFAULT_PORT};

use crate::SdkError;

/// Display name used when the platform config does not set one
pub const DEFAULT_NAME: &str = "SFR TV Remote";

/// Socket timeout used when the platform config does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

const CLIENT_NAME: &str = "HomeAssistant";
const CLIENT_ID: &str = "ha.component.sfrtv";

/// Fixed pacing around device round trips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait between a command and reading its status message
    pub settle_delay: Duration,
    /// Wait between the power key and the confirming OK key on turn-on
    pub power_on_delay: Duration,
    /// How long non-power commands are held back after turn-off
    pub power_off_quiet_period: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            power_on_delay: Duration::from_secs(2),
            power_off_quiet_period: Duration::from_secs(4),
        }
    }
}

/// Ordered mapping from channel name to device channel identifier
///
/// Parsed from a JSON object such as `{"TF1": 192, "France 2": "4"}`.
/// Entries keep the order of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCatalog {
    entries: Vec<(String, Argument)>,
}

impl SourceCatalog {
    /// Parse a catalog from JSON object text
    pub fn from_json(text: &str) -> Result<Self, SdkError> {
        let map: Map<String, Value> = serde_json::from_str(text)?;

        let entries = map
            .into_iter()
            .map(|(name, value)| {
                let id = match value {
                    Value::String(s) => Argument::Text(s),
                    Value::Number(n) => match n.as_i64() {
                        Some(i) => Argument::Number(i),
                        None => {
                            return Err(SdkError::InvalidCatalog(format!(
                                "channel '{}' has non-integer identifier {}",
                                name, n
                            )))
                        }
                    },
                    other => {
                        return Err(SdkError::InvalidCatalog(format!(
                            "channel '{}' has unsupported identifier {}",
                            name, other
                        )))
                    }
                };
                Ok((name, id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Read and parse a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SdkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Device identifier for a channel name
    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, id)| id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Channel names in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable per-device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub client: ClientIdentity,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub sources: SourceCatalog,
    pub timing: Timing,
}

impl DeviceConfig {
    /// Build the configuration for one box
    ///
    /// `name` is the display name; it is also sent to the box as the client
    /// description.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        name: impl Into<String>,
        timeout: Duration,
        sources: SourceCatalog,
    ) -> Self {
        Self {
            client: ClientIdentity {
                name: CLIENT_NAME.to_string(),
                description: name.into(),
                id: CLIENT_ID.to_string(),
            },
            host: host.into(),
            port,
            timeout,
            sources,
            timing: Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Display name of the device
    pub fn name(&self) -> &str {
        &self.client.description
    }

    pub(crate) fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            client: self.client.clone(),
            host: self.host.clone(),
            port: self.port,
            timeout: self.timeout,
        }
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Platform entry as written by the user
///
/// ```json
/// {"host": "192.168.1.20", "name": "Salon", "timeout": 20}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_name")]
    pub name: String,
    /// Socket timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl PlatformConfig {
    pub fn from_json_str(text: &str) -> Result<Self, SdkError> {
        let config: PlatformConfig = serde_json::from_str(text)?;
        if config.timeout == 0 {
            return Err(SdkError::InvalidConfig(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
