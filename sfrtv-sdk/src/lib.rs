//! # SFR TV SDK - media-player control for SFR STB7 boxes
//!
//! Keeps a session with one set-top-box and exposes it as a media player:
//!
//! ```rust,no_run
//! use sfrtv_sdk::{setup_platform, KnownDevices, Operation, PlatformConfig, SharedDevice, SourceCatalog};
//!
//! fn main() -> Result<(), sfrtv_sdk::SdkError> {
//!     let known = KnownDevices::new();
//!     let config = PlatformConfig::from_json_str(r#"{"host": "192.168.1.20", "name": "Salon"}"#)?;
//!     let sources = SourceCatalog::load("sources.json")?;
//!
//!     if let Some(device) = setup_platform(&known, &config, sources)? {
//!         let device = SharedDevice::new(device);
//!         device.issue(Operation::TurnOn);
//!         device.refresh();
//!         println!("{} is {}", device.name(), device.state().media_state().as_str());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! sfrtv-sdk (device state reconciler, platform setup)
//!     ↓
//! sfrtv-api (command codec, Remote session)
//!     ↓
//! stb-transport (line-framed TCP)
//! ```
//!
//! ## Behaviour notes
//!
//! - Operations never return errors. A failed round trip marks the box on
//!   (it answered, but badly) or off (nothing answered) and drops the
//!   session; the next operation reconnects.
//! - For a few seconds after `turn_off` only power and status commands are
//!   sent, so a stray key press cannot wake the box mid-shutdown.
//! - Every command waits a short settle delay and then reads the status
//!   message the box sends after it.

pub use config::{DeviceConfig, PlatformConfig, SourceCatalog, Timing, DEFAULT_NAME, DEFAULT_TIMEOUT_SECS};
pub use device::{Feature, Operation, SfrTvDevice, ATTR_MEDIA_DESCRIPTION, MEDIA_TYPE_CHANNEL};
pub use error::SdkError;
pub use registry::{resolve_host, setup_platform, KnownDevices};
pub use shared::SharedDevice;
pub use state::{DeviceState, MediaState, PlaybackState, PowerState};

// Re-export commonly used types from sfrtv-api
pub use sfrtv_api::{Argument, Command, Key};

pub mod logging;

mod config;
mod device;
mod error;
mod registry;
mod shared;
mod state;
