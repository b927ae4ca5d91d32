//! Typed API for SFR STB7 set-top-box control
//!
//! This crate speaks the STB7 remote protocol on top of the private
//! `stb-transport` crate:
//!
//! - [`command`] defines the commands and remote-control keys the box accepts
//! - [`protocol`] encodes requests and decodes response frames
//! - [`Remote`] owns one session: lazy connect, command acknowledgement,
//!   follow-up status read, and typed failure classification
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sfrtv_api::{ClientIdentity, Command, Remote, RemoteConfig};
//!
//! let mut remote = Remote::new(RemoteConfig {
//!     client: ClientIdentity {
//!         name: "HomeAssistant".to_string(),
//!         description: "Salon".to_string(),
//!         id: "ha.component.sfrtv".to_string(),
//!     },
//!     host: "192.168.1.20".to_string(),
//!     port: sfrtv_api::DEFAULT_PORT,
//!     timeout: Duration::from_secs(20),
//! });
//!
//! remote.control(&Command::GetInfo)?;
//! if let Some(live) = remote.read_response()?.live_session() {
//!     println!("Watching {}", live.channel_name);
//! }
//! # Ok::<(), sfrtv_api::RemoteError>(())
//! ```

pub mod command;
pub mod error;
pub mod protocol;
mod remote;

pub use command::{Argument, Command, Key};
pub use error::{CodecError, RemoteError, Result};
pub use protocol::{Action, ClientIdentity, LiveSession, ResponseCode, ResponseRecord};
pub use remote::{Remote, RemoteConfig};
pub use stb_transport::{Connection, Connector, TcpConnector, TransportError, DEFAULT_PORT};
