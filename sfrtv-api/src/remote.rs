use std::time::Duration;

use stb_transport::{Connection, Connector, TcpConnector};
use tracing::{debug, trace};

use crate::command::Command;
use crate::protocol::{self, ClientIdentity, ResponseCode, ResponseRecord};
use crate::{RemoteError, Result};

/// Connection parameters for a [`Remote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub client: ClientIdentity,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

/// A session with one set-top-box
///
/// The box answers every command with an acknowledgement and then emits a
/// status message on the same connection. `control()` consumes the
/// acknowledgement; `read_response()` picks up the status message. Only one
/// such round trip may be in flight at a time.
///
/// The connection is opened on first use and dropped after any transport
/// failure; the next call opens a fresh one. No call retries.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use sfrtv_api::{ClientIdentity, Command, Key, Remote, RemoteConfig};
///
/// let mut remote = Remote::new(RemoteConfig {
///     client: ClientIdentity {
///         name: "HomeAssistant".to_string(),
///         description: "Salon".to_string(),
///         id: "ha.component.sfrtv".to_string(),
///     },
///     host: "192.168.1.20".to_string(),
///     port: 7682,
///     timeout: Duration::from_secs(20),
/// });
///
/// remote.control(&Command::ButtonEvent(Key::PlayPause))?;
/// let status = remote.read_response()?;
/// # Ok::<(), sfrtv_api::RemoteError>(())
/// ```
pub struct Remote<C: Connector = TcpConnector> {
    config: RemoteConfig,
    connector: C,
    connection: Option<C::Connection>,
}

impl Remote<TcpConnector> {
    /// Create a remote that talks TCP to the configured host
    pub fn new(config: RemoteConfig) -> Self {
        Self::with_connector(config, TcpConnector::new())
    }
}

impl<C: Connector> Remote<C> {
    /// Create a remote over a custom connector
    pub fn with_connector(config: RemoteConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            connection: None,
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Send a command and check its acknowledgement
    pub fn control(&mut self, command: &Command) -> Result<()> {
        let (arg1, arg2) = command.arguments();
        let frame = protocol::encode_command(command.name(), &arg1, &arg2, &self.config.client)?;

        debug!("Sending {} to {}", command, self.config.host);
        self.with_connection(|conn| conn.send(&frame))?;

        let ack = self.receive_record()?;
        trace!("Acknowledgement for {}: {:?}", command.name(), ack.code);
        match ack.code {
            ResponseCode::Ok => Ok(()),
            ResponseCode::AccessDenied => Err(RemoteError::AccessDenied),
            ResponseCode::Unhandled(code) => Err(RemoteError::UnhandledResponse(code)),
        }
    }

    /// Read and decode the status message that follows a command
    pub fn read_response(&mut self) -> Result<ResponseRecord> {
        self.receive_record()
    }

    /// Close the current connection, if any
    pub fn close(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
    }

    fn receive_record(&mut self) -> Result<ResponseRecord> {
        let frame = self.with_connection(|conn| conn.receive())?;
        Ok(protocol::decode_response(&frame)?)
    }

    /// Run `op` on the live connection, opening one first if needed.
    ///
    /// Any transport failure drops the connection.
    fn with_connection<T>(
        &mut self,
        op: impl FnOnce(&mut C::Connection) -> std::result::Result<T, stb_transport::TransportError>,
    ) -> Result<T> {
        let conn = match self.connection.as_mut() {
            Some(conn) => conn,
            None => {
                let conn = self.connector.connect(
                    &self.config.host,
                    self.config.port,
                    self.config.timeout,
                )?;
                self.connection.insert(conn)
            }
        };

        let result = op(conn);
        if result.is_err() {
            self.close();
        }
        result.map_err(RemoteError::from)
    }
}

impl<C: Connector> Drop for Remote<C> {
    fn drop(&mut self) {
        self.close();
    }
}
