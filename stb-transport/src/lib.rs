//! Private socket transport for set-top-box communication
//!
//! This crate provides the I/O primitive used to talk to an SFR STB7 box:
//! open a TCP connection, write one line-delimited frame, read one frame
//! back, close. It knows nothing about the message schema and performs no
//! retries; every blocking call is bounded by the configured timeout.

mod error;
#[cfg(feature = "test-support")]
pub mod mock;

pub use error::TransportError;

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

/// Default control port of the STB7 remote service
pub const DEFAULT_PORT: u16 = 7682;

/// Longest frame accepted from the box, delimiter excluded
pub const MAX_FRAME_LEN: usize = 64 * 1024;

const FRAME_DELIMITER: u8 = b'\n';

/// Opens connections to a device
///
/// The session layer is generic over this trait so tests can swap the TCP
/// implementation for a scripted one.
pub trait Connector {
    /// The connection type produced by this connector
    type Connection: Connection;

    /// Open a connection, blocking for at most `timeout`
    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Connection, TransportError>;
}

/// A single open, framed connection
pub trait Connection {
    /// Write one frame; the delimiter is appended by the connection
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Read one frame, without its delimiter
    fn receive(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Shut the connection down; further calls will fail
    fn close(&mut self);
}

/// Connector for the real device over TCP
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<TcpConnection, TransportError> {
        let addr = format!("{}:{}", host, port);
        let connect_error = |source| TransportError::Connect {
            addr: addr.clone(),
            source,
        };

        let candidates = (host, port).to_socket_addrs().map_err(connect_error)?;

        let mut last_error = None;
        let mut stream = None;
        for candidate in candidates {
            let attempt = if timeout.is_zero() {
                TcpStream::connect(candidate)
            } else {
                TcpStream::connect_timeout(&candidate, timeout)
            };
            match attempt {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }

        let stream = match stream {
            Some(s) => s,
            None => {
                let source = last_error.unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved")
                });
                return Err(connect_error(source));
            }
        };

        let io_timeout = (!timeout.is_zero()).then_some(timeout);
        stream.set_read_timeout(io_timeout).map_err(connect_error)?;
        stream.set_write_timeout(io_timeout).map_err(connect_error)?;
        stream.set_nodelay(true).map_err(connect_error)?;

        let reader = BufReader::new(stream.try_clone().map_err(connect_error)?);
        debug!("Connected to {}", addr);

        Ok(TcpConnection {
            writer: stream,
            reader,
            closed: false,
        })
    }
}

/// Line-framed TCP connection
#[derive(Debug)]
pub struct TcpConnection {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    closed: bool,
}

impl Connection for TcpConnection {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut buf = Vec::with_capacity(frame.len() + 1);
        buf.extend_from_slice(frame);
        buf.push(FRAME_DELIMITER);

        self.writer
            .write_all(&buf)
            .and_then(|_| self.writer.flush())
            .map_err(TransportError::from_write)?;
        trace!("Sent {} byte frame", frame.len());
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut frame = Vec::new();
        let read = (&mut self.reader)
            .take(MAX_FRAME_LEN as u64 + 1)
            .read_until(FRAME_DELIMITER, &mut frame)
            .map_err(TransportError::from_read)?;
        if read == 0 {
            return Err(TransportError::Closed);
        }
        if frame.len() > MAX_FRAME_LEN && frame.last() != Some(&FRAME_DELIMITER) {
            return Err(TransportError::Read(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame exceeds {} bytes", MAX_FRAME_LEN),
            )));
        }

        strip_delimiter(&mut frame);
        trace!("Received {} byte frame", frame.len());
        Ok(frame)
    }

    fn close(&mut self) {
        if !self.closed {
            // Peer may already be gone
            let _ = self.writer.shutdown(Shutdown::Both);
            self.closed = true;
        }
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn strip_delimiter(frame: &mut Vec<u8>) {
    if frame.last() == Some(&FRAME_DELIMITER) {
        frame.pop();
    }
    if frame.last() == Some(&b'\r') {
        frame.pop();
    }
}
