//! Scripted in-memory transport for tests
//!
//! Replies are queued up front and replayed in order across every connection
//! the connector hands out. Every frame sent is recorded so tests can assert
//! on outbound traffic and on how many times a connection was opened.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{Connection, Connector, TransportError};

/// A scripted result for one `receive()` call
#[derive(Debug, Clone)]
pub enum Reply {
    Frame(Vec<u8>),
    Closed,
    Timeout,
    ReadError(io::ErrorKind),
}

#[derive(Debug, Default)]
struct Script {
    connects: usize,
    connect_failures: usize,
    send_failures: VecDeque<io::ErrorKind>,
    replies: VecDeque<Reply>,
    sent: Vec<Vec<u8>>,
    closes: usize,
}

/// Connector whose connections replay a shared script
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a frame for the next `receive()`
    pub fn push_frame(&self, frame: impl Into<Vec<u8>>) -> &Self {
        self.script().replies.push_back(Reply::Frame(frame.into()));
        self
    }

    /// Queue an arbitrary reply
    pub fn push_reply(&self, reply: Reply) -> &Self {
        self.script().replies.push_back(reply);
        self
    }

    /// Make the next `count` connect attempts fail with connection refused
    pub fn fail_connects(&self, count: usize) -> &Self {
        self.script().connect_failures += count;
        self
    }

    /// Make the next `send()` fail with the given I/O error kind
    pub fn fail_next_send(&self, kind: io::ErrorKind) -> &Self {
        self.script().send_failures.push_back(kind);
        self
    }

    /// Number of successful and failed connect attempts so far
    pub fn connect_count(&self) -> usize {
        self.script().connects
    }

    /// Number of `close()` calls on handed-out connections
    pub fn close_count(&self) -> usize {
        self.script().closes
    }

    /// Frames written so far, in order
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.script().sent.clone()
    }

    /// Frames written so far, lossily decoded as UTF-8
    pub fn sent_text(&self) -> Vec<String> {
        self.script()
            .sent
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    /// Replies not consumed yet
    pub fn pending_replies(&self) -> usize {
        self.script().replies.len()
    }

    pub fn clear_sent(&self) {
        self.script().sent.clear();
    }
}

impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    fn connect(
        &self,
        host: &str,
        port: u16,
        _timeout: Duration,
    ) -> Result<ScriptedConnection, TransportError> {
        let mut script = self.script();
        script.connects += 1;
        if script.connect_failures > 0 {
            script.connect_failures -= 1;
            return Err(TransportError::Connect {
                addr: format!("{}:{}", host, port),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        Ok(ScriptedConnection {
            script: Arc::clone(&self.script),
            closed: false,
        })
    }
}

/// Connection handed out by [`ScriptedConnector`]
#[derive(Debug)]
pub struct ScriptedConnection {
    script: Arc<Mutex<Script>>,
    closed: bool,
}

impl ScriptedConnection {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Connection for ScriptedConnection {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut script = self.script();
        if let Some(kind) = script.send_failures.pop_front() {
            return Err(TransportError::from_write(io::Error::from(kind)));
        }
        script.sent.push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        // An exhausted script behaves like a silent device
        match self.script().replies.pop_front() {
            Some(Reply::Frame(frame)) => Ok(frame),
            Some(Reply::Closed) => Err(TransportError::Closed),
            Some(Reply::Timeout) | None => Err(TransportError::Timeout),
            Some(Reply::ReadError(kind)) => Err(TransportError::from_read(io::Error::from(kind))),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.script().closes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_script_in_order() {
        let connector = ScriptedConnector::new();
        connector.push_frame("one").push_reply(Reply::Closed);

        let mut conn = connector.connect("box", 7682, Duration::ZERO).unwrap();
        assert_eq!(conn.receive().unwrap(), b"one");
        assert!(matches!(conn.receive(), Err(TransportError::Closed)));
        assert!(matches!(conn.receive(), Err(TransportError::Timeout)));
    }

    #[test]
    fn test_counts_connects_and_failures() {
        let connector = ScriptedConnector::new();
        connector.fail_connects(1);

        assert!(connector.connect("box", 7682, Duration::ZERO).is_err());
        assert!(connector.connect("box", 7682, Duration::ZERO).is_ok());
        assert_eq!(connector.connect_count(), 2);
    }

    #[test]
    fn test_records_sent_frames() {
        let connector = ScriptedConnector::new();
        connector.fail_next_send(io::ErrorKind::BrokenPipe);

        let mut conn = connector.connect("box", 7682, Duration::ZERO).unwrap();
        let err = conn.send(b"dropped").unwrap_err();
        assert!(err.is_broken_pipe());

        conn.send(b"kept").unwrap();
        assert_eq!(connector.sent_text(), vec!["kept".to_string()]);

        conn.close();
        assert_eq!(connector.close_count(), 1);
    }
}
