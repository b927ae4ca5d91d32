//! Wire codec for the STB7 remote protocol
//!
//! Requests and responses are single JSON objects, one per frame. A request
//! carries the client identity, a command name and two positional
//! arguments:
//!
//! ```text
//! {"Action":"BUTTONEVENT","Client":{"Name":"HomeAssistant","Description":"Salon","Id":"ha.component.sfrtv"},"Params":{"Arg1":"POWER","Arg2":""}}
//! ```
//!
//! A response carries an action tag, a response code and optional
//! action-specific data. Session status reports look like:
//!
//! ```text
//! {"Action":"GetSessionsStatus","RemoteResponseCode":"OK","Data":{"LiveSession":{"LiveItem":{"CurrentChannel":{"Name":"TF1"}},"Speed":1}}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::Argument;
use crate::error::CodecError;

/// Action tag of a session status report
pub const SESSION_STATUS_ACTION: &str = "GetSessionsStatus";

/// Identity announced to the box with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientIdentity {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Serialize)]
struct Request<'a> {
    #[serde(rename = "Action")]
    action: &'a str,
    #[serde(rename = "Client")]
    client: &'a ClientIdentity,
    #[serde(rename = "Params")]
    params: Params<'a>,
}

#[derive(Serialize)]
struct Params<'a> {
    #[serde(rename = "Arg1")]
    arg1: &'a Argument,
    #[serde(rename = "Arg2")]
    arg2: &'a Argument,
}

/// Encode a command request into one frame
pub fn encode_command(
    name: &str,
    arg1: &Argument,
    arg2: &Argument,
    client: &ClientIdentity,
) -> Result<Vec<u8>, CodecError> {
    let request = Request {
        action: name,
        client,
        params: Params { arg1, arg2 },
    };
    serde_json::to_vec(&request).map_err(CodecError::Encode)
}

/// Operation tag of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `GetSessionsStatus`: live session report
    SessionStatus,
    Other(String),
}

impl Action {
    fn from_tag(tag: String) -> Self {
        if tag == SESSION_STATUS_ACTION {
            Action::SessionStatus
        } else {
            Action::Other(tag)
        }
    }
}

/// Result code reported by the box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    AccessDenied,
    /// Well-formed but not a code this client knows how to interpret
    Unhandled(String),
}

impl ResponseCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "OK" => ResponseCode::Ok,
            "ACCESS_DENIED" | "DENIED" | "FORBIDDEN" => ResponseCode::AccessDenied,
            other => ResponseCode::Unhandled(other.to_string()),
        }
    }

    /// Codes that are missing, null or not a string are unhandled
    fn from_value(code: &Value) -> Self {
        match code {
            Value::String(code) => Self::from_code(code),
            Value::Null => ResponseCode::Unhandled(String::new()),
            other => ResponseCode::Unhandled(other.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseCode::Ok)
    }
}

/// Live playback information carried by a status report
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSession {
    pub channel_name: String,
    pub speed: f64,
}

impl LiveSession {
    /// Normal-speed playback; any other speed counts as paused
    pub fn is_playing(&self) -> bool {
        self.speed == 1.0
    }
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(rename = "Action")]
    action: String,
    #[serde(rename = "RemoteResponseCode", default)]
    code: Value,
    #[serde(rename = "Data", default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct RawData {
    #[serde(rename = "LiveSession")]
    live_session: RawLiveSession,
}

#[derive(Deserialize)]
struct RawLiveSession {
    #[serde(rename = "LiveItem")]
    live_item: RawLiveItem,
    #[serde(rename = "Speed")]
    speed: f64,
}

#[derive(Deserialize)]
struct RawLiveItem {
    #[serde(rename = "CurrentChannel")]
    current_channel: RawChannel,
}

#[derive(Deserialize)]
struct RawChannel {
    #[serde(rename = "Name")]
    name: String,
}

/// A decoded response frame
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub action: Action,
    pub code: ResponseCode,
    pub data: Option<Value>,
}

impl ResponseRecord {
    pub fn is_session_status(&self) -> bool {
        self.action == Action::SessionStatus
    }

    /// Extract the live session block, if the data carries one
    pub fn live_session(&self) -> Option<LiveSession> {
        let data = self.data.as_ref()?;
        let raw = RawData::deserialize(data).ok()?;
        Some(LiveSession {
            channel_name: raw.live_session.live_item.current_channel.name,
            speed: raw.live_session.speed,
        })
    }
}

/// Decode one response frame
///
/// Unknown, missing or non-string response codes decode successfully as
/// [`ResponseCode::Unhandled`]; only frames that are not a response object
/// with an action tag are rejected.
pub fn decode_response(frame: &[u8]) -> Result<ResponseRecord, CodecError> {
    if frame.iter().all(u8::is_ascii_whitespace) {
        return Err(CodecError::EmptyFrame);
    }
    let raw: RawResponse = serde_json::from_slice(frame).map_err(CodecError::Decode)?;

    Ok(ResponseRecord {
        action: Action::from_tag(raw.action),
        code: ResponseCode::from_value(&raw.code),
        data: raw.data.filter(|d| !d.is_null()),
    })
}
