//! Integration tests for the remote session
//!
//! These tests drive `Remote` over the scripted transport to check lazy
//! connection handling and failure classification without a real box.

use std::io;
use std::time::Duration;

use rstest::rstest;
use serde_json::Value;
use sfrtv_api::{
    Action, ClientIdentity, Command, Key, Remote, RemoteConfig, RemoteError, ResponseCode,
    TransportError,
};
use stb_transport::mock::{Reply, ScriptedConnector};

const OK_ACK: &str = r#"{"Action":"ButtonEvent","RemoteResponseCode":"OK"}"#;
const STATUS_PLAYING: &str = r#"{"Action":"GetSessionsStatus","RemoteResponseCode":"OK","Data":{"LiveSession":{"LiveItem":{"CurrentChannel":{"Name":"BBC1"}},"Speed":1}}}"#;

fn config() -> RemoteConfig {
    RemoteConfig {
        client: ClientIdentity {
            name: "HomeAssistant".to_string(),
            description: "Salon".to_string(),
            id: "ha.component.sfrtv".to_string(),
        },
        host: "192.168.1.20".to_string(),
        port: 7682,
        timeout: Duration::from_millis(100),
    }
}

fn remote(connector: &ScriptedConnector) -> Remote<ScriptedConnector> {
    Remote::with_connector(config(), connector.clone())
}

#[test]
fn test_connects_lazily() {
    let connector = ScriptedConnector::new();
    let remote = remote(&connector);

    assert!(!remote.is_connected());
    assert_eq!(connector.connect_count(), 0);
}

#[test]
fn test_control_sends_encoded_command() {
    let connector = ScriptedConnector::new();
    connector.push_frame(OK_ACK);
    let mut remote = remote(&connector);

    remote.control(&Command::ButtonEvent(Key::VolumeUp)).unwrap();

    let sent = connector.sent_frames();
    assert_eq!(sent.len(), 1);
    let request: Value = serde_json::from_slice(&sent[0]).unwrap();
    assert_eq!(request["Action"], "BUTTONEVENT");
    assert_eq!(request["Params"]["Arg1"], "VUP");
    assert_eq!(request["Client"]["Description"], "Salon");
    assert!(remote.is_connected());
}

#[test]
fn test_connection_is_reused_across_round_trips() {
    let connector = ScriptedConnector::new();
    connector
        .push_frame(OK_ACK)
        .push_frame(STATUS_PLAYING)
        .push_frame(OK_ACK)
        .push_frame(STATUS_PLAYING);
    let mut remote = remote(&connector);

    for _ in 0..2 {
        remote.control(&Command::GetInfo).unwrap();
        remote.read_response().unwrap();
    }

    assert_eq!(connector.connect_count(), 1);
}

#[test]
fn test_read_response_decodes_status() {
    let connector = ScriptedConnector::new();
    connector.push_frame(OK_ACK).push_frame(STATUS_PLAYING);
    let mut remote = remote(&connector);

    remote.control(&Command::GetInfo).unwrap();
    let record = remote.read_response().unwrap();

    assert_eq!(record.action, Action::SessionStatus);
    assert_eq!(record.code, ResponseCode::Ok);
    let live = record.live_session().unwrap();
    assert_eq!(live.channel_name, "BBC1");
    assert!(live.is_playing());
}

#[rstest]
#[case("ACCESS_DENIED")]
#[case("DENIED")]
#[case("FORBIDDEN")]
fn test_access_denied(#[case] code: &str) {
    let connector = ScriptedConnector::new();
    connector.push_frame(format!(
        r#"{{"Action":"ButtonEvent","RemoteResponseCode":"{}"}}"#,
        code
    ));
    let mut remote = remote(&connector);

    let err = remote.control(&Command::ButtonEvent(Key::Ok)).unwrap_err();
    assert!(matches!(err, RemoteError::AccessDenied));
}

#[test]
fn test_unknown_code_is_unhandled_response() {
    let connector = ScriptedConnector::new();
    connector.push_frame(r#"{"Action":"ButtonEvent","RemoteResponseCode":"BUSY"}"#);
    let mut remote = remote(&connector);

    match remote.control(&Command::ButtonEvent(Key::Ok)) {
        Err(RemoteError::UnhandledResponse(code)) => assert_eq!(code, "BUSY"),
        other => panic!("Expected UnhandledResponse, got {:?}", other),
    }
}

#[test]
fn test_peer_close_is_connection_closed() {
    let connector = ScriptedConnector::new();
    connector.push_reply(Reply::Closed);
    let mut remote = remote(&connector);

    let err = remote.control(&Command::GetInfo).unwrap_err();
    assert!(matches!(err, RemoteError::ConnectionClosed));
    assert!(!remote.is_connected());
}

#[test]
fn test_connect_failure_propagates() {
    let connector = ScriptedConnector::new();
    connector.fail_connects(1);
    let mut remote = remote(&connector);

    let err = remote.control(&Command::GetInfo).unwrap_err();
    assert!(matches!(
        err,
        RemoteError::Transport(TransportError::Connect { .. })
    ));
    assert!(connector.sent_frames().is_empty());
}

#[test]
fn test_broken_pipe_keeps_write_kind() {
    let connector = ScriptedConnector::new();
    connector.fail_next_send(io::ErrorKind::BrokenPipe);
    let mut remote = remote(&connector);

    match remote.control(&Command::ButtonEvent(Key::Power)) {
        Err(RemoteError::Transport(e)) => assert!(e.is_broken_pipe()),
        other => panic!("Expected broken pipe, got {:?}", other),
    }
}

#[test]
fn test_transport_failure_drops_connection() {
    let connector = ScriptedConnector::new();
    connector.push_reply(Reply::Timeout).push_frame(OK_ACK);
    let mut remote = remote(&connector);

    assert!(matches!(
        remote.control(&Command::GetInfo),
        Err(RemoteError::Transport(TransportError::Timeout))
    ));
    assert!(!remote.is_connected());

    remote.control(&Command::GetInfo).unwrap();
    assert_eq!(connector.connect_count(), 2);
}

#[test]
fn test_malformed_ack_is_codec_error() {
    let connector = ScriptedConnector::new();
    connector.push_frame("<html>");
    let mut remote = remote(&connector);

    assert!(matches!(
        remote.control(&Command::GetInfo),
        Err(RemoteError::Codec(_))
    ));
}

#[test]
fn test_close_releases_connection() {
    let connector = ScriptedConnector::new();
    connector.push_frame(OK_ACK);
    let mut remote = remote(&connector);

    remote.control(&Command::GetInfo).unwrap();
    remote.close();

    assert!(!remote.is_connected());
    assert_eq!(connector.close_count(), 1);
}
