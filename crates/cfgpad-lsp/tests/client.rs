//! Client tests against `cat`, which echoes every framed message back.
//!
//! An echoed request looks like a server request, so the client answers it; the echo of that
//! answer is then the response to the original request id.
#![cfg(unix)]

use cfgpad_core::SchemaSettings;
use cfgpad_lsp::{LspClient, LspError, LspInbound, yaml_settings};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::process::Command;
use std::time::{Duration, Instant};

fn echo_client() -> LspClient {
    LspClient::spawn(Command::new("cat")).expect("spawn cat")
}

#[test]
fn test_configuration_request_is_answered_per_section() {
    let mut client = echo_client();
    client.set_settings(yaml_settings(&[SchemaSettings::new(
        "http://localhost/api/v1/cfg/schema",
        vec!["config.yaml".to_string()],
    )]));

    let id = client
        .request(
            "workspace/configuration",
            json!({ "items": [ { "section": "yaml.validate" }, { "section": "yaml.missing" }, {} ] }),
        )
        .unwrap();
    let (response, backlog) = client
        .wait_for_response(id, Duration::from_secs(5))
        .unwrap();

    assert!(backlog.is_empty());
    let result = response.get("result").unwrap().as_array().unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0], json!(true));
    assert_eq!(result[1], json!(null));
    assert_eq!(
        result[2].pointer("/yaml/schemas/http:~1~1localhost~1api~1v1~1cfg~1schema"),
        Some(&json!(["config.yaml"]))
    );
}

#[test]
fn test_notifications_race_into_backlog() {
    let mut client = echo_client();
    client
        .notify("window/logMessage", json!({ "message": "hello" }))
        .unwrap();
    let id = client
        .request("workspace/workspaceFolders", json!(null))
        .unwrap();

    let (response, backlog) = client
        .wait_for_response(id, Duration::from_secs(5))
        .unwrap();
    assert_eq!(response.get("result"), Some(&json!([])));
    assert_eq!(backlog.len(), 1);
    assert_eq!(
        backlog[0].pointer("/params/message"),
        Some(&json!("hello"))
    );
}

#[test]
fn test_try_recv_polls_without_blocking() {
    let client = echo_client();
    client.notify("ping", json!({ "n": 1 })).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let msg = loop {
        if let Some(LspInbound::Message(msg)) = client.try_recv() {
            break msg;
        }
        assert!(Instant::now() < deadline, "no echo received");
        std::thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(msg.get("method"), Some(&json!("ping")));
    assert!(client.try_recv().is_none());
}

#[test]
fn test_spawn_failure_names_the_command() {
    let err = LspClient::spawn(Command::new("cfgpad-no-such-language-server")).err();
    match err {
        Some(err @ LspError::Spawn { .. }) => {
            assert!(err.is_not_found());
            assert!(err.to_string().contains("cfgpad-no-such-language-server"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}
