//! Tests for ProcessConnector using `sh` as a stand-in source executable
//!
//! `sh -c <script> sh read --config <f> --catalog <f> [--state <f>]` exposes the
//! connector arguments to the script as `$1..$7`.

#![cfg(unix)]

use serde_json::{json, Value};

use airbyte::{AirbyteMessage, AirbyteReader, ConfiguredAirbyteCatalog, ProcessConnector, SourceConnector};
use reader::{ConnectorError, Reader, ReaderError, StreamName};

fn script(body: &str) -> ProcessConnector {
    ProcessConnector::new("sh")
        .with_args(["-c", body, "sh"])
        .with_name("fake-source")
}

fn catalog() -> ConfiguredAirbyteCatalog {
    ConfiguredAirbyteCatalog::for_stream(&StreamName::new("tickets").unwrap())
}

#[tokio::test]
async fn test_reads_protocol_lines_and_skips_noise() {
    let connector = script(
        r#"
echo "Starting source"
echo '{"type":"LOG","log":{"level":"INFO","message":"hello"}}'
echo '{"type":"RECORD","record":{"stream":"tickets","data":{"id":1},"emitted_at":1}}'
echo '{"type":"RECORD","record":{"stream":"tickets","data":{"id":2},"emitted_at":2}}'
"#,
    );

    let messages = connector.read(&json!({}), &catalog(), None).await.unwrap();

    assert_eq!(messages.len(), 3);
    assert!(matches!(messages[0], AirbyteMessage::Log { .. }));
    assert!(matches!(messages[2], AirbyteMessage::Record { .. }));
}

#[tokio::test]
async fn test_undecodable_output_is_skipped_as_noise() {
    let connector = script(
        r#"
printf '\377\376 noise\n'
echo '{"type":"RECORD","record":{"stream":"tickets","data":{"id":1},"emitted_at":1}}'
"#,
    );

    let messages = connector.read(&json!({}), &catalog(), None).await.unwrap();

    assert_eq!(messages.len(), 1);
    assert!(matches!(messages[0], AirbyteMessage::Record { .. }));
}

#[tokio::test]
async fn test_passes_read_command_and_config_file() {
    let connector = script(
        r#"
[ "$1" = "read" ] && [ "$2" = "--config" ] && [ "$4" = "--catalog" ] || exit 9
printf '{"type":"RECORD","record":{"stream":"tickets","data":%s,"emitted_at":1}}\n' "$(cat "$3")"
"#,
    );
    let config = json!({"subdomain": "acme", "credentials": {"credentials": "oauth2.0", "access_token": "t"}});

    let messages = connector.read(&config, &catalog(), None).await.unwrap();

    let AirbyteMessage::Record { record } = &messages[0] else {
        panic!("expected record, got {messages:?}");
    };
    assert_eq!(record.data, config);
}

#[tokio::test]
async fn test_passes_state_file_when_given() {
    let connector = script(
        r#"
[ "$6" = "--state" ] || exit 9
printf '{"type":"STATE","state":{"data":%s}}\n' "$(cat "$7")"
"#,
    );
    let state = json!({"tickets": {"updated_at": "2024-01-01T00:00:00Z"}});

    let messages = connector.read(&json!({}), &catalog(), Some(&state)).await.unwrap();

    let AirbyteMessage::State { state: echoed } = &messages[0] else {
        panic!("expected state, got {messages:?}");
    };
    assert_eq!(echoed.data.as_ref(), Some(&state));
}

#[tokio::test]
async fn test_non_zero_exit_reports_stderr_tail() {
    let connector = script("echo 'Traceback: boom' >&2; exit 3");

    let err = connector.read(&json!({}), &catalog(), None).await.unwrap_err();

    match err {
        ConnectorError::Failed { connector, message } => {
            assert_eq!(connector, "fake-source");
            assert!(message.contains("Traceback: boom"), "message: {message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_stderr_still_reported() {
    let connector = script("printf '\\377 Traceback: boom\\n' >&2; exit 2");

    let err = connector.read(&json!({}), &catalog(), None).await.unwrap_err();

    match err {
        ConnectorError::Failed { message, .. } => {
            assert!(message.contains("Traceback: boom"), "message: {message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_zero_exit_prefers_error_trace() {
    let connector = script(
        r#"
echo '{"type":"TRACE","trace":{"type":"ERROR","emitted_at":1.0,"error":{"message":"Invalid API token","failure_type":"config_error"}}}'
exit 1
"#,
    );

    let err = connector.read(&json!({}), &catalog(), None).await.unwrap_err();

    assert_eq!(
        err,
        ConnectorError::Rejected {
            connector: "fake-source".into(),
            message: "Invalid API token".into(),
        }
    );
}

#[tokio::test]
async fn test_malformed_message_is_protocol_error() {
    let connector = script(r#"echo '{"type":"RECORD","record":{"data":{}}}'"#);

    let err = connector.read(&json!({}), &catalog(), None).await.unwrap_err();

    assert!(matches!(err, ConnectorError::Protocol { .. }));
}

#[tokio::test]
async fn test_missing_program_is_unavailable() {
    let connector = ProcessConnector::new("/nonexistent/source-zendesk-support");

    let err = connector.read(&json!({}), &catalog(), None).await.unwrap_err();

    assert!(matches!(err, ConnectorError::Unavailable { .. }));
}

#[tokio::test]
async fn test_reader_over_process_connector() {
    let connector = script(
        r#"
echo '{"type":"RECORD","record":{"stream":"tickets","data":{"id":11,"subject":"A"},"emitted_at":1}}'
echo '{"type":"RECORD","record":{"stream":"tickets","data":{"id":12,"subject":"B"},"emitted_at":2}}'
echo '{"type":"STATE","state":{"type":"STREAM","stream":{"stream_descriptor":{"name":"tickets"},"stream_state":{"updated_at":2}}}}'
"#,
    );
    let reader = AirbyteReader::new(connector, json!({}), StreamName::new("tickets").unwrap()).unwrap();

    let docs = reader.load_data().await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].id().as_str(), "12");
    let state: Value = reader.last_state().unwrap();
    assert_eq!(state[0]["stream"]["stream_state"]["updated_at"], 2);
}

#[tokio::test]
async fn test_reader_surfaces_process_failure() {
    let connector = script("exit 1");
    let reader = AirbyteReader::new(connector, json!({}), StreamName::new("tickets").unwrap()).unwrap();

    let result = reader.load_data().await;

    assert!(matches!(
        result,
        Err(ReaderError::Connector(ConnectorError::Failed { .. }))
    ));
}
