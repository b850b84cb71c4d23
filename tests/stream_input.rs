//! Dispatch from raw change-stream payloads.

mod common;

use alert_dispatch::{
    Device, Dispatcher, DispatcherConfig, EventKind, MemoryDirectory, StreamBatch,
};
use common::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn payload() -> serde_json::Value {
    json!({
        "Records": [
            {
                "eventID": "1",
                "eventName": "INSERT",
                "dynamodb": {
                    "Keys": {"PK": {"S": "MotionVideos:acct1:dev1"}, "SK": {"S": "clip.mp4"}},
                    "NewImage": {
                        "PK": {"S": "MotionVideos:acct1:dev1"},
                        "SK": {"S": "clip.mp4"},
                        "GS1-PK": {"S": "MotionVideos:acct1"},
                        "thingName": {"S": "dev1"},
                        "motionVideo": {"S": "clip.mp4"},
                        "trigger": {"S": "motion"},
                        "duration": {"N": "12"},
                        "createTime": {"N": "1700000000"},
                        "updateTime": {"N": "1700000000"},
                        "expiresIn": {"N": "1715552000"}
                    }
                }
            },
            {
                "eventID": "2",
                "eventName": "MODIFY",
                "dynamodb": {
                    "OldImage": {
                        "PK": {"S": "Versions:acct1:latest"},
                        "SK": {"S": "current"},
                        "tag": {"S": "v1.0.0"}
                    },
                    "NewImage": {
                        "PK": {"S": "Versions:acct1:latest"},
                        "SK": {"S": "current"},
                        "tag": {"S": "v1.1.0"},
                        "commit": {"M": {
                            "sha": {"S": "abc123"},
                            "url": {"S": "https://example.com/commits/abc123"}
                        }},
                        "updateTime": {"N": "1700000000"}
                    }
                }
            },
            {
                "eventID": "3",
                "eventName": "REMOVE",
                "dynamodb": {
                    "OldImage": {"PK": {"S": "MotionVideos:acct1:dev1"}, "trigger": {"S": "motion"}}
                }
            },
            {
                "eventID": "4",
                "eventName": "TRUNCATE",
                "dynamodb": {}
            }
        ]
    })
}

fn dispatcher() -> (Dispatcher, Arc<RecordingPublisher>) {
    init_logging();
    let directory = MemoryDirectory::new();
    directory.put_device(ACCOUNT, Device::new("dev1", "Front Door"));
    let publisher = Arc::new(RecordingPublisher::default());
    let dispatcher = Dispatcher::new(
        DispatcherConfig::new(ACCOUNT, BASE_URL),
        Arc::new(directory),
        publisher.clone(),
    )
    .unwrap();
    (dispatcher, publisher)
}

#[test]
fn test_dispatch_json_envelope() {
    let (dispatcher, publisher) = dispatcher();

    let report = dispatcher.dispatch_json(&payload().to_string()).unwrap();

    assert_eq!(report.records, 3);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.published(), 2);

    let subjects: Vec<String> = publisher.captured().into_iter().map(|c| c.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "Motion detected by Front Door".to_string(),
            "New software version available".to_string()
        ]
    );
    assert!(publisher.captured()[1]
        .body
        .contains("https://example.com/commits/abc123"));
}

#[test]
fn test_batch_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(&path, payload().to_string()).unwrap();

    let batch = StreamBatch::from_path(&path).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch.rejected, 1);
    assert_eq!(batch.records[0].event_id.as_deref(), Some("1"));
    assert_eq!(batch.records[2].event_kind, EventKind::Remove);

    let (dispatcher, publisher) = dispatcher();
    let report = dispatcher.dispatch_stream_batch(&batch);
    assert_eq!(report.rejected, 1);
    assert_eq!(publisher.captured().len(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = StreamBatch::from_path(dir.path().join("missing.json"));
    assert!(matches!(result, Err(alert_dispatch::AlertError::Io(_))));
}

#[test]
fn test_undecodable_envelope_is_error() {
    let (dispatcher, publisher) = dispatcher();
    assert!(dispatcher.dispatch_json("{\"Records\": {}}").is_err());
    assert!(publisher.captured().is_empty());
}
