// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use tempfile::TempDir;
use tfr_adapters::params::{SSH_HOST, SSH_KEY, SSH_USERNAME};
use tfr_adapters::{
    FakeRemote, MemoryObjectStore, RemotePaths, StaticParameterStore, TerraformParameters,
};
use tfr_core::{OperationStatus, SequentialIdGen};

const MODEL: &str = r#"{
    "identifier": "web",
    "configurationContent": "terraform {}\n",
    "logBucketUrl": "https://s3.console.aws.amazon.com/s3/buckets/logs"
}"#;

fn deps(remote: &FakeRemote) -> EngineDeps {
    let params = StaticParameterStore::new();
    params.set(SSH_HOST, "tf.example.com").set(SSH_USERNAME, "ubuntu").set(SSH_KEY, "key");
    EngineDeps::new(
        Arc::new(remote.clone()),
        TerraformParameters::new(Arc::new(params)),
        Arc::new(MemoryObjectStore::new()),
        RemotePaths::default(),
        Arc::new(SequentialIdGen::new()),
    )
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn args(operation: OperationKind, model: PathBuf, context: Option<PathBuf>) -> InvokeArgs {
    InvokeArgs { operation, model, context, pretty: false }
}

#[tokio::test]
async fn first_invocation_without_context() {
    let dir = TempDir::new().unwrap();
    let remote = FakeRemote::new();
    let model = write(&dir, "model.json", MODEL);

    let event = run(&args(OperationKind::Create, model, None), &deps(&remote)).await.unwrap();

    assert_eq!(event.status, OperationStatus::InProgress);
    assert_eq!(remote.commands(), vec!["mkdir -p ~/tfdata/web"]);
}

#[tokio::test]
async fn context_from_previous_event_resumes() {
    let dir = TempDir::new().unwrap();
    let remote = FakeRemote::new();
    let model = write(&dir, "model.json", MODEL);
    let context = write(
        &dir,
        "context.json",
        r#"{"stepId": "DELETE_SYNC_CLEANUP", "commandRequestId": "abc123", "lastDelaySeconds": 4}"#,
    );

    let event =
        run(&args(OperationKind::Delete, model, Some(context)), &deps(&remote)).await.unwrap();

    assert_eq!(event.status, OperationStatus::InProgress);
    assert_eq!(remote.commands(), vec!["rm -rf ~/tfdata/web"]);
    let ctx = event.callback_context.unwrap();
    assert_eq!(ctx.step_id.as_deref(), Some("DELETE_DONE"));
    assert_eq!(ctx.command_request_id.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn blank_context_file_is_a_first_invocation() {
    let dir = TempDir::new().unwrap();
    let remote = FakeRemote::new();
    let model = write(&dir, "model.json", MODEL);
    let context = write(&dir, "context.json", "null\n");

    let event =
        run(&args(OperationKind::Create, model, Some(context)), &deps(&remote)).await.unwrap();

    let ctx = event.callback_context.unwrap();
    assert_eq!(ctx.step_id.as_deref(), Some("CREATE_SYNC_CONFIG"));
}

#[tokio::test]
async fn malformed_model_names_the_file() {
    let dir = TempDir::new().unwrap();
    let model = write(&dir, "model.json", "{ not json");

    let err = run(&args(OperationKind::Create, model, None), &deps(&FakeRemote::new()))
        .await
        .unwrap_err();

    let text = format!("{err:#}");
    assert!(text.contains("reading resource model"), "{text}");
    assert!(text.contains("model.json"), "{text}");
}

#[tokio::test]
async fn missing_model_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("absent.json");

    let result = run(&args(OperationKind::Update, model, None), &deps(&FakeRemote::new())).await;

    assert!(result.is_err());
}

#[test]
fn render_omits_absent_fields() {
    let event = ProgressEvent::success(ResourceModel {
        identifier: Some("web".into()),
        ..ResourceModel::default()
    });

    let json = render(&event, false).unwrap();

    assert_eq!(json, r#"{"status":"SUCCESS","resourceModel":{"identifier":"web"}}"#);
}

#[test]
fn failed_status_maps_to_exit_code() {
    assert!(ExitError::for_status(OperationStatus::Success).is_none());
    assert!(ExitError::for_status(OperationStatus::InProgress).is_none());
    let exit = ExitError::for_status(OperationStatus::Failed).unwrap();
    assert_eq!(exit.code, crate::exit_error::EXIT_OPERATION_FAILED);
}
