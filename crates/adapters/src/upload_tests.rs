// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::remote::{CommandOutput, FakeRemote, RemoteCall};
use serde_json::json;
use std::sync::Arc;

const FILE: &str = "terraform-upload-abc123-q7k2.file";

fn uploader() -> (FakeRemote, ConfigurationUploader) {
    let remote = FakeRemote::new();
    let ssh = SshToolbox::new(Arc::new(remote.clone()));
    (remote, ConfigurationUploader::new(ssh, RemotePaths::default(), "r1"))
}

fn upload<'a>(vars: &'a BTreeMap<String, Value>, first_time: bool) -> Upload<'a> {
    Upload { contents: b"resource \"null_resource\" \"x\" {}", variables: vars, first_time, file_name: FILE }
}

#[tokio::test]
async fn text_configuration_is_moved_into_workdir() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "text/plain\n");
    let vars = BTreeMap::new();

    up.upload(upload(&vars, true)).await.unwrap();

    assert_eq!(
        remote.commands(),
        vec![
            "mkdir -p /tmp/r1".to_string(),
            format!("file --brief --mime-type /tmp/r1/{FILE}"),
            format!("mv /tmp/r1/{FILE} ~/tfdata/r1/configuration.tf"),
            "rm -rf /tmp/r1".to_string(),
        ]
    );
    let uploads = remote.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "/tmp/r1");
    assert_eq!(uploads[0].1, FILE);
}

#[tokio::test]
async fn zip_archive_is_unpacked_and_scratch_removed() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "application/zip");
    let vars = BTreeMap::new();

    up.upload(upload(&vars, true)).await.unwrap();

    let commands = remote.commands();
    assert!(commands.contains(&format!("unzip -o /tmp/r1/{FILE} -d ~/tfdata/r1")));
    assert!(commands.iter().all(|c| !c.starts_with("mv ")));
    assert_eq!(commands.last().map(String::as_str), Some("rm -rf /tmp/r1"));
}

#[tokio::test]
async fn unknown_content_type_still_removes_scratch() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "image/png\n");
    let vars = BTreeMap::new();

    let err = up.upload(upload(&vars, true)).await.unwrap_err();

    assert!(matches!(&err, UploadError::UnknownContentType(t) if t == "image/png"));
    assert_eq!(err.to_string(), "Unknown content type image/png");
    assert_eq!(remote.commands().last().map(String::as_str), Some("rm -rf /tmp/r1"));
}

#[tokio::test]
async fn variables_are_written_as_sorted_pretty_json() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "text/plain");
    let vars: BTreeMap<String, Value> =
        [("zone".to_string(), json!("a")), ("count".to_string(), json!(2))].into_iter().collect();

    up.upload(upload(&vars, true)).await.unwrap();

    let uploads = remote.uploads();
    assert_eq!(uploads.len(), 2);
    let (dir, name, body) = &uploads[1];
    assert_eq!(dir, "/tmp/r1");
    assert_eq!(name, "cfn-r1.auto.tfvars.json");
    assert_eq!(String::from_utf8_lossy(body), "{\n  \"count\": 2,\n  \"zone\": \"a\"\n}");
    assert!(remote
        .commands()
        .contains(&"mv /tmp/r1/cfn-r1.auto.tfvars.json ~/tfdata/r1/cfn-r1.auto.tfvars.json".to_string()));
}

#[tokio::test]
async fn empty_variables_remove_stale_file_on_replace_only() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "text/plain");
    let vars = BTreeMap::new();

    up.upload(upload(&vars, true)).await.unwrap();
    assert!(remote.commands_matching("rm -f").is_empty());

    remote.clear_calls();
    up.upload(upload(&vars, false)).await.unwrap();
    assert_eq!(
        remote.commands_matching("rm -f"),
        vec!["rm -f ~/tfdata/r1/cfn-r1.auto.tfvars.json"]
    );
}

#[tokio::test]
async fn failed_move_is_a_remote_error_and_scratch_is_removed() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "text/plain");
    remote.on("mv ", [CommandOutput::new(1, "", "mv: cannot move")]);
    let vars = BTreeMap::new();

    let err = up.upload(upload(&vars, true)).await.unwrap_err();

    assert!(matches!(err, UploadError::Remote(RemoteError::CommandFailed { .. })));
    assert_eq!(
        remote.calls().last(),
        Some(&RemoteCall::Exec("rm -rf /tmp/r1".to_string()))
    );
}

#[tokio::test]
async fn failed_scratch_cleanup_fails_the_upload() {
    let (remote, up) = uploader();
    remote.on_stdout("file --brief", "text/plain");
    remote.on("rm -rf", [CommandOutput::new(1, "", "busy")]);
    let vars = BTreeMap::new();

    assert!(up.upload(upload(&vars, true)).await.is_err());
}
