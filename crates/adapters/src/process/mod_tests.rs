// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::remote::FakeRemote;
use std::sync::Arc;

#[test]
fn command_lines_never_prompt() {
    for command in [TerraformCommand::Init, TerraformCommand::Apply, TerraformCommand::Destroy] {
        let line = command.command_line();
        assert!(line.starts_with(&format!("terraform {command} ")));
        assert!(line.contains("-input=false"));
        assert!(line.contains("-lock=true"));
    }
    assert!(TerraformCommand::Apply.command_line().ends_with("-auto-approve"));
    assert!(!TerraformCommand::Init.command_line().contains("-auto-approve"));
}

#[tokio::test]
async fn factory_selects_backend() {
    let remote = FakeRemote::new();
    let ssh = SshToolbox::new(Arc::new(remote.clone()));
    let paths = RemotePaths::default();

    let nohup =
        detached_process(ProcessManager::Nohup, ssh.clone(), &paths, "r1", TerraformCommand::Init);
    nohup.start().await.unwrap();
    let systemd =
        detached_process(ProcessManager::Systemd, ssh, &paths, "r1", TerraformCommand::Init);
    systemd.start().await.unwrap();

    let commands = remote.commands();
    assert!(commands[0].contains("nohup"));
    assert!(commands[0].starts_with("cd ~/tfdata/r1 "));
    assert!(commands[1].contains("systemd-run --user --unit=tfr-init-r1"));
    assert_eq!(nohup.command(), TerraformCommand::Init);
}
