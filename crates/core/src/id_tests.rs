// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::is_valid_identifier;

#[test]
fn nanoid_tokens_use_safe_alphabet() {
    let id_gen = NanoIdGen;
    let token = id_gen.token(32);
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
}

#[test]
fn nanoid_command_request_ids_differ() {
    let id_gen = NanoIdGen;
    let a = id_gen.command_request_id();
    let b = id_gen.command_request_id();
    assert_eq!(a.len(), COMMAND_REQUEST_ID_LEN);
    assert_ne!(a, b);
}

#[test]
fn minted_resource_identifier_is_valid() {
    let id = NanoIdGen.resource_identifier();
    assert!(id.starts_with(RESOURCE_ID_PREFIX));
    assert!(is_valid_identifier(&id));
}

#[test]
fn sequential_gen_is_deterministic_and_padded() {
    let id_gen = SequentialIdGen::new();
    assert_eq!(id_gen.command_request_id(), "t10000");
    assert_eq!(id_gen.token(4), "t200");
    assert_eq!(id_gen.token(1), "t3");
}

#[test]
fn sequential_gen_clones_share_counter() {
    let id_gen = SequentialIdGen::new();
    let clone = id_gen.clone();
    assert_eq!(id_gen.token(2), "t1");
    assert_eq!(clone.token(2), "t2");
}
