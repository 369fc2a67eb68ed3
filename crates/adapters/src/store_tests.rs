// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[tokio::test]
async fn local_store_round_trips_nested_keys() {
    let dir = TempDir::new().unwrap();
    let store = LocalObjectStore::new(dir.path());

    store.put("logs", "r1/abc123/cfn-log.txt", b"hello".to_vec()).await.unwrap();
    assert_eq!(store.get("logs", "r1/abc123/cfn-log.txt").await.unwrap(), b"hello");
    assert!(dir.path().join("logs/r1/abc123/cfn-log.txt").exists());
}

#[tokio::test]
async fn local_store_missing_object() {
    let dir = TempDir::new().unwrap();
    let store = LocalObjectStore::new(dir.path());
    let err = store.get("logs", "nope.txt").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[parameterized(
    parent_escape = { "logs", "../etc/passwd" },
    absolute_key = { "logs", "/etc/passwd" },
    empty_key = { "logs", "" },
    empty_bucket = { "", "a.txt" },
    nested_bucket = { "a/b", "c.txt" },
)]
fn local_store_rejects_escaping_keys(bucket: &str, key: &str) {
    let store = LocalObjectStore::new("/srv/objects");
    assert!(matches!(store.path(bucket, key), Err(StoreError::InvalidKey { .. })));
}

#[tokio::test]
async fn append_creates_then_extends() {
    let dir = TempDir::new().unwrap();
    let store = LocalObjectStore::new(dir.path());
    store.append("logs", "k.txt", "one\n").await.unwrap();
    store.append("logs", "k.txt", "two\n").await.unwrap();
    assert_eq!(store.get("logs", "k.txt").await.unwrap(), b"one\ntwo\n");
}

#[tokio::test]
async fn memory_store_lists_and_fails_on_demand() {
    let store = MemoryObjectStore::new();
    store.insert("b", "z.txt", "z");
    store.append("b", "a.txt", "a").await.unwrap();
    assert_eq!(store.keys("b"), vec!["a.txt", "z.txt"]);
    assert_eq!(store.text("b", "a.txt").as_deref(), Some("a"));

    store.fail_writes();
    assert!(store.put("b", "c.txt", Vec::new()).await.is_err());
}
