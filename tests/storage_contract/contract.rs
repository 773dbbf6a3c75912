//! The shared contract, run against both backends.

use crate::*;
use stepseal::prelude::*;

fn kv(dir: &tempfile::TempDir) -> KvStore<PipelineEvent> {
    KvStore::open(dir.path().join("records")).unwrap()
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

#[test]
fn test_memory_store_then_list() {
    assert_store_then_list(&MemoryStore::new());
}

#[test]
fn test_memory_duplicate_id_ignored() {
    assert_duplicate_id_ignored(&MemoryStore::new());
}

#[test]
fn test_memory_duplicate_id_is_global() {
    assert_duplicate_id_is_global(&MemoryStore::new());
}

#[test]
fn test_memory_scope_isolation() {
    assert_scope_isolation(&MemoryStore::new());
}

#[test]
fn test_memory_unknown_scope_empty() {
    assert_unknown_scope_empty(&MemoryStore::new());
}

#[test]
fn test_memory_clear_resets() {
    assert_clear_resets(&MemoryStore::new());
}

#[test]
fn test_memory_multi_scope_fanout() {
    assert_multi_scope_fanout(&MemoryStore::new());
}

// =============================================================================
// SLED BACKEND
// =============================================================================

#[test]
fn test_kv_store_then_list() {
    let dir = tempfile::tempdir().unwrap();
    assert_store_then_list(&kv(&dir));
}

#[test]
fn test_kv_duplicate_id_ignored() {
    let dir = tempfile::tempdir().unwrap();
    assert_duplicate_id_ignored(&kv(&dir));
}

#[test]
fn test_kv_duplicate_id_is_global() {
    let dir = tempfile::tempdir().unwrap();
    assert_duplicate_id_is_global(&kv(&dir));
}

#[test]
fn test_kv_scope_isolation() {
    let dir = tempfile::tempdir().unwrap();
    assert_scope_isolation(&kv(&dir));
}

#[test]
fn test_kv_unknown_scope_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert_unknown_scope_empty(&kv(&dir));
}

#[test]
fn test_kv_clear_resets() {
    let dir = tempfile::tempdir().unwrap();
    assert_clear_resets(&kv(&dir));
}

#[test]
fn test_kv_multi_scope_fanout() {
    let dir = tempfile::tempdir().unwrap();
    assert_multi_scope_fanout(&kv(&dir));
}
