//! End-to-end store scenarios, including the blocking paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use latchkv::store::{Key, LockId, LockStore, StoreError, Value};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};

#[tokio::test]
async fn test_basic_round_trip() {
    let store = LockStore::new("scenarios");
    let lock_id = store.put_and_lock(Key::from("k"), Value::from("v")).await;
    assert_eq!(lock_id, LockId(1));

    let value = store.get(lock_id, Key::from("k")).await.unwrap();
    assert_eq!(value, Value::from("v"));

    store.release(lock_id).await.unwrap();
    let err = store.release(lock_id).await.unwrap_err();
    assert_eq!(err, StoreError::LockIdNotFound { lock_id });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_put_blocks_until_holder_releases() {
    let store = LockStore::new("scenarios");
    let first = store.put_and_lock(Key::from("k"), Value::from("a")).await;
    assert_eq!(first, LockId(1));

    let writer = store.clone();
    let mut second =
        tokio::spawn(async move { writer.put_and_lock(Key::from("k"), Value::from("b")).await });

    // The second writer must not complete while the lock is held.
    let poll = timeout(Duration::from_millis(100), &mut second).await;
    assert!(poll.is_err(), "second put completed while the lock was held");

    store.release(first).await.unwrap();

    let second_id = second.await.unwrap();
    assert_eq!(second_id, LockId(2));
    assert_eq!(
        store.direct_get(&Key::from("k")).await,
        Some(Value::from("b"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reservation_returns_once_released() {
    let store = LockStore::new("scenarios");
    let lock_id = store.put_and_lock(Key::from("k"), Value::from("v")).await;
    assert_eq!(lock_id, LockId(1));

    let releaser = store.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        releaser.release(lock_id).await.unwrap();
    });

    let (reserved_id, value) = store.get_and_lock(Key::from("k")).await.unwrap();
    assert_eq!(reserved_id, LockId(2));
    assert_eq!(value, Value::from("v"));
}

#[tokio::test]
async fn test_reservation_does_not_create_keys() {
    let store = LockStore::new("scenarios");
    let err = store.get_and_lock(Key::from("missing")).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::KeyNotFound {
            key: Key::from("missing")
        }
    );
    assert_eq!(store.direct_get(&Key::from("missing")).await, None);
}

#[tokio::test]
async fn test_update_checks_key_before_lock_id() {
    let store = LockStore::new("scenarios");
    // Both preconditions fail here; the key check wins.
    let err = store
        .update(LockId(0), Key::from("ghost"), Value::from("x"), true)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::KeyNotFound {
            key: Key::from("ghost")
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_same_key_critical_sections_never_overlap() {
    let store = LockStore::new("scenarios");
    let in_section = Arc::new(AtomicBool::new(false));

    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let store = store.clone();
        let in_section = in_section.clone();
        tasks.spawn(async move {
            let lock_id = store
                .put_and_lock(Key::from("shared"), Value::from(format!("v{i}")))
                .await;
            assert!(
                !in_section.swap(true, Ordering::SeqCst),
                "two holders inside the critical section"
            );
            sleep(Duration::from_millis(5)).await;
            in_section.store(false, Ordering::SeqCst);
            store.release(lock_id).await.unwrap();
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_mints_are_unique() {
    let store = LockStore::new("scenarios");
    let mut tasks = JoinSet::new();
    for i in 0..16 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .put_and_lock(Key::from(format!("key{i}")), Value::from("v"))
                .await
        });
    }

    let mut ids = Vec::new();
    while let Some(result) = tasks.join_next().await {
        ids.push(result.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16, "duplicate lock ids were minted");
}
