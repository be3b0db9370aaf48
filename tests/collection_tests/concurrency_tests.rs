//! Tests for concurrent access
//!
//! These tests verify:
//! - Parallel puts on distinct keys all land
//! - Readers never decode a torn value while a writer replaces it
//! - Handles opened separately share the process-wide locks
//! - flush waits for in-flight operations, including nested collections

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use snapkv::{Collection, LockRegistry, SnapError};

use super::{john, setup_temp_collection, temp_config, User};

const VALUE_LEN: usize = 16 * 1024;

#[test]
fn test_parallel_puts_distinct_keys() {
    let (_temp, users) = setup_temp_collection("users");
    let users = Arc::new(users);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let users = Arc::clone(&users);
            thread::spawn(move || {
                let key = format!("user{}", i);
                users.put(&key, &(i as u64)).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(users.total_item(), 16);
    for i in 0..16u64 {
        assert_eq!(users.get::<u64>(&format!("user{}", i)).unwrap(), i);
    }
}

#[test]
fn test_concurrent_put_get_same_key_never_torn() {
    let (_temp, blobs) = setup_temp_collection("blobs");
    blobs.put("blob", &vec![0u64; VALUE_LEN]).unwrap();

    let done = AtomicBool::new(false);

    crossbeam::scope(|s| {
        s.spawn(|_| {
            for round in 1..=50u64 {
                blobs.put("blob", &vec![round; VALUE_LEN]).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        for _ in 0..4 {
            s.spawn(|_| {
                while !done.load(Ordering::SeqCst) {
                    let value: Vec<u64> = blobs.get("blob").unwrap();
                    assert_eq!(value.len(), VALUE_LEN);
                    assert!(value.iter().all(|v| *v == value[0]));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(blobs.get::<Vec<u64>>("blob").unwrap(), vec![50u64; VALUE_LEN]);
}

#[test]
fn test_concurrent_has_never_misses_existing_key() {
    let (_temp, users) = setup_temp_collection("users");
    users.put("john", &john()).unwrap();

    crossbeam::scope(|s| {
        s.spawn(|_| {
            for _ in 0..100 {
                users.put("john", &john()).unwrap();
            }
        });
        s.spawn(|_| {
            for _ in 0..100 {
                // rename replaces the file in one step
                assert!(users.has("john"));
            }
        });
    })
    .unwrap();
}

#[test]
fn test_separate_handles_share_locks() {
    let temp = tempfile::TempDir::new().unwrap();
    let a = Collection::open_with("shared", temp_config(&temp)).unwrap();
    let b = Collection::open_with("shared", temp_config(&temp)).unwrap();

    a.put("john", &john()).unwrap();

    let path = a.item_path("john").unwrap();
    assert!(LockRegistry::global().contains(&path));
    assert_eq!(b.item_path("john").unwrap(), path);
    assert_eq!(b.get::<User>("john").unwrap(), john());
}

#[test]
fn test_flush_during_writes_leaves_only_whole_items() {
    let temp = tempfile::TempDir::new().unwrap();
    let users = Collection::open_with("users", temp_config(&temp)).unwrap();

    crossbeam::scope(|s| {
        for t in 0..4 {
            let users = &users;
            s.spawn(move |_| {
                for i in 0..25 {
                    match users.put(&format!("t{}-{}", t, i), &vec![t as u64; 512]) {
                        Ok(()) => {}
                        // The directory may already be gone
                        Err(SnapError::Io(_)) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            });
        }
        s.spawn(|_| users.flush().unwrap());
    })
    .unwrap();

    let reopened = Collection::open_with("users", temp_config(&temp)).unwrap();
    for key in reopened.list().unwrap() {
        let value: Vec<u64> = reopened.get(&key).unwrap();
        assert_eq!(value.len(), 512);
    }
}

#[test]
fn test_flush_waits_for_gate_holders() {
    let temp = tempfile::TempDir::new().unwrap();
    let users = Collection::open_with("users", temp_config(&temp)).unwrap();
    users.put("john", &john()).unwrap();

    let gate = LockRegistry::global().acquire(users.dir());
    let guard = gate.read();

    crossbeam::scope(|s| {
        let flusher = s.spawn(|_| users.flush());

        thread::sleep(Duration::from_millis(50));
        assert!(users.dir().exists());

        drop(guard);
        flusher.join().unwrap().unwrap();
    })
    .unwrap();

    assert!(!users.dir().exists());
}

#[test]
fn test_parent_flush_waits_for_nested_collection() {
    let temp = tempfile::TempDir::new().unwrap();
    let team = Collection::open_with("team", temp_config(&temp)).unwrap();
    let members = Collection::open_with("team/members", temp_config(&temp)).unwrap();
    members.put("john", &john()).unwrap();

    let gate = LockRegistry::global().acquire(members.dir());
    let guard = gate.read();

    crossbeam::scope(|s| {
        let flusher = s.spawn(|_| team.flush());

        thread::sleep(Duration::from_millis(50));
        assert!(members.dir().exists());
        assert!(members.has("john"));

        drop(guard);
        flusher.join().unwrap().unwrap();
    })
    .unwrap();

    assert!(!team.dir().exists());
    assert!(!members.has("john"));
    assert_eq!(members.total_item(), 0);
}
