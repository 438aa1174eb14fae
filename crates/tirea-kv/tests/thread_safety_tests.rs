//! Thread safety tests for tirea-kv.
//!
//! Trees are shared across threads by reference and updated concurrently
//! without locks; each thread gets its own new root.

use serde_json::json;
use std::sync::Arc;
use std::thread;
use tirea_kv::{get, path, put, update, Value};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_value_is_send_sync() {
    assert_send_sync::<Value>();
    assert_send_sync::<tirea_kv::KvError>();
    assert_send_sync::<tirea_kv::Accessor>();
}

#[test]
fn test_concurrent_puts_on_shared_root() {
    let root = Arc::new(Value::from(json!({
        "counters": {},
        "shared": {"big": [1, 2, 3, 4, 5]}
    })));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                let key = format!("c{i}");
                let next = put(&root, path!("counters", key.as_str()), i as i64).unwrap();
                assert!(next["shared"].same(&root["shared"]));
                next
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let next = handle.join().unwrap();
        let key = format!("c{i}");
        assert_eq!(get(&next, path!("counters", key.as_str())), Some(&Value::from(i as i64)));
        assert_eq!(next["counters"].as_keyed().unwrap().len(), 1);
    }

    // the shared root saw none of the writes
    assert_eq!(root["counters"].as_keyed().unwrap().len(), 0);
}

#[test]
fn test_threaded_fold_of_updates() {
    let root = Value::from(json!({"hits": 0}));

    let results: Vec<Value> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let root = &root;
                scope.spawn(move || {
                    (0..n).try_fold(root.clone(), |acc, _| {
                        update(&acc, "hits", |v| {
                            Value::from(v.and_then(Value::as_i64).unwrap_or_default() + 1)
                        })
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    for (n, result) in results.iter().enumerate() {
        assert_eq!(result["hits"], n as i64);
    }
    assert_eq!(root["hits"], 0);
}
