//! Property tests: round-trip, identity preservation and sharing.

use proptest::prelude::*;
use tirea_kv::{get, put, Key, Path, Value};

fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        3 => prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(Key::from),
        1 => (0usize..4).prop_map(Key::Index),
    ]
}

fn path_strategy() -> impl Strategy<Value = Path> {
    prop::collection::vec(key_strategy(), 1..5).prop_map(Path::from_keys)
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

/// A tree grown by a sequence of writes into an empty record.
fn tree_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec((path_strategy(), leaf_strategy()), 0..12).prop_map(|writes| {
        writes
            .into_iter()
            .fold(Value::empty_keyed(), |root, (path, leaf)| {
                // writes whose path runs through an array with a named key fail; skip them
                put(&root, path, leaf).unwrap_or(root)
            })
    })
}

proptest! {
    #[test]
    fn prop_round_trip(root in tree_strategy(), path in path_strategy(), leaf in leaf_strategy()) {
        if let Ok(next) = put(&root, &path, leaf.clone()) {
            prop_assert_eq!(get(&next, &path), Some(&leaf));
        }
    }

    #[test]
    fn prop_rewriting_current_value_keeps_root(root in tree_strategy(), path in path_strategy()) {
        if let Some(current) = get(&root, &path).cloned() {
            let next = put(&root, &path, current).unwrap();
            prop_assert!(next.same(&root));
        }
    }

    #[test]
    fn prop_siblings_are_shared(root in tree_strategy(), path in path_strategy(), leaf in leaf_strategy()) {
        let Some(first) = path.first().map(|k| k.record_key().into_owned()) else { return Ok(()); };
        let Ok(next) = put(&root, &path, leaf) else { return Ok(()); };
        if let Some(entries) = root.as_keyed() {
            for (key, value) in entries.iter().filter(|(k, _)| **k != first) {
                let after = next.child(key);
                prop_assert!(after.is_some_and(|v| v.same(value)));
            }
        }
    }

    #[test]
    fn prop_put_never_mutates_input(root in tree_strategy(), path in path_strategy(), leaf in leaf_strategy()) {
        let before = format!("{root:?}");
        let _ = put(&root, &path, leaf);
        prop_assert_eq!(before, format!("{root:?}"));
    }

    #[test]
    fn prop_empty_path_always_fails(root in tree_strategy(), leaf in leaf_strategy()) {
        let err = put(&root, Path::root(), leaf).unwrap_err();
        prop_assert!(err.is_validation());
    }
}
