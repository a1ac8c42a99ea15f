use locker::{
    Driver, DriverError, DriverResult, Entries, Keys, Locker, LockerError, MemoryDriver,
    PutValue, Result, Retrieved, StorageQuota,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::thread;

/// Helper to create a locker over the default volatile drivers
fn create_test_locker() -> Locker {
    Locker::builder().isolated().build().unwrap()
}

#[test]
fn test_put_then_get_returns_value() -> Result<()> {
    let locker = create_test_locker();

    let values = [
        json!("someVal"),
        json!(42),
        json!(3.5),
        json!(true),
        json!(null),
        json!([1, "two", { "three": 3 }]),
        json!({ "foo": "bar", "bar": { "baz": [true, false] } }),
    ];

    for (i, value) in values.iter().enumerate() {
        let key = format!("key{i}");
        assert!(locker.put(key.as_str(), value.clone())?);
        assert_eq!(locker.get(&key)?.as_ref(), Some(value));
    }

    Ok(())
}

#[test]
fn test_has_lifecycle() -> Result<()> {
    let locker = create_test_locker();

    // Absent before any put
    assert!(!locker.has("k")?);

    locker.put("k", "v")?;
    assert!(locker.has("k")?);

    locker.forget("k")?;
    assert!(!locker.has("k")?);

    Ok(())
}

#[test]
fn test_second_add_is_a_noop() -> Result<()> {
    let locker = create_test_locker();

    assert!(locker.add("k", "v1")?);
    assert!(!locker.add("k", "v2")?);
    assert_eq!(locker.get("k")?, Some(json!("v1")));

    Ok(())
}

#[test]
fn test_pull_returns_and_removes() -> Result<()> {
    let locker = create_test_locker();

    locker.put("k", json!({ "a": 1 }))?;
    assert_eq!(locker.pull("k", None)?, Retrieved::Item(Some(json!({ "a": 1 }))));
    assert!(!locker.has("k")?);

    Ok(())
}

#[test]
fn test_falsy_defaults_are_honored() -> Result<()> {
    let locker = create_test_locker();

    assert_eq!(locker.get_or("missing", "default")?, json!("default"));
    assert_eq!(locker.get_or("missing", false)?, json!(false));
    assert_eq!(locker.get_or("missing", 0)?, json!(0));
    assert_eq!(
        locker.retrieve("missing", Some(json!("")))?,
        Retrieved::Item(Some(json!("")))
    );

    Ok(())
}

#[test]
fn test_read_modify_write_producer() -> Result<()> {
    let locker = create_test_locker();

    let increment = || {
        PutValue::from_fn(|current: Option<Value>| {
            json!(current.and_then(|v| v.as_i64()).unwrap_or_default() + 1)
        })
    };

    locker.put("counter", 5)?;
    locker.put("counter", increment())?;
    assert_eq!(locker.get("counter")?, Some(json!(6)));

    // With no prior value the producer sees the fallback
    locker.put_with_default("fresh", increment(), 10)?;
    assert_eq!(locker.get("fresh")?, Some(json!(11)));

    Ok(())
}

#[test]
fn test_key_producers() -> Result<()> {
    let locker = create_test_locker();
    let prefix = "user";

    locker.put(
        Entries::from_fn(|| Entries::from(format!("{prefix}:1"))),
        "Alice",
    )?;
    assert_eq!(locker.get("user:1")?, Some(json!("Alice")));

    let keys = Keys::from_fn(|| Keys::from(vec![format!("{prefix}:1"), format!("{prefix}:2")]));
    let items = locker.retrieve(keys, None)?.into_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items["user:1"], json!("Alice"));

    Ok(())
}

#[test]
fn test_namespace_isolation() -> Result<()> {
    let locker = create_test_locker();
    let a = locker.namespace("A");
    let b = locker.namespace("B");

    a.put("x", 1)?;
    assert_eq!(b.get("x")?, None);

    b.put("y", 2)?;
    a.clean()?;

    assert_eq!(a.count()?, 0);
    assert_eq!(b.get("y")?, Some(json!(2)));

    Ok(())
}

#[test]
fn test_namespace_containing_separator() -> Result<()> {
    let locker = create_test_locker();
    let nested = locker.namespace("app.sub");

    nested.put("key", "v")?;
    locker.namespace("app").put("sub", "other")?;

    assert_eq!(nested.keys()?, vec!["key"]);
    assert_eq!(locker.namespace("app").keys()?, vec!["sub", "sub.key"]);

    Ok(())
}

#[test]
fn test_all_and_count_match_seeded_keys() -> Result<()> {
    let locker = create_test_locker().namespace("seeded");
    let n = 25;

    for i in 0..n {
        locker.put(format!("key_{i}"), i)?;
    }
    locker.namespace("noise").put("key_0", "noise")?;

    let all = locker.all()?;
    assert_eq!(all.len(), n);
    assert_eq!(locker.count()?, n);
    for i in 0..n {
        assert_eq!(all[&format!("key_{i}")], json!(i));
    }

    Ok(())
}

#[test]
fn test_driver_fork_is_independent() -> Result<()> {
    let local = create_test_locker();
    local.put("x", 1)?;

    let session = local.driver("session")?;
    assert_eq!(session.get("x")?, None);

    session.put("x", 2)?;
    assert_eq!(local.get("x")?, Some(json!(1)));

    Ok(())
}

#[test]
fn test_default_lockers_share_process_stores() -> Result<()> {
    // Unique namespace: the built-in stores are shared by the whole test binary
    let first = Locker::builder().namespace("shared_default").build()?;
    let second = Locker::builder().namespace("shared_default").build()?;

    first.put("x", 1)?;
    assert_eq!(second.get("x")?, Some(json!(1)));

    first.driver("session")?.put("s", true)?;
    assert_eq!(second.driver("session")?.get("s")?, Some(json!(true)));

    first.clean()?;
    first.driver("session")?.clean()?;
    assert!(!second.has("x")?);

    Ok(())
}

#[test]
fn test_quota_failure_is_distinguished() -> Result<()> {
    let quota = StorageQuota {
        max_keys: Some(1),
        max_bytes: None,
    };
    let locker = Locker::builder()
        .isolated()
        .register_driver("tiny", Arc::new(MemoryDriver::with_quota(quota)))
        .driver("tiny")
        .build()?;

    assert!(locker.supported());
    locker.put("first", 1)?;

    match locker.put("second", 2) {
        Err(LockerError::QuotaExceeded { key }) => assert_eq!(key, "second"),
        other => panic!("expected a quota error, got {other:?}"),
    }

    // Overwriting an existing key still fits
    locker.put("first", 3)?;
    assert_eq!(locker.get("first")?, Some(json!(3)));

    Ok(())
}

#[test]
fn test_full_driver_stays_usable_in_new_lockers() -> Result<()> {
    let quota = StorageQuota {
        max_keys: Some(1),
        max_bytes: None,
    };
    let locker = Locker::builder()
        .isolated()
        .register_driver("tiny", Arc::new(MemoryDriver::with_quota(quota)))
        .driver("tiny")
        .build()?;
    locker.put("first", 1)?;

    // The fork runs its own support check against the full store
    let fork = locker.namespace("locker");
    assert!(fork.supported());
    assert_eq!(fork.get("first")?, Some(json!(1)));
    assert!(fork.has("first")?);

    match fork.put("second", 2) {
        Err(LockerError::QuotaExceeded { key }) => assert_eq!(key, "second"),
        other => panic!("expected a quota error, got {other:?}"),
    }

    fork.forget("first")?;
    assert!(fork.put("second", 2)?);

    Ok(())
}

/// Memory store that refuses writes to physical keys containing `bad`.
#[derive(Debug, Default)]
struct RejectingDriver {
    inner: MemoryDriver,
}

impl Driver for RejectingDriver {
    fn get(&self, key: &str) -> DriverResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> DriverResult<()> {
        if key.contains("bad") {
            return Err(DriverError::Unavailable(format!("cannot store {key}")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> DriverResult<()> {
        self.inner.remove(key)
    }

    fn clear(&self) -> DriverResult<()> {
        self.inner.clear()
    }

    fn entries(&self) -> DriverResult<Vec<(String, String)>> {
        self.inner.entries()
    }
}

#[test]
fn test_other_write_failures_are_write_errors() -> Result<()> {
    let locker = Locker::builder()
        .isolated()
        .register_driver("rejecting", Arc::new(RejectingDriver::default()))
        .driver("rejecting")
        .build()?;

    assert!(locker.supported());
    match locker.put("bad_key", 1) {
        Err(LockerError::Write { key, source }) => {
            assert_eq!(key, "bad_key");
            assert!(matches!(source, DriverError::Unavailable(_)));
        }
        other => panic!("expected a write error, got {other:?}"),
    }

    // Map keys are written in order; the failing key stops the rest
    let mut items = Map::new();
    items.insert("a".into(), json!(1));
    items.insert("bad".into(), json!(2));
    items.insert("c".into(), json!(3));

    let err = locker.put(items, PutValue::Absent).unwrap_err();
    assert!(matches!(err, LockerError::Write { ref key, .. } if key == "bad"));
    assert_eq!(locker.keys()?, vec!["a"]);

    Ok(())
}

#[test]
fn test_bulk_put_aborts_without_rollback() -> Result<()> {
    let quota = StorageQuota {
        max_keys: Some(2),
        max_bytes: None,
    };
    let locker = Locker::builder()
        .isolated()
        .register_driver("tiny", Arc::new(MemoryDriver::with_quota(quota)))
        .driver("tiny")
        .build()?;

    let mut items = Map::new();
    items.insert("a".into(), json!(1));
    items.insert("b".into(), json!(2));
    items.insert("c".into(), json!(3));

    let err = locker.put(items, PutValue::Absent).unwrap_err();
    assert!(matches!(err, LockerError::QuotaExceeded { .. }));

    // Entries written before the failure stay written
    assert_eq!(locker.count()?, 2);
    assert!(!locker.has("c")?);

    Ok(())
}

#[test]
fn test_empty_clears_whole_driver() -> Result<()> {
    let locker = create_test_locker();
    locker.put("a", 1)?;
    locker.namespace("other").put("b", 2)?;
    locker.namespace("").put("bare", 3)?;

    locker.empty()?;

    assert!(locker.current_driver().is_empty().unwrap());
    assert_eq!(locker.namespace("other").count()?, 0);

    Ok(())
}

#[test]
fn test_non_json_values_come_back_as_strings() -> Result<()> {
    let locker = create_test_locker();

    locker
        .current_driver()
        .set("locker.legacy", "written by someone else")
        .unwrap();

    assert_eq!(locker.get("legacy")?, Some(json!("written by someone else")));

    Ok(())
}

#[test]
fn test_concurrent_writes_from_threads() -> Result<()> {
    let locker = Arc::new(create_test_locker());
    let threads = 8;
    let per_thread = 50;

    thread::scope(|s| {
        for t in 0..threads {
            let locker = Arc::clone(&locker);
            s.spawn(move || {
                let ns = locker.namespace(format!("t{t}"));
                for i in 0..per_thread {
                    ns.put(format!("k{i}"), i).unwrap();
                }
            });
        }
    });

    for t in 0..threads {
        assert_eq!(locker.namespace(format!("t{t}")).count()?, per_thread);
    }

    Ok(())
}
