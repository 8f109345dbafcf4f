//! Integration Tests for Cache Persistence
//!
//! Exercises the public API against real files: reopening, corrupt input,
//! unwritable paths and the fixed on-disk layout.

use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;
use ttl_file_cache::error::LoadFailure;
use ttl_file_cache::{CacheConfig, CacheError, ManualClock, SharedCache, TtlCache};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_file_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn open_at(dir: &TempDir, clock: &ManualClock) -> TtlCache {
    TtlCache::with_clock(CacheConfig::in_dir(dir.path()), Arc::new(clock.clone()))
        .expect("cache should open")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Snap {
    id: String,
    sender: String,
    viewed: bool,
    timestamp: u64,
}

// == Reopen Tests ==

#[test]
fn test_reopen_reproduces_lookups() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(1_700_000_000);

    {
        let mut cache = open_at(&dir, &clock);
        cache.set("user:42", &json!({"name": "Alice"})).unwrap();
        cache.set("friends", &json!(["bob", "carol"])).unwrap();
        cache.set("unread", &0).unwrap();
    }

    let cache = open_at(&dir, &clock);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get("user:42"), Some(&json!({"name": "Alice"})));
    assert_eq!(cache.get("friends"), Some(&json!(["bob", "carol"])));
    assert_eq!(cache.get("unread"), Some(&json!(0)));
    assert_eq!(
        cache.stored_at("user:42").unwrap().timestamp(),
        1_700_000_000
    );
}

#[test]
fn test_reopen_keeps_expiry_time() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);

    open_at(&dir, &clock).set("user:42", &json!({"name": "Alice"})).unwrap();

    clock.set(100);
    assert_eq!(
        open_at(&dir, &clock).get("user:42"),
        Some(&json!({"name": "Alice"}))
    );

    clock.set(700);
    let cache = open_at(&dir, &clock);
    assert!(cache.get("user:42").is_none());
    assert_eq!(
        cache.get_ignoring_ttl("user:42"),
        Some(&json!({"name": "Alice"}))
    );
}

#[test]
fn test_typed_payload_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);
    let snaps = vec![
        Snap {
            id: "s1".to_string(),
            sender: "bob".to_string(),
            viewed: false,
            timestamp: 1_384_000_000_123,
        },
        Snap {
            id: "s2".to_string(),
            sender: "carol".to_string(),
            viewed: true,
            timestamp: 1_384_000_000_456,
        },
    ];

    open_at(&dir, &clock).set("snaps", &snaps).unwrap();

    let cache = open_at(&dir, &clock);
    let loaded: Option<Vec<Snap>> = cache.get_as("snaps", false).unwrap();
    assert_eq!(loaded, Some(snaps));
}

#[test]
fn test_clear_persists_empty_store() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);

    let mut cache = open_at(&dir, &clock);
    cache.set("a", &1).unwrap();
    cache.set("b", &2).unwrap();
    cache.clear().unwrap();

    let reopened = open_at(&dir, &clock);
    assert!(reopened.is_empty());
    assert!(reopened.get_ignoring_ttl("a").is_none());
}

#[test]
fn test_stale_entries_stay_on_disk() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);

    let mut cache = open_at(&dir, &clock);
    cache.set("old", "stale soon").unwrap();
    clock.advance(10_000);
    cache.set("new", "fresh").unwrap();

    let reopened = open_at(&dir, &clock);
    let stats = reopened.stats();
    assert_eq!(stats.total_entries, 2);
    assert_eq!(stats.stale_entries, 1);
    assert!(reopened.get("old").is_none());
    assert_eq!(reopened.get_ignoring_ttl("old"), Some(&json!("stale soon")));
}

#[test]
fn test_independent_caches_do_not_share_files() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);
    let config_a = CacheConfig::new(dir.path().join("a.dat"));
    let config_b = CacheConfig::new(dir.path().join("b.dat"));

    let mut a = TtlCache::with_clock(config_a.clone(), Arc::new(clock.clone())).unwrap();
    let mut b = TtlCache::with_clock(config_b, Arc::new(clock.clone())).unwrap();
    a.set("k", "from a").unwrap();
    b.set("k", "from b").unwrap();

    let a = TtlCache::with_clock(config_a, Arc::new(clock.clone())).unwrap();
    assert_eq!(a.get("k"), Some(&json!("from a")));
}

// == File Format Tests ==

#[test]
fn test_file_layout() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(1_000);

    let mut cache = open_at(&dir, &clock);
    cache.set("user:42", &json!({"name": "Alice"})).unwrap();

    let raw: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("cache.dat")).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!({
            "version": 1,
            "entries": {
                "user:42": {"stored_at": 1_000, "value": {"name": "Alice"}}
            }
        })
    );
}

#[test]
fn test_handwritten_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("cache.dat"),
        r#"{"version":1,"entries":{"score":{"stored_at":50,"value":12.75}}}"#,
    )
    .unwrap();
    let clock = ManualClock::new(60);

    let cache = open_at(&dir, &clock);
    assert_eq!(cache.get("score"), Some(&json!(12.75)));
}

// == Error Tests ==

#[test]
fn test_corrupt_file_fails_to_open() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.dat");
    fs::write(&path, "{ this is not json").unwrap();

    let err = TtlCache::open(CacheConfig::new(&path)).unwrap_err();

    assert!(err.is_load());
    assert!(err.to_string().contains("cache.dat"));
    // The corrupt file is left alone for inspection
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ this is not json");
}

#[test]
fn test_future_version_fails_to_open() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("cache.dat"),
        r#"{"version":2,"entries":{}}"#,
    )
    .unwrap();

    let err = TtlCache::open(CacheConfig::in_dir(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        CacheError::Load {
            source: LoadFailure::Version { found: 2, .. },
            ..
        }
    ));
}

#[test]
fn test_unwritable_path_keeps_memory_update() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);
    let mut cache = open_at(&dir, &clock);

    // A directory squatting on the backing path makes every write fail
    fs::create_dir(dir.path().join("cache.dat")).unwrap();

    let err = cache.set("k", "v").unwrap_err();
    assert!(err.is_persist());
    assert_eq!(cache.get("k"), Some(&json!("v")));

    let err = cache.clear().unwrap_err();
    assert!(err.is_persist());
    assert!(cache.is_empty());
}

#[test]
fn test_persist_can_be_retried_after_fix() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);
    let mut cache = open_at(&dir, &clock);

    let squatter = dir.path().join("cache.dat");
    fs::create_dir(&squatter).unwrap();
    assert!(cache.set("first", &1).is_err());

    fs::remove_dir(&squatter).unwrap();
    cache.set("second", &2).unwrap();

    let reopened = open_at(&dir, &clock);
    assert_eq!(reopened.get("first"), Some(&json!(1)));
    assert_eq!(reopened.get("second"), Some(&json!(2)));
}

// == Shared Handle Tests ==

#[test]
fn test_shared_cache_open() {
    let dir = TempDir::new().unwrap();
    let shared = SharedCache::open(CacheConfig::in_dir(dir.path())).unwrap();

    shared.set("k", &json!({"nested": {"list": [1, 2, 3]}})).unwrap();

    let reopened = SharedCache::open(CacheConfig::in_dir(dir.path())).unwrap();
    assert_eq!(
        reopened.get("k"),
        Some(json!({"nested": {"list": [1, 2, 3]}}))
    );
}

// == Payload Fidelity Tests ==

#[test]
fn test_non_finite_payload_rejected_and_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);
    let mut cache = open_at(&dir, &clock);
    cache.set("temp", &21.5).unwrap();
    let before = fs::read_to_string(dir.path().join("cache.dat")).unwrap();

    let err = cache.set("temp", &f64::NAN).unwrap_err();

    assert!(matches!(err, CacheError::Encode { .. }));
    assert_eq!(cache.get("temp"), Some(&json!(21.5)));
    assert_eq!(
        fs::read_to_string(dir.path().join("cache.dat")).unwrap(),
        before
    );
}

#[test]
fn test_extreme_numbers_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(0);
    let payload = json!({
        "big": u64::MAX,
        "small": i64::MIN,
        "tiny": 5e-324,
        "odd": 1.0715660391465826e-75,
        "max": f64::MAX,
    });

    open_at(&dir, &clock).set("numbers", &payload).unwrap();

    let cache = open_at(&dir, &clock);
    assert_eq!(cache.get("numbers"), Some(&payload));
    assert_eq!(
        cache.get("numbers").unwrap()["odd"].as_f64().unwrap().to_bits(),
        1.0715660391465826e-75f64.to_bits()
    );
}
