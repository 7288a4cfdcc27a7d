// ABOUTME: Integration tests for the session cache and its persistence.
// ABOUTME: Covers bounded eviction, recency order, deploy flags, and reload semantics.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use contractguard::session::persistence::{load_state_from, save_state_to};
use contractguard::session::{
    AddressScope, CacheLimits, SessionCache, SessionState, encode_method_key,
};

#[test]
fn method_keys_keep_trailing_separator() {
    assert_eq!(encode_method_key("foo", &["int", "String"]), "foo-int,String,");
    assert_eq!(encode_method_key::<String>("foo", &[]), "foo-");
}

#[test]
fn thirty_first_entry_clears_the_rest() {
    let cache = SessionCache::new();
    for i in 0..30 {
        cache.put_args("init", &[format!("T{i}")], vec![i.to_string()]);
    }
    cache.put_args("init", &["T30".to_string()], vec!["30".to_string()]);

    for i in 0..30 {
        assert!(cache.get_args("init", &[format!("T{i}")]).is_none(), "T{i}");
    }
    assert_eq!(
        cache.get_args("init", &["T30".to_string()]),
        Some(vec!["30".to_string()])
    );
}

#[test]
fn twelve_addresses_keep_ten_newest_first() {
    let cache = SessionCache::new();
    let addresses: Vec<String> = (0..12).map(|i| format!("0xa{i:02}")).collect();
    for address in &addresses {
        cache.record_address(AddressScope::Local, address);
    }

    let expected: Vec<String> = addresses[2..].iter().rev().cloned().collect();
    assert_eq!(cache.list_addresses(AddressScope::Local), expected);
    assert!(cache.list_addresses(AddressScope::Remote).is_empty());
}

#[test]
fn repeated_deploy_does_not_reorder() {
    let cache = SessionCache::new();
    cache.record_address(AddressScope::Remote, "0xABC");
    cache.record_address(AddressScope::Remote, "0xDEF");
    cache.record_address(AddressScope::Remote, "0xABC");
    assert_eq!(cache.list_addresses(AddressScope::Remote), vec!["0xDEF", "0xABC"]);
}

#[test]
fn blank_module_deploy_args() {
    let cache = SessionCache::new();
    cache.put_deploy_args("", "1000 2000");
    assert_eq!(cache.get_deploy_args(""), Some("1000 2000".to_string()));
    assert_eq!(cache.get_deploy_args(" \t"), Some("1000 2000".to_string()));
    assert_eq!(
        cache.state().deploy_args.get("args").map(String::as_str),
        Some("1000 2000")
    );
}

#[test]
fn skip_prompt_flag_lifecycle() {
    let cache = SessionCache::new();
    assert!(!cache.should_skip_deploy_prompt("mod"));
    cache.set_skip_deploy_prompt("mod", true);
    assert!(cache.should_skip_deploy_prompt("mod"));
}

/// Save, reload into a fresh cache, and keep going: eviction and recency
/// continue from the persisted state.
#[test]
fn persisted_state_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-cache.json");
    let limits = CacheLimits {
        method_args: 30,
        addresses: 3,
    };

    let first = SessionCache::with_limits(limits);
    first.record_address(AddressScope::Local, "0x1");
    first.record_address(AddressScope::Local, "0x2");
    first.put_deploy_args("token", " 7 ");
    save_state_to(&path, Path::new("/work/token"), &first.state()).unwrap();

    let second = SessionCache::from_state(load_state_from(&path), limits);
    second.record_address(AddressScope::Local, "0x3");
    second.record_address(AddressScope::Local, "0x4");
    assert_eq!(
        second.list_addresses(AddressScope::Local),
        vec!["0x4", "0x3", "0x2"]
    );
    assert_eq!(second.get_deploy_args("token"), Some("7".to_string()));
}

#[test]
fn load_state_replaces_wholesale() {
    let cache = SessionCache::new();
    cache.put_args("a", &["int"], vec!["1".to_string()]);

    cache.load_state(SessionState::default());
    assert!(cache.get_args("a", &["int"]).is_none());
    assert_eq!(cache.state(), SessionState::default());
}

/// Concurrent writers never push the map past its capacity.
#[test]
fn concurrent_writers_respect_capacity() {
    let cache = Arc::new(SessionCache::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..50 {
                    cache.put_args(&format!("m{t}-{i}"), &["int"], vec![]);
                    cache.record_address(AddressScope::Local, &format!("0x{t}{i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let state = cache.state();
    assert!(state.method_args.len() <= 30);
    assert!(!state.method_args.is_empty());
    assert_eq!(cache.list_addresses(AddressScope::Local).len(), 10);
}
