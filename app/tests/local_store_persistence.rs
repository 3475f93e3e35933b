//! Session, cache and search history persisted through the file store.

use std::sync::Arc;
use std::time::Duration;

use findmyjob::domain::ports::{KeyValueStore, KeyValueStoreError};
use findmyjob::domain::{
    AuthTokens, CacheNamespace, SearchHistory, SessionStore, TtlCache, UserId, UserType,
};
use findmyjob::outbound::storage::FileKeyValueStore;
use findmyjob::test_support::{MutableClock, temp_file_store};
use rstest::rstest;

fn reopen(path: &std::path::Path) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKeyValueStore::open(path).expect("store reopens"))
}

#[rstest]
fn session_survives_reopening_the_store() {
    let (_dir, path, store) = temp_file_store();
    let session = SessionStore::new(store);
    let user_id = UserId::new("company-7").expect("valid id");
    session
        .sign_in(&user_id, "Acme HR", "hr@acme.test", UserType::Company)
        .expect("sign in");
    session
        .store_tokens(&AuthTokens::new("access-1", "refresh-1"))
        .expect("store tokens");

    let reopened = SessionStore::new(reopen(&path));
    assert_eq!(reopened.user_id().expect("read id"), Some(user_id));
    assert_eq!(reopened.user_type().expect("read type"), Some(UserType::Company));
    assert_eq!(
        reopened.access_token().expect("read token").as_deref(),
        Some("access-1")
    );
}

#[rstest]
fn cached_entries_keep_their_expiry_across_reopen() {
    let (_dir, path, store) = temp_file_store();
    let clock = Arc::new(MutableClock::fixed());
    TtlCache::new(store, clock.clone())
        .set(
            &CacheNamespace::JOBS,
            "listing",
            &vec!["j1", "j2"],
            Duration::from_secs(60),
        )
        .expect("cache write");

    let cache = TtlCache::new(reopen(&path), clock.clone());
    let hit: Option<Vec<String>> = cache.get(&CacheNamespace::JOBS, "listing").expect("read");
    assert_eq!(hit, Some(vec!["j1".to_owned(), "j2".to_owned()]));

    clock.advance(Duration::from_secs(61));
    assert!(cache
        .has_expired(&CacheNamespace::JOBS, "listing")
        .expect("expiry check"));
    let miss: Option<Vec<String>> = cache.get(&CacheNamespace::JOBS, "listing").expect("read");
    assert!(miss.is_none());

    let after_purge = reopen(&path);
    assert!(after_purge
        .get("jobs:listing")
        .expect("raw read")
        .is_none());
}

#[rstest]
fn clearing_one_namespace_persists_and_spares_the_rest() {
    let (_dir, path, store) = temp_file_store();
    let clock = Arc::new(MutableClock::fixed());
    let cache = TtlCache::new(store.clone(), clock.clone());
    cache
        .set_default(&CacheNamespace::JOBS, "a", &1)
        .expect("write jobs");
    cache
        .set_default(&CacheNamespace::API, "b", &2)
        .expect("write api");
    let mut history = SearchHistory::new(store);
    history.add_term("rust").expect("add term");

    assert_eq!(cache.clear_namespace(&CacheNamespace::API).expect("clear"), 1);

    let reopened = reopen(&path);
    let cache = TtlCache::new(reopened.clone(), clock);
    assert_eq!(cache.get::<i32>(&CacheNamespace::JOBS, "a").expect("read"), Some(1));
    assert_eq!(cache.get::<i32>(&CacheNamespace::API, "b").expect("read"), None);
    let mut history = SearchHistory::new(reopened);
    assert_eq!(history.load().expect("load"), ["rust".to_owned()]);
}

#[rstest]
fn corrupt_documents_are_reported_on_open() {
    let (dir, _path, _store) = temp_file_store();
    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "[not an object").expect("write corrupt file");

    let error = FileKeyValueStore::open(&corrupt)
        .err()
        .expect("corrupt file is rejected");
    assert!(matches!(error, KeyValueStoreError::Corrupt { .. }));
}
