//! Cache-aside metadata lookups.

use async_trait::async_trait;
use exn::ResultExt;
use rjren_cache::Repository;
use rjren_catalog::MetadataSource;
use rjren_catalog::error::{ErrorKind as FetchErrorKind, Result as FetchResult};
use rjren_catalog::models::{WorkCode, WorkMetadata};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::instrument;

/// Wraps a [`MetadataSource`] with the metadata cache.
///
/// A cached record is returned as-is, without touching the wrapped source
/// (and without its rate-limit pause). A missing record is fetched, stored
/// and returned. Records are never refreshed.
///
/// Lookups of the same code are serialized, so concurrent callers asking for
/// one code cause at most one remote call.
pub struct CachingSource<S> {
    inner: S,
    cache: Repository,
    locks: Mutex<HashMap<WorkCode, Arc<AsyncMutex<()>>>>,
}
impl<S: MetadataSource> CachingSource<S> {
    pub fn new(inner: S, cache: Repository) -> Self {
        Self { inner, cache, locks: Mutex::new(HashMap::new()) }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn lock_for(&self, code: &WorkCode) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(code.clone()).or_default().clone()
    }

    fn release(&self, code: &WorkCode) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only the map itself still holds the lock: nobody is waiting.
        if locks.get(code).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(code);
        }
    }

    async fn fetch_locked(&self, code: &WorkCode) -> FetchResult<WorkMetadata> {
        if let Some(metadata) = self.cache.get_metadata(code).await.or_raise(|| FetchErrorKind::Cache)? {
            tracing::debug!("cache hit");
            return Ok(metadata);
        }
        let metadata = self.inner.fetch(code).await?;
        if let Err(err) = self.cache.insert(&metadata).await {
            tracing::warn!(error = ?err, "could not store metadata in the cache");
        }
        Ok(metadata)
    }
}

#[async_trait]
impl<S: MetadataSource> MetadataSource for CachingSource<S> {
    #[instrument(skip(self), fields(code = %code))]
    async fn fetch(&self, code: &WorkCode) -> FetchResult<WorkMetadata> {
        let lock = self.lock_for(code);
        let result = {
            let _guard = lock.lock().await;
            self.fetch_locked(code).await
        };
        drop(lock);
        self.release(code);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rjren_cache::Database;
    use rjren_catalog::models::AgeCategory;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use time::macros::date;

    /// Counts calls; fails for any code listed in `missing`.
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        missing: Vec<&'static str>,
    }
    #[async_trait]
    impl MetadataSource for Counting {
        async fn fetch(&self, code: &WorkCode) -> FetchResult<WorkMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Keeps concurrent lookups overlapping.
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.missing.contains(&code.as_str()) {
                exn::bail!(FetchErrorKind::HttpStatus { status: 404, reason: "Not Found".to_string() });
            }
            Ok(WorkMetadata {
                code: code.clone(),
                work_name: "Title".to_string(),
                maker_id: "RG00001".to_string(),
                maker_name: "Circle".to_string(),
                release_date: date!(2023 - 05 - 12),
                series_id: None,
                series_name: None,
                age_category: AgeCategory::General,
                tags: vec![],
                voice_actors: vec![],
                cover_url: String::new(),
            })
        }
    }

    async fn source(inner: Counting) -> (CachingSource<Counting>, Database) {
        let db = Database::connect_in_memory().await.unwrap();
        (CachingSource::new(inner, Repository::from(&db)), db)
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let (source, _db) = source(Counting::default()).await;
        let code: WorkCode = "RJ123456".parse().unwrap();

        let first = source.fetch(&code).await.unwrap();
        let second = source.fetch(&code).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_call() {
        let (source, _db) = source(Counting::default()).await;
        let code: WorkCode = "RJ123456".parse().unwrap();

        let (a, b) = tokio::join!(source.fetch(&code), source.fetch(&code));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
        assert!(source.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (source, db) = source(Counting { missing: vec!["RJ654321"], ..Counting::default() }).await;
        let code: WorkCode = "RJ654321".parse().unwrap();

        let err = source.fetch(&code).await.unwrap_err();
        assert!(matches!(&*err, FetchErrorKind::HttpStatus { status: 404, .. }));
        assert!(source.fetch(&code).await.is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
        assert!(Repository::from(&db).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_cache_is_classified() {
        let (source, db) = source(Counting::default()).await;
        db.close().await;

        let err = source.fetch(&"RJ123456".parse().unwrap()).await.unwrap_err();
        assert_eq!(*err, FetchErrorKind::Cache);
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 0);
    }
}
