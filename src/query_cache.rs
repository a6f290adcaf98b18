//! Read-through cache for backend queries.
//!
//! Every key moves through `Idle -> Loading -> {Fresh, Failed}`. A successful result is served
//! without a new request until the freshness window runs out or the key is invalidated. Readers
//! that arrive while a fetch for their key is in flight wait for it and share its outcome, so a
//! burst of identical reads costs one request.
//!
//! A failed refetch keeps the last good value around (the snapshot still carries it) and only
//! records the error; a key that has never loaded successfully reports the error with no data.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Fresh,
    Failed,
}

/// What a view sees of a key on a given frame.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<V> {
    pub status: QueryStatus,
    /// Last successfully fetched value, kept across failed refetches.
    pub data: Option<V>,
    pub error: Option<Arc<FetchError>>,
    /// True once the freshness window has passed or the key was invalidated.
    pub is_stale: bool,
}

impl<V> QuerySnapshot<V> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// Whether a view should start a background fetch on its own. Failed keys wait for an
    /// explicit retry instead.
    pub fn needs_fetch(&self) -> bool {
        match self.status {
            QueryStatus::Idle => true,
            QueryStatus::Fresh => self.is_stale,
            QueryStatus::Loading | QueryStatus::Failed => false,
        }
    }
}

struct Entry<V> {
    data: Option<V>,
    error: Option<Arc<FetchError>>,
    updated_at: Option<Instant>,
    loading: bool,
    queued: bool,
    failed: bool,
    invalidated: bool,
    settled_fetches: u64,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            loading: false,
            queued: false,
            failed: false,
            invalidated: false,
            settled_fetches: 0,
        }
    }
}

impl<V: Clone> Entry<V> {
    fn status(&self) -> QueryStatus {
        if self.loading || self.queued {
            QueryStatus::Loading
        } else if self.failed {
            QueryStatus::Failed
        } else if self.data.is_some() {
            QueryStatus::Fresh
        } else {
            QueryStatus::Idle
        }
    }

    fn is_stale(&self, now: Instant, stale_after: Duration) -> bool {
        self.invalidated
            || self
                .updated_at
                .map_or(true, |at| now.saturating_duration_since(at) >= stale_after)
    }

    fn is_servable(&self, now: Instant, stale_after: Duration) -> bool {
        !self.failed && self.data.is_some() && !self.is_stale(now, stale_after)
    }

    /// Result of the most recently settled fetch.
    fn outcome(&self) -> Option<Result<V, Arc<FetchError>>> {
        if self.failed {
            return self.error.clone().map(Err);
        }
        self.data.clone().map(Ok)
    }
}

pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    settled: Condvar,
    stale_after: Duration,
    #[cfg(test)]
    joined_waits: std::sync::atomic::AtomicUsize,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            settled: Condvar::new(),
            stale_after,
            #[cfg(test)]
            joined_waits: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key` if it is still fresh, otherwise runs `fetcher` and
    /// stores its outcome. Blocks the calling thread while another fetch for the same key is in
    /// flight and then returns that fetch's outcome instead of issuing a second request.
    pub fn fetch<F>(&self, key: &K, fetcher: F) -> Result<V, Arc<FetchError>>
    where
        F: FnOnce() -> Result<V, FetchError>,
    {
        let mut entries = self.lock();

        loop {
            let entry = entries.entry(key.clone()).or_default();
            if !entry.loading {
                break;
            }

            let awaited = entry.settled_fetches;
            debug!(?key, "joining in-flight fetch");
            #[cfg(test)]
            self.joined_waits
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            entries = self
                .settled
                .wait_while(entries, |entries| {
                    entries
                        .get(key)
                        .is_some_and(|e| e.loading && e.settled_fetches == awaited)
                })
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(outcome) = entries
                .get(key)
                .filter(|e| e.settled_fetches != awaited)
                .and_then(Entry::outcome)
            {
                return outcome;
            }
        }

        let now = Instant::now();
        let entry = entries.entry(key.clone()).or_default();
        entry.queued = false;
        if entry.is_servable(now, self.stale_after) {
            if let Some(data) = entry.data.clone() {
                debug!(?key, "cache hit");
                return Ok(data);
            }
        }

        entry.loading = true;
        entry.invalidated = false;
        drop(entries);

        debug!(?key, "fetching");
        self.settle(key, fetcher())
    }

    /// Marks `key` as loading on the caller's thread ahead of a background `fetch`, so a view
    /// polling snapshots does not start a second one. Returns false when the key is already
    /// loading or still fresh. The mark is cleared by the next `fetch` of the key.
    pub fn begin(&self, key: &K) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_default();
        if entry.loading || entry.queued || entry.is_servable(now, self.stale_after) {
            return false;
        }

        debug!(?key, "queued");
        entry.queued = true;
        true
    }

    fn settle(&self, key: &K, result: Result<V, FetchError>) -> Result<V, Arc<FetchError>> {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_default();
        entry.loading = false;
        entry.settled_fetches += 1;

        let outcome = match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.error = None;
                entry.failed = false;
                entry.updated_at = Some(Instant::now());
                Ok(value)
            }
            Err(err) => {
                warn!(?key, error = %err, kept_last_value = entry.data.is_some(), "fetch failed");
                let err = Arc::new(err);
                entry.error = Some(err.clone());
                entry.failed = true;
                Err(err)
            }
        };

        drop(entries);
        self.settled.notify_all();
        outcome
    }

    pub fn snapshot(&self, key: &K) -> QuerySnapshot<V> {
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) => QuerySnapshot {
                status: entry.status(),
                data: entry.data.clone(),
                error: entry.error.clone(),
                is_stale: entry.is_stale(Instant::now(), self.stale_after),
            },
            None => QuerySnapshot {
                status: QueryStatus::Idle,
                data: None,
                error: None,
                is_stale: true,
            },
        }
    }

    /// Marks `key` stale so the next read refetches regardless of the freshness window. A fetch
    /// already in flight still settles, but its value counts as stale.
    pub fn invalidate(&self, key: &K) {
        if let Some(entry) = self.lock().get_mut(key) {
            debug!(?key, "invalidated");
            entry.invalidated = true;
        }
    }

    /// Blocks until `count` readers have parked on an in-flight fetch. The counter moves under the
    /// map lock, so a parked reader is guaranteed to see the fetch it joined settle.
    #[cfg(test)]
    pub(crate) fn wait_for_joined(&self, count: usize) {
        use std::sync::atomic::Ordering;

        let deadline = Instant::now() + Duration::from_secs(5);
        while self.joined_waits.load(Ordering::SeqCst) < count {
            assert!(
                Instant::now() < deadline,
                "no reader joined the in-flight fetch"
            );
            std::thread::yield_now();
        }
    }

    /// Stores a value obtained elsewhere (e.g. a mutation response) as a fresh result.
    pub fn set_data(&self, key: K, value: V) {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        entry.data = Some(value);
        entry.error = None;
        entry.failed = false;
        entry.invalidated = false;
        entry.updated_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    const LONG: Duration = Duration::from_secs(3600);

    fn status_error(status: u16) -> FetchError {
        FetchError::HttpStatus {
            url: "http://localhost:3001/blogs".to_string(),
            status,
        }
    }

    #[test]
    fn unknown_key_is_idle_and_wants_a_fetch() {
        let cache: QueryCache<u64, String> = QueryCache::new(LONG);
        let snap = cache.snapshot(&1);
        assert_eq!(snap.status, QueryStatus::Idle);
        assert!(snap.needs_fetch());
        assert!(snap.data.is_none());
    }

    #[test]
    fn fresh_value_is_served_without_refetching() {
        let cache = QueryCache::new(LONG);
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, FetchError>("stories".to_string())
        };

        assert_eq!(cache.fetch(&"all", load).unwrap(), "stories");
        assert_eq!(cache.fetch(&"all", load).unwrap(), "stories");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let snap = cache.snapshot(&"all");
        assert_eq!(snap.status, QueryStatus::Fresh);
        assert!(!snap.is_stale);
        assert!(!snap.needs_fetch());
    }

    #[test]
    fn expired_value_is_refetched() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);
        let load = || Ok::<_, FetchError>(calls.fetch_add(1, Ordering::SeqCst));

        assert_eq!(cache.fetch(&"all", load).unwrap(), 0);
        assert!(cache.snapshot(&"all").needs_fetch());
        assert_eq!(cache.fetch(&"all", load).unwrap(), 1);
    }

    #[test]
    fn invalidation_forces_the_next_read_to_refetch() {
        let cache = QueryCache::new(LONG);
        let calls = AtomicUsize::new(0);
        let load = || Ok::<_, FetchError>(calls.fetch_add(1, Ordering::SeqCst));

        cache.fetch(&"all", load).unwrap();
        cache.invalidate(&"all");

        let snap = cache.snapshot(&"all");
        assert!(snap.is_stale);
        assert_eq!(snap.data, Some(0));

        assert_eq!(cache.fetch(&"all", load).unwrap(), 1);
        assert!(!cache.snapshot(&"all").is_stale);
    }

    #[test]
    fn first_failure_reports_error_without_data() {
        let cache: QueryCache<&str, String> = QueryCache::new(LONG);
        let err = cache.fetch(&"all", || Err(status_error(500))).unwrap_err();
        assert!(matches!(*err, FetchError::HttpStatus { status: 500, .. }));

        let snap = cache.snapshot(&"all");
        assert_eq!(snap.status, QueryStatus::Failed);
        assert!(snap.data.is_none());
        assert!(snap.error.is_some());
        assert!(!snap.needs_fetch());
    }

    #[test]
    fn failed_refetch_keeps_last_good_value() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.fetch(&"all", || Ok::<_, FetchError>(vec![1, 2])).unwrap();
        cache.fetch(&"all", || Err(status_error(503))).unwrap_err();

        let snap = cache.snapshot(&"all");
        assert_eq!(snap.status, QueryStatus::Failed);
        assert_eq!(snap.data, Some(vec![1, 2]));

        // a manual retry recovers
        assert_eq!(cache.fetch(&"all", || Ok(vec![3])).unwrap(), vec![3]);
        let snap = cache.snapshot(&"all");
        assert_eq!(snap.status, QueryStatus::Fresh);
        assert!(snap.error.is_none());
    }

    #[test]
    fn set_data_primes_a_fresh_entry() {
        let cache = QueryCache::new(LONG);
        cache.set_data(7u64, "story".to_string());
        let value = cache
            .fetch(&7, || panic!("primed entry must not be fetched"))
            .unwrap();
        assert_eq!(value, "story");
    }

    #[test]
    fn concurrent_reads_share_one_request() {
        let cache = Arc::new(QueryCache::new(LONG));
        let calls = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let leader = {
            let (cache, calls, started, release) =
                (cache.clone(), calls.clone(), started.clone(), release.clone());
            thread::spawn(move || {
                cache.fetch(&"all", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    started.wait();
                    release.wait();
                    Ok::<_, FetchError>("shared".to_string())
                })
            })
        };

        // the leader is now inside its fetcher with the key marked loading
        started.wait();
        assert!(cache.snapshot(&"all").is_loading());

        let follower = {
            let (cache, calls) = (cache.clone(), calls.clone());
            thread::spawn(move || {
                cache.fetch(&"all", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, FetchError>("duplicate".to_string())
                })
            })
        };

        cache.wait_for_joined(1);
        release.wait();
        assert_eq!(leader.join().unwrap().unwrap(), "shared");
        assert_eq!(follower.join().unwrap().unwrap(), "shared");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn waiters_receive_the_shared_failure() {
        let cache: Arc<QueryCache<&str, String>> = Arc::new(QueryCache::new(LONG));
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let leader = {
            let (cache, started, release) = (cache.clone(), started.clone(), release.clone());
            thread::spawn(move || {
                cache.fetch(&"all", || {
                    started.wait();
                    release.wait();
                    Err(status_error(502))
                })
            })
        };

        started.wait();
        let followers: Vec<_> = (0..2)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || cache.fetch(&"all", || Ok("late".to_string())))
            })
            .collect();

        cache.wait_for_joined(2);
        release.wait();
        let leader_err = leader.join().unwrap().unwrap_err();
        for follower in followers {
            let err = follower.join().unwrap().unwrap_err();
            assert!(Arc::ptr_eq(&err, &leader_err));
        }
        assert_eq!(cache.snapshot(&"all").status, QueryStatus::Failed);
    }

    #[test]
    fn begin_marks_loading_until_the_fetch_settles() {
        let cache: QueryCache<&str, u32> = QueryCache::new(LONG);
        assert!(cache.begin(&"all"));
        assert!(cache.snapshot(&"all").is_loading());
        // a frame drawn before the worker starts must not queue another fetch
        assert!(!cache.begin(&"all"));

        assert_eq!(cache.fetch(&"all", || Ok(4)).unwrap(), 4);
        assert_eq!(cache.snapshot(&"all").status, QueryStatus::Fresh);
        assert!(!cache.begin(&"all"));
    }

    #[test]
    fn begin_allows_an_explicit_retry_after_failure() {
        let cache: QueryCache<&str, u32> = QueryCache::new(LONG);
        assert!(cache.begin(&"all"));
        cache.fetch(&"all", || Err(status_error(500))).unwrap_err();

        let snap = cache.snapshot(&"all");
        assert_eq!(snap.status, QueryStatus::Failed);
        assert!(!snap.needs_fetch());

        assert!(cache.begin(&"all"));
        assert_eq!(cache.fetch(&"all", || Ok(1)).unwrap(), 1);
    }

    #[test]
    fn different_keys_do_not_block_each_other() {
        let cache = Arc::new(QueryCache::new(LONG));
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let slow = {
            let (cache, started, release) = (cache.clone(), started.clone(), release.clone());
            thread::spawn(move || {
                cache.fetch(&1u64, || {
                    started.wait();
                    release.wait();
                    Ok::<_, FetchError>("slow")
                })
            })
        };

        started.wait();
        assert_eq!(cache.fetch(&2u64, || Ok("fast")).unwrap(), "fast");
        release.wait();
        assert_eq!(slow.join().unwrap().unwrap(), "slow");
    }
}
