//! In-process progress/result store with per-record TTL.
//!
//! Stands in for the external key-value store: single writer per job key,
//! records expire `ttl` after their last write. Results are write-once; a
//! terminal record is never replaced.

use super::types::{JobProgress, JobResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Expiring<T> {
    value: T,
    expires_at: Instant,
}

#[derive(Default)]
struct Inner {
    progress: HashMap<String, Expiring<JobProgress>>,
    results: HashMap<String, Expiring<JobResult>>,
}

pub struct JobStore {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl JobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
        }
    }

    pub fn put_progress(&self, progress: JobProgress) {
        let mut inner = self.lock();
        let expires_at = Instant::now() + self.ttl;
        inner.progress.insert(
            progress.job_id.clone(),
            Expiring {
                value: progress,
                expires_at,
            },
        );
    }

    pub fn get_progress(&self, job_id: &str) -> Option<JobProgress> {
        let inner = self.lock();
        inner
            .progress
            .get(job_id)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone())
    }

    /// First write wins: the terminal record is immutable.
    pub fn put_result(&self, result: JobResult) {
        let mut inner = self.lock();
        let expires_at = Instant::now() + self.ttl;
        inner.results.entry(result.job_id.clone()).or_insert(Expiring {
            value: result,
            expires_at,
        });
    }

    pub fn get_result(&self, job_id: &str) -> Option<JobResult> {
        let inner = self.lock();
        inner
            .results
            .get(job_id)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone())
    }

    /// Drop expired records. Callers may invoke this periodically; reads
    /// already ignore expired entries.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.progress.retain(|_, e| e.expires_at > now);
        inner.results.retain(|_, e| e.expires_at > now);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a writer panicked; the records are
        // plain data, so recover the guard and continue.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
