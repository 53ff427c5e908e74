//! Bounded pool of live sessions.
//!
//! Two levels of locking:
//!
//! * the pool's own bookkeeping (entry map and recency index) sits behind a
//!   `std::sync::Mutex` that is held only for map operations, never across an
//!   `.await`;
//! * each session sits behind its own `tokio::sync::Mutex`, which a request
//!   holds for its whole duration so resolutions of one session never overlap.
//!
//! Evicting a session that is still locked by an in-flight request only drops
//! the pool's handle; the request finishes on its own `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::attributes::Domain;
use crate::error::DialogError;
use crate::machine::CompiledMachine;
use crate::session::Session;

/// A pooled session, locked per request.
pub type SharedSession<D> = Arc<tokio::sync::Mutex<Session<D>>>;

struct PoolEntry<D> {
    session:     SharedSession<D>,
    last_access: u64,
}

struct PoolInner<D> {
    entries: HashMap<String, PoolEntry<D>>,
    /// last_access tick → session id; the first key is the LRU entry.
    recency: BTreeMap<u64, String>,
    clock:   u64,
}

impl<D> PoolInner<D> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

pub struct SessionPool<D> {
    machine:     Arc<CompiledMachine<D>>,
    capacity:    usize,
    trace_limit: usize,
    inner:       Mutex<PoolInner<D>>,
}

impl<D: Domain> SessionPool<D> {
    /// A pool holding at most `capacity` sessions of `machine`.
    pub fn new(machine: Arc<CompiledMachine<D>>, capacity: usize) -> Result<Self, DialogError> {
        if capacity == 0 {
            return Err(DialogError::InvalidCapacity);
        }
        Ok(Self {
            machine,
            capacity,
            trace_limit: 64,
            inner: Mutex::new(PoolInner {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                clock:   0,
            }),
        })
    }

    /// Trace entries kept per session created from now on.
    pub fn with_trace_limit(mut self, limit: usize) -> Self {
        self.trace_limit = limit; self
    }

    pub fn machine(&self) -> &Arc<CompiledMachine<D>> {
        &self.machine
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the session for `id`, creating it on first access. Every call
    /// marks the session most recently used; creating one beyond capacity
    /// evicts the least recently used session.
    pub fn get(&self, id: &str) -> SharedSession<D> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let now = inner.tick();

        if let Some(entry) = inner.entries.get_mut(id) {
            let previous = std::mem::replace(&mut entry.last_access, now);
            let session = Arc::clone(&entry.session);
            inner.recency.remove(&previous);
            inner.recency.insert(now, id.to_string());
            return session;
        }

        while inner.entries.len() >= self.capacity {
            let Some((_, evicted)) = inner.recency.pop_first() else { break };
            inner.entries.remove(&evicted);
            tracing::debug!(session = %evicted, capacity = self.capacity, "evicted least recently used session");
        }

        let session = Arc::new(tokio::sync::Mutex::new(
            Session::new(id, Arc::clone(&self.machine), self.trace_limit)
        ));
        inner.entries.insert(id.to_string(), PoolEntry {
            session:     Arc::clone(&session),
            last_access: now,
        });
        inner.recency.insert(now, id.to_string());
        tracing::debug!(session = %id, live = inner.entries.len(), "session created");
        session
    }

    /// Drops a session, e.g. when its conversation ends. Returns whether it
    /// was present.
    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.lock();
        match inner.entries.remove(id) {
            Some(entry) => {
                inner.recency.remove(&entry.last_access);
                true
            }
            None => false,
        }
    }

    /// Drops every session, e.g. at shutdown.
    pub fn clear(&self) {
        let mut inner = self.lock();
        let drained = inner.entries.len();
        inner.entries.clear();
        inner.recency.clear();
        tracing::info!(drained, "session pool cleared");
    }

    /// Does not count as an access.
    pub fn contains(&self, id: &str) -> bool {
        self.lock().entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live session ids, least recently used first.
    pub fn session_ids_by_recency(&self) -> Vec<String> {
        self.lock().recency.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner<D>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
