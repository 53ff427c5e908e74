use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// A query against an external data backend, used from prepare operations.
///
/// # Contract
/// - Must be Send + Sync (shared by every session through the machine)
/// - Returns Err(String) for any failure, including timeouts, which the
///   implementation enforces itself
/// - May block; the engine treats the call as opaque
pub trait LookupOperation: Send + Sync {
    type Output;

    fn lookup(&self, query: &str) -> Result<Self::Output, String>;
}

/// Programmed lookup results for tests and demos.
pub struct MockLookup<T> {
    results:  HashMap<String, Result<T, String>>,
    fallback: Option<T>,
    call_log: Mutex<Vec<String>>,
}

impl<T: Clone> MockLookup<T> {
    pub fn new() -> Self {
        Self {
            results:  HashMap::new(),
            fallback: None,
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(mut self, query: impl Into<String>, result: T) -> Self {
        self.results.insert(query.into(), Ok(result)); self
    }

    pub fn with_failure(mut self, query: impl Into<String>, error: impl Into<String>) -> Self {
        self.results.insert(query.into(), Err(error.into())); self
    }

    /// Returned for queries without a programmed result.
    pub fn with_fallback(mut self, result: T) -> Self {
        self.fallback = Some(result); self
    }

    /// Returns the number of times lookup() was invoked
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Queries in the order they were looked up
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<T: Clone> Default for MockLookup<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Clone + Send + Sync> LookupOperation for MockLookup<T> {
    type Output = T;

    fn lookup(&self, query: &str) -> Result<T, String> {
        self.call_log.lock().unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        match (self.results.get(query), &self.fallback) {
            (Some(result), _)   => result.clone(),
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None)        => Err(format!("MockLookup: no programmed result for '{}'", query)),
        }
    }
}
