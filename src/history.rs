// src/history.rs

//! Bounded query history shared by every command of a session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::{Result, SqlToolsError};

/// FIFO buffer of executed query texts.
///
/// Clones share the same buffer; appends from concurrently running commands
/// are serialized by a mutex so none are lost.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    inner: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl HistoryBuffer {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a query, evicting the oldest entries beyond capacity.
    pub fn push(&self, query: impl Into<String>) {
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(query.into());
    }

    /// Entry at `index`, oldest first.
    pub fn get(&self, index: usize) -> Result<String> {
        let entries = self.lock();
        entries
            .get(index)
            .cloned()
            .ok_or(SqlToolsError::HistoryIndex {
                index,
                len: entries.len(),
            })
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
