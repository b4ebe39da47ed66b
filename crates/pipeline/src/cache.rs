//! Content-addressed cache of segmented documents.
//!
//! Keyed by the blake3 hash of the raw bytes, so the same upload under a
//! different file name still hits. Oldest entries are evicted first.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::segment::Segment;

type Key = [u8; 32];

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Key, Arc<Vec<Segment>>>,
    order: VecDeque<Key>,
}

#[derive(Debug)]
pub struct SegmentCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl SegmentCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn key(bytes: &[u8]) -> Key {
        *blake3::hash(bytes).as_bytes()
    }

    pub fn get(&self, bytes: &[u8]) -> Option<Arc<Vec<Segment>>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.get(&Self::key(bytes)).cloned()
    }

    pub fn insert(&self, bytes: &[u8], segments: Vec<Segment>) -> Arc<Vec<Segment>> {
        let segments = Arc::new(segments);
        if self.capacity == 0 {
            return segments;
        }

        let key = Self::key(bytes);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.entries.insert(key, Arc::clone(&segments)).is_none() {
            inner.order.push_back(key);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
        segments
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
