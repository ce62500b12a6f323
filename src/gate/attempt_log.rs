// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Blocked,
    FetchSuccess,
    FetchError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub outcome: AttemptOutcome,
    pub details: String,
}

impl AttemptRecord {
    pub fn new(
        url: impl Into<String>,
        outcome: AttemptOutcome,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            url: url.into(),
            outcome,
            details: details.into(),
        }
    }
}

/// Fixed-size history of recent mediation decisions, oldest evicted first
#[derive(Debug)]
pub struct AttemptLog {
    records: Mutex<VecDeque<AttemptRecord>>,
    capacity: usize,
}

impl AttemptLog {
    /// A zero capacity is bumped to one so the newest record is always visible
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn append(&self, record: AttemptRecord) {
        let mut records = self.lock();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Snapshot, oldest first
    pub fn recent(&self) -> Vec<AttemptRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Every critical section is a single push or pop, so a poisoned buffer is still consistent
    fn lock(&self) -> MutexGuard<'_, VecDeque<AttemptRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
