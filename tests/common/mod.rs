//! Shared fixtures for ring-dl integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use ring_dl::{Error, HistoryItem, RecordingId, RecordingSource, Result};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

/// Build a history item with an optional `YYYY-MM-DDTHH:MM:SS` timestamp
pub fn item(id: i64, kind: &str, created_at: Option<&str>) -> HistoryItem {
    HistoryItem {
        id: RecordingId::new(id),
        kind: kind.to_string(),
        created_at: created_at.map(naive),
    }
}

/// Parse a `YYYY-MM-DDTHH:MM:SS` literal
pub fn naive(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").expect("valid test timestamp")
}

/// Midnight on a given day
#[allow(dead_code)]
pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .expect("valid test date")
        .and_hms_opt(0, 0, 0)
        .expect("valid midnight")
}

/// One scripted response for a fetch call
pub enum Step {
    /// Write a file of this many bytes and report success
    Succeed(u64),
    /// Fail with a remote error response
    FailRemote,
}

/// Recording source driven by a per-item script of outcomes. Records every
/// call so tests can assert which items were attempted and how often. Items
/// with an exhausted (or missing) script keep failing.
pub struct ScriptedSource {
    script: Mutex<HashMap<i64, VecDeque<Step>>>,
    calls: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    /// Source with the given per-item scripts
    pub fn new(script: impl IntoIterator<Item = (i64, Vec<Step>)>) -> Self {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|(id, steps)| (id, steps.into_iter().collect()))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of fetch calls made for an item
    pub fn calls_for(&self, id: i64) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|c| **c == id)
            .count()
    }

    /// Total fetch calls across all items
    #[allow(dead_code)]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl RecordingSource for ScriptedSource {
    async fn fetch_recording(&self, item: &HistoryItem, dest: &Path) -> Result<u64> {
        self.calls.lock().expect("calls lock").push(item.id.get());
        let step = self
            .script
            .lock()
            .expect("script lock")
            .get_mut(&item.id.get())
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::FailRemote);
        match step {
            Step::Succeed(bytes) => {
                std::fs::write(dest, vec![0u8; bytes as usize]).expect("write test recording");
                Ok(bytes)
            }
            Step::FailRemote => Err(Error::Remote {
                status: 503,
                body: Some("service unavailable".to_string()),
            }),
        }
    }
}
