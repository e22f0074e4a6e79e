//! Sequential download orchestration
//!
//! The orchestrator walks the filtered history in order, one item at a time.
//! Each eligible item moves through NotStarted -> Attempting(n) ->
//! Succeeded | GaveUp; an item without a capture timestamp is skipped before
//! the first attempt. No item's outcome affects whether the next item is
//! attempted, and nothing here aborts the run.

use std::io::Write;
use std::path::Path;

use crate::error::Error;
use crate::history::HistoryItem;
use crate::report::Reporter;
use crate::retry::{Attempt, retry_immediate};
use crate::session::RecordingSource;

/// Terminal state of one history item
#[derive(Debug)]
pub enum Outcome {
    /// The recording was written to disk
    Succeeded {
        /// Bytes written to the destination file
        bytes_written: u64,
    },
    /// Every attempt failed; the item was abandoned
    GaveUp {
        /// Attempts made before giving up
        attempts: u32,
        /// The error the final attempt produced
        error: Error,
    },
    /// The item has no capture timestamp and was never attempted
    Skipped,
}

/// Totals for a completed run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items whose recording was downloaded
    pub succeeded: usize,
    /// Items abandoned after exhausting their attempts
    pub gave_up: usize,
    /// Items skipped for lacking a capture timestamp
    pub skipped: usize,
}

impl RunSummary {
    /// Tally outcomes into a summary
    pub fn tally(outcomes: &[Outcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Succeeded { .. } => summary.succeeded += 1,
                Outcome::GaveUp { .. } => summary.gave_up += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Downloads recordings for a list of history items, sequentially, with
/// bounded immediate retries per item
pub struct Downloader<'a, S> {
    source: &'a S,
    output_dir: &'a Path,
    max_retries: u32,
}

impl<'a, S: RecordingSource> Downloader<'a, S> {
    /// Orchestrator writing into `output_dir`, attempting each item at most
    /// `max_retries` times
    pub fn new(source: &'a S, output_dir: &'a Path, max_retries: u32) -> Self {
        Self {
            source,
            output_dir,
            max_retries,
        }
    }

    /// Process every item in order and return one outcome per item.
    ///
    /// Runs to the end of the list regardless of individual failures; the
    /// returned vector is index-aligned with `items`.
    pub async fn run<W: Write>(
        &self,
        items: &[HistoryItem],
        reporter: &mut Reporter<W>,
    ) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            outcomes.push(self.process_item(index, item, reporter).await);
        }
        outcomes
    }

    async fn process_item<W: Write>(
        &self,
        index: usize,
        item: &HistoryItem,
        reporter: &mut Reporter<W>,
    ) -> Outcome {
        // No capture timestamp means no derivable filename: skip before the
        // first attempt
        let Some(file_name) = item.file_name() else {
            tracing::debug!(id = %item.id, "item has no capture timestamp, skipping");
            return Outcome::Skipped;
        };
        let dest = self.output_dir.join(&file_name);

        let (result, attempts) = retry_immediate(
            self.max_retries,
            |event| match event {
                Attempt::Started { .. } => reporter.attempt_started(index, &file_name),
                Attempt::Failed { number, error } => {
                    reporter.attempt_failed(number, self.max_retries, error)
                }
            },
            || self.source.fetch_recording(item, &dest),
        )
        .await;

        match result {
            Ok(bytes_written) => {
                reporter.succeeded(bytes_written);
                Outcome::Succeeded { bytes_written }
            }
            Err(error) => {
                tracing::warn!(id = %item.id, attempts, error = %error, "giving up on item");
                Outcome::GaveUp { attempts, error }
            }
        }
    }
}
