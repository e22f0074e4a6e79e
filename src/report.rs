//! Console progress rendering
//!
//! Cosmetic by design: correctness is never derived from what the reporter
//! prints, and write errors are deliberately ignored. The binary points it
//! at stdout; tests point it at a buffer.

use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;

use crate::downloader::RunSummary;

/// Renders per-item progress and the run summary to a writer
pub struct Reporter<W> {
    out: W,
}

impl Reporter<std::io::Stdout> {
    /// Reporter writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    /// Reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Program banner
    pub fn banner(&mut self, version: &str) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "Ring Recording Download Tool v{version}");
        let _ = writeln!(self.out);
    }

    /// A free-form line, used for fatal configuration messages
    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    /// Session is being set up
    pub fn connecting(&mut self) {
        let _ = writeln!(self.out, "Connecting to Ring services");
    }

    /// Token exchange is running
    pub fn authenticating(&mut self) {
        let _ = writeln!(self.out, "Authenticating");
    }

    /// The history window about to be fetched
    pub fn window(
        &mut self,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        type_filter: Option<&str>,
    ) {
        let kinds = type_filter.filter(|t| !t.trim().is_empty()).unwrap_or("all");
        let start = start.format("%A %e %B %Y %H:%M:%S");
        let end = match end {
            Some(end) => end.format("%A %e %B %Y %H:%M:%S").to_string(),
            None => "now".to_string(),
        };
        let _ = writeln!(
            self.out,
            "Downloading {kinds} historical events between {start} and {end}"
        );
    }

    /// How many items matched, and where they will be written
    pub fn item_count(&mut self, count: usize, output_path: &Path) {
        let plural = if count == 1 { "" } else { "s" };
        let _ = writeln!(
            self.out,
            "{count} item{plural} found, downloading to {}",
            output_path.display()
        );
    }

    /// An attempt for an item is starting. Partial line; the outcome is
    /// appended by [`succeeded`] or [`attempt_failed`].
    ///
    /// [`succeeded`]: Reporter::succeeded
    /// [`attempt_failed`]: Reporter::attempt_failed
    pub fn attempt_started(&mut self, index: usize, file_name: &str) {
        let _ = write!(self.out, "{} - {file_name}... ", index + 1);
        let _ = self.out.flush();
    }

    /// The item downloaded successfully
    pub fn succeeded(&mut self, bytes: u64) {
        let _ = writeln!(self.out, "done ({} MB)", bytes / 1_048_576);
    }

    /// An attempt failed; announces the retry or the give-up
    pub fn attempt_failed<E: std::fmt::Display>(&mut self, number: u32, max: u32, error: &E) {
        let _ = write!(self.out, "failed ({error})");
        if number < max {
            let _ = writeln!(self.out, ". Retrying {}/{max}.", number + 1);
        } else {
            let _ = writeln!(self.out, ". Giving up.");
        }
    }

    /// Closing summary for the run
    pub fn summary(&mut self, summary: &RunSummary) {
        let _ = writeln!(
            self.out,
            "Done. {} downloaded, {} given up, {} skipped.",
            summary.succeeded, summary.gave_up, summary.skipped
        );
    }
}
