//! # ring-dl
//!
//! Downloads recorded events from a Ring doorbell/camera account to local
//! MP4 files. The library authenticates, retrieves a time-filtered event
//! history, narrows it by event kind, and downloads each recording
//! sequentially with bounded immediate retries per item.
//!
//! ## Design Philosophy
//!
//! - **Sequential by design** - items download one at a time, in history order
//! - **Failures stay local** - one recording giving up never aborts the run
//! - **Deterministic filenames** - `<timestamp> (<id>).mp4`, derived only
//!   from the item itself
//!
//! ## Quick Start
//!
//! ```no_run
//! use ring_dl::{Config, Downloader, Reporter, RingSession, filter_by_kind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_args(std::env::args().skip(1));
//!     config.validate()?;
//!
//!     let mut session = RingSession::new(
//!         config.username.clone().unwrap_or_default(),
//!         config.password.clone().unwrap_or_default(),
//!     )?;
//!     session.authenticate().await?;
//!
//!     let start = config.start_date.ok_or("start date required")?;
//!     let history = session.history(start, config.end_date).await?;
//!     let items = filter_by_kind(history, config.type_filter.as_deref());
//!
//!     let mut reporter = Reporter::stdout();
//!     let downloader = Downloader::new(&session, &config.output_path, config.max_retries);
//!     downloader.run(&items, &mut reporter).await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Runtime configuration and argument parsing
pub mod config;
/// Sequential download orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Event history types and the filtering/naming pipeline
pub mod history;
/// Console progress rendering
pub mod report;
/// Bounded immediate-retry logic
pub mod retry;
/// Authenticated session against the Ring cloud API
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use downloader::{Downloader, Outcome, RunSummary};
pub use error::{Error, Result};
pub use history::{HistoryItem, RecordingId, filter_by_kind};
pub use report::Reporter;
pub use session::{RecordingSource, RingSession};
