//! Bounded immediate-retry logic for per-item downloads
//!
//! Every failure class is retried identically: a fixed number of attempts,
//! no delay between them. The observer callback sees each attempt start and
//! each failure, which is how the reporter interleaves progress output with
//! the retry loop without owning it.

use std::future::Future;

/// Progress of one bounded-retry sequence, surfaced to the observer
#[derive(Debug)]
pub enum Attempt<'e, E> {
    /// An attempt is about to run (1-based)
    Started {
        /// Attempt number, starting at 1
        number: u32,
    },
    /// An attempt failed; the error is borrowed for the callback's duration
    Failed {
        /// Attempt number that failed
        number: u32,
        /// The error the attempt produced
        error: &'e E,
    },
}

/// Run `operation` up to `max_attempts` times, retrying immediately on any
/// error.
///
/// Returns the first success or the last error, together with the number of
/// attempts actually made. At least one attempt is always made. The result
/// of a failed attempt is discarded entirely; the next attempt starts from
/// scratch against the same destination.
pub async fn retry_immediate<F, Fut, T, E, O>(
    max_attempts: u32,
    mut observe: O,
    mut operation: F,
) -> (Result<T, E>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    O: FnMut(Attempt<'_, E>),
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        observe(Attempt::Started { number: attempt });
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "succeeded after retry");
                }
                return (Ok(value), attempt);
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    attempt,
                    max_attempts,
                    "attempt failed"
                );
                observe(Attempt::Failed {
                    number: attempt,
                    error: &error,
                });
                if attempt >= max_attempts {
                    return (Err(error), attempt);
                }
            }
        }
    }
}
