//! Runtime configuration for ring-dl
//!
//! A [`Config`] is built once from command-line arguments (with environment
//! fallback for credentials), validated, and read-only for the rest of the
//! run. Argument parsing is deliberately lenient: a malformed value for an
//! optional flag is dropped and the field keeps its default, matching the
//! tool's documented behavior.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default number of download attempts per recording
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Environment variable consulted when `-username` is not passed
pub const USERNAME_ENV: &str = "RING_USERNAME";

/// Environment variable consulted when `-password` is not passed
pub const PASSWORD_ENV: &str = "RING_PASSWORD";

/// Resolved settings for one download run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Ring account username
    pub username: Option<String>,

    /// Ring account password
    pub password: Option<String>,

    /// Directory recordings are written to (default: current directory)
    pub output_path: PathBuf,

    /// Only download events of this kind, e.g. "motion" or "ring"
    pub type_filter: Option<String>,

    /// Start of the history window. Must be set before any network call.
    pub start_date: Option<NaiveDateTime>,

    /// End of the history window. `None` means "now" at the moment the
    /// history is fetched, not at program start.
    pub end_date: Option<NaiveDateTime>,

    /// Maximum download attempts per recording (at least 1)
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            output_path: PathBuf::from("."),
            type_filter: None,
            start_date: None,
            end_date: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Config {
    /// Build a configuration from command-line arguments.
    ///
    /// Credentials fall back to the `RING_USERNAME` / `RING_PASSWORD`
    /// environment variables when the corresponding flags are absent;
    /// explicit flags win over the environment.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        config.apply_env();
        config.apply_args(args);
        config
    }

    /// Overlay credentials from the environment
    fn apply_env(&mut self) {
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            self.username = Some(username);
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            self.password = Some(password);
        }
    }

    /// Overlay command-line flags.
    ///
    /// Each flag takes the next argument as its value. A flag at the end of
    /// the argument list, or an unparseable date/number value, is ignored.
    fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let mut index = 0;
        while index < args.len() {
            let flag = args[index].as_str();
            let Some(value) = args.get(index + 1) else {
                break;
            };
            match flag {
                "-username" => self.username = Some(value.clone()),
                "-password" => self.password = Some(value.clone()),
                "-out" => self.output_path = PathBuf::from(value),
                "-type" => self.type_filter = Some(value.clone()),
                "-lastdays" => {
                    if let Ok(days) = value.parse::<f64>() {
                        let now = Local::now().naive_local();
                        self.start_date =
                            Some(now - Duration::seconds((days * 86_400.0) as i64));
                        self.end_date = Some(now);
                    }
                }
                "-startdate" => {
                    if let Some(date) = parse_date_time(value) {
                        self.start_date = Some(date);
                    }
                }
                "-enddate" => {
                    if let Some(date) = parse_date_time(value) {
                        self.end_date = Some(date);
                    }
                }
                "-retries" => {
                    if let Ok(retries) = value.parse::<u32>()
                        && retries >= 1
                    {
                        self.max_retries = retries;
                    }
                }
                _ => {
                    // Unknown token: move one position and re-examine, so a
                    // stray value does not swallow the following flag.
                    index += 1;
                    continue;
                }
            }
            index += 2;
        }
    }

    /// Check the required settings, in the order the tool reports them.
    ///
    /// Must pass before any network activity is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.username.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(Error::config_key("-username is required", "username"));
        }
        if self.password.as_deref().is_none_or(|p| p.trim().is_empty()) {
            return Err(Error::config_key("-password is required", "password"));
        }
        if self.start_date.is_none() {
            return Err(Error::config_key(
                "-startdate or -lastdays is required",
                "start_date",
            ));
        }
        Ok(())
    }
}

/// Parse a date-time argument value.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, `DD-MM-YYYY
/// HH:MM:SS` and the bare-date forms of each (midnight assumed). Returns
/// `None` for anything else; callers treat that as "value not given".
fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%d-%m-%Y %H:%M:%S"];
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}
