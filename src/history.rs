//! Event history types and the filtering/naming pipeline
//!
//! A [`HistoryItem`] is one recorded event as returned by the service. Items
//! are immutable once fetched; the pipeline narrows the list by kind and
//! derives deterministic local filenames from capture timestamps.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Unique identifier of a recorded event
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordingId(pub i64);

impl RecordingId {
    /// Create a new RecordingId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RecordingId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RecordingId> for i64 {
    fn from(id: RecordingId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RecordingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// One recorded event from the doorbell history
///
/// Sourced entirely from the remote service and never mutated. An item
/// without a capture timestamp is permanently unprocessable: it is skipped
/// before the download loop and never produces a file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Event identifier, used verbatim in filenames
    pub id: RecordingId,

    /// Category tag, e.g. "motion" or "ring"
    pub kind: String,

    /// Capture timestamp as the service reports it (no timezone conversion)
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl HistoryItem {
    /// Derive the local filename for this item's recording.
    ///
    /// `<created_at as "YYYY-MM-DD HH-MM-SS"> (<id>).mp4`, or `None` when the
    /// item has no capture timestamp.
    pub fn file_name(&self) -> Option<String> {
        self.created_at
            .map(|ts| format!("{} ({}).mp4", ts.format("%Y-%m-%d %H-%M-%S"), self.id))
    }

    /// Full destination path under `output_dir`
    pub fn destination(&self, output_dir: &Path) -> Option<PathBuf> {
        self.file_name().map(|name| output_dir.join(name))
    }
}

/// Narrow a history list by event kind.
///
/// Keeps exactly the items whose `kind` equals `filter` case-insensitively,
/// preserving order. An absent or blank filter returns the input unchanged;
/// a filter matching nothing yields an empty list, which is not an error.
pub fn filter_by_kind(items: Vec<HistoryItem>, filter: Option<&str>) -> Vec<HistoryItem> {
    let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return items;
    };
    let wanted = filter.to_lowercase();
    items
        .into_iter()
        .filter(|item| item.kind.to_lowercase() == wanted)
        .collect()
}

/// Deserialize a timestamp the way the service formats it, keeping the
/// literal clock value and discarding any UTC offset. Missing, null, or
/// unparseable values become `None` rather than failing the whole history
/// page.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_service_timestamp))
}

fn parse_service_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        // naive_local() keeps the clock value as printed by the service
        return Some(with_offset.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn item(id: i64, kind: &str, created_at: Option<NaiveDateTime>) -> HistoryItem {
        HistoryItem {
            id: RecordingId(id),
            kind: kind.to_string(),
            created_at,
        }
    }

    // -----------------------------------------------------------------------
    // Filter laws
    // -----------------------------------------------------------------------

    #[test]
    fn absent_filter_returns_input_unchanged() {
        let items = vec![
            item(1, "motion", None),
            item(2, "ring", None),
            item(3, "motion", None),
        ];
        let filtered = filter_by_kind(items.clone(), None);
        assert_eq!(filtered.len(), 3);
        let ids: Vec<i64> = filtered.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn blank_filter_behaves_like_absent() {
        let items = vec![item(1, "motion", None), item(2, "ring", None)];
        assert_eq!(filter_by_kind(items.clone(), Some("")).len(), 2);
        assert_eq!(filter_by_kind(items, Some("   ")).len(), 2);
    }

    #[test]
    fn filter_matches_case_insensitively_and_preserves_order() {
        let items = vec![
            item(1, "Motion", None),
            item(2, "ring", None),
            item(3, "MOTION", None),
            item(4, "motion_detected", None),
        ];
        let filtered = filter_by_kind(items, Some("motion"));
        let ids: Vec<i64> = filtered.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![1, 3], "exact match only, original order kept");
    }

    #[test]
    fn unmatched_filter_yields_empty_list() {
        let items = vec![item(1, "motion", None)];
        assert!(filter_by_kind(items, Some("ding")).is_empty());
    }

    // -----------------------------------------------------------------------
    // Filename derivation
    // -----------------------------------------------------------------------

    #[test]
    fn file_name_formats_timestamp_and_id() {
        let event = item(42, "motion", Some(ts(2019, 3, 5, 8, 12, 45)));
        assert_eq!(
            event.file_name().unwrap(),
            "2019-03-05 08-12-45 (42).mp4"
        );
    }

    #[test]
    fn file_name_is_none_without_timestamp() {
        assert!(item(42, "motion", None).file_name().is_none());
    }

    #[test]
    fn destination_joins_output_dir() {
        let event = item(7, "ring", Some(ts(2020, 12, 31, 23, 59, 1)));
        let dest = event.destination(Path::new("/tmp/out")).unwrap();
        assert_eq!(
            dest,
            PathBuf::from("/tmp/out/2020-12-31 23-59-01 (7).mp4")
        );
    }

    // -----------------------------------------------------------------------
    // Service JSON deserialization
    // -----------------------------------------------------------------------

    #[test]
    fn deserializes_rfc3339_timestamp_keeping_clock_value() {
        let event: HistoryItem = serde_json::from_str(
            r#"{"id": 42, "kind": "motion", "created_at": "2019-03-05T08:12:45.000-06:00"}"#,
        )
        .unwrap();
        assert_eq!(event.created_at, Some(ts(2019, 3, 5, 8, 12, 45)));
    }

    #[test]
    fn missing_timestamp_deserializes_to_none() {
        let event: HistoryItem =
            serde_json::from_str(r#"{"id": 1, "kind": "ring"}"#).unwrap();
        assert!(event.created_at.is_none());
    }

    #[test]
    fn unparseable_timestamp_deserializes_to_none() {
        let event: HistoryItem = serde_json::from_str(
            r#"{"id": 1, "kind": "ring", "created_at": "soon"}"#,
        )
        .unwrap();
        assert!(event.created_at.is_none());
    }

    #[test]
    fn null_timestamp_deserializes_to_none() {
        let event: HistoryItem = serde_json::from_str(
            r#"{"id": 1, "kind": "ring", "created_at": null}"#,
        )
        .unwrap();
        assert!(event.created_at.is_none());
    }

    #[test]
    fn recording_id_round_trips_display_and_fromstr() {
        let id: RecordingId = "6543210".parse().unwrap();
        assert_eq!(id, RecordingId::new(6543210));
        assert_eq!(id.to_string(), "6543210");
    }
}
