//! Dashboard statistics types
//!
//! - `MetricKind`: the statistics the dashboard shows
//! - `MetricReading`: one calculator answer and where it came from
//! - `StatisticsSnapshot`: one aggregation cycle's result
//! - `SnapshotRow` / `SnapshotBaseline`: the persisted form, written strictly
//!   and read leniently

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::impl_keyword_conversions;

/* -------------------------------------------------------------------------- */
/* Metrics */
/* -------------------------------------------------------------------------- */

/// Statistic computed by one metric calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TotalMembers,
    NewMembers,
    MonthlyEvents,
    MatchingSuccess,
    UnreadMessages,
}

impl_keyword_conversions!(MetricKind {
    TotalMembers => "total_members",
    NewMembers => "new_members",
    MonthlyEvents => "monthly_events",
    MatchingSuccess => "matching_success",
    UnreadMessages => "unread_messages",
});

impl MetricKind {
    /// Every metric, in dashboard order
    pub const ALL: [Self; 5] = [
        Self::TotalMembers,
        Self::NewMembers,
        Self::MonthlyEvents,
        Self::MatchingSuccess,
        Self::UnreadMessages,
    ];

    /// Metrics compared against the previous snapshot
    pub const fn has_period_comparison(self) -> bool {
        !matches!(self, Self::NewMembers)
    }
}

/// Where a metric value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tier", rename_all = "snake_case")]
pub enum ReadingSource {
    /// A live cache entry
    Cache,
    /// The fallback tier at this zero-based position
    Tier(usize),
    /// Every tier failed; the value is the zero default
    Unavailable,
}

/// One calculator answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricReading {
    pub kind: MetricKind,
    pub value: u64,
    pub source: ReadingSource,
}

impl MetricReading {
    /// Zero-valued reading for a metric that could not be computed
    pub const fn unavailable(kind: MetricKind) -> Self {
        Self { kind, value: 0, source: ReadingSource::Unavailable }
    }

    pub const fn is_available(&self) -> bool {
        !matches!(self.source, ReadingSource::Unavailable)
    }
}

/* -------------------------------------------------------------------------- */
/* Snapshot */
/* -------------------------------------------------------------------------- */

/// One aggregation cycle's dashboard numbers
///
/// Counts are never negative. Change percents are always finite: 0.0 when
/// there is no baseline or the baseline value is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_members: u64,
    pub total_members_change_percent: f64,
    pub monthly_events: u64,
    pub monthly_events_change_percent: f64,
    #[serde(rename = "matching_success")]
    pub matching_success_count: u64,
    pub matching_success_change_percent: f64,
    pub unread_messages: u64,
    /// Positive when unread messages went down
    pub unread_messages_change_percent: f64,
    pub new_members_this_month: u64,
    /// Metrics reported as 0 because no data source answered
    #[serde(default)]
    pub unavailable_metrics: Vec<MetricKind>,
    /// Capture time of the snapshot the deltas were computed against
    #[serde(default)]
    pub baseline_captured_at: Option<DateTime<Utc>>,
    pub captured_at: DateTime<Utc>,
}

impl StatisticsSnapshot {
    /// Current value of `kind`
    pub const fn count(&self, kind: MetricKind) -> u64 {
        match kind {
            MetricKind::TotalMembers => self.total_members,
            MetricKind::NewMembers => self.new_members_this_month,
            MetricKind::MonthlyEvents => self.monthly_events,
            MetricKind::MatchingSuccess => self.matching_success_count,
            MetricKind::UnreadMessages => self.unread_messages,
        }
    }

    /// Period-over-period change for `kind`, if it has one
    pub const fn change_percent(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::TotalMembers => Some(self.total_members_change_percent),
            MetricKind::NewMembers => None,
            MetricKind::MonthlyEvents => Some(self.monthly_events_change_percent),
            MetricKind::MatchingSuccess => Some(self.matching_success_change_percent),
            MetricKind::UnreadMessages => Some(self.unread_messages_change_percent),
        }
    }

    pub fn is_unavailable(&self, kind: MetricKind) -> bool {
        self.unavailable_metrics.contains(&kind)
    }

    /// Copy to persist: unavailable metrics keep the baseline's count
    /// instead of the placeholder 0
    #[must_use]
    pub fn carried_forward(&self, baseline: Option<&SnapshotBaseline>) -> Self {
        let mut carried = self.clone();
        if let Some(baseline) = baseline {
            for &kind in &self.unavailable_metrics {
                if kind.has_period_comparison() {
                    carried.set_count(kind, baseline.count(kind));
                }
            }
        }
        carried
    }

    fn set_count(&mut self, kind: MetricKind, value: u64) {
        let slot = match kind {
            MetricKind::TotalMembers => &mut self.total_members,
            MetricKind::NewMembers => &mut self.new_members_this_month,
            MetricKind::MonthlyEvents => &mut self.monthly_events,
            MetricKind::MatchingSuccess => &mut self.matching_success_count,
            MetricKind::UnreadMessages => &mut self.unread_messages,
        };
        *slot = value;
    }

    /// Persisted form of this snapshot
    pub fn to_row(&self) -> SnapshotRow {
        SnapshotRow {
            total_members: self.total_members,
            monthly_events: self.monthly_events,
            matching_success: self.matching_success_count,
            unread_messages: self.unread_messages,
            new_members: self.new_members_this_month,
            member_growth_percentage: self.total_members_change_percent,
            event_increase: self.monthly_events_change_percent,
            matching_change_percentage: self.matching_success_change_percent,
            unread_change_percentage: self.unread_messages_change_percent,
            captured_at: self.captured_at,
            updated_at: self.captured_at,
        }
    }
}

/// Row written to the snapshot collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub total_members: u64,
    pub monthly_events: u64,
    pub matching_success: u64,
    pub unread_messages: u64,
    pub new_members: u64,
    pub member_growth_percentage: f64,
    pub event_increase: f64,
    pub matching_change_percentage: f64,
    pub unread_change_percentage: f64,
    pub captured_at: DateTime<Utc>,
    /// Same instant as `captured_at`, for tables that only order by it
    pub updated_at: DateTime<Utc>,
}

/// Previous snapshot, as far as it could be decoded
///
/// Missing, null, negative or malformed counts read as 0. Older rows that
/// only carry `updated_at` still provide a capture time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnapshotBaseline {
    #[serde(deserialize_with = "lenient_count")]
    pub total_members: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub monthly_events: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub matching_success: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub unread_messages: u64,
    #[serde(alias = "updated_at", deserialize_with = "lenient_timestamp")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl SnapshotBaseline {
    /// Baseline value of `kind`; metrics without a comparison read as 0
    pub const fn count(&self, kind: MetricKind) -> u64 {
        match kind {
            MetricKind::TotalMembers => self.total_members,
            MetricKind::MonthlyEvents => self.monthly_events,
            MetricKind::MatchingSuccess => self.matching_success,
            MetricKind::UnreadMessages => self.unread_messages,
            MetricKind::NewMembers => 0,
        }
    }
}

impl From<&StatisticsSnapshot> for SnapshotBaseline {
    fn from(snapshot: &StatisticsSnapshot) -> Self {
        Self {
            total_members: snapshot.total_members,
            monthly_events: snapshot.monthly_events,
            matching_success: snapshot.matching_success_count,
            unread_messages: snapshot.unread_messages,
            captured_at: Some(snapshot.captured_at),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(count)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn snapshot() -> StatisticsSnapshot {
        StatisticsSnapshot {
            total_members: 1150,
            total_members_change_percent: 4.5,
            monthly_events: 12,
            monthly_events_change_percent: 0.0,
            matching_success_count: 7,
            matching_success_change_percent: -12.5,
            unread_messages: 2,
            unread_messages_change_percent: 50.0,
            new_members_this_month: 50,
            unavailable_metrics: vec![],
            baseline_captured_at: None,
            captured_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).single().expect("valid"),
        }
    }

    #[test]
    fn test_metric_kind_round_trip_names() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.as_str().parse::<MetricKind>(), Ok(kind));
            assert_eq!(serde_json::to_value(kind).expect("serializes"), json!(kind.as_str()));
        }
        assert!(!MetricKind::NewMembers.has_period_comparison());
        assert!(MetricKind::UnreadMessages.has_period_comparison());
    }

    #[test]
    fn test_snapshot_serializes_matching_success_name() {
        let value = serde_json::to_value(snapshot()).expect("serializes");
        assert_eq!(value["matching_success"], json!(7));
        assert!(value.get("matching_success_count").is_none());
    }

    #[test]
    fn test_snapshot_accessors() {
        let snap = snapshot();
        assert_eq!(snap.count(MetricKind::NewMembers), 50);
        assert_eq!(snap.change_percent(MetricKind::NewMembers), None);
        let unread = snap.change_percent(MetricKind::UnreadMessages).expect("unread has a comparison");
        assert!((unread - 50.0).abs() < 1e-9);
        assert!(!snap.is_unavailable(MetricKind::TotalMembers));
    }

    #[test]
    fn test_row_uses_persisted_column_names() {
        let row = serde_json::to_value(snapshot().to_row()).expect("serializes");
        assert_eq!(row["total_members"], json!(1150));
        assert_eq!(row["member_growth_percentage"], json!(4.5));
        assert_eq!(row["event_increase"], json!(0.0));
        assert_eq!(row["captured_at"], json!("2025-03-14T09:30:00Z"));
        assert_eq!(row["updated_at"], row["captured_at"]);
    }

    #[test]
    fn test_baseline_decodes_leniently() {
        let baseline: SnapshotBaseline = serde_json::from_value(json!({
            "id": 3,
            "total_members": "1100",
            "monthly_events": null,
            "matching_success": -4,
            "unread_messages": 4.0,
            "updated_at": "2025-02-28T23:00:00+00:00"
        }))
        .expect("lenient decode");

        assert_eq!(baseline.total_members, 1100);
        assert_eq!(baseline.monthly_events, 0);
        assert_eq!(baseline.matching_success, 0);
        assert_eq!(baseline.unread_messages, 4);
        assert_eq!(
            baseline.captured_at,
            Utc.with_ymd_and_hms(2025, 2, 28, 23, 0, 0).single()
        );
    }

    #[test]
    fn test_carried_forward_keeps_baseline_for_unavailable() {
        let mut snap = snapshot();
        snap.unread_messages = 0;
        snap.new_members_this_month = 0;
        snap.unavailable_metrics = vec![MetricKind::NewMembers, MetricKind::UnreadMessages];
        let baseline = SnapshotBaseline { total_members: 1100, unread_messages: 4, ..SnapshotBaseline::default() };

        let carried = snap.carried_forward(Some(&baseline));

        assert_eq!(carried.unread_messages, 4);
        assert_eq!(carried.new_members_this_month, 0);
        assert_eq!(carried.total_members, 1150);
        assert_eq!(carried.unavailable_metrics, snap.unavailable_metrics);
        assert_eq!(snap.carried_forward(None), snap);
    }

    #[test]
    fn test_baseline_from_empty_row() {
        let baseline: SnapshotBaseline = serde_json::from_value(json!({})).expect("decodes");
        assert_eq!(baseline, SnapshotBaseline::default());
    }

    #[test]
    fn test_baseline_from_snapshot() {
        let baseline = SnapshotBaseline::from(&snapshot());
        assert_eq!(baseline.count(MetricKind::MatchingSuccess), 7);
        assert_eq!(baseline.count(MetricKind::NewMembers), 0);
        assert_eq!(baseline.captured_at, Some(snapshot().captured_at));
    }

    #[test]
    fn test_reading_availability() {
        let reading = MetricReading::unavailable(MetricKind::UnreadMessages);
        assert_eq!(reading.value, 0);
        assert!(!reading.is_available());
        let cached =
            MetricReading { kind: MetricKind::TotalMembers, value: 3, source: ReadingSource::Cache };
        assert!(cached.is_available());
    }
}
