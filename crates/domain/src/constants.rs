//! Collection names, candidate field lists and defaults
//!
//! Deployments disagree on column names, so several lists below are ordered
//! by preference and resolved against a sample row at runtime.

// Collections
pub const PROFILES_COLLECTION: &str = "profiles";
pub const EVENTS_COLLECTION: &str = "events";
pub const MATCHINGS_COLLECTION: &str = "matchings";
pub const USER_ACTIVITIES_COLLECTION: &str = "user_activities";
pub const MESSAGES_COLLECTION: &str = "messages";
pub const DEFAULT_SNAPSHOT_COLLECTION: &str = "dashboard_stats";

// Fields
pub const CREATED_AT_FIELD: &str = "created_at";
pub const EVENT_DATE_CANDIDATES: &[&str] = &["event_date", "start_date", "date"];
pub const MATCHING_STATUS_FIELD: &str = "status";
pub const MATCHING_SUCCESS_STATUSES: &[&str] = &["success", "completed"];
pub const ACTIVITY_TYPE_FIELD: &str = "activity_type";
pub const MATCHING_ACTIVITY_TYPES: &[&str] = &["matching_success", "matching"];
pub const PROFILE_EXCHANGE_ACTIVITY: &str = "profile_exchange";
pub const RECIPIENT_CANDIDATES: &[&str] = &["recipient_id", "to_user_id", "receiver_id"];
pub const SNAPSHOT_ORDER_CANDIDATES: &[&str] = &["captured_at", "updated_at", "created_at"];
/// Columns present on every `dashboard_stats` table, including ones created
/// before capture times and change percents were stored
pub const LEGACY_SNAPSHOT_COLUMNS: &[&str] = &[
    "total_members",
    "monthly_events",
    "matching_success",
    "unread_messages",
    "member_growth_percentage",
    "event_increase",
    "updated_at",
];

// Defaults
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
