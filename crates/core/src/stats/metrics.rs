//! Metric catalogue: the fallback chain behind each dashboard number.

use interconnect_domain::constants::{
    ACTIVITY_TYPE_FIELD, CREATED_AT_FIELD, EVENTS_COLLECTION, EVENT_DATE_CANDIDATES,
    MATCHINGS_COLLECTION, MATCHING_ACTIVITY_TYPES, MATCHING_STATUS_FIELD,
    MATCHING_SUCCESS_STATUSES, MESSAGES_COLLECTION, PROFILES_COLLECTION,
    PROFILE_EXCHANGE_ACTIVITY, RECIPIENT_CANDIDATES, USER_ACTIVITIES_COLLECTION,
};
use interconnect_domain::MetricKind;

use super::plan::{Clause, Condition, CountTier, FieldOption, ValueSpec};

/// How one metric is computed and compared
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub kind: MetricKind,
    /// Tried in order; the first success is the value
    pub tiers: Vec<CountTier>,
    /// A decrease is the favorable direction, so the change sign is flipped
    pub invert_delta_sign: bool,
}

impl MetricDefinition {
    pub const fn new(kind: MetricKind, tiers: Vec<CountTier>) -> Self {
        Self { kind, tiers, invert_delta_sign: false }
    }

    #[must_use]
    pub const fn inverted(mut self) -> Self {
        self.invert_delta_sign = true;
        self
    }

    /// Built-in definition for `kind`
    pub fn standard(kind: MetricKind) -> Self {
        match kind {
            MetricKind::TotalMembers => total_members(),
            MetricKind::NewMembers => new_members(),
            MetricKind::MonthlyEvents => monthly_events(),
            MetricKind::MatchingSuccess => matching_success(),
            MetricKind::UnreadMessages => unread_messages(),
        }
    }
}

/// Every built-in definition, in dashboard order
pub fn standard_catalogue() -> Vec<MetricDefinition> {
    MetricKind::ALL.into_iter().map(MetricDefinition::standard).collect()
}

fn total_members() -> MetricDefinition {
    MetricDefinition::new(MetricKind::TotalMembers, vec![CountTier::new(
        "profiles",
        PROFILES_COLLECTION,
    )])
}

fn new_members() -> MetricDefinition {
    MetricDefinition::new(MetricKind::NewMembers, vec![CountTier::new(
        "profiles_created_in_month",
        PROFILES_COLLECTION,
    )
    .with(Clause::on(CREATED_AT_FIELD, Condition::WithinMonth))])
}

fn monthly_events() -> MetricDefinition {
    MetricDefinition::new(MetricKind::MonthlyEvents, vec![
        CountTier::new("events_by_event_date", EVENTS_COLLECTION)
            .with(Clause::first_present(EVENT_DATE_CANDIDATES, &Condition::WithinMonth)),
        CountTier::new("events_by_created_at", EVENTS_COLLECTION)
            .with(Clause::on(CREATED_AT_FIELD, Condition::WithinMonth)),
    ])
}

fn matching_success() -> MetricDefinition {
    MetricDefinition::new(MetricKind::MatchingSuccess, vec![
        CountTier::new("matchings_succeeded", MATCHINGS_COLLECTION).with(Clause::on(
            MATCHING_STATUS_FIELD,
            Condition::one_of(MATCHING_SUCCESS_STATUSES.iter().copied()),
        )),
        CountTier::new("matching_activities", USER_ACTIVITIES_COLLECTION).with(Clause::on(
            ACTIVITY_TYPE_FIELD,
            Condition::one_of(MATCHING_ACTIVITY_TYPES.iter().copied()),
        )),
        CountTier::new("profile_exchanges", USER_ACTIVITIES_COLLECTION)
            .with(Clause::on(ACTIVITY_TYPE_FIELD, Condition::equals(PROFILE_EXCHANGE_ACTIVITY))),
    ])
}

fn unread_messages() -> MetricDefinition {
    let read_marker = Clause::first_of(vec![
        FieldOption { field: "is_read".to_string(), condition: Condition::equals(false) },
        FieldOption { field: "read_at".to_string(), condition: Condition::IsNull },
        FieldOption { field: "read".to_string(), condition: Condition::equals(false) },
    ]);

    MetricDefinition::new(MetricKind::UnreadMessages, vec![CountTier::new(
        "unread_messages",
        MESSAGES_COLLECTION,
    )
    .with(Clause::first_present(RECIPIENT_CANDIDATES, &Condition::Equals(ValueSpec::CurrentUser)))
    .with(read_marker)])
    .inverted()
}
