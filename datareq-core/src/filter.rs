use crate::models::RequirementRecord;
use crate::schema::{FIELD_ATTRIBUTE, FIELD_DATA_STEWARD, FIELD_TARGET_DATAMART};

/// Three independent free-text substring filters plus the "show all" toggle
///
/// UI-only, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub attribute: String,
    pub steward: String,
    pub datamart: String,
    pub show_all: bool,
}

impl FilterCriteria {
    /// No text filters and "show all" off - the default-latest view applies
    pub fn is_default_view(&self) -> bool {
        self.attribute.is_empty()
            && self.steward.is_empty()
            && self.datamart.is_empty()
            && !self.show_all
    }

    /// Conjunction of the three case-insensitive substring checks
    ///
    /// Absent attributes compare as empty string.
    pub fn matches(&self, record: &RequirementRecord) -> bool {
        contains_ci(record.value(FIELD_ATTRIBUTE), &self.attribute)
            && contains_ci(record.value(FIELD_DATA_STEWARD), &self.steward)
            && contains_ci(record.value(FIELD_TARGET_DATAMART), &self.datamart)
    }

    /// Derives the visible subset of the fetched collection
    ///
    /// With no criteria at all the view collapses to the single most recent
    /// record (the first element, per the backend's most-recent-first
    /// ordering contract), or nothing when the collection is empty. That
    /// collapse is the documented policy, not an accident. Any text filter or
    /// the "show all" toggle switches to the full filtered scan.
    pub fn apply<'a>(&self, records: &'a [RequirementRecord]) -> Vec<&'a RequirementRecord> {
        if self.is_default_view() {
            return records.first().into_iter().collect();
        }

        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Empty needle matches everything
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
