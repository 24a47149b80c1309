//! Group-by counts and distinct-entity cardinalities for the dashboard
//!
//! Counting only - no numeric aggregation, weighting or time-windowing.

use std::collections::HashSet;

use crate::models::{RecordSet, RequirementRecord};
use crate::schema::{FIELD_DATA_OWNER, FIELD_DATA_STEWARD, FIELD_TARGET_DATAMART};

/// Label a record is grouped under when its owner is absent or empty
pub const UNKNOWN_OWNER: &str = "Unknown";
/// Label a record is grouped under when its datamart is absent or empty
pub const UNSPECIFIED_DATAMART: &str = "Unspecified";

/// Occurrence counts per value of `field_id`
///
/// Absent or empty values are grouped under `fallback`. Entries keep the
/// insertion order of first occurrence - charts must render the same way on
/// every pass over the same collection, and the order is part of that.
pub fn group_counts(
    records: &[RequirementRecord],
    field_id: &str,
    fallback: &str,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for record in records {
        let value = record.value(field_id);
        let key = if value.is_empty() { fallback } else { value };
        match counts.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key.to_string(), 1)),
        }
    }

    counts
}

/// Cardinality of the set of non-empty values of `field_id`
pub fn distinct_count(records: &[RequirementRecord], field_id: &str) -> usize {
    records
        .iter()
        .map(|r| r.value(field_id))
        .filter(|v| !v.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Chart-ready summary of the full collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub owner_counts: Vec<(String, usize)>,
    pub datamart_counts: Vec<(String, usize)>,
    pub distinct_stewards: usize,
    pub distinct_owners: usize,
}

impl Summary {
    pub fn compute(records: &[RequirementRecord]) -> Self {
        Self {
            total: records.len(),
            owner_counts: group_counts(records, FIELD_DATA_OWNER, UNKNOWN_OWNER),
            datamart_counts: group_counts(records, FIELD_TARGET_DATAMART, UNSPECIFIED_DATAMART),
            distinct_stewards: distinct_count(records, FIELD_DATA_STEWARD),
            distinct_owners: distinct_count(records, FIELD_DATA_OWNER),
        }
    }
}

/// Memoizes the summary on the record set's generation counter
///
/// Identity memoization, not deep comparison: the summary is recomputed only
/// when the cached collection is replaced or spliced.
#[derive(Debug, Default)]
pub struct SummaryCache {
    cached: Option<(u64, Summary)>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&mut self, set: &RecordSet) -> &Summary {
        let stale = match &self.cached {
            Some((generation, _)) => *generation != set.generation(),
            None => true,
        };
        if stale {
            self.cached = Some((set.generation(), Summary::compute(set.records())));
        }
        &self.cached.as_ref().expect("cache populated above").1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record;

    #[test]
    fn test_group_counts_with_sentinel() {
        let records = vec![
            record(1, &[("data_owner", "Finance")]),
            record(2, &[("data_owner", "")]),
            record(3, &[("data_owner", "Finance")]),
        ];
        let counts = group_counts(&records, "data_owner", UNKNOWN_OWNER);
        assert_eq!(
            counts,
            vec![("Finance".to_string(), 2), ("Unknown".to_string(), 1)]
        );
    }

    #[test]
    fn test_group_counts_order_is_first_occurrence() {
        let records = vec![
            record(1, &[("target_datamart", "Risk")]),
            record(2, &[("target_datamart", "Sales")]),
            record(3, &[("target_datamart", "Risk")]),
            record(4, &[]),
        ];
        let counts = group_counts(&records, "target_datamart", UNSPECIFIED_DATAMART);
        let keys: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Risk", "Sales", "Unspecified"]);
    }

    #[test]
    fn test_distinct_count_ignores_empty_values() {
        let records = vec![
            record(1, &[("data_steward", "A")]),
            record(2, &[("data_steward", "")]),
            record(3, &[("data_steward", "A")]),
            record(4, &[("data_steward", "B")]),
        ];
        assert_eq!(distinct_count(&records, "data_steward"), 2);
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            record(1, &[("data_owner", "Finance"), ("data_steward", "A")]),
            record(2, &[("data_owner", "Risk")]),
        ];
        let summary = Summary::compute(&records);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.distinct_owners, 2);
        assert_eq!(summary.distinct_stewards, 1);
    }

    #[test]
    fn test_cache_recomputes_only_on_new_generation() {
        let mut set = RecordSet::new();
        set.replace(vec![record(1, &[("data_owner", "Finance")])]);

        let mut cache = SummaryCache::new();
        let first = cache.summary(&set).clone();
        // Same generation: identical summary without recompute
        assert_eq!(cache.summary(&set), &first);

        set.remove(1);
        let after = cache.summary(&set);
        assert_eq!(after.total, 0);
    }
}
