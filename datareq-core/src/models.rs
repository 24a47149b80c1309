use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One submitted requirement as owned by the remote collection
///
/// `id`, `created_at` and `updated_at` are assigned by the server; everything
/// else is a flat string attribute keyed by its schema field id. Records
/// predating a schema change may be missing newer attributes, so reads go
/// through [`RequirementRecord::value`] which falls back to the empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

impl RequirementRecord {
    /// Attribute value, absent keys read as empty string
    pub fn value(&self, field_id: &str) -> &str {
        self.fields.get(field_id).map(String::as_str).unwrap_or("")
    }
}

/// Read-only cache of the fetched collection, in backend order
///
/// The backend contract is most-recent-first (sort key = creation time,
/// descending), which the default view of the filter engine relies on. The
/// generation counter is bumped on every replace or splice so the aggregation
/// engine can memoize by identity instead of deep comparison.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<RequirementRecord>,
    generation: u64,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RequirementRecord] {
        &self.records
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&RequirementRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Replaces the whole cache after a fetch
    pub fn replace(&mut self, records: Vec<RequirementRecord>) {
        self.records = records;
        self.generation += 1;
    }

    /// Splices out one record after an acknowledged delete
    ///
    /// Returns false when the id is not cached, in which case the generation
    /// is left untouched.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() != before {
            self.generation += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
pub(crate) fn record(id: i64, pairs: &[(&str, &str)]) -> RequirementRecord {
    RequirementRecord {
        id,
        created_at: Utc::now(),
        updated_at: None,
        fields: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_falls_back_to_empty() {
        let rec = record(1, &[("attribute", "customer_id")]);
        assert_eq!(rec.value("attribute"), "customer_id");
        assert_eq!(rec.value("never_set"), "");
    }

    #[test]
    fn test_replace_bumps_generation() {
        let mut set = RecordSet::new();
        assert_eq!(set.generation(), 0);

        set.replace(vec![record(1, &[])]);
        assert_eq!(set.generation(), 1);
        assert_eq!(set.len(), 1);

        set.replace(Vec::new());
        assert_eq!(set.generation(), 2);
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_splices_exactly_one() {
        let mut set = RecordSet::new();
        set.replace(vec![record(1, &[]), record(5, &[]), record(9, &[])]);

        assert!(set.remove(5));
        assert_eq!(set.len(), 2);
        assert!(set.get(5).is_none());
        assert!(set.get(1).is_some());
        assert!(set.get(9).is_some());

        // Unknown id leaves cache and generation alone
        let generation = set.generation();
        assert!(!set.remove(42));
        assert_eq!(set.generation(), generation);
    }

    #[test]
    fn test_record_serde_flattens_fields() {
        let rec = record(7, &[("attribute", "loan_type")]);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["attribute"], "loan_type");

        let back: RequirementRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.value("attribute"), "loan_type");
    }
}
