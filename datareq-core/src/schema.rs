use anyhow::Result;
use std::collections::HashSet;
use std::fmt;

/// Sentinel role whose visible set is always the full registry
pub const ALL_ROLE: &str = "All";

// Field ids consulted by the filter and aggregation engines
pub const FIELD_ATTRIBUTE: &str = "attribute";
pub const FIELD_DATA_STEWARD: &str = "data_steward";
pub const FIELD_DATA_OWNER: &str = "data_owner";
pub const FIELD_TARGET_DATAMART: &str = "target_datamart";

/// Kind of input control a field is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    SingleLine,
    MultiLine,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::SingleLine => write!(f, "text"),
            FieldKind::MultiLine => write!(f, "multiline"),
        }
    }
}

/// Describes one attribute of the requirement schema
///
/// The `id` doubles as the attribute name on submitted records; `description`
/// and `example` are documentation only and never validated against.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub description: Option<String>,
    pub example: Option<String>,
}

impl FieldDefinition {
    pub fn new(id: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            description: None,
            example: None,
        }
    }

    pub fn with_docs(mut self, description: &str, example: &str) -> Self {
        self.description = Some(description.to_string());
        self.example = Some(example.to_string());
        self
    }
}

/// Immutable registry of all schema attributes and the role-visibility map
///
/// Field order is insertion order and is the canonical display order
/// everywhere (forms, detail expansion, validation messages). The registry is
/// built once at startup; there is no API to register fields afterwards.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    fields: Vec<FieldDefinition>,
    roles: Vec<(String, Vec<String>)>,
}

impl SchemaRegistry {
    /// Builds a registry, validating referential integrity up front: every
    /// role-mapped id must exist and no role may list an id twice.
    pub fn new(fields: Vec<FieldDefinition>, roles: Vec<(String, Vec<String>)>) -> Result<Self> {
        let mut ids = HashSet::new();
        for field in &fields {
            if !ids.insert(field.id.as_str()) {
                anyhow::bail!("Duplicate field id in registry: {}", field.id);
            }
        }

        for (role, subset) in &roles {
            let mut seen = HashSet::new();
            for id in subset {
                if !ids.contains(id.as_str()) {
                    anyhow::bail!("Role '{}' references unknown field id: {}", role, id);
                }
                if !seen.insert(id.as_str()) {
                    anyhow::bail!("Role '{}' lists field id twice: {}", role, id);
                }
            }
        }

        Ok(Self { fields, roles })
    }

    /// The built-in datamart mapping schema
    pub fn standard() -> Self {
        let fields = vec![
            FieldDefinition::new("attribute", "Attribute", FieldKind::SingleLine)
                .with_docs("Target field name in the datamart", "customer_id, loan_type"),
            FieldDefinition::new("description", "Description", FieldKind::MultiLine)
                .with_docs("Business meaning of the attribute", "Unique customer identifier"),
            FieldDefinition::new("domain", "Domain", FieldKind::SingleLine)
                .with_docs("Business domain the attribute belongs to", "onboarding, collection"),
            FieldDefinition::new("source_system", "Source System", FieldKind::SingleLine)
                .with_docs("System of record the value originates from", "crm, iabs"),
            FieldDefinition::new("source_entity", "Source Entity", FieldKind::SingleLine)
                .with_docs("Table or entity in the source system", "customers, loans"),
            FieldDefinition::new("source_field", "Source Field", FieldKind::SingleLine)
                .with_docs("Column in the source entity", "cust_id"),
            FieldDefinition::new("transformation_logic", "Transformation Logic", FieldKind::MultiLine)
                .with_docs("How the source value maps to the target", "Trim and cast to bigint"),
            FieldDefinition::new("target_datamart", "Target Datamart", FieldKind::SingleLine)
                .with_docs("Analytical schema the field is mapped into", "Sales, Risk"),
            FieldDefinition::new("target_table", "Target Table", FieldKind::SingleLine)
                .with_docs("Table in the target datamart", "dim_customer"),
            FieldDefinition::new("data_type", "Data Type", FieldKind::SingleLine)
                .with_docs("Target column type", "bigint, varchar(64)"),
            FieldDefinition::new("data_owner", "Data Owner", FieldKind::SingleLine)
                .with_docs("Business owner accountable for the meaning", "Finance"),
            FieldDefinition::new("data_steward", "Data Steward", FieldKind::SingleLine)
                .with_docs("Technical owner accountable for correctness", "Jane Smith"),
            FieldDefinition::new("responsible_analyst", "Responsible Analyst", FieldKind::SingleLine)
                .with_docs("Analyst who raised the requirement", "John Doe"),
            FieldDefinition::new("sensitivity", "Sensitivity", FieldKind::SingleLine)
                .with_docs("Classification of the data", "public, internal, pii"),
            FieldDefinition::new("retention_period", "Retention Period", FieldKind::SingleLine)
                .with_docs("How long the data must be kept", "7 years"),
            FieldDefinition::new("refresh_frequency", "Refresh Frequency", FieldKind::SingleLine)
                .with_docs("How often the target is reloaded", "daily, hourly"),
            FieldDefinition::new("sla", "SLA", FieldKind::SingleLine)
                .with_docs("Availability deadline for the refreshed data", "07:00 UTC"),
            FieldDefinition::new("notes", "Notes", FieldKind::MultiLine)
                .with_docs("Anything that does not fit the fields above", "Backfill from 2019 onwards"),
        ];

        let roles = vec![
            (ALL_ROLE.to_string(), Vec::new()),
            (
                "Business Analyst".to_string(),
                vec![
                    "attribute".to_string(),
                    "description".to_string(),
                    "domain".to_string(),
                    "data_owner".to_string(),
                    "responsible_analyst".to_string(),
                    "sensitivity".to_string(),
                    "notes".to_string(),
                ],
            ),
            (
                "Data Engineer".to_string(),
                vec![
                    "attribute".to_string(),
                    "source_system".to_string(),
                    "source_entity".to_string(),
                    "source_field".to_string(),
                    "transformation_logic".to_string(),
                    "target_datamart".to_string(),
                    "target_table".to_string(),
                    "data_type".to_string(),
                    "refresh_frequency".to_string(),
                ],
            ),
            (
                "Data Steward".to_string(),
                vec![
                    "attribute".to_string(),
                    "description".to_string(),
                    "data_owner".to_string(),
                    "data_steward".to_string(),
                    "sensitivity".to_string(),
                    "retention_period".to_string(),
                    "sla".to_string(),
                ],
            ),
        ];

        Self::new(fields, roles).expect("built-in schema is valid")
    }

    /// All field definitions in display order
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Looks up a single field definition
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Returns true if `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    /// Role names in registration order, the "All" sentinel included
    pub fn roles(&self) -> Vec<&str> {
        self.roles.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Visible field subset for a role, in display order
    ///
    /// The "All" sentinel and any unknown role yield the full registry.
    pub fn visible_fields(&self, role: &str) -> Vec<&FieldDefinition> {
        if role == ALL_ROLE {
            return self.fields.iter().collect();
        }

        match self.roles.iter().find(|(name, _)| name == role) {
            Some((_, subset)) if !subset.is_empty() => subset
                .iter()
                .filter_map(|id| self.field(id))
                .collect(),
            _ => self.fields.iter().collect(),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_valid() {
        let registry = SchemaRegistry::standard();
        assert!(!registry.fields().is_empty());
        assert!(registry.contains(FIELD_ATTRIBUTE));
        assert!(registry.contains(FIELD_DATA_STEWARD));
        assert!(registry.contains(FIELD_DATA_OWNER));
        assert!(registry.contains(FIELD_TARGET_DATAMART));
    }

    #[test]
    fn test_all_role_returns_full_registry() {
        let registry = SchemaRegistry::standard();
        let visible = registry.visible_fields(ALL_ROLE);
        assert_eq!(visible.len(), registry.fields().len());
    }

    #[test]
    fn test_unknown_role_returns_full_registry() {
        let registry = SchemaRegistry::standard();
        let visible = registry.visible_fields("Intern");
        assert_eq!(visible.len(), registry.fields().len());
    }

    #[test]
    fn test_role_subsets_are_within_registry() {
        let registry = SchemaRegistry::standard();
        for role in registry.roles() {
            for field in registry.visible_fields(role) {
                assert!(registry.contains(&field.id), "role {} leaked {}", role, field.id);
            }
        }
    }

    #[test]
    fn test_role_subset_preserves_order_and_content() {
        let registry = SchemaRegistry::standard();
        let visible = registry.visible_fields("Data Engineer");
        let ids: Vec<&str> = visible.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids[0], "attribute");
        assert!(ids.contains(&"transformation_logic"));
        assert!(!ids.contains(&"retention_period"));
    }

    #[test]
    fn test_duplicate_field_id_rejected() {
        let fields = vec![
            FieldDefinition::new("a", "A", FieldKind::SingleLine),
            FieldDefinition::new("a", "A again", FieldKind::SingleLine),
        ];
        let result = SchemaRegistry::new(fields, Vec::new());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate field id"));
    }

    #[test]
    fn test_role_with_unknown_id_rejected() {
        let fields = vec![FieldDefinition::new("a", "A", FieldKind::SingleLine)];
        let roles = vec![("Analyst".to_string(), vec!["missing".to_string()])];
        let result = SchemaRegistry::new(fields, roles);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown field id"));
    }

    #[test]
    fn test_role_with_duplicate_id_rejected() {
        let fields = vec![FieldDefinition::new("a", "A", FieldKind::SingleLine)];
        let roles = vec![(
            "Analyst".to_string(),
            vec!["a".to_string(), "a".to_string()],
        )];
        assert!(SchemaRegistry::new(fields, roles).is_err());
    }
}
