use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::client::{ApiError, RequirementApi};
use crate::models::RequirementRecord;
use crate::schema::SchemaRegistry;

/// How long the transient "submitted" affordance stays visible
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

/// Errors raised by the form state controller
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// `set_field` with an unregistered id - a programming defect, not a
    /// user-facing condition
    #[error("Unknown field id: {0}")]
    UnknownField(String),

    /// Required-field check failed at submit time (role-scoped)
    #[error("Missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },
}

/// Errors from a submit attempt
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What a successful submit did
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(RequirementRecord),
    Updated(RequirementRecord),
}

/// The attribute map currently bound to input controls
///
/// Always total over the registry: every registered field id is present,
/// unmapped fields round-trip as empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: HashMap<String, String>,
}

impl FormState {
    /// Every field id mapped to empty string
    pub fn empty(registry: &SchemaRegistry) -> Self {
        Self {
            values: registry
                .fields()
                .iter()
                .map(|f| (f.id.clone(), String::new()))
                .collect(),
        }
    }

    /// Populated from a record, absent attributes falling back to empty
    /// string (records predating a schema change must not error)
    pub fn from_record(registry: &SchemaRegistry, record: &RequirementRecord) -> Self {
        Self {
            values: registry
                .fields()
                .iter()
                .map(|f| (f.id.clone(), record.value(&f.id).to_string()))
                .collect(),
        }
    }

    pub fn get(&self, field_id: &str) -> &str {
        self.values.get(field_id).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Pure update: a new state with only that field's value replaced
    pub fn with_field(
        &self,
        registry: &SchemaRegistry,
        field_id: &str,
        value: &str,
    ) -> Result<Self, FormError> {
        if !registry.contains(field_id) {
            return Err(FormError::UnknownField(field_id.to_string()));
        }
        let mut next = self.clone();
        next.values.insert(field_id.to_string(), value.to_string());
        Ok(next)
    }
}

/// Owns the in-progress record being created or edited
///
/// Exactly one form state exists at a time; the edit session is either absent
/// (create mode) or holds the id of the record being edited. No nested
/// sessions.
#[derive(Debug)]
pub struct FormController {
    state: FormState,
    editing: Option<i64>,
    success_until: Option<Instant>,
}

impl FormController {
    pub fn new(registry: &SchemaRegistry) -> Self {
        Self {
            state: FormState::empty(registry),
            editing: None,
            success_until: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Id of the record being edited, if any
    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    /// Resets the form to all-empty without touching the edit session
    pub fn init_empty(&mut self, registry: &SchemaRegistry) {
        self.state = FormState::empty(registry);
    }

    /// Enters edit mode, snapshotting the record's values into the form
    pub fn load_for_edit(&mut self, registry: &SchemaRegistry, record: &RequirementRecord) {
        self.state = FormState::from_record(registry, record);
        self.editing = Some(record.id);
    }

    /// Replaces one field's value; unregistered ids are rejected
    pub fn set_field(
        &mut self,
        registry: &SchemaRegistry,
        field_id: &str,
        value: &str,
    ) -> Result<(), FormError> {
        self.state = self.state.with_field(registry, field_id, value)?;
        Ok(())
    }

    /// Leaves edit mode and resets the form
    pub fn cancel_edit(&mut self, registry: &SchemaRegistry) {
        self.editing = None;
        self.init_empty(registry);
    }

    /// Checks that every field visible to `role` is non-empty
    ///
    /// Required-ness means literally non-empty, nothing more - no trimming,
    /// no format checks. Fields hidden for the current role are not
    /// required. Missing ids are reported in display order.
    pub fn validate(&self, registry: &SchemaRegistry, role: &str) -> Result<(), FormError> {
        let missing: Vec<String> = registry
            .visible_fields(role)
            .iter()
            .filter(|f| self.state.get(&f.id).is_empty())
            .map(|f| f.id.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::Validation { missing })
        }
    }

    /// Validates, then creates or updates through the backend
    ///
    /// POST when no edit session is active, PUT with the session's id
    /// otherwise. On acknowledgment the session is cleared, the form reset
    /// and the transient success flag armed. On any failure the form and
    /// session are left untouched so the user can retry.
    pub fn submit(
        &mut self,
        registry: &SchemaRegistry,
        role: &str,
        api: &impl RequirementApi,
    ) -> Result<SubmitOutcome, SubmitError> {
        self.validate(registry, role)?;

        let outcome = match self.editing {
            None => SubmitOutcome::Created(api.create(self.state.values())?),
            Some(id) => SubmitOutcome::Updated(api.update(id, self.state.values())?),
        };

        self.editing = None;
        self.init_empty(registry);
        self.mark_success(Instant::now());
        Ok(outcome)
    }

    /// Arms the success affordance for [`SUCCESS_DISPLAY`]
    pub fn mark_success(&mut self, now: Instant) {
        self.success_until = Some(now + SUCCESS_DISPLAY);
    }

    /// Whether the success affordance is still showing at `now`
    pub fn success_visible(&self, now: Instant) -> bool {
        self.success_until.map_or(false, |until| now < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StubApi;
    use crate::models::record;
    use crate::schema::ALL_ROLE;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::standard()
    }

    #[test]
    fn test_empty_state_covers_full_registry() {
        let registry = registry();
        let state = FormState::empty(&registry);

        assert_eq!(state.values().len(), registry.fields().len());
        for field in registry.fields() {
            assert_eq!(state.get(&field.id), "");
        }
    }

    #[test]
    fn test_load_for_edit_snapshots_record() {
        let registry = registry();
        let mut form = FormController::new(&registry);
        let rec = record(3, &[("attribute", "loan_type"), ("data_owner", "Risk")]);

        form.load_for_edit(&registry, &rec);

        assert_eq!(form.editing(), Some(3));
        assert_eq!(form.state().get("attribute"), "loan_type");
        assert_eq!(form.state().get("data_owner"), "Risk");
        // Attributes the record never had round-trip as empty string
        assert_eq!(form.state().get("sla"), "");
    }

    #[test]
    fn test_cancel_edit_is_equivalent_to_fresh_form() {
        let registry = registry();
        let mut form = FormController::new(&registry);
        let rec = record(3, &[("attribute", "loan_type")]);

        form.load_for_edit(&registry, &rec);
        form.set_field(&registry, "description", "scratch").unwrap();
        form.cancel_edit(&registry);

        assert_eq!(form.editing(), None);
        assert_eq!(form.state(), &FormState::empty(&registry));
    }

    #[test]
    fn test_set_field_rejects_unknown_id() {
        let registry = registry();
        let mut form = FormController::new(&registry);

        let err = form.set_field(&registry, "no_such_field", "x").unwrap_err();
        assert_eq!(err, FormError::UnknownField("no_such_field".to_string()));
        // The state is untouched on rejection
        assert_eq!(form.state(), &FormState::empty(&registry));
    }

    #[test]
    fn test_with_field_replaces_only_that_field() {
        let registry = registry();
        let state = FormState::empty(&registry);
        let next = state.with_field(&registry, "attribute", "customer_id").unwrap();

        assert_eq!(next.get("attribute"), "customer_id");
        assert_eq!(state.get("attribute"), "");
        assert_eq!(next.values().len(), state.values().len());
    }

    #[test]
    fn test_validate_reports_missing_visible_fields() {
        let registry = registry();
        let mut form = FormController::new(&registry);

        // Fill everything a Data Steward sees except retention_period
        for field in registry.visible_fields("Data Steward") {
            if field.id != "retention_period" {
                let id = field.id.clone();
                form.set_field(&registry, &id, "filled").unwrap();
            }
        }

        let err = form.validate(&registry, "Data Steward").unwrap_err();
        assert_eq!(
            err,
            FormError::Validation {
                missing: vec!["retention_period".to_string()]
            }
        );
    }

    #[test]
    fn test_required_means_non_empty_not_non_blank() {
        let registry = registry();
        let mut form = FormController::new(&registry);

        for field in registry.visible_fields("Data Steward") {
            let id = field.id.clone();
            form.set_field(&registry, &id, " ").unwrap();
        }

        // Whitespace counts as a value; required-ness is plain non-emptiness
        assert!(form.validate(&registry, "Data Steward").is_ok());
    }

    #[test]
    fn test_hidden_fields_are_not_required() {
        let registry = registry();
        let mut form = FormController::new(&registry);

        for field in registry.visible_fields("Business Analyst") {
            let id = field.id.clone();
            form.set_field(&registry, &id, "filled").unwrap();
        }

        // source_system is hidden for this role and still empty
        assert_eq!(form.state().get("source_system"), "");
        assert!(form.validate(&registry, "Business Analyst").is_ok());
    }

    #[test]
    fn test_submit_creates_when_no_session() {
        let registry = registry();
        let api = StubApi::default();
        let mut form = FormController::new(&registry);

        for field in registry.fields() {
            let id = field.id.clone();
            form.set_field(&registry, &id, "filled").unwrap();
        }

        let outcome = form.submit(&registry, ALL_ROLE, &api).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert_eq!(api.created.borrow().len(), 1);
        assert!(api.updated.borrow().is_empty());

        // Session cleared, form reset, success armed
        assert_eq!(form.editing(), None);
        assert_eq!(form.state(), &FormState::empty(&registry));
        assert!(form.success_visible(Instant::now()));
    }

    #[test]
    fn test_submit_updates_with_session_id() {
        let registry = registry();
        let api = StubApi::default();
        let mut form = FormController::new(&registry);

        let mut rec = record(12, &[]);
        for field in registry.fields() {
            rec.fields.insert(field.id.clone(), "filled".to_string());
        }
        form.load_for_edit(&registry, &rec);

        let outcome = form.submit(&registry, ALL_ROLE, &api).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Updated(_)));
        assert_eq!(api.updated.borrow()[0].0, 12);
        assert!(api.created.borrow().is_empty());
        assert_eq!(form.editing(), None);
    }

    #[test]
    fn test_validation_failure_performs_no_network_call() {
        let registry = registry();
        let api = StubApi::default();
        let mut form = FormController::new(&registry);

        let err = form.submit(&registry, ALL_ROLE, &api).unwrap_err();
        assert!(matches!(err, SubmitError::Form(FormError::Validation { .. })));
        assert!(api.created.borrow().is_empty());
        assert!(api.updated.borrow().is_empty());
    }

    #[test]
    fn test_network_failure_leaves_form_intact() {
        let registry = registry();
        let api = StubApi {
            fail: true,
            ..Default::default()
        };
        let mut form = FormController::new(&registry);

        for field in registry.fields() {
            let id = field.id.clone();
            form.set_field(&registry, &id, "filled").unwrap();
        }
        let before = form.state().clone();

        let err = form.submit(&registry, ALL_ROLE, &api).unwrap_err();
        assert!(matches!(err, SubmitError::Api(_)));
        assert_eq!(form.state(), &before);
        assert!(!form.success_visible(Instant::now()));
    }

    #[test]
    fn test_success_flag_expires() {
        let registry = registry();
        let mut form = FormController::new(&registry);
        let now = Instant::now();

        form.mark_success(now);
        assert!(form.success_visible(now));
        assert!(form.success_visible(now + Duration::from_secs(2)));
        assert!(!form.success_visible(now + SUCCESS_DISPLAY));
    }
}
