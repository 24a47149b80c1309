use crate::client::{ApiError, RequirementApi};
use crate::form::FormController;
use crate::models::{RecordSet, RequirementRecord};
use crate::schema::SchemaRegistry;

/// Coordinates the confirm-before-destroy delete flow and detail expansion
///
/// Delete is two-phase: requesting it only parks the target id behind a
/// confirmation prompt; the DELETE request goes out on confirm, and the local
/// cache is spliced only after the backend acknowledges. A failed delete
/// leaves the record visible. Detail expansion is an independent toggle with
/// no interaction with edit or delete state.
#[derive(Debug, Default)]
pub struct Workflow {
    pending_delete: Option<i64>,
    expanded: Option<i64>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id awaiting delete confirmation, if any
    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// Opens the confirmation prompt for `id`; no mutation yet
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    /// Discards the pending id without any request
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issues the DELETE and splices the cache on acknowledgment
    ///
    /// Returns the removed id, or `None` when no delete was pending. The
    /// pending id is consumed either way; a failure must be re-triggered by
    /// the user.
    pub fn confirm_delete(
        &mut self,
        api: &impl RequirementApi,
        set: &mut RecordSet,
    ) -> Result<Option<i64>, ApiError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };

        api.delete(id).inspect_err(|e| {
            log::error!("Failed to delete requirement {}: {}", id, e);
        })?;

        set.remove(id);
        if self.expanded == Some(id) {
            self.expanded = None;
        }
        Ok(Some(id))
    }

    /// Enters edit mode on the form controller
    ///
    /// Scrolling the view to the form region is the presentation layer's
    /// side effect, not handled here.
    pub fn request_edit(
        &self,
        registry: &SchemaRegistry,
        form: &mut FormController,
        record: &RequirementRecord,
    ) {
        form.load_for_edit(registry, record);
    }

    /// Currently expanded record id, if any
    pub fn expanded(&self) -> Option<i64> {
        self.expanded
    }

    /// Expands `id`, collapsing it again when already expanded
    ///
    /// At most one record is expanded at a time.
    pub fn toggle_expanded(&mut self, id: i64) {
        self.expanded = if self.expanded == Some(id) {
            None
        } else {
            Some(id)
        };
    }
}
