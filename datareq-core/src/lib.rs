pub mod client;
pub mod config;
pub mod filter;
pub mod form;
pub mod models;
pub mod schema;
pub mod stats;
pub mod workflow;

// Re-export commonly used types
pub use client::{ApiClient, ApiError, RequirementApi};
pub use config::{preferences_path, Preferences, Theme};
pub use filter::FilterCriteria;
pub use form::{FormController, FormError, FormState, SubmitError, SubmitOutcome, SUCCESS_DISPLAY};
pub use models::{RecordSet, RequirementRecord};
pub use schema::{
    FieldDefinition, FieldKind, SchemaRegistry, ALL_ROLE, FIELD_ATTRIBUTE, FIELD_DATA_OWNER,
    FIELD_DATA_STEWARD, FIELD_TARGET_DATAMART,
};
pub use stats::{distinct_count, group_counts, Summary, SummaryCache};
pub use workflow::Workflow;
