//! Structured validation messages.
//!
//! The engine never renders text: each message is a [`MessageKind`] plus
//! positional arguments. Rendering lives in
//! [`crate::services::translator`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::RecordRef;

/// Identifier of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// args: `[external_id]`
    DuplicateExternalId,
    /// args: `[name]`
    DuplicateName,
    /// args: `[raw_action]`
    InvalidAction,
    /// args: `[column]`
    MissingMandatoryField,
    /// The row targets an entity that does not exist. args: `[action]`
    NotFound,
    /// The row creates an entity that already exists. args: `[]`
    Found,
    /// args: `[column, value, reference_kind]`
    ReferenceNotFound,
    /// A required reference column is empty. args: `[column]`
    MissingReference,
    /// args: `[field, value]`
    DuplicateValueInFile,
    /// args: `[field, value]`
    ValueExistsInDatabase,
    /// args: `[dependent_kind, dependent_count]`
    ProtectedDeletion,
    /// A resync left a persisted entity in place. args: `[dependent_kind, dependent_count]`
    ResyncDeletionSkipped,
    /// args: `[]`
    EntityResurrected,
    /// args: `[]`
    NoEntitiesRemain,
    /// args: `[column]`
    MeterSettingsDisabled,
    /// args: `[email, reason]`
    InvalidEmail,
}

impl MessageKind {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::DuplicateExternalId => "duplicate_external_id",
            MessageKind::DuplicateName => "duplicate_name",
            MessageKind::InvalidAction => "invalid_action",
            MessageKind::MissingMandatoryField => "missing_mandatory_field",
            MessageKind::NotFound => "not_found",
            MessageKind::Found => "found",
            MessageKind::ReferenceNotFound => "reference_not_found",
            MessageKind::MissingReference => "missing_reference",
            MessageKind::DuplicateValueInFile => "duplicate_value_in_file",
            MessageKind::ValueExistsInDatabase => "value_exists_in_database",
            MessageKind::ProtectedDeletion => "protected_deletion",
            MessageKind::ResyncDeletionSkipped => "resync_deletion_skipped",
            MessageKind::EntityResurrected => "entity_resurrected",
            MessageKind::NoEntitiesRemain => "no_entities_remain",
            MessageKind::MeterSettingsDisabled => "meter_settings_disabled",
            MessageKind::InvalidEmail => "invalid_email",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `{record, message}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// Row the message is about; `None` for batch-level messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordRef>,
    pub kind: MessageKind,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ValidationMessage {
    /// Batch-level message.
    #[must_use]
    pub fn new(kind: MessageKind) -> Self {
        Self {
            record: None,
            kind,
            args: Vec::new(),
        }
    }

    /// Message about one row.
    #[must_use]
    pub fn for_record(record: RecordRef, kind: MessageKind) -> Self {
        Self {
            record: Some(record),
            kind,
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Argument at `index`, or `""`.
    #[must_use]
    pub fn arg(&self, index: usize) -> &str {
        self.args.get(index).map_or("", String::as_str)
    }
}

/// Accumulates hard errors and soft warnings while a batch is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationMessage>,
    pub warnings: Vec<ValidationMessage>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: ValidationMessage) {
        self.errors.push(message);
    }

    pub fn warn(&mut self, message: ValidationMessage) {
        self.warnings.push(message);
    }

    pub fn extend_errors(&mut self, messages: impl IntoIterator<Item = ValidationMessage>) {
        self.errors.extend(messages);
    }

    pub fn extend_warnings(&mut self, messages: impl IntoIterator<Item = ValidationMessage>) {
        self.warnings.extend(messages);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
