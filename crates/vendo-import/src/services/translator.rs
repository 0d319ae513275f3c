//! Message rendering.
//!
//! The engine emits `(kind, args)` pairs; translators turn them into text.
//! Fallback between languages is a translator policy, not an engine one.

use crate::messages::{MessageKind, ValidationMessage};
use crate::reconciliation::ValidationResult;

/// Renders validation messages in one language.
pub trait MessageTranslator: Send + Sync {
    /// BCP 47 tag of the rendered language.
    fn language(&self) -> &str;

    /// Message body without the record prefix.
    fn render(&self, message: &ValidationMessage) -> String;

    /// Full line, prefixed with the record when there is one.
    fn translate(&self, message: &ValidationMessage) -> String {
        let body = self.render(message);
        match &message.record {
            Some(record) => format!("{record}: {body}"),
            None => body,
        }
    }

    /// Errors then warnings of a result, one line each.
    fn translate_result(&self, result: &ValidationResult) -> Vec<String> {
        result
            .errors
            .iter()
            .chain(&result.warnings)
            .map(|message| self.translate(message))
            .collect()
    }
}

/// English renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTranslator;

impl MessageTranslator for EnglishTranslator {
    fn language(&self) -> &str {
        "en"
    }

    fn render(&self, message: &ValidationMessage) -> String {
        let a = |i| message.arg(i);
        match message.kind {
            MessageKind::DuplicateExternalId => {
                format!("External id '{}' appears more than once in the file", a(0))
            }
            MessageKind::DuplicateName => {
                format!("Name '{}' appears more than once in the file", a(0))
            }
            MessageKind::InvalidAction => format!("Invalid action '{}'", a(0)),
            MessageKind::MissingMandatoryField => format!("Missing mandatory field '{}'", a(0)),
            MessageKind::NotFound => format!("Cannot {}: entity does not exist", a(0)),
            MessageKind::Found => "Cannot create: entity already exists".to_string(),
            MessageKind::ReferenceNotFound => format!(
                "{} '{}' does not match any {}",
                a(0),
                a(1),
                a(2).replace('_', " ")
            ),
            MessageKind::MissingReference => format!("Reference '{}' is empty", a(0)),
            MessageKind::DuplicateValueInFile => {
                format!("Value '{}' of {} is used by several rows", a(1), a(0))
            }
            MessageKind::ValueExistsInDatabase => {
                format!("Value '{}' of {} is already used by another entity", a(1), a(0))
            }
            MessageKind::ProtectedDeletion => format!(
                "Cannot delete: still used by {} {}",
                a(1),
                a(0).replace('_', " ")
            ),
            MessageKind::ResyncDeletionSkipped => format!(
                "Not deleted by full resync: still used by {} {}",
                a(1),
                a(0).replace('_', " ")
            ),
            MessageKind::EntityResurrected => "Previously deleted entity restored".to_string(),
            MessageKind::NoEntitiesRemain => {
                "Full resync would leave no entities; nothing was changed".to_string()
            }
            MessageKind::MeterSettingsDisabled => {
                format!("Field '{}' ignored: meters are disabled for this company", a(0))
            }
            MessageKind::InvalidEmail => format!("Invalid email '{}': {}", a(0), a(1)),
        }
    }
}
