//! Users.
//!
//! Users keep the declared intent: a CREATE of an existing user is reported
//! instead of silently turned into an update.

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::{Batch, EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile, Snapshot};
use crate::validation::{CreatePolicy, ReferenceRule, UniqueField};

/// Maximum email length per RFC 5321.
const MAX_EMAIL_LENGTH: usize = 254;

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Users,
    check_names: true,
    mandatory_fields: &["name", "email"],
    references: &[ReferenceRule::optional("warehouse_id", ReferenceKind::Warehouse)],
    unique_fields: &[UniqueField {
        label: "email",
        columns: &["email"],
    }],
    protections: &[],
    create_policy: CreatePolicy::RejectExisting,
    extra_references: &[],
    uses_meter_settings: false,
};

/// Practical email shape check: one `@`, non-empty local part, dotted
/// domain, no whitespace.
pub(crate) fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Email exceeds maximum length of {MAX_EMAIL_LENGTH} characters"
        ));
    }

    if email.contains(char::is_whitespace) {
        return Err("Email contains whitespace".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Email must contain exactly one '@'".to_string());
    };

    if local.is_empty() {
        return Err("Email local part is empty".to_string());
    }

    if domain.contains('@') {
        return Err("Email must contain exactly one '@'".to_string());
    }

    if !domain.contains('.') {
        return Err("Email domain must contain at least one '.'".to_string());
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err("Email domain cannot start or end with '.'".to_string());
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserOrchestrator;

impl EntityOrchestrator for UserOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }

    fn kind_checks(&self, batch: Batch, _snapshot: &Snapshot, report: &mut ValidationReport) -> Batch {
        for row in batch.rows().iter().filter(|row| !row.is_delete()) {
            let Some(email) = row.value_key("email") else {
                continue;
            };
            if let Err(reason) = validate_email(&email) {
                report.error(
                    ValidationMessage::for_record(row.record(), MessageKind::InvalidEmail)
                        .with_arg(&email)
                        .with_arg(reason),
                );
            }
        }
        batch
    }
}
