use log::{error, warn};

use super::{ProcessImporter, target_process_id};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{ProcessPayload, WorkItemTypeField};

impl<R: ArtifactRepository> ProcessImporter<R> {
    /// Attach field usages to their work item types.
    ///
    /// Identity defaults are set by a second call so a rejected default can be
    /// tolerated without losing the field.
    pub(super) async fn add_fields_to_work_item_types(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?;

        for entry in &payload.work_item_type_fields {
            let wit = entry.work_item_type_ref_name.as_str();

            for field in &entry.fields {
                let identity_default = if is_identity(payload, field) {
                    field.effective_default().cloned()
                } else {
                    None
                };

                let add = WorkItemTypeField {
                    default_value: if identity_default.is_some() { None } else { field.default_value.clone() },
                    ..field.clone()
                };

                let added = self
                    .engine
                    .call(
                        &format!("Add field '{}' to work item type '{}'", field.reference_name, wit),
                        || self.repo.add_field_to_work_item_type(process_id, wit, &add),
                    )
                    .await
                    .import_context(|| {
                        format!(
                            "Failed to add field '{}' to work item type '{}', see logs for details.",
                            field.reference_name, wit
                        )
                    })?;

                if added.reference_name != field.reference_name {
                    return Err(MigrationError::Import(format!(
                        "Failed to add field '{}' to work item type '{}', server returned reference name '{}'.",
                        field.reference_name, wit, added.reference_name
                    )));
                }

                let Some(default_value) = identity_default else {
                    continue;
                };

                let with_default = WorkItemTypeField {
                    default_value: Some(default_value.clone()),
                    ..field.clone()
                };

                let result = self
                    .engine
                    .call(
                        &format!(
                            "Update field '{}' with default value on work item type '{}'",
                            field.reference_name, wit
                        ),
                        || self.repo.add_field_to_work_item_type(process_id, wit, &with_default),
                    )
                    .await;

                match result {
                    Ok(_) => {}
                    Err(MigrationError::Cancelled) => return Err(MigrationError::Cancelled),
                    Err(e) if self.options.continue_on_identity_default_value_failure => {
                        warn!(
                            "Failed to set field '{}' with default value '{}' to work item type '{}', continue because 'continueOnIdentityDefaultValueFailure' is set to true. {}",
                            field.reference_name, default_value, wit, e
                        );
                    }
                    Err(e) => {
                        error!("{}", e);
                        return Err(MigrationError::Import(format!(
                            "Failed to set field '{}' with default value '{}' to work item type '{}'. You may set continueOnIdentityDefaultValueFailure = true in configuration file to continue.",
                            field.reference_name, default_value, wit
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Usages of identity fields are sometimes typed `string`, the collection
/// definition is checked as well
fn is_identity(payload: &ProcessPayload, field: &WorkItemTypeField) -> bool {
    field.is_identity()
        || payload
            .fields
            .iter()
            .any(|definition| definition.reference_name == field.reference_name && definition.is_identity)
}
