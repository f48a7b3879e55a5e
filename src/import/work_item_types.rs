use log::info;

use super::{ProcessImporter, target_process_id};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::ProcessPayload;

impl<R: ArtifactRepository> ProcessImporter<R> {
    /// Creates every type and rewrites the payload to the reference names the
    /// destination assigned, which derive from the destination process.
    pub(super) async fn import_work_item_types(&self, payload: &mut ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?.to_string();

        // Reject before the first create call so nothing is half imported
        if let Some(wit) = payload.work_item_types.iter().find(|wit| wit.is_system()) {
            return Err(MigrationError::Import(format!(
                "Work item type '{}' is a system work item type with no modifications, cannot import.",
                wit.name
            )));
        }

        let mut renamed = Vec::new();
        for wit in &payload.work_item_types {
            let created = self
                .engine
                .call(&format!("Create work item type '{}'", wit.reference_name), || {
                    self.repo.create_work_item_type(&process_id, wit)
                })
                .await
                .import_context(|| {
                    format!("Failed to create work item type '{}', see logs for details.", wit.reference_name)
                })?;

            if created.reference_name.trim().is_empty() {
                return Err(MigrationError::Import(format!(
                    "Failed to create work item type '{}', server returned no reference name.",
                    wit.reference_name
                )));
            }

            if created.reference_name != wit.reference_name {
                renamed.push((wit.reference_name.clone(), created.reference_name));
            }
        }

        for (source, target) in renamed {
            info!("Work item type '{}' is '{}' on target process", source, target);
            payload.rename_work_item_type(&source, &target);
        }

        Ok(())
    }
}
