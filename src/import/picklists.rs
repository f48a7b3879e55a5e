use std::collections::HashSet;

use log::debug;
use uuid::Uuid;

use super::{ProcessImporter, target_information};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{Picklist, PicklistTarget, ProcessPayload, WitFieldPicklist};

impl<R: ArtifactRepository> ProcessImporter<R> {
    /// Create or overwrite picklists. Must run before fields are created.
    pub(super) async fn import_picklists(&self, payload: &mut ProcessPayload) -> MigrationResult<()> {
        let mapping = &target_information(payload)?.field_ref_name_to_picklist_id;
        let mut processed = HashSet::new();
        let mut created = Vec::new();

        for entry in &payload.wit_field_picklists {
            // Fields shared by several work item types are listed once per type
            if !processed.insert(entry.field_ref_name.as_str()) {
                continue;
            }

            match mapping.get(&entry.field_ref_name) {
                Some(PicklistTarget::NoAction) => {
                    debug!("Picklist of field '{}' already matches target", entry.field_ref_name);
                }
                Some(PicklistTarget::Existing(target_id)) => {
                    self.update_picklist(entry, target_id).await?;
                }
                Some(PicklistTarget::Created(_)) => {}
                None => {
                    let id = self.create_picklist(entry).await?;
                    created.push((entry.field_ref_name.clone(), id));
                }
            }
        }

        if let Some(info) = payload.target_account_information.as_mut() {
            for (field_ref_name, id) in created {
                info.field_ref_name_to_picklist_id
                    .insert(field_ref_name, PicklistTarget::Created(id));
            }
        }

        Ok(())
    }

    async fn update_picklist(&self, entry: &WitFieldPicklist, target_id: &str) -> MigrationResult<()> {
        let field_ref_name = &entry.field_ref_name;
        let picklist = Picklist {
            id: Some(target_id.to_string()),
            ..entry.picklist.clone()
        };

        let updated = self
            .engine
            .call(
                &format!("Update picklist '{}' for field '{}'", target_id, field_ref_name),
                || self.repo.update_picklist(target_id, &picklist),
            )
            .await
            .import_context(|| {
                format!(
                    "Failed to update picklist '{}' for field '{}', check logs for details.",
                    target_id, field_ref_name
                )
            })?;

        if updated.id.as_deref().is_none_or(str::is_empty) {
            return Err(MigrationError::Import(format!(
                "Update picklist '{}' for field '{}' was not successful, result is empty, possibly the picklist does not exist on target collection.",
                target_id, field_ref_name
            )));
        }

        if updated.items.len() != entry.picklist.items.len() {
            return Err(MigrationError::Import(format!(
                "Update picklist '{}' for field '{}' was not successful, items number does not match.",
                target_id, field_ref_name
            )));
        }

        if let Some(item) = updated
            .items
            .iter()
            .find(|item| !entry.picklist.items.contains(item))
        {
            return Err(MigrationError::Import(format!(
                "Update picklist '{}' for field '{}' was not successful, item '{}' does not match expected.",
                target_id, field_ref_name, item
            )));
        }

        Ok(())
    }

    async fn create_picklist(&self, entry: &WitFieldPicklist) -> MigrationResult<String> {
        let field_ref_name = &entry.field_ref_name;
        // Picklist names are collection-wide, a fresh name never collides
        let picklist = Picklist {
            id: None,
            name: format!("picklist_{}", Uuid::new_v4()),
            ..entry.picklist.clone()
        };

        let created = self
            .engine
            .call(&format!("Create picklist for field {}", field_ref_name), || {
                self.repo.create_picklist(&picklist)
            })
            .await
            .import_context(|| format!("Failed to create picklist for field {}, see logs for details.", field_ref_name))?;

        created.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            MigrationError::Import(format!(
                "Failed to create picklist for field {}, server returned empty result or id.",
                field_ref_name
            ))
        })
    }
}
