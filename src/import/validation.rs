//! Destination compatibility checks run before anything is created
//!
//! Besides failing fast on conflicts, validation fills
//! `targetAccountInformation`, which the picklist and field steps read.

use std::collections::HashMap;

use futures::future::try_join_all;
use log::{debug, info};

use crate::api::ArtifactRepository;
use crate::engine::Engine;
use crate::error::{MigrationError, MigrationResult};
use crate::models::{Picklist, PicklistTarget, ProcessPayload, TargetAccountInformation, WorkItemField};

pub struct PreImportValidator<'a, R> {
    repo: &'a R,
    engine: &'a Engine,
    overwrite_picklist: bool,
}

impl<'a, R: ArtifactRepository> PreImportValidator<'a, R> {
    pub fn new(repo: &'a R, engine: &'a Engine, overwrite_picklist: bool) -> Self {
        Self {
            repo,
            engine,
            overwrite_picklist,
        }
    }

    /// Checks run strictly in order: process, fields, picklists. The
    /// existence check is skipped when the destination process is deleted
    /// before creation.
    pub async fn validate(
        &self,
        payload: &mut ProcessPayload,
        skip_process_existence_check: bool,
    ) -> MigrationResult<()> {
        payload.target_account_information = Some(TargetAccountInformation::default());

        if !payload.process.is_derived() {
            return Err(MigrationError::Validation(
                "Only inherited process is supported to be imported.".to_string(),
            ));
        }

        if !skip_process_existence_check {
            self.engine
                .step(
                    "Validate process existence on target account",
                    self.validate_process(payload),
                )
                .await?;
        }

        let collection_fields = self
            .engine
            .step("Validate fields on target account", self.validate_fields(payload))
            .await?;

        let mapping = self
            .engine
            .step(
                "Validate picklists on target account",
                self.validate_picklists(payload, &collection_fields),
            )
            .await?;

        payload.target_account_information = Some(TargetAccountInformation {
            collection_fields,
            field_ref_name_to_picklist_id: mapping,
        });

        info!("Pre-import validation completed.");
        Ok(())
    }

    async fn validate_process(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let target_processes = self
            .engine
            .call("Get processes on target account", || self.repo.list_processes())
            .await
            .map_err(|e| known_or(e, "Failed to get processes on target account, check account url, token and token permission."))?;

        if target_processes
            .iter()
            .any(|process| process.name_matches(&payload.process.name))
        {
            return Err(MigrationError::Validation(
                "Process with same name already exists on target account.".to_string(),
            ));
        }

        Ok(())
    }

    async fn validate_fields(&self, payload: &ProcessPayload) -> MigrationResult<Vec<WorkItemField>> {
        let target_fields = self
            .engine
            .call("Get fields on target account", || self.repo.list_fields())
            .await
            .map_err(|e| known_or(e, "Failed to get fields on target account."))?;

        for source_field in &payload.fields {
            let source_type = source_field.field_type.as_destination_type(source_field.is_identity);

            let conflict = target_fields.iter().any(|target_field| {
                (target_field.reference_name == source_field.reference_name || target_field.name == source_field.name)
                    && target_field.field_type != source_type
                    && !(source_field.is_identity && target_field.is_identity)
            });

            if conflict {
                return Err(MigrationError::Validation(format!(
                    "Field in target Collection conflicts with '{}' field with a different reference name or type.",
                    source_field.name
                )));
            }
        }

        Ok(target_fields)
    }

    async fn validate_picklists(
        &self,
        payload: &ProcessPayload,
        collection_fields: &[WorkItemField],
    ) -> MigrationResult<HashMap<String, PicklistTarget>> {
        let target_picklists = self.target_picklists(payload, collection_fields).await?;
        let mut mapping = HashMap::new();

        for entry in &payload.wit_field_picklists {
            let field_ref_name = &entry.field_ref_name;
            let Some(target_picklist) = target_picklists.get(field_ref_name) else {
                // No list on the destination, import creates one
                continue;
            };

            if entry.picklist.matches_items(target_picklist) {
                mapping.insert(field_ref_name.clone(), PicklistTarget::NoAction);
                continue;
            }

            if !self.overwrite_picklist {
                return Err(MigrationError::Validation(format!(
                    "Picklist field {} exist on target account but have different items than source, set 'overwritePicklist' option to overwrite",
                    field_ref_name
                )));
            }

            let target_id = target_picklist.id.clone().ok_or_else(|| {
                MigrationError::Validation(format!(
                    "Picklist of field {} on target account has no id.",
                    field_ref_name
                ))
            })?;
            debug!("Picklist of field '{}' will be overwritten", field_ref_name);
            mapping.insert(field_ref_name.clone(), PicklistTarget::Existing(target_id));
        }

        Ok(mapping)
    }

    /// Destination picklists of the source's picklist fields, fetched concurrently
    async fn target_picklists(
        &self,
        payload: &ProcessPayload,
        fields: &[WorkItemField],
    ) -> MigrationResult<HashMap<String, Picklist>> {
        let lookups = fields.iter().filter_map(|field| {
            payload.picklist_for_field(&field.reference_name)?;
            let picklist_id = field.picklist_id.as_deref().filter(|_| field.is_picklist)?;
            Some(async move {
                let label = format!("Get picklist of field '{}' on target account", field.reference_name);
                let picklist = self
                    .engine
                    .call(&label, || self.repo.get_picklist(picklist_id))
                    .await
                    .map_err(|e| known_or(e, &format!("Failed to get picklist of field '{}' on target account.", field.reference_name)))?;
                Ok::<_, MigrationError>((field.reference_name.clone(), picklist))
            })
        });

        Ok(try_join_all(lookups).await?.into_iter().collect())
    }
}

/// Remote failures during validation are reported as validation failures
fn known_or(error: MigrationError, message: &str) -> MigrationError {
    if error.is_known() {
        return error;
    }

    log::error!("{}", error);
    MigrationError::Validation(message.to_string())
}
