//! Ordered replay of a process payload onto the destination account
//!
//! Steps run strictly one after another, each artifact kind in its own
//! module. Later steps reference what earlier ones created (fields need
//! picklist ids, type fields need fields, ...), so the order below matters.

mod behaviors;
mod fields;
mod layouts;
mod picklists;
mod rules;
mod states;
mod type_fields;
pub mod validation;
mod work_item_types;

use log::{error, info};
use uuid::Uuid;

pub use validation::PreImportValidator;

use crate::api::ArtifactRepository;
use crate::engine::Engine;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{CreateProcessModel, ProcessPayload, TargetAccountInformation};

/// Switches that change how the replay treats the destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Replaces the payload's process name before validation
    pub target_process_name: Option<String>,
    /// Delete same-named destination processes instead of failing validation
    pub overwrite_process_on_target: bool,
    pub overwrite_picklist: bool,
    pub continue_on_rule_import_failure: bool,
    pub continue_on_identity_default_value_failure: bool,
    pub skip_import_form_contributions: bool,
}

pub struct ProcessImporter<R> {
    repo: R,
    engine: Engine,
    options: ImportOptions,
}

impl<R: ArtifactRepository> ProcessImporter<R> {
    pub fn new(repo: R, engine: Engine, options: ImportOptions) -> Self {
        Self { repo, engine, options }
    }

    pub async fn import_process(&self, payload: &mut ProcessPayload) -> MigrationResult<()> {
        info!("Process import started.");

        if let Err(e) = self.replay(payload).await {
            if let MigrationError::Validation(_) = e {
                error!("Pre-Import validation failed. No artifacts were created on target process");
            }
            return Err(e);
        }

        info!("Process import completed successfully.");
        Ok(())
    }

    async fn replay(&self, payload: &mut ProcessPayload) -> MigrationResult<()> {
        if let Some(name) = &self.options.target_process_name {
            payload.process.name = name.clone();
        }

        let validator = PreImportValidator::new(&self.repo, &self.engine, self.options.overwrite_picklist);
        self.engine
            .step(
                "Pre-import validation on target account",
                validator.validate(payload, self.options.overwrite_process_on_target),
            )
            .await?;

        if self.options.overwrite_process_on_target {
            self.engine
                .step(
                    "Delete process (if exist) on target account",
                    self.delete_process_on_target(&payload.process.name),
                )
                .await?;
        }

        self.engine
            .step("Create process on target account", self.create_process(payload))
            .await?;
        self.engine
            .step("Create artifacts on target process", self.create_components(payload))
            .await
    }

    async fn delete_process_on_target(&self, process_name: &str) -> MigrationResult<()> {
        let processes = self
            .engine
            .call("Get processes on target account", || self.repo.list_processes())
            .await
            .import_context(|| "Failed to get processes on target account.".to_string())?;

        for process in processes.iter().filter(|p| p.name_matches(process_name)) {
            let Some(type_id) = process.type_id.as_deref() else {
                continue;
            };

            self.engine
                .call(&format!("Delete process '{}' on target account", process.name), || {
                    self.repo.delete_process(type_id)
                })
                .await
                .import_context(|| {
                    "Failed to delete process on target, do you have projects created using that process?".to_string()
                })?;
        }

        Ok(())
    }

    async fn create_process(&self, payload: &mut ProcessPayload) -> MigrationResult<()> {
        let parent_process_type_id = payload.process.parent_process_type_id.clone().ok_or_else(|| {
            MigrationError::Import(format!(
                "Process '{}' has no parent process, cannot create it on target account.",
                payload.process.name
            ))
        })?;

        // Only the returned type id is used afterwards
        let model = CreateProcessModel {
            name: payload.process.name.clone(),
            parent_process_type_id,
            reference_name: Uuid::new_v4().simple().to_string(),
            description: payload.process.description.clone(),
        };

        let created = self
            .engine
            .call(&format!("Create process '{}'", model.name), || {
                self.repo.create_process(&model)
            })
            .await
            .import_context(|| format!("Failed to create process '{}' on target account.", model.name))?;

        let type_id = created.type_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            MigrationError::Import(format!(
                "Failed to create process '{}' on target account, server returned no type id.",
                model.name
            ))
        })?;

        payload.process.type_id = Some(type_id);
        Ok(())
    }

    async fn create_components(&self, payload: &mut ProcessPayload) -> MigrationResult<()> {
        self.engine
            .step("Import picklists on target account", self.import_picklists(payload))
            .await?;
        self.engine
            .step("Import fields on target account", self.import_fields(payload))
            .await?;
        self.engine
            .step("Import work item types on target process", self.import_work_item_types(payload))
            .await?;
        self.engine
            .step(
                "Add field to work item types on target process",
                self.add_fields_to_work_item_types(payload),
            )
            .await?;
        self.engine
            .step("Import work item form layouts on target process", self.import_layouts(payload))
            .await?;
        self.engine
            .step("Import states on target process", self.import_states(payload))
            .await?;
        self.engine
            .step("Import rules on target process", self.import_rules(payload))
            .await?;
        self.engine
            .step("Import behaviors on target process", self.import_behaviors(payload))
            .await?;
        self.engine
            .step(
                "Add behavior to work item types on target process",
                self.add_behaviors_to_work_item_types(payload),
            )
            .await
    }
}

/// Destination process id, set once the process is created
fn target_process_id(payload: &ProcessPayload) -> MigrationResult<&str> {
    payload
        .process
        .type_id
        .as_deref()
        .ok_or_else(|| MigrationError::Import("Target process has not been created.".to_string()))
}

fn target_information(payload: &ProcessPayload) -> MigrationResult<&TargetAccountInformation> {
    payload.target_account_information.as_ref().ok_or_else(|| {
        MigrationError::Import("Target account information is not populated, run validation first.".to_string())
    })
}
