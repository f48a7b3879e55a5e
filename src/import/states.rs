use super::{ProcessImporter, target_process_id};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{HideStateModel, ProcessPayload, WitStates, WorkItemState};

impl<R: ArtifactRepository> ProcessImporter<R> {
    pub(super) async fn import_states(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?;

        for entry in &payload.states {
            self.import_work_item_type_states(process_id, entry).await?;
        }

        Ok(())
    }

    /// States are matched by name. Destination states absent from the source
    /// are deleted, the only artifact kind import removes.
    async fn import_work_item_type_states(&self, process_id: &str, entry: &WitStates) -> MigrationResult<()> {
        let wit = entry.work_item_type_ref_name.as_str();

        let target_states = self
            .engine
            .call(
                &format!("Get states on target process for work item type '{}'", wit),
                || self.repo.get_states(process_id, wit),
            )
            .await
            .import_context(|| {
                format!(
                    "Failed to get states definitions from work item type '{}' on target account, see logs for details.",
                    wit
                )
            })?;

        if target_states.is_empty() {
            return Err(MigrationError::Import(format!(
                "Failed to get states definitions from work item type '{}' on target account, server returned empty result.",
                wit
            )));
        }

        for source in &entry.states {
            self.import_state(process_id, wit, source, &target_states)
                .await
                .import_context(|| {
                    format!(
                        "Unable to create/hide/update state '{}' in '{}' work item type, see logs for details",
                        source.name, wit
                    )
                })?;
        }

        for target in &target_states {
            if entry.states.iter().any(|source| source.name == target.name) {
                continue;
            }

            self.engine
                .call(
                    &format!("Delete state '{}' in '{}' work item type", target.name, wit),
                    || self.repo.delete_state(process_id, wit, &target.id),
                )
                .await
                .import_context(|| {
                    format!(
                        "Unable to delete state '{}' in '{}' work item type, see logs for details",
                        target.name, wit
                    )
                })?;
        }

        Ok(())
    }

    async fn import_state(
        &self,
        process_id: &str,
        wit: &str,
        source: &WorkItemState,
        target_states: &[WorkItemState],
    ) -> MigrationResult<()> {
        let input = source.to_input();

        let Some(existing) = target_states.iter().find(|target| target.name == source.name) else {
            let created = self
                .engine
                .call(&format!("Create state '{}' in '{}' work item type", source.name, wit), || {
                    self.repo.create_state(process_id, wit, &input)
                })
                .await?;

            if created.id.is_empty() {
                return Err(MigrationError::Import(format!(
                    "Unable to create state '{}' in '{}' work item type, server returned empty result or id.",
                    source.name, wit
                )));
            }
            return Ok(());
        };

        if source.hidden {
            let hide = HideStateModel { hidden: true };
            let hidden = self
                .engine
                .call(&format!("Hide state '{}' in '{}' work item type", source.name, wit), || {
                    self.repo.hide_state(process_id, wit, &existing.id, &hide)
                })
                .await?;

            if hidden.name != source.name || !hidden.hidden {
                return Err(MigrationError::Import(format!(
                    "Unable to hide state '{}' in '{}' work item type, server returned empty result, id or state is not hidden.",
                    source.name, wit
                )));
            }
            return Ok(());
        }

        if source.differs_from(existing) {
            let updated = self
                .engine
                .call(&format!("Update state '{}' in '{}' work item type", source.name, wit), || {
                    self.repo.update_state(process_id, wit, &existing.id, &input)
                })
                .await?;

            if updated.name != source.name {
                return Err(MigrationError::Import(format!(
                    "Unable to update state '{}' in '{}' work item type, server returned empty result or non-matching name.",
                    source.name, wit
                )));
            }
        }

        Ok(())
    }
}
