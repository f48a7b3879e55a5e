use log::warn;

use super::{ProcessImporter, target_process_id};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{ProcessPayload, ProcessRule};

impl<R: ArtifactRepository> ProcessImporter<R> {
    pub(super) async fn import_rules(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?;

        for entry in &payload.rules {
            let wit = entry.work_item_type_ref_name.as_str();

            for rule in entry.rules.iter().filter(|rule| !rule.is_system()) {
                match self.import_rule(process_id, wit, rule).await {
                    Ok(()) => {}
                    Err(MigrationError::Cancelled) => return Err(MigrationError::Cancelled),
                    Err(e) if self.options.continue_on_rule_import_failure => {
                        let rule_json = serde_json::to_string_pretty(rule).unwrap_or_default();
                        warn!(
                            "Failed to import rule below, continue importing rest of process.\nError: {}\n{}",
                            e, rule_json
                        );
                    }
                    Err(e) => {
                        return Err::<(), _>(e).import_context(|| {
                            format!(
                                "Unable to create rule '{}' in work item type '{}', see logs for details.",
                                rule.display_id(),
                                wit
                            )
                        });
                    }
                }
            }
        }

        Ok(())
    }

    async fn import_rule(&self, process_id: &str, wit: &str, rule: &ProcessRule) -> MigrationResult<()> {
        let created = self
            .engine
            .call(
                &format!("Create rule '{}' in work item type '{}'", rule.display_id(), wit),
                || self.repo.add_rule(process_id, wit, rule),
            )
            .await?;

        if created.id.as_deref().is_none_or(str::is_empty) {
            return Err(MigrationError::Import(format!(
                "Unable to create rule '{}' in work item type '{}', server returned empty result or id.",
                rule.display_id(),
                wit
            )));
        }

        Ok(())
    }
}
