use log::{debug, warn};
use uuid::Uuid;

use super::{ProcessImporter, target_process_id};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{Behavior, BehaviorCreateModel, BehaviorReplaceModel, CustomizationType, ProcessPayload};

impl<R: ArtifactRepository> ProcessImporter<R> {
    /// Two-pass behavior import.
    ///
    /// Pass one creates missing behaviors and parks renamed ones under a random
    /// name, pass two gives every touched behavior its real name. Names are
    /// unique per process, so renaming in place would fail when two behaviors
    /// swap names.
    pub(super) async fn import_behaviors(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?;

        let behaviors_on_target = self
            .engine
            .call("Get behaviors on target account", || self.repo.list_behaviors(process_id))
            .await
            .import_context(|| "Failed to get behaviors on target account.".to_string())?;

        let mut renames: Vec<(String, BehaviorReplaceModel)> = Vec::new();

        for behavior in &payload.behaviors {
            let id = behavior.id.trim();
            if id.is_empty() {
                warn!(
                    "Skipping behavior with invalid ID: {{\"id\": {:?}, \"name\": {:?}}}",
                    behavior.id, behavior.name
                );
                continue;
            }

            let rename = match behaviors_on_target.iter().find(|target| target.id == id) {
                None => self.create_behavior(process_id, id, behavior).await?,
                Some(existing) => self.park_behavior(process_id, id, behavior, existing).await?,
            };

            if let Some(real) = rename {
                renames.push((id.to_string(), real));
            }
        }

        for (id, real) in &renames {
            let result = self
                .engine
                .call(&format!("Replace behavior '{}' to its real name '{}'", id, real.name), || {
                    self.repo.replace_behavior(process_id, id, real)
                })
                .await;

            match result {
                Ok(_) => {}
                Err(MigrationError::Api(e)) if e.is_method_not_supported() => {
                    warn!("Behavior name update not supported for '{}': {}", id, e);
                }
                Err(e) => {
                    return Err::<(), _>(e)
                        .import_context(|| format!("Failed to restore behavior name for '{}', see logs for details.", id));
                }
            }
        }

        Ok(())
    }

    /// Create a missing behavior under a temporary name, returning its real name
    async fn create_behavior(
        &self,
        process_id: &str,
        id: &str,
        behavior: &Behavior,
    ) -> MigrationResult<Option<BehaviorReplaceModel>> {
        let Some(parent) = behavior.parent_id() else {
            warn!(
                "Behavior '{}' has empty or missing parent behavior ID. Original inherits: {}",
                behavior.name,
                serde_json::to_string(&behavior.inherits).unwrap_or_default()
            );
            return Err(MigrationError::Import(format!(
                "Cannot create behavior '{}' (id '{}') because parent behavior ID is missing or empty.",
                behavior.name, behavior.id
            )));
        };

        let create = BehaviorCreateModel {
            reference_name: id.to_string(),
            name: Uuid::new_v4().simple().to_string(),
            color: behavior.color.clone(),
            inherits: parent.to_string(),
        };
        debug!(
            "Creating behavior: id='{}', name='{}', inherits='{}', color='{}'",
            id, behavior.name, create.inherits, create.color
        );

        let created = self
            .engine
            .call(&format!("Create behavior '{}' with temporary name", id), || {
                self.repo.create_behavior(process_id, &create)
            })
            .await
            .import_context(|| format!("Failed to import behavior {}, see logs for details.", behavior.name))?;

        if created.id != id {
            return Err(MigrationError::Import(format!(
                "Failed to create behavior '{}', server returned empty result or id does not match.",
                behavior.name
            )));
        }

        Ok(Some(behavior.to_replace()))
    }

    /// Move an existing behavior whose name changes out of the way
    async fn park_behavior(
        &self,
        process_id: &str,
        id: &str,
        behavior: &Behavior,
        existing: &Behavior,
    ) -> MigrationResult<Option<BehaviorReplaceModel>> {
        if existing.name == behavior.name {
            if existing.color == behavior.color {
                debug!("Behavior '{}' already matches target", id);
                return Ok(None);
            }
            return Ok(Some(behavior.to_replace()));
        }

        let parked = BehaviorReplaceModel {
            name: Uuid::new_v4().simple().to_string(),
            color: existing.color.clone(),
        };

        let result = self
            .engine
            .call(&format!("Rename behavior '{}' to a temporary name", id), || {
                self.repo.replace_behavior(process_id, id, &parked)
            })
            .await;

        match result {
            Ok(_) => Ok(Some(behavior.to_replace())),
            Err(MigrationError::Api(e)) if e.is_method_not_supported() => {
                warn!(
                    "Behavior '{}' already exists on target and cannot be renamed to '{}': {}",
                    id, behavior.name, e
                );
                Ok(None)
            }
            Err(e) => Err(e).import_context(|| format!("Failed to import behavior {}, see logs for details.", behavior.name)),
        }
    }

    /// Attach behaviors to custom work item types, inherited types keep theirs
    pub(super) async fn add_behaviors_to_work_item_types(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?;

        for entry in &payload.work_item_type_behaviors {
            if entry.work_item_type.work_item_type_class != CustomizationType::Custom {
                continue;
            }
            let wit = entry.work_item_type.ref_name.as_str();

            for behavior in &entry.behaviors {
                let behavior_id = behavior.behavior.id.as_str();

                let added = self
                    .engine
                    .call(
                        &format!("Add behavior '{}' to work item type '{}'", behavior_id, wit),
                        || self.repo.add_behavior_to_work_item_type(process_id, wit, behavior),
                    )
                    .await
                    .import_context(|| {
                        format!(
                            "Failed to add behavior '{}' to work item type '{}', check logs for details.",
                            behavior_id, wit
                        )
                    })?;

                if added.behavior.id != behavior_id {
                    return Err(MigrationError::Import(format!(
                        "Failed to add behavior '{}' to work item type '{}', server returned empty result or id does not match",
                        behavior_id, wit
                    )));
                }
            }
        }

        Ok(())
    }
}
