use super::{ProcessImporter, target_information};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{CreateFieldModel, ProcessPayload};

impl<R: ArtifactRepository> ProcessImporter<R> {
    /// Create collection fields missing on the destination
    pub(super) async fn import_fields(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let fields_to_create = self
            .engine
            .step(
                "Get fields to be created on target process",
                self.fields_to_create(payload),
            )
            .await?;

        for field in &fields_to_create {
            let created = self
                .engine
                .call(&format!("Create field '{}'", field.reference_name), || {
                    self.repo.create_field(field)
                })
                .await
                .import_context(|| format!("Create field '{}' failed, see log for details.", field.name))?;

            if created.reference_name != field.reference_name {
                return Err(MigrationError::Import(format!(
                    "Create field '{}' actually returned reference name '{}' instead of anticipated '{}'.",
                    field.name, created.reference_name, field.reference_name
                )));
            }
        }

        Ok(())
    }

    async fn fields_to_create(&self, payload: &ProcessPayload) -> MigrationResult<Vec<CreateFieldModel>> {
        let mapping = &target_information(payload)?.field_ref_name_to_picklist_id;

        let fields_on_target = self
            .engine
            .call("Get fields on target account", || self.repo.list_fields())
            .await
            .import_context(|| "Failed to get fields from target account, see logs for details.".to_string())?;

        if fields_on_target.is_empty() {
            return Err(MigrationError::Import(
                "Failed to get fields from target account, server returned empty result".to_string(),
            ));
        }

        let mut output = Vec::new();
        for source_field in &payload.fields {
            if fields_on_target
                .iter()
                .any(|target| target.reference_name == source_field.reference_name)
            {
                continue;
            }

            let mut create = CreateFieldModel::from_definition(source_field);

            if payload.picklist_for_field(&source_field.reference_name).is_some() {
                let picklist_id = mapping
                    .get(&source_field.reference_name)
                    .and_then(|target| target.id())
                    .ok_or_else(|| {
                        MigrationError::Import(format!(
                            "No picklist was resolved for new field '{}'.",
                            source_field.reference_name
                        ))
                    })?;
                create = create.with_picklist(picklist_id);
            }

            output.push(create);
        }

        Ok(output)
    }
}
