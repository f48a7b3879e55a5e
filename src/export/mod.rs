//! Collects one inherited process from the source account into a payload

use std::collections::HashSet;

use futures::future::try_join_all;
use log::{debug, info};

use crate::api::ArtifactRepository;
use crate::engine::Engine;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{
    FieldDefinition, Picklist, ProcessPayload, WitBehaviors, WitBehaviorsInfo, WitFieldPicklist, WitFields,
    WitLayout, WitRules, WitStates, WorkItemField, WorkItemType,
};

/// Per-type artifacts fetched together
struct WorkItemTypeArtifacts {
    fields: WitFields,
    layout: WitLayout,
    states: WitStates,
    rules: WitRules,
    behaviors: WitBehaviors,
}

pub struct ProcessExporter<R> {
    repo: R,
    engine: Engine,
}

impl<R: ArtifactRepository> ProcessExporter<R> {
    pub fn new(repo: R, engine: Engine) -> Self {
        Self { repo, engine }
    }

    pub async fn export_process(&self, process_name: &str) -> MigrationResult<ProcessPayload> {
        info!("Export process started.");

        let process_id = self
            .engine
            .step("Get source process Id from name", self.source_process_id(process_name))
            .await?;
        let payload = self
            .engine
            .step("Get artifacts from source process", self.collect(&process_id))
            .await?;

        info!("Export process completed.");
        Ok(payload)
    }

    async fn source_process_id(&self, process_name: &str) -> MigrationResult<String> {
        let processes = self
            .engine
            .call("Get processes on source account", || self.repo.list_processes())
            .await
            .export_context(|| {
                "Error getting processes on source account, check account url, token and token permissions."
                    .to_string()
            })?;

        let matches: Vec<_> = processes
            .into_iter()
            .filter(|process| process.name_matches(process_name))
            .collect();

        let process = match matches.as_slice() {
            [] => {
                return Err(MigrationError::Export(format!(
                    "Process '{}' is not found on source account.",
                    process_name
                )));
            }
            [process] => process,
            _ => {
                return Err(MigrationError::Export(format!(
                    "Process name '{}' matches {} processes on source account.",
                    process_name,
                    matches.len()
                )));
            }
        };

        if !process.is_derived() {
            return Err(MigrationError::Export(format!(
                "Process '{}' is not a derived process, not supported.",
                process_name
            )));
        }

        process.type_id.clone().ok_or_else(|| {
            MigrationError::Export(format!("Process '{}' has no type id on source account.", process_name))
        })
    }

    async fn collect(&self, process_id: &str) -> MigrationResult<ProcessPayload> {
        let (process, account_fields, behaviors, work_item_types) = futures::try_join!(
            self.engine.call("Get process", || self.repo.get_process(process_id)),
            self.engine.call("Get fields", || self.repo.list_fields()),
            self.engine.call("Get behaviors", || self.repo.list_behaviors(process_id)),
            self.engine
                .call("Get work item types", || self.repo.list_work_item_types(process_id)),
        )
        .export_context(|| format!("Failed to get artifacts of process '{}'.", process_id))?;

        let work_item_types: Vec<WorkItemType> = work_item_types
            .into_iter()
            .filter(|wit| !wit.is_system())
            .collect();

        let per_type = try_join_all(
            work_item_types
                .iter()
                .map(|wit| self.collect_work_item_type(process_id, wit)),
        )
        .await?;

        let wit_field_picklists = self.collect_picklists(&per_type, &account_fields).await?;
        let fields = referenced_fields(&per_type, &account_fields);

        let mut payload = ProcessPayload::new(process);
        payload.work_item_types = work_item_types;
        payload.fields = fields;
        payload.behaviors = behaviors;
        payload.wit_field_picklists = wit_field_picklists;

        for artifacts in per_type {
            payload.work_item_type_fields.push(artifacts.fields);
            payload.layouts.push(artifacts.layout);
            payload.states.push(artifacts.states);
            payload.rules.push(artifacts.rules);
            payload.work_item_type_behaviors.push(artifacts.behaviors);
        }

        debug!(
            "Exported {} work item types, {} fields, {} picklists",
            payload.work_item_types.len(),
            payload.fields.len(),
            payload.wit_field_picklists.len()
        );
        Ok(payload)
    }

    async fn collect_work_item_type(
        &self,
        process_id: &str,
        wit: &WorkItemType,
    ) -> MigrationResult<WorkItemTypeArtifacts> {
        let wit_ref = wit.reference_name.as_str();

        let labels = [
            format!("Get fields of '{}'", wit_ref),
            format!("Get layout of '{}'", wit_ref),
            format!("Get states of '{}'", wit_ref),
            format!("Get rules of '{}'", wit_ref),
            format!("Get behaviors of '{}'", wit_ref),
        ];

        let (fields, layout, states, rules, behaviors) = futures::try_join!(
            self.engine.call(&labels[0], || self.repo.get_work_item_type_fields(process_id, wit_ref)),
            self.engine.call(&labels[1], || self.repo.get_form_layout(process_id, wit_ref)),
            self.engine.call(&labels[2], || self.repo.get_states(process_id, wit_ref)),
            self.engine.call(&labels[3], || self.repo.get_rules(process_id, wit_ref)),
            self.engine.call(&labels[4], || self.repo.get_work_item_type_behaviors(process_id, wit_ref)),
        )
        .export_context(|| format!("Failed to get artifacts of work item type '{}'.", wit_ref))?;

        Ok(WorkItemTypeArtifacts {
            fields: WitFields {
                work_item_type_ref_name: wit_ref.to_string(),
                fields,
            },
            layout: WitLayout {
                work_item_type_ref_name: wit_ref.to_string(),
                layout,
            },
            states: WitStates {
                work_item_type_ref_name: wit_ref.to_string(),
                states,
            },
            rules: WitRules {
                work_item_type_ref_name: wit_ref.to_string(),
                rules,
            },
            behaviors: WitBehaviors {
                work_item_type: WitBehaviorsInfo {
                    ref_name: wit_ref.to_string(),
                    work_item_type_class: wit.customization,
                },
                behaviors,
            },
        })
    }

    /// Fetch every picklist used by an exported field exactly once
    async fn collect_picklists(
        &self,
        per_type: &[WorkItemTypeArtifacts],
        account_fields: &[WorkItemField],
    ) -> MigrationResult<Vec<WitFieldPicklist>> {
        let mut seen = HashSet::new();
        let mut wanted = Vec::new();

        for artifacts in per_type {
            for usage in &artifacts.fields.fields {
                let picklist_id = account_fields
                    .iter()
                    .find(|field| field.reference_name == usage.reference_name)
                    .filter(|field| field.is_picklist)
                    .and_then(|field| field.picklist_id.as_deref());

                if let Some(picklist_id) = picklist_id {
                    if seen.insert(picklist_id.to_string()) {
                        wanted.push((
                            artifacts.fields.work_item_type_ref_name.as_str(),
                            usage.reference_name.as_str(),
                            picklist_id,
                        ));
                    }
                }
            }
        }

        try_join_all(wanted.into_iter().map(|(wit_ref, field_ref, picklist_id)| async move {
            let picklist: Picklist = self
                .engine
                .call(&format!("Get picklist '{}'", picklist_id), || {
                    self.repo.get_picklist(picklist_id)
                })
                .await
                .export_context(|| format!("Failed to get picklist for field '{}'.", field_ref))?;

            Ok::<_, MigrationError>(WitFieldPicklist {
                work_item_type_ref_name: wit_ref.to_string(),
                field_ref_name: field_ref.to_string(),
                picklist,
            })
        }))
        .await
    }
}

/// Account field definitions used by at least one exported type, first use wins
fn referenced_fields(per_type: &[WorkItemTypeArtifacts], account_fields: &[WorkItemField]) -> Vec<FieldDefinition> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    for artifacts in per_type {
        for usage in &artifacts.fields.fields {
            if !seen.insert(usage.reference_name.as_str()) {
                continue;
            }
            if let Some(field) = account_fields
                .iter()
                .find(|field| field.reference_name == usage.reference_name)
            {
                fields.push(field.to_definition());
            }
        }
    }

    fields
}
