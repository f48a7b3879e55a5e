use log::debug;

use super::{ProcessImporter, target_process_id};
use crate::api::ArtifactRepository;
use crate::error::{MigrationError, MigrationResult, StepContext};
use crate::models::{Control, FormLayout, Group, Page, PageType, ProcessPayload, Section, WEBPAGE_CONTROL};

/// Location of the page being replayed
struct PageScope<'a> {
    process_id: &'a str,
    wit: &'a str,
    page_id: &'a str,
}

impl<R: ArtifactRepository> ProcessImporter<R> {
    /// Replay custom pages of every form layout.
    ///
    /// HTML controls can only be created together with their group, every
    /// other control is added after its group exists. Calls are strictly
    /// sequential since later groups may reference earlier ones.
    pub(super) async fn import_layouts(&self, payload: &ProcessPayload) -> MigrationResult<()> {
        let process_id = target_process_id(payload)?;

        for entry in &payload.layouts {
            let wit = entry.work_item_type_ref_name.as_str();
            let target_layout = self
                .engine
                .call(
                    &format!("Get layout on target process for work item type '{}'", wit),
                    || self.repo.get_form_layout(process_id, wit),
                )
                .await
                .import_context(|| format!("Failed to get layout of work item type '{}' on target process.", wit))?;

            for page in entry.layout.pages.iter().filter(|page| page.page_type == PageType::Custom) {
                self.import_page(process_id, wit, &target_layout, page).await?;
            }
        }

        Ok(())
    }

    async fn import_page(
        &self,
        process_id: &str,
        wit: &str,
        target_layout: &FormLayout,
        page: &Page,
    ) -> MigrationResult<()> {
        if page.is_contribution && self.options.skip_import_form_contributions {
            debug!("Skipping contribution page '{}' in {}", page.id, wit);
            return Ok(());
        }

        let create = page.to_create();
        let result = if target_layout.page(&page.id).is_some() {
            self.engine
                .call(&format!("Edit '{}' page in {}", page.id, wit), || {
                    self.repo.edit_page(process_id, wit, &create)
                })
                .await
        } else {
            self.engine
                .call(&format!("Create '{}' page in {}", page.id, wit), || {
                    self.repo.add_page(process_id, wit, &create)
                })
                .await
        };

        let saved = result.import_context(|| {
            format!("Failed to create or edit '{}' page in {}, see logs for details.", page.id, wit)
        })?;

        if saved.id.is_empty() {
            return Err(MigrationError::Import(format!(
                "Failed to create or edit '{}' page in {}, server returned empty result.",
                page.id, wit
            )));
        }

        let scope = PageScope {
            process_id,
            wit,
            page_id: &saved.id,
        };

        // Inherited groups go first, a custom group may reuse an inherited group's name
        debug!("Start import inherited group changes");
        for section in &page.sections {
            for group in section.groups.iter().filter(|group| group.inherited && group.overridden) {
                self.edit_group(&scope, section, group).await?;
            }
        }

        debug!("Start import custom groups and all controls");
        for section in &page.sections {
            for group in &section.groups {
                self.import_group(&scope, section, group).await?;
            }
        }

        Ok(())
    }

    async fn import_group(&self, scope: &PageScope<'_>, section: &Section, group: &Group) -> MigrationResult<()> {
        if group.is_contribution && self.options.skip_import_form_contributions {
            return Ok(());
        }

        if group.has_html_control() {
            if !group.inherited {
                self.create_group(scope, section, &group.to_create_with_controls()).await?;
                return Ok(());
            }

            // The group itself was edited in the first pass
            if let Some(control) = group.controls.first().filter(|c| group.overridden && c.overridden) {
                self.edit_html_control(scope, group, control).await?;
            }
            return Ok(());
        }

        let group_id = if group.inherited {
            group.id.clone()
        } else {
            self.create_group(scope, section, &group.to_create()).await?.id
        };

        for control in group.controls.iter().filter(|control| control.is_user_modified()) {
            if control.control_type == WEBPAGE_CONTROL
                || (control.is_contribution && self.options.skip_import_form_contributions)
            {
                continue;
            }

            self.import_control(scope, &group_id, control).await?;
        }

        Ok(())
    }

    async fn import_control(&self, scope: &PageScope<'_>, group_id: &str, control: &Control) -> MigrationResult<()> {
        let create = control.to_create();
        let PageScope { process_id, wit, page_id } = *scope;

        let result = if control.inherited {
            self.engine
                .call(
                    &format!(
                        "Edit control '{}' in group '{}' in page '{}' in work item type '{}'.",
                        control.id, group_id, page_id, wit
                    ),
                    || self.repo.edit_control(process_id, wit, group_id, &control.id, &create),
                )
                .await
        } else {
            self.engine
                .call(
                    &format!(
                        "Create control '{}' in group '{}' in page '{}' in work item type '{}'.",
                        control.id, group_id, page_id, wit
                    ),
                    || self.repo.add_control(process_id, wit, group_id, &create),
                )
                .await
        };

        result.map(|_| ()).import_context(|| {
            format!(
                "Unable to add '{}' control to group '{}' in page '{}' in '{}'.",
                control.id, group_id, page_id, wit
            )
        })
    }

    async fn edit_html_control(&self, scope: &PageScope<'_>, group: &Group, control: &Control) -> MigrationResult<()> {
        let PageScope { process_id, wit, page_id } = *scope;

        let edited = self
            .engine
            .call(
                &format!("Edit HTML control '{}' in group '{}' in page '{}'", control.id, group.id, page_id),
                || self.repo.edit_control(process_id, wit, &group.id, &control.id, control),
            )
            .await
            .import_context(|| {
                format!(
                    "Failed to edit HTML control '{}' in group '{}' in page '{}', see logs for details.",
                    control.id, group.id, page_id
                )
            })?;

        if edited.id != control.id {
            return Err(MigrationError::Import(format!(
                "Failed to edit group '{}' in page '{}', server returned empty result or non-matching id.",
                group.id, page_id
            )));
        }

        Ok(())
    }

    async fn create_group(&self, scope: &PageScope<'_>, section: &Section, group: &Group) -> MigrationResult<Group> {
        let PageScope { process_id, wit, page_id } = *scope;

        let created = self
            .engine
            .call(&format!("Create group '{}' in page '{}'", group.id, page_id), || {
                self.repo.add_group(process_id, wit, page_id, &section.id, group)
            })
            .await
            .import_context(|| format!("Failed to create group '{}' in page '{}', see logs for details.", group.id, page_id))?;

        if created.id.is_empty() {
            return Err(MigrationError::Import(format!(
                "Failed to create group '{}' in page '{}', server returned empty result or non-matching id.",
                group.id, page_id
            )));
        }

        Ok(created)
    }

    async fn edit_group(&self, scope: &PageScope<'_>, section: &Section, group: &Group) -> MigrationResult<()> {
        let PageScope { process_id, wit, page_id } = *scope;
        let update = group.to_create();

        let edited = self
            .engine
            .call(&format!("Edit group '{}' in page '{}'", group.id, page_id), || {
                self.repo.edit_group(process_id, wit, page_id, &section.id, &group.id, &update)
            })
            .await
            .import_context(|| format!("Failed to edit group '{}' in page '{}', see logs for details.", group.id, page_id))?;

        if edited.id != group.id {
            return Err(MigrationError::Import(format!(
                "Failed to edit group '{}' in page '{}', server returned empty result or id.",
                group.id, page_id
            )));
        }

        Ok(())
    }
}
