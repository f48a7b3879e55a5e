//! Per-artifact-kind access to one account's process definitions
//!
//! `process_id` arguments are process type ids, `wit` arguments are work item
//! type reference names. Implementations are already authenticated.

use async_trait::async_trait;

use super::error::ApiError;
use crate::models::{
    Behavior, BehaviorCreateModel, BehaviorReplaceModel, Control, CreateFieldModel, CreateProcessModel,
    FormLayout, Group, HideStateModel, Page, Picklist, ProcessInfo, ProcessRule, StateInputModel,
    WorkItemField, WorkItemState, WorkItemType, WorkItemTypeBehavior, WorkItemTypeField,
};

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait ProcessRepository: Send + Sync {
    async fn list_processes(&self) -> ApiResult<Vec<ProcessInfo>>;
    async fn get_process(&self, process_id: &str) -> ApiResult<ProcessInfo>;
    async fn create_process(&self, process: &CreateProcessModel) -> ApiResult<ProcessInfo>;
    async fn delete_process(&self, process_id: &str) -> ApiResult<()>;
}

/// Collection-scoped fields
#[async_trait]
pub trait FieldRepository: Send + Sync {
    async fn list_fields(&self) -> ApiResult<Vec<WorkItemField>>;
    async fn create_field(&self, field: &CreateFieldModel) -> ApiResult<WorkItemField>;
}

#[async_trait]
pub trait WorkItemTypeRepository: Send + Sync {
    async fn list_work_item_types(&self, process_id: &str) -> ApiResult<Vec<WorkItemType>>;
    async fn create_work_item_type(&self, process_id: &str, wit: &WorkItemType) -> ApiResult<WorkItemType>;
    async fn get_work_item_type_fields(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemTypeField>>;
    async fn add_field_to_work_item_type(
        &self,
        process_id: &str,
        wit: &str,
        field: &WorkItemTypeField,
    ) -> ApiResult<WorkItemTypeField>;
}

#[async_trait]
pub trait LayoutRepository: Send + Sync {
    async fn get_form_layout(&self, process_id: &str, wit: &str) -> ApiResult<FormLayout>;
    async fn add_page(&self, process_id: &str, wit: &str, page: &Page) -> ApiResult<Page>;
    async fn edit_page(&self, process_id: &str, wit: &str, page: &Page) -> ApiResult<Page>;
    async fn add_group(
        &self,
        process_id: &str,
        wit: &str,
        page_id: &str,
        section_id: &str,
        group: &Group,
    ) -> ApiResult<Group>;
    async fn edit_group(
        &self,
        process_id: &str,
        wit: &str,
        page_id: &str,
        section_id: &str,
        group_id: &str,
        group: &Group,
    ) -> ApiResult<Group>;
    async fn add_control(&self, process_id: &str, wit: &str, group_id: &str, control: &Control) -> ApiResult<Control>;
    async fn edit_control(
        &self,
        process_id: &str,
        wit: &str,
        group_id: &str,
        control_id: &str,
        control: &Control,
    ) -> ApiResult<Control>;
}

#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn get_states(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemState>>;
    async fn create_state(&self, process_id: &str, wit: &str, state: &StateInputModel) -> ApiResult<WorkItemState>;
    async fn update_state(
        &self,
        process_id: &str,
        wit: &str,
        state_id: &str,
        state: &StateInputModel,
    ) -> ApiResult<WorkItemState>;
    async fn hide_state(
        &self,
        process_id: &str,
        wit: &str,
        state_id: &str,
        hide: &HideStateModel,
    ) -> ApiResult<WorkItemState>;
    async fn delete_state(&self, process_id: &str, wit: &str, state_id: &str) -> ApiResult<()>;
}

#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn get_rules(&self, process_id: &str, wit: &str) -> ApiResult<Vec<ProcessRule>>;
    async fn add_rule(&self, process_id: &str, wit: &str, rule: &ProcessRule) -> ApiResult<ProcessRule>;
}

#[async_trait]
pub trait BehaviorRepository: Send + Sync {
    async fn list_behaviors(&self, process_id: &str) -> ApiResult<Vec<Behavior>>;
    async fn create_behavior(&self, process_id: &str, behavior: &BehaviorCreateModel) -> ApiResult<Behavior>;
    async fn replace_behavior(
        &self,
        process_id: &str,
        behavior_id: &str,
        behavior: &BehaviorReplaceModel,
    ) -> ApiResult<Behavior>;
    async fn get_work_item_type_behaviors(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemTypeBehavior>>;
    async fn add_behavior_to_work_item_type(
        &self,
        process_id: &str,
        wit: &str,
        behavior: &WorkItemTypeBehavior,
    ) -> ApiResult<WorkItemTypeBehavior>;
}

#[async_trait]
pub trait PicklistRepository: Send + Sync {
    async fn get_picklist(&self, picklist_id: &str) -> ApiResult<Picklist>;
    async fn create_picklist(&self, picklist: &Picklist) -> ApiResult<Picklist>;
    async fn update_picklist(&self, picklist_id: &str, picklist: &Picklist) -> ApiResult<Picklist>;
}

/// Every artifact kind at once, what export and import work against
pub trait ArtifactRepository:
    ProcessRepository
    + FieldRepository
    + WorkItemTypeRepository
    + LayoutRepository
    + StateRepository
    + RuleRepository
    + BehaviorRepository
    + PicklistRepository
{
}

impl<T> ArtifactRepository for T where
    T: ProcessRepository
        + FieldRepository
        + WorkItemTypeRepository
        + LayoutRepository
        + StateRepository
        + RuleRepository
        + BehaviorRepository
        + PicklistRepository
{
}
