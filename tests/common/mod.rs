//! In-memory artifact repository shared by the integration tests
//!
//! Records every call as `"<operation> <arguments>"` and fails calls whose
//! record starts with an injected prefix. Behavior names are unique per
//! account, like the real service enforces.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use process_migrator::api::{
    ApiError, ApiResult, BehaviorRepository, FieldRepository, LayoutRepository, PicklistRepository,
    ProcessRepository, RuleRepository, StateRepository, WorkItemTypeRepository,
};
use process_migrator::models::*;

type WitKey = (String, String);

#[derive(Debug, Default)]
pub struct State {
    pub processes: Vec<ProcessInfo>,
    pub fields: Vec<WorkItemField>,
    pub work_item_types: HashMap<String, Vec<WorkItemType>>,
    pub type_fields: HashMap<WitKey, Vec<WorkItemTypeField>>,
    pub layouts: HashMap<WitKey, FormLayout>,
    pub states: HashMap<WitKey, Vec<WorkItemState>>,
    pub rules: HashMap<WitKey, Vec<ProcessRule>>,
    pub behaviors: Vec<Behavior>,
    pub wit_behaviors: HashMap<WitKey, Vec<WorkItemTypeBehavior>>,
    pub picklists: HashMap<String, Picklist>,
    /// States every newly created work item type starts with
    pub default_states: Vec<WorkItemState>,
    /// When set, created types are named `<prefix>.<Name>` like the service
    /// does, instead of keeping the requested reference name
    pub type_name_prefix: Option<String>,
    pub calls: Vec<String>,
    failures: Vec<Failure>,
    next_id: u32,
}

#[derive(Debug)]
struct Failure {
    prefix: String,
    error: ApiError,
    remaining: usize,
}

impl State {
    fn next_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeRepository {
    state: Arc<Mutex<State>>,
}

fn key(process_id: &str, wit: &str) -> WitKey {
    (process_id.to_string(), wit.to_string())
}

fn not_found(what: &str) -> ApiError {
    ApiError::status(404, format!("{} does not exist", what))
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Fail every call whose record starts with `prefix`
    pub fn fail_on(&self, prefix: &str, error: ApiError) {
        self.fail_times(prefix, error, usize::MAX);
    }

    pub fn fail_times(&self, prefix: &str, error: ApiError, times: usize) {
        self.state().failures.push(Failure {
            prefix: prefix.to_string(),
            error,
            remaining: times,
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Operation names only, in call order
    pub fn operations(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| call.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn record(&self, call: String) -> ApiResult<MutexGuard<'_, State>> {
        let mut state = self.state();
        state.calls.push(call.clone());

        if let Some(failure) = state
            .failures
            .iter_mut()
            .find(|failure| failure.remaining > 0 && call.starts_with(&failure.prefix))
        {
            failure.remaining -= 1;
            return Err(failure.error.clone());
        }

        Ok(state)
    }
}

fn ensure_unique_behavior_name(state: &State, id: &str, name: &str) -> ApiResult<()> {
    if state.behaviors.iter().any(|b| b.id != id && b.name == name) {
        return Err(ApiError::status(
            400,
            format!("Behavior name '{}' is already in use", name),
        ));
    }
    Ok(())
}

#[async_trait]
impl ProcessRepository for FakeRepository {
    async fn list_processes(&self) -> ApiResult<Vec<ProcessInfo>> {
        let state = self.record("list_processes".to_string())?;
        Ok(state.processes.clone())
    }

    async fn get_process(&self, process_id: &str) -> ApiResult<ProcessInfo> {
        let state = self.record(format!("get_process {}", process_id))?;
        state
            .processes
            .iter()
            .find(|p| p.type_id.as_deref() == Some(process_id))
            .cloned()
            .ok_or_else(|| not_found(process_id))
    }

    async fn create_process(&self, process: &CreateProcessModel) -> ApiResult<ProcessInfo> {
        let mut state = self.record(format!("create_process {}", process.name))?;
        let type_id = state.next_id("process");
        let created = ProcessInfo {
            name: process.name.clone(),
            reference_name: Some(process.reference_name.clone()),
            type_id: Some(type_id),
            parent_process_type_id: Some(process.parent_process_type_id.clone()),
            description: process.description.clone(),
            customization_type: CustomizationType::Inherited,
            is_enabled: true,
            is_default: false,
        };
        state.processes.push(created.clone());
        Ok(created)
    }

    async fn delete_process(&self, process_id: &str) -> ApiResult<()> {
        let mut state = self.record(format!("delete_process {}", process_id))?;
        state.processes.retain(|p| p.type_id.as_deref() != Some(process_id));
        Ok(())
    }
}

#[async_trait]
impl FieldRepository for FakeRepository {
    async fn list_fields(&self) -> ApiResult<Vec<WorkItemField>> {
        let state = self.record("list_fields".to_string())?;
        Ok(state.fields.clone())
    }

    async fn create_field(&self, field: &CreateFieldModel) -> ApiResult<WorkItemField> {
        let mut state = self.record(format!("create_field {}", field.reference_name))?;
        let created = WorkItemField {
            reference_name: field.reference_name.clone(),
            name: field.name.clone(),
            description: field.description.clone(),
            field_type: field.field_type,
            is_identity: field.is_identity,
            is_picklist: field.is_picklist,
            picklist_id: field.picklist_id.clone(),
        };
        state.fields.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl WorkItemTypeRepository for FakeRepository {
    async fn list_work_item_types(&self, process_id: &str) -> ApiResult<Vec<WorkItemType>> {
        let state = self.record(format!("list_work_item_types {}", process_id))?;
        Ok(state.work_item_types.get(process_id).cloned().unwrap_or_default())
    }

    async fn create_work_item_type(&self, process_id: &str, wit: &WorkItemType) -> ApiResult<WorkItemType> {
        let mut state = self.record(format!("create_work_item_type {}", wit.reference_name))?;
        let created = match &state.type_name_prefix {
            Some(prefix) => WorkItemType {
                reference_name: format!("{}.{}", prefix, wit.name.replace(' ', "")),
                ..wit.clone()
            },
            None => wit.clone(),
        };

        let default_states = state.default_states.clone();
        state
            .states
            .insert(key(process_id, &created.reference_name), default_states);
        state
            .work_item_types
            .entry(process_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn get_work_item_type_fields(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemTypeField>> {
        let state = self.record(format!("get_work_item_type_fields {}", wit))?;
        Ok(state.type_fields.get(&key(process_id, wit)).cloned().unwrap_or_default())
    }

    async fn add_field_to_work_item_type(
        &self,
        process_id: &str,
        wit: &str,
        field: &WorkItemTypeField,
    ) -> ApiResult<WorkItemTypeField> {
        let default = match &field.default_value {
            Some(value) => value.clone(),
            None => json!(null),
        };
        let mut state = self.record(format!(
            "add_field_to_work_item_type {} {} default={}",
            wit, field.reference_name, default
        ))?;
        let fields = state.type_fields.entry(key(process_id, wit)).or_default();
        fields.retain(|f| f.reference_name != field.reference_name);
        fields.push(field.clone());
        Ok(field.clone())
    }
}

#[async_trait]
impl LayoutRepository for FakeRepository {
    async fn get_form_layout(&self, process_id: &str, wit: &str) -> ApiResult<FormLayout> {
        let state = self.record(format!("get_form_layout {}", wit))?;
        Ok(state.layouts.get(&key(process_id, wit)).cloned().unwrap_or_default())
    }

    async fn add_page(&self, _process_id: &str, wit: &str, page: &Page) -> ApiResult<Page> {
        let mut state = self.record(format!("add_page {} {}", wit, page.id))?;
        let id = state.next_id("page");
        Ok(Page { id, ..page.clone() })
    }

    async fn edit_page(&self, _process_id: &str, wit: &str, page: &Page) -> ApiResult<Page> {
        self.record(format!("edit_page {} {}", wit, page.id))?;
        Ok(page.clone())
    }

    async fn add_group(
        &self,
        _process_id: &str,
        wit: &str,
        page_id: &str,
        section_id: &str,
        group: &Group,
    ) -> ApiResult<Group> {
        let mut state = self.record(format!(
            "add_group {} {} {} {} controls={}",
            wit,
            page_id,
            section_id,
            group.id,
            group.controls.len()
        ))?;
        let id = state.next_id("group");
        Ok(Group { id, ..group.clone() })
    }

    async fn edit_group(
        &self,
        _process_id: &str,
        wit: &str,
        page_id: &str,
        section_id: &str,
        group_id: &str,
        group: &Group,
    ) -> ApiResult<Group> {
        self.record(format!("edit_group {} {} {} {}", wit, page_id, section_id, group_id))?;
        Ok(Group {
            id: group_id.to_string(),
            ..group.clone()
        })
    }

    async fn add_control(&self, _process_id: &str, wit: &str, group_id: &str, control: &Control) -> ApiResult<Control> {
        self.record(format!("add_control {} {} {}", wit, group_id, control.id))?;
        Ok(control.clone())
    }

    async fn edit_control(
        &self,
        _process_id: &str,
        wit: &str,
        group_id: &str,
        control_id: &str,
        control: &Control,
    ) -> ApiResult<Control> {
        self.record(format!("edit_control {} {} {}", wit, group_id, control_id))?;
        Ok(Control {
            id: control_id.to_string(),
            ..control.clone()
        })
    }
}

#[async_trait]
impl StateRepository for FakeRepository {
    async fn get_states(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemState>> {
        let state = self.record(format!("get_states {}", wit))?;
        Ok(state.states.get(&key(process_id, wit)).cloned().unwrap_or_default())
    }

    async fn create_state(&self, process_id: &str, wit: &str, input: &StateInputModel) -> ApiResult<WorkItemState> {
        let mut state = self.record(format!("create_state {} {}", wit, input.name))?;
        let id = state.next_id("state");
        let created = WorkItemState {
            id,
            name: input.name.clone(),
            color: input.color.clone(),
            state_category: input.state_category.clone(),
            order: input.order,
            hidden: false,
            customization_type: CustomizationType::Custom,
        };
        state.states.entry(key(process_id, wit)).or_default().push(created.clone());
        Ok(created)
    }

    async fn update_state(
        &self,
        process_id: &str,
        wit: &str,
        state_id: &str,
        input: &StateInputModel,
    ) -> ApiResult<WorkItemState> {
        let mut state = self.record(format!("update_state {} {}", wit, input.name))?;
        let existing = state
            .states
            .get_mut(&key(process_id, wit))
            .and_then(|states| states.iter_mut().find(|s| s.id == state_id))
            .ok_or_else(|| not_found(state_id))?;
        existing.name = input.name.clone();
        existing.color = input.color.clone();
        existing.state_category = input.state_category.clone();
        Ok(existing.clone())
    }

    async fn hide_state(
        &self,
        process_id: &str,
        wit: &str,
        state_id: &str,
        hide: &HideStateModel,
    ) -> ApiResult<WorkItemState> {
        let mut state = self.record(format!("hide_state {} {}", wit, state_id))?;
        let existing = state
            .states
            .get_mut(&key(process_id, wit))
            .and_then(|states| states.iter_mut().find(|s| s.id == state_id))
            .ok_or_else(|| not_found(state_id))?;
        existing.hidden = hide.hidden;
        Ok(existing.clone())
    }

    async fn delete_state(&self, process_id: &str, wit: &str, state_id: &str) -> ApiResult<()> {
        let mut state = self.record(format!("delete_state {} {}", wit, state_id))?;
        if let Some(states) = state.states.get_mut(&key(process_id, wit)) {
            states.retain(|s| s.id != state_id);
        }
        Ok(())
    }
}

#[async_trait]
impl RuleRepository for FakeRepository {
    async fn get_rules(&self, process_id: &str, wit: &str) -> ApiResult<Vec<ProcessRule>> {
        let state = self.record(format!("get_rules {}", wit))?;
        Ok(state.rules.get(&key(process_id, wit)).cloned().unwrap_or_default())
    }

    async fn add_rule(&self, process_id: &str, wit: &str, rule: &ProcessRule) -> ApiResult<ProcessRule> {
        let mut state = self.record(format!("add_rule {} {}", wit, rule.name))?;
        let id = state.next_id("rule");
        let created = ProcessRule {
            id: Some(id),
            ..rule.clone()
        };
        state.rules.entry(key(process_id, wit)).or_default().push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl BehaviorRepository for FakeRepository {
    async fn list_behaviors(&self, _process_id: &str) -> ApiResult<Vec<Behavior>> {
        let state = self.record("list_behaviors".to_string())?;
        Ok(state.behaviors.clone())
    }

    async fn create_behavior(&self, _process_id: &str, behavior: &BehaviorCreateModel) -> ApiResult<Behavior> {
        let mut state = self.record(format!("create_behavior {}", behavior.reference_name))?;
        ensure_unique_behavior_name(&state, &behavior.reference_name, &behavior.name)?;
        if !state.behaviors.iter().any(|b| b.id == behavior.inherits) {
            return Err(ApiError::status(400, format!("Parent behavior '{}' not found", behavior.inherits)));
        }

        let created = Behavior {
            id: behavior.reference_name.clone(),
            name: behavior.name.clone(),
            color: behavior.color.clone(),
            description: None,
            customization: CustomizationType::Custom,
            rank: 0,
            inherits: Some(ProcessBehaviorReference {
                behavior_ref_name: behavior.inherits.clone(),
                url: None,
            }),
        };
        state.behaviors.push(created.clone());
        Ok(created)
    }

    async fn replace_behavior(
        &self,
        _process_id: &str,
        behavior_id: &str,
        behavior: &BehaviorReplaceModel,
    ) -> ApiResult<Behavior> {
        let mut state = self.record(format!("replace_behavior {} {}", behavior_id, behavior.name))?;
        ensure_unique_behavior_name(&state, behavior_id, &behavior.name)?;
        let existing = state
            .behaviors
            .iter_mut()
            .find(|b| b.id == behavior_id)
            .ok_or_else(|| not_found(behavior_id))?;
        existing.name = behavior.name.clone();
        existing.color = behavior.color.clone();
        Ok(existing.clone())
    }

    async fn get_work_item_type_behaviors(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemTypeBehavior>> {
        let state = self.record(format!("get_work_item_type_behaviors {}", wit))?;
        Ok(state.wit_behaviors.get(&key(process_id, wit)).cloned().unwrap_or_default())
    }

    async fn add_behavior_to_work_item_type(
        &self,
        process_id: &str,
        wit: &str,
        behavior: &WorkItemTypeBehavior,
    ) -> ApiResult<WorkItemTypeBehavior> {
        let mut state = self.record(format!("add_behavior_to_work_item_type {} {}", wit, behavior.behavior.id))?;
        state
            .wit_behaviors
            .entry(key(process_id, wit))
            .or_default()
            .push(behavior.clone());
        Ok(behavior.clone())
    }
}

#[async_trait]
impl PicklistRepository for FakeRepository {
    async fn get_picklist(&self, picklist_id: &str) -> ApiResult<Picklist> {
        let state = self.record(format!("get_picklist {}", picklist_id))?;
        state.picklists.get(picklist_id).cloned().ok_or_else(|| not_found(picklist_id))
    }

    async fn create_picklist(&self, picklist: &Picklist) -> ApiResult<Picklist> {
        let mut state = self.record(format!("create_picklist {}", picklist.name))?;
        let id = state.next_id("list");
        let created = Picklist {
            id: Some(id.clone()),
            ..picklist.clone()
        };
        state.picklists.insert(id, created.clone());
        Ok(created)
    }

    async fn update_picklist(&self, picklist_id: &str, picklist: &Picklist) -> ApiResult<Picklist> {
        let mut state = self.record(format!("update_picklist {}", picklist_id))?;
        let existing = state.picklists.get_mut(picklist_id).ok_or_else(|| not_found(picklist_id))?;
        existing.items = picklist.items.clone();
        existing.is_suggested = picklist.is_suggested;
        Ok(existing.clone())
    }
}

// Builders for payload fixtures

pub const PARENT_PROCESS_ID: &str = "adcc42ab-9882-485e-a3ed-7678f01f66bc";

pub fn process(name: &str, type_id: &str) -> ProcessInfo {
    ProcessInfo {
        name: name.to_string(),
        reference_name: None,
        type_id: Some(type_id.to_string()),
        parent_process_type_id: Some(PARENT_PROCESS_ID.to_string()),
        description: Some("Customized agile".to_string()),
        customization_type: CustomizationType::Inherited,
        is_enabled: true,
        is_default: false,
    }
}

pub fn work_item_type(reference_name: &str, customization: CustomizationType) -> WorkItemType {
    WorkItemType {
        reference_name: reference_name.to_string(),
        name: reference_name.rsplit('.').next().unwrap_or(reference_name).to_string(),
        description: None,
        color: Some("009CCC".to_string()),
        icon: None,
        inherits: None,
        customization,
        is_disabled: false,
    }
}

pub fn field(reference_name: &str, name: &str, field_type: FieldType) -> FieldDefinition {
    FieldDefinition {
        reference_name: reference_name.to_string(),
        name: name.to_string(),
        description: None,
        field_type,
        is_identity: field_type == FieldType::Identity,
    }
}

pub fn account_field(reference_name: &str, name: &str, field_type: FieldType) -> WorkItemField {
    WorkItemField {
        reference_name: reference_name.to_string(),
        name: name.to_string(),
        description: None,
        field_type,
        is_identity: field_type == FieldType::Identity,
        is_picklist: false,
        picklist_id: None,
    }
}

pub fn usage(reference_name: &str, field_type: FieldType, default_value: Option<serde_json::Value>) -> WorkItemTypeField {
    WorkItemTypeField {
        reference_name: reference_name.to_string(),
        name: None,
        field_type: Some(field_type),
        default_value,
        required: false,
        read_only: false,
        allow_groups: None,
        customization: None,
    }
}

pub fn picklist(id: Option<&str>, items: &[&str]) -> Picklist {
    Picklist {
        id: id.map(str::to_string),
        name: "picklist_source".to_string(),
        picklist_type: "String".to_string(),
        is_suggested: false,
        items: items.iter().map(|item| item.to_string()).collect(),
    }
}

pub fn state(id: &str, name: &str, color: &str, category: &str) -> WorkItemState {
    WorkItemState {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        state_category: category.to_string(),
        order: None,
        hidden: false,
        customization_type: CustomizationType::Inherited,
    }
}

pub fn rule(name: &str, customization_type: CustomizationType) -> ProcessRule {
    ProcessRule {
        id: None,
        name: name.to_string(),
        conditions: vec![RuleCondition {
            condition_type: "when".to_string(),
            field: Some("System.State".to_string()),
            value: Some("Active".to_string()),
        }],
        actions: vec![RuleAction {
            action_type: "makeRequired".to_string(),
            target_field: Some("Custom.Reviewer".to_string()),
            value: None,
        }],
        is_disabled: false,
        customization_type,
    }
}

pub fn behavior(id: &str, name: &str, parent: Option<&str>) -> Behavior {
    Behavior {
        id: id.to_string(),
        name: name.to_string(),
        color: "FF9D00".to_string(),
        description: None,
        customization: CustomizationType::Custom,
        rank: 0,
        inherits: parent.map(|parent| ProcessBehaviorReference {
            behavior_ref_name: parent.to_string(),
            url: None,
        }),
    }
}

/// A derived process with nothing in it
pub fn empty_payload(name: &str) -> ProcessPayload {
    ProcessPayload::new(process(name, "source-process"))
}

/// Destination with the system portfolio behavior every account has
pub fn destination() -> FakeRepository {
    let repo = FakeRepository::new();
    {
        let mut s = repo.state();
        s.fields.push(account_field("System.Title", "Title", FieldType::String));
        s.fields.push(account_field("System.AssignedTo", "Assigned To", FieldType::Identity));
        s.behaviors.push(Behavior {
            customization: CustomizationType::System,
            ..behavior("System.PortfolioBacklogBehavior", "Portfolio", None)
        });
        s.default_states = vec![
            state("s-new", "New", "b2b2b2", "Proposed"),
            state("s-active", "Active", "007acc", "InProgress"),
            state("s-closed", "Closed", "339933", "Completed"),
        ];
    }
    repo
}
