use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    Behavior, FieldDefinition, ProcessInfo, WitBehaviors, WitFieldPicklist, WitFields, WitLayout,
    WitRules, WitStates, WorkItemField, WorkItemType,
};

/// The whole artifact graph of one process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPayload {
    pub process: ProcessInfo,
    #[serde(default)]
    pub work_item_types: Vec<WorkItemType>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub work_item_type_fields: Vec<WitFields>,
    #[serde(default)]
    pub wit_field_picklists: Vec<WitFieldPicklist>,
    #[serde(default)]
    pub layouts: Vec<WitLayout>,
    #[serde(default)]
    pub behaviors: Vec<Behavior>,
    #[serde(default)]
    pub work_item_type_behaviors: Vec<WitBehaviors>,
    #[serde(default)]
    pub states: Vec<WitStates>,
    #[serde(default)]
    pub rules: Vec<WitRules>,
    /// Computed by validation, never part of an export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_account_information: Option<TargetAccountInformation>,
}

impl ProcessPayload {
    pub fn new(process: ProcessInfo) -> Self {
        Self {
            process,
            work_item_types: Vec::new(),
            fields: Vec::new(),
            work_item_type_fields: Vec::new(),
            wit_field_picklists: Vec::new(),
            layouts: Vec::new(),
            behaviors: Vec::new(),
            work_item_type_behaviors: Vec::new(),
            states: Vec::new(),
            rules: Vec::new(),
            target_account_information: None,
        }
    }

    /// Picklist entry for a field, if the field is a picklist field
    pub fn picklist_for_field(&self, field_ref_name: &str) -> Option<&WitFieldPicklist> {
        self.wit_field_picklists
            .iter()
            .find(|entry| entry.field_ref_name == field_ref_name)
    }

    pub fn work_item_type(&self, ref_name: &str) -> Option<&WorkItemType> {
        self.work_item_types
            .iter()
            .find(|wit| wit.reference_name == ref_name)
    }

    /// Points every type-scoped entry at a new work item type reference name
    pub fn rename_work_item_type(&mut self, from: &str, to: &str) {
        let rename = |ref_name: &mut String| {
            if *ref_name == from {
                *ref_name = to.to_string();
            }
        };

        self.work_item_types
            .iter_mut()
            .for_each(|wit| rename(&mut wit.reference_name));
        self.work_item_type_fields
            .iter_mut()
            .for_each(|entry| rename(&mut entry.work_item_type_ref_name));
        self.wit_field_picklists
            .iter_mut()
            .for_each(|entry| rename(&mut entry.work_item_type_ref_name));
        self.layouts
            .iter_mut()
            .for_each(|entry| rename(&mut entry.work_item_type_ref_name));
        self.states
            .iter_mut()
            .for_each(|entry| rename(&mut entry.work_item_type_ref_name));
        self.rules
            .iter_mut()
            .for_each(|entry| rename(&mut entry.work_item_type_ref_name));
        self.work_item_type_behaviors
            .iter_mut()
            .for_each(|entry| rename(&mut entry.work_item_type.ref_name));
    }
}

/// How a source picklist maps onto the destination account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "id", rename_all = "camelCase")]
pub enum PicklistTarget {
    /// Destination list already holds the same items
    NoAction,
    /// Destination list differs and will be overwritten
    Existing(String),
    /// Created during this import
    Created(String),
}

impl PicklistTarget {
    /// Picklist id to attach to a new field; `None` for [`PicklistTarget::NoAction`]
    pub fn id(&self) -> Option<&str> {
        match self {
            PicklistTarget::NoAction => None,
            PicklistTarget::Existing(id) | PicklistTarget::Created(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TargetAccountInformation {
    #[serde(default)]
    pub collection_fields: Vec<WorkItemField>,
    /// Keyed by source field reference name. Absent means "create a new list".
    #[serde(default)]
    pub field_ref_name_to_picklist_id: HashMap<String, PicklistTarget>,
}

impl TargetAccountInformation {
    pub fn collection_field(&self, ref_name: &str) -> Option<&WorkItemField> {
        self.collection_fields
            .iter()
            .find(|field| field.reference_name == ref_name)
    }
}
