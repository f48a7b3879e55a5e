use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::process::CustomizationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Integer,
    DateTime,
    PlainText,
    Html,
    TreePath,
    History,
    Double,
    Guid,
    Boolean,
    Identity,
    PicklistInteger,
    PicklistString,
    PicklistDouble,
}

impl FieldType {
    /// Type the destination reports for a source field. Identity fields are
    /// sometimes exported typed as `string`, the identity flag is what counts.
    pub fn as_destination_type(self, is_identity: bool) -> FieldType {
        if is_identity { FieldType::Identity } else { self }
    }
}

/// Collection-scoped field definition carried in the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub reference_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_identity: bool,
}

/// A field as the account's field list reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemField {
    pub reference_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_identity: bool,
    #[serde(default)]
    pub is_picklist: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picklist_id: Option<String>,
}

impl WorkItemField {
    pub fn to_definition(&self) -> FieldDefinition {
        FieldDefinition {
            reference_name: self.reference_name.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            field_type: self.field_type,
            is_identity: self.is_identity,
        }
    }
}

/// Body of a create-field call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFieldModel {
    pub reference_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub is_identity: bool,
    pub is_picklist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picklist_id: Option<String>,
}

impl CreateFieldModel {
    pub fn from_definition(field: &FieldDefinition) -> Self {
        Self {
            reference_name: field.reference_name.clone(),
            name: field.name.clone(),
            description: field.description.clone(),
            field_type: field.field_type.as_destination_type(field.is_identity),
            is_identity: field.is_identity,
            is_picklist: false,
            picklist_id: None,
        }
    }

    pub fn with_picklist(mut self, picklist_id: &str) -> Self {
        self.is_picklist = true;
        self.picklist_id = Some(picklist_id.to_string());
        self
    }
}

/// A field's usage on one work item type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemTypeField {
    pub reference_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_groups: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<CustomizationType>,
}

impl WorkItemTypeField {
    pub fn is_identity(&self) -> bool {
        self.field_type == Some(FieldType::Identity)
    }

    /// Default value, ignoring `null` and empty strings
    pub fn effective_default(&self) -> Option<&Value> {
        match &self.default_value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitFields {
    pub work_item_type_ref_name: String,
    pub fields: Vec<WorkItemTypeField>,
}
