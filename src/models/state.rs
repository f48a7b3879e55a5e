use serde::{Deserialize, Serialize};

use super::process::CustomizationType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemState {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub state_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub customization_type: CustomizationType,
}

impl WorkItemState {
    pub fn to_input(&self) -> StateInputModel {
        StateInputModel {
            name: self.name.clone(),
            color: self.color.clone(),
            state_category: self.state_category.clone(),
            order: None,
        }
    }

    /// Color, category or name differ
    pub fn differs_from(&self, other: &WorkItemState) -> bool {
        self.color != other.color || self.state_category != other.state_category || self.name != other.name
    }
}

/// Body of create/update state calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInputModel {
    pub name: String,
    pub color: String,
    pub state_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HideStateModel {
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitStates {
    pub work_item_type_ref_name: String,
    pub states: Vec<WorkItemState>,
}
