use serde::{Deserialize, Serialize};

use super::process::CustomizationType;

/// Behavior as referenced from a work item type, `{ id, url }` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorReference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Parent of a process behavior, `{ behaviorRefName, url }` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessBehaviorReference {
    #[serde(alias = "id")]
    pub behavior_ref_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Collection-scoped behavior (e.g. a backlog level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behavior {
    #[serde(alias = "referenceName")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub customization: CustomizationType,
    #[serde(default)]
    pub rank: i32,
    #[serde(default)]
    pub inherits: Option<ProcessBehaviorReference>,
}

impl Behavior {
    /// Parent behavior id, `None` when absent or blank
    pub fn parent_id(&self) -> Option<&str> {
        self.inherits
            .as_ref()
            .map(|parent| parent.behavior_ref_name.trim())
            .filter(|id| !id.is_empty())
    }

    pub fn to_replace(&self) -> BehaviorReplaceModel {
        BehaviorReplaceModel {
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorCreateModel {
    pub reference_name: String,
    pub name: String,
    pub color: String,
    pub inherits: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorReplaceModel {
    pub name: String,
    pub color: String,
}

/// A behavior attached to one work item type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemTypeBehavior {
    pub behavior: BehaviorReference,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_legacy_default: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitBehaviorsInfo {
    pub ref_name: String,
    pub work_item_type_class: CustomizationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitBehaviors {
    pub work_item_type: WitBehaviorsInfo,
    pub behaviors: Vec<WorkItemTypeBehavior>,
}
