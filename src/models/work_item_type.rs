use serde::{Deserialize, Serialize};

use super::process::CustomizationType;

/// Work item type definition (e.g. "Bug")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemType {
    pub reference_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Reference name of the parent type for inherited types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    #[serde(default)]
    pub customization: CustomizationType,
    #[serde(default)]
    pub is_disabled: bool,
}

impl WorkItemType {
    pub fn is_system(&self) -> bool {
        self.customization == CustomizationType::System
    }

    pub fn is_custom(&self) -> bool {
        self.customization == CustomizationType::Custom
    }
}
