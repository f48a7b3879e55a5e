use serde::{Deserialize, Serialize};

/// Where an artifact comes from: shipped by the service, inherited from a
/// system parent, or created by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CustomizationType {
    System,
    #[default]
    Inherited,
    Custom,
}

/// A process as listed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_name: Option<String>,
    /// Identifier on the account the process lives on. Rewritten on import once
    /// the destination process exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_process_type_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customization_type: CustomizationType,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl ProcessInfo {
    /// Only processes derived from a system process can be exported or imported
    pub fn is_derived(&self) -> bool {
        self.customization_type == CustomizationType::Inherited
    }

    pub fn name_matches(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }
}

/// Body of a create-process call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcessModel {
    pub name: String,
    pub parent_process_type_id: String,
    pub reference_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
