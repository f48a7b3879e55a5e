use serde::{Deserialize, Serialize};

/// A named, ordered list of allowed values for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picklist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default = "default_picklist_type")]
    pub picklist_type: String,
    #[serde(default)]
    pub is_suggested: bool,
    #[serde(default)]
    pub items: Vec<String>,
}

fn default_picklist_type() -> String {
    "String".to_string()
}

impl Picklist {
    /// Same values (order ignored, each exactly once) and same suggested flag
    pub fn matches_items(&self, other: &Picklist) -> bool {
        if self.items.len() != other.items.len() || self.is_suggested != other.is_suggested {
            return false;
        }

        contains_each_once(&self.items, &other.items) && contains_each_once(&other.items, &self.items)
    }
}

fn contains_each_once(items: &[String], haystack: &[String]) -> bool {
    items
        .iter()
        .all(|item| haystack.iter().filter(|candidate| *candidate == item).count() == 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitFieldPicklist {
    pub work_item_type_ref_name: String,
    pub field_ref_name: String,
    pub picklist: Picklist,
}
