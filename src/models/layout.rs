//! Work item form layout: pages → sections → groups → controls

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTML controls can only be created together with their group
pub const HTML_FIELD_CONTROL: &str = "HtmlFieldControl";
/// Not supported in inherited processes, never replayed
pub const WEBPAGE_CONTROL: &str = "WebpageControl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormLayout {
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_controls: Vec<Control>,
}

impl FormLayout {
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageType {
    Custom,
    History,
    Links,
    Attachments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub page_type: PageType,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub overridden: bool,
    #[serde(default)]
    pub is_contribution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Page {
    /// Page body for add/edit calls: no sections, no ordering, no override flag
    pub fn to_create(&self) -> Page {
        Page {
            sections: Vec::new(),
            order: None,
            overridden: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub overridden: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub overridden: bool,
    #[serde(default)]
    pub is_contribution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Group {
    /// Group body for add/edit calls, without controls
    pub fn to_create(&self) -> Group {
        Group {
            controls: Vec::new(),
            order: None,
            overridden: false,
            ..self.clone()
        }
    }

    /// Group body that carries its controls, used for HTML groups
    pub fn to_create_with_controls(&self) -> Group {
        Group {
            controls: self.controls.clone(),
            ..self.to_create()
        }
    }

    pub fn has_html_control(&self) -> bool {
        self.controls
            .first()
            .is_some_and(|control| control.control_type == HTML_FIELD_CONTROL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub control_type: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub overridden: bool,
    #[serde(default)]
    pub is_contribution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Control {
    pub fn to_create(&self) -> Control {
        Control {
            order: None,
            overridden: false,
            ..self.clone()
        }
    }

    /// Only controls the user added or changed are replayed
    pub fn is_user_modified(&self) -> bool {
        !self.inherited || self.overridden
    }
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitLayout {
    pub work_item_type_ref_name: String,
    pub layout: FormLayout,
}
