//! Process payload model
//!
//! Plain serde data describing one inherited process: the artifact graph produced
//! by export and consumed by import. Field names follow the REST API's camelCase
//! so the payload file stays readable next to raw API responses.

pub mod behavior;
pub mod field;
pub mod layout;
pub mod payload;
pub mod picklist;
pub mod process;
pub mod rule;
pub mod state;
pub mod work_item_type;

pub use behavior::{
    Behavior, BehaviorCreateModel, BehaviorReference, BehaviorReplaceModel, ProcessBehaviorReference, WitBehaviors,
    WitBehaviorsInfo, WorkItemTypeBehavior,
};
pub use field::{CreateFieldModel, FieldDefinition, FieldType, WitFields, WorkItemField, WorkItemTypeField};
pub use layout::{Control, FormLayout, Group, Page, PageType, Section, WitLayout, HTML_FIELD_CONTROL, WEBPAGE_CONTROL};
pub use payload::{PicklistTarget, ProcessPayload, TargetAccountInformation};
pub use picklist::{Picklist, WitFieldPicklist};
pub use process::{CreateProcessModel, CustomizationType, ProcessInfo};
pub use rule::{ProcessRule, RuleAction, RuleCondition, WitRules};
pub use state::{HideStateModel, StateInputModel, WitStates, WorkItemState};
pub use work_item_type::WorkItemType;
