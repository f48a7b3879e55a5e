//! REST endpoint paths for the work item process APIs

pub const API_VERSION: &str = "7.1";

/// Standard request headers
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const ACCEPT_JSON: &str = "application/json";
}

const PROCESSES: &str = "_apis/work/processes";

pub fn processes_endpoint() -> String {
    PROCESSES.to_string()
}

pub fn process_endpoint(process_id: &str) -> String {
    format!("{}/{}", PROCESSES, encode(process_id))
}

pub fn fields_endpoint() -> String {
    "_apis/wit/fields".to_string()
}

pub fn work_item_types_endpoint(process_id: &str) -> String {
    format!("{}/workitemtypes", process_endpoint(process_id))
}

pub fn work_item_type_endpoint(process_id: &str, wit: &str) -> String {
    format!("{}/{}", work_item_types_endpoint(process_id), encode(wit))
}

pub fn work_item_type_fields_endpoint(process_id: &str, wit: &str) -> String {
    format!("{}/fields", work_item_type_endpoint(process_id, wit))
}

pub fn layout_endpoint(process_id: &str, wit: &str) -> String {
    format!("{}/layout", work_item_type_endpoint(process_id, wit))
}

pub fn pages_endpoint(process_id: &str, wit: &str) -> String {
    format!("{}/pages", layout_endpoint(process_id, wit))
}

pub fn groups_endpoint(process_id: &str, wit: &str, page_id: &str, section_id: &str) -> String {
    format!(
        "{}/{}/sections/{}/groups",
        pages_endpoint(process_id, wit),
        encode(page_id),
        encode(section_id)
    )
}

pub fn group_endpoint(process_id: &str, wit: &str, page_id: &str, section_id: &str, group_id: &str) -> String {
    format!("{}/{}", groups_endpoint(process_id, wit, page_id, section_id), encode(group_id))
}

pub fn controls_endpoint(process_id: &str, wit: &str, group_id: &str) -> String {
    format!("{}/groups/{}/controls", layout_endpoint(process_id, wit), encode(group_id))
}

pub fn control_endpoint(process_id: &str, wit: &str, group_id: &str, control_id: &str) -> String {
    format!("{}/{}", controls_endpoint(process_id, wit, group_id), encode(control_id))
}

pub fn states_endpoint(process_id: &str, wit: &str) -> String {
    format!("{}/states", work_item_type_endpoint(process_id, wit))
}

pub fn state_endpoint(process_id: &str, wit: &str, state_id: &str) -> String {
    format!("{}/{}", states_endpoint(process_id, wit), encode(state_id))
}

pub fn rules_endpoint(process_id: &str, wit: &str) -> String {
    format!("{}/rules", work_item_type_endpoint(process_id, wit))
}

pub fn behaviors_endpoint(process_id: &str) -> String {
    format!("{}/behaviors", process_endpoint(process_id))
}

pub fn behavior_endpoint(process_id: &str, behavior_id: &str) -> String {
    format!("{}/{}", behaviors_endpoint(process_id), encode(behavior_id))
}

pub fn work_item_type_behaviors_endpoint(process_id: &str, wit: &str) -> String {
    format!(
        "{}/workitemtypesbehaviors/{}/behaviors",
        process_endpoint(process_id),
        encode(wit)
    )
}

pub fn picklists_endpoint() -> String {
    format!("{}/lists", PROCESSES)
}

pub fn picklist_endpoint(picklist_id: &str) -> String {
    format!("{}/{}", picklists_endpoint(), encode(picklist_id))
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_scoped_paths() {
        assert_eq!(
            work_item_type_fields_endpoint("p1", "Custom.Bug"),
            "_apis/work/processes/p1/workitemtypes/Custom.Bug/fields"
        );
        assert_eq!(
            group_endpoint("p1", "Custom.Bug", "page 1", "Section1", "g1"),
            "_apis/work/processes/p1/workitemtypes/Custom.Bug/layout/pages/page%201/sections/Section1/groups/g1"
        );
        assert_eq!(
            control_endpoint("p1", "Custom.Bug", "g1", "System.Title"),
            "_apis/work/processes/p1/workitemtypes/Custom.Bug/layout/groups/g1/controls/System.Title"
        );
    }

    #[test]
    fn test_collection_scoped_paths() {
        assert_eq!(fields_endpoint(), "_apis/wit/fields");
        assert_eq!(picklist_endpoint("abc"), "_apis/work/processes/lists/abc");
        assert_eq!(
            work_item_type_behaviors_endpoint("p1", "Custom.Epic"),
            "_apis/work/processes/p1/workitemtypesbehaviors/Custom.Epic/behaviors"
        );
    }
}
