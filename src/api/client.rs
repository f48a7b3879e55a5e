use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::constants::{self, API_VERSION, headers};
use super::error::ApiError;
use super::repository::{
    ApiResult, BehaviorRepository, FieldRepository, LayoutRepository, PicklistRepository, ProcessRepository,
    RuleRepository, StateRepository, WorkItemTypeRepository,
};
use super::resilience::{ApiLogger, MonitoringConfig};
use crate::models::{
    Behavior, BehaviorCreateModel, BehaviorReplaceModel, Control, CreateFieldModel, CreateProcessModel,
    FormLayout, Group, HideStateModel, Page, Picklist, ProcessInfo, ProcessRule, StateInputModel,
    WorkItemField, WorkItemState, WorkItemType, WorkItemTypeBehavior, WorkItemTypeField,
};

/// `{ count, value }` envelope of list responses
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

/// REST client for one account, authenticated with a personal access token
#[derive(Debug, Clone)]
pub struct DevOpsClient {
    base_url: String,
    token: String,
    http_client: reqwest::Client,
    logger: ApiLogger,
}

impl DevOpsClient {
    pub fn new(base_url: &str, token: &str) -> ApiResult<Self> {
        Self::with_monitoring(base_url, token, MonitoringConfig::default())
    }

    pub fn with_monitoring(base_url: &str, token: &str, monitoring: MonitoringConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("process-migrator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http_client,
            logger: ApiLogger::new(monitoring),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path, with the api-version pinned
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.base_url, path, API_VERSION)
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<reqwest::Response> {
        let url = self.url(path);
        let context = self.logger.start_operation(method.as_str(), path);

        let mut logged_headers = HashMap::new();
        logged_headers.insert("Authorization".to_string(), "Basic".to_string());
        logged_headers.insert("Accept".to_string(), headers::ACCEPT_JSON.to_string());
        self.logger.log_request(&context, &url, &logged_headers);

        let mut request = self
            .http_client
            .request(method, &url)
            .basic_auth("", Some(&self.token))
            .header(reqwest::header::ACCEPT, headers::ACCEPT_JSON);

        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, headers::CONTENT_TYPE_JSON)
                .json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        self.logger.log_response(&context, status.as_u16());

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        debug!("{} {} failed with {}: {}", context.operation_type, path, status, text);
        Err(ApiError::status(status.as_u16(), message))
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<T> {
        let response = self.request(method, path, body).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(Method::GET, path, None).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let list: ListResponse<T> = self.get(path).await?;
        Ok(list.value)
    }

    async fn send_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        self.send(method, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// Create-type request body. The service derives the reference name from the
/// destination process, so none is sent.
fn work_item_type_create_body(wit: &WorkItemType) -> Value {
    json!({
        "name": wit.name,
        "description": wit.description,
        "color": wit.color,
        "icon": wit.icon,
        "inheritsFrom": wit.inherits,
        "isDisabled": wit.is_disabled,
    })
}

/// The service reports failures as `{ "message": "...", "typeKey": "..." }`
fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(json) => json.get("message").and_then(Value::as_str).map(str::to_string),
        Err(_) => Some(body.trim().to_string()),
    }
}

#[async_trait]
impl ProcessRepository for DevOpsClient {
    async fn list_processes(&self) -> ApiResult<Vec<ProcessInfo>> {
        self.get_list(&constants::processes_endpoint()).await
    }

    async fn get_process(&self, process_id: &str) -> ApiResult<ProcessInfo> {
        self.get(&constants::process_endpoint(process_id)).await
    }

    async fn create_process(&self, process: &CreateProcessModel) -> ApiResult<ProcessInfo> {
        self.send_body(Method::POST, &constants::processes_endpoint(), process).await
    }

    async fn delete_process(&self, process_id: &str) -> ApiResult<()> {
        self.delete(&constants::process_endpoint(process_id)).await
    }
}

#[async_trait]
impl FieldRepository for DevOpsClient {
    async fn list_fields(&self) -> ApiResult<Vec<WorkItemField>> {
        self.get_list(&constants::fields_endpoint()).await
    }

    async fn create_field(&self, field: &CreateFieldModel) -> ApiResult<WorkItemField> {
        self.send_body(Method::POST, &constants::fields_endpoint(), field).await
    }
}

#[async_trait]
impl WorkItemTypeRepository for DevOpsClient {
    async fn list_work_item_types(&self, process_id: &str) -> ApiResult<Vec<WorkItemType>> {
        self.get_list(&constants::work_item_types_endpoint(process_id)).await
    }

    async fn create_work_item_type(&self, process_id: &str, wit: &WorkItemType) -> ApiResult<WorkItemType> {
        let body = work_item_type_create_body(wit);
        self.send(Method::POST, &constants::work_item_types_endpoint(process_id), Some(body))
            .await
    }

    async fn get_work_item_type_fields(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemTypeField>> {
        self.get_list(&constants::work_item_type_fields_endpoint(process_id, wit))
            .await
    }

    async fn add_field_to_work_item_type(
        &self,
        process_id: &str,
        wit: &str,
        field: &WorkItemTypeField,
    ) -> ApiResult<WorkItemTypeField> {
        self.send_body(
            Method::POST,
            &constants::work_item_type_fields_endpoint(process_id, wit),
            field,
        )
        .await
    }
}

#[async_trait]
impl LayoutRepository for DevOpsClient {
    async fn get_form_layout(&self, process_id: &str, wit: &str) -> ApiResult<FormLayout> {
        self.get(&constants::layout_endpoint(process_id, wit)).await
    }

    async fn add_page(&self, process_id: &str, wit: &str, page: &Page) -> ApiResult<Page> {
        self.send_body(Method::POST, &constants::pages_endpoint(process_id, wit), page)
            .await
    }

    async fn edit_page(&self, process_id: &str, wit: &str, page: &Page) -> ApiResult<Page> {
        self.send_body(Method::PATCH, &constants::pages_endpoint(process_id, wit), page)
            .await
    }

    async fn add_group(
        &self,
        process_id: &str,
        wit: &str,
        page_id: &str,
        section_id: &str,
        group: &Group,
    ) -> ApiResult<Group> {
        self.send_body(
            Method::POST,
            &constants::groups_endpoint(process_id, wit, page_id, section_id),
            group,
        )
        .await
    }

    async fn edit_group(
        &self,
        process_id: &str,
        wit: &str,
        page_id: &str,
        section_id: &str,
        group_id: &str,
        group: &Group,
    ) -> ApiResult<Group> {
        self.send_body(
            Method::PATCH,
            &constants::group_endpoint(process_id, wit, page_id, section_id, group_id),
            group,
        )
        .await
    }

    async fn add_control(&self, process_id: &str, wit: &str, group_id: &str, control: &Control) -> ApiResult<Control> {
        self.send_body(
            Method::POST,
            &constants::controls_endpoint(process_id, wit, group_id),
            control,
        )
        .await
    }

    async fn edit_control(
        &self,
        process_id: &str,
        wit: &str,
        group_id: &str,
        control_id: &str,
        control: &Control,
    ) -> ApiResult<Control> {
        self.send_body(
            Method::PATCH,
            &constants::control_endpoint(process_id, wit, group_id, control_id),
            control,
        )
        .await
    }
}

#[async_trait]
impl StateRepository for DevOpsClient {
    async fn get_states(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemState>> {
        self.get_list(&constants::states_endpoint(process_id, wit)).await
    }

    async fn create_state(&self, process_id: &str, wit: &str, state: &StateInputModel) -> ApiResult<WorkItemState> {
        self.send_body(Method::POST, &constants::states_endpoint(process_id, wit), state)
            .await
    }

    async fn update_state(
        &self,
        process_id: &str,
        wit: &str,
        state_id: &str,
        state: &StateInputModel,
    ) -> ApiResult<WorkItemState> {
        self.send_body(
            Method::PATCH,
            &constants::state_endpoint(process_id, wit, state_id),
            state,
        )
        .await
    }

    async fn hide_state(
        &self,
        process_id: &str,
        wit: &str,
        state_id: &str,
        hide: &HideStateModel,
    ) -> ApiResult<WorkItemState> {
        self.send_body(Method::PUT, &constants::state_endpoint(process_id, wit, state_id), hide)
            .await
    }

    async fn delete_state(&self, process_id: &str, wit: &str, state_id: &str) -> ApiResult<()> {
        self.delete(&constants::state_endpoint(process_id, wit, state_id)).await
    }
}

#[async_trait]
impl RuleRepository for DevOpsClient {
    async fn get_rules(&self, process_id: &str, wit: &str) -> ApiResult<Vec<ProcessRule>> {
        self.get_list(&constants::rules_endpoint(process_id, wit)).await
    }

    async fn add_rule(&self, process_id: &str, wit: &str, rule: &ProcessRule) -> ApiResult<ProcessRule> {
        self.send_body(Method::POST, &constants::rules_endpoint(process_id, wit), rule)
            .await
    }
}

#[async_trait]
impl BehaviorRepository for DevOpsClient {
    async fn list_behaviors(&self, process_id: &str) -> ApiResult<Vec<Behavior>> {
        self.get_list(&constants::behaviors_endpoint(process_id)).await
    }

    async fn create_behavior(&self, process_id: &str, behavior: &BehaviorCreateModel) -> ApiResult<Behavior> {
        self.send_body(Method::POST, &constants::behaviors_endpoint(process_id), behavior)
            .await
    }

    async fn replace_behavior(
        &self,
        process_id: &str,
        behavior_id: &str,
        behavior: &BehaviorReplaceModel,
    ) -> ApiResult<Behavior> {
        self.send_body(
            Method::PUT,
            &constants::behavior_endpoint(process_id, behavior_id),
            behavior,
        )
        .await
    }

    async fn get_work_item_type_behaviors(&self, process_id: &str, wit: &str) -> ApiResult<Vec<WorkItemTypeBehavior>> {
        self.get_list(&constants::work_item_type_behaviors_endpoint(process_id, wit))
            .await
    }

    async fn add_behavior_to_work_item_type(
        &self,
        process_id: &str,
        wit: &str,
        behavior: &WorkItemTypeBehavior,
    ) -> ApiResult<WorkItemTypeBehavior> {
        self.send_body(
            Method::POST,
            &constants::work_item_type_behaviors_endpoint(process_id, wit),
            behavior,
        )
        .await
    }
}

#[async_trait]
impl PicklistRepository for DevOpsClient {
    async fn get_picklist(&self, picklist_id: &str) -> ApiResult<Picklist> {
        self.get(&constants::picklist_endpoint(picklist_id)).await
    }

    async fn create_picklist(&self, picklist: &Picklist) -> ApiResult<Picklist> {
        self.send_body(Method::POST, &constants::picklists_endpoint(), picklist)
            .await
    }

    async fn update_picklist(&self, picklist_id: &str, picklist: &Picklist) -> ApiResult<Picklist> {
        self.send_body(Method::PUT, &constants::picklist_endpoint(picklist_id), picklist)
            .await
    }
}
