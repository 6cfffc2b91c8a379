//! HTTPS implementation of [`PrismApi`] over the Prism Central v3 REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use prism_common::PrismCredentials;

use crate::api::PrismApi;
use crate::error::ClientError;
use crate::models::{
    CategoryKey, CategoryValueEntity, DeleteResponse, IntentResource, ListRequest, ListResponse,
    ManagedResource, Task, TaskResponse,
};

/// Request timeout applied to every call, connection included
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Number of entities requested per list page
pub const LIST_PAGE_SIZE: u32 = 250;

const API_PREFIX: &str = "/api/nutanix/v3";

/// Prism Central v3 client
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct PrismClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for PrismClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrismClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish()
    }
}

impl PrismClient {
    /// Build a client for a Prism Central endpoint
    ///
    /// No request is made; connectivity problems surface on first use.
    pub fn connect(credentials: &PrismCredentials) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(CONNECT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(credentials.insecure)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        debug!(
            endpoint = %credentials.endpoint,
            port = credentials.port,
            insecure = credentials.insecure,
            "Created Prism Central client"
        );

        Ok(Self {
            http,
            base_url: format!("{}{}", credentials.base_url(), API_PREFIX),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the successful response
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        operation: &str,
        entity: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() || e.is_request() {
                ClientError::transient(operation, e.to_string())
            } else {
                ClientError::fatal(operation, e.to_string())
            }
        })?;

        let status = response.status();
        trace!(operation, status = status.as_u16(), "Prism response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(
            operation,
            entity,
            status.as_u16(),
            &body,
        ))
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        operation: &str,
        entity: &str,
    ) -> Result<T, ClientError> {
        let response = self.send(method, path, body, operation, entity).await?;
        response.json::<T>().await.map_err(|e| {
            ClientError::fatal(operation, format!("invalid response body: {}", e))
        })
    }

    /// Page through a v3 list endpoint until every entity has been read
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: &str,
        filter: &str,
        operation: &str,
    ) -> Result<Vec<T>, ClientError> {
        let mut entities = Vec::new();
        let mut offset = 0u32;

        loop {
            let request = ListRequest {
                kind,
                length: LIST_PAGE_SIZE,
                offset,
                filter: (!filter.is_empty()).then_some(filter),
            };
            let page: ListResponse<T> = self
                .send_json(Method::POST, path, Some(&request), operation, kind)
                .await?;

            let received = page.entities.len() as u32;
            entities.extend(page.entities);
            offset += received;

            let more = match page.metadata.total_matches {
                Some(total) => offset < total,
                None => received == LIST_PAGE_SIZE,
            };
            if received == 0 || !more {
                break;
            }
        }

        debug!(operation, count = entities.len(), "Listed entities");
        Ok(entities)
    }

    async fn list_intents(
        &self,
        path: &str,
        kind: &str,
        filter: &str,
        operation: &str,
    ) -> Result<Vec<ManagedResource>, ClientError> {
        let intents: Vec<IntentResource> = self.list_all(path, kind, filter, operation).await?;
        Ok(intents.into_iter().map(ManagedResource::from).collect())
    }

    async fn delete_intent(
        &self,
        path: &str,
        operation: &str,
        entity: &str,
    ) -> Result<String, ClientError> {
        let response: DeleteResponse = self
            .send_json::<(), _>(Method::DELETE, path, None, operation, entity)
            .await?;
        Ok(response.status.execution_context.task_uuid)
    }

    async fn delete_no_content(
        &self,
        path: &str,
        operation: &str,
        entity: &str,
    ) -> Result<(), ClientError> {
        self.send::<()>(Method::DELETE, path, None, operation, entity)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PrismApi for PrismClient {
    async fn list_vms(&self, filter: &str) -> Result<Vec<ManagedResource>, ClientError> {
        self.list_intents("/vms/list", "vm", filter, "list vms").await
    }

    async fn delete_vm(&self, uuid: &str) -> Result<String, ClientError> {
        self.delete_intent(&format!("/vms/{}", uuid), "delete vm", &format!("vm {}", uuid))
            .await
    }

    async fn list_images(&self, filter: &str) -> Result<Vec<ManagedResource>, ClientError> {
        self.list_intents("/images/list", "image", filter, "list images")
            .await
    }

    async fn delete_image(&self, uuid: &str) -> Result<String, ClientError> {
        self.delete_intent(
            &format!("/images/{}", uuid),
            "delete image",
            &format!("image {}", uuid),
        )
        .await
    }

    async fn list_volume_groups(
        &self,
        filter: &str,
    ) -> Result<Vec<ManagedResource>, ClientError> {
        self.list_intents(
            "/volume_groups/list",
            "volume_group",
            filter,
            "list volume groups",
        )
        .await
    }

    async fn delete_volume_group(&self, uuid: &str) -> Result<String, ClientError> {
        self.delete_intent(
            &format!("/volume_groups/{}", uuid),
            "delete volume group",
            &format!("volume group {}", uuid),
        )
        .await
    }

    async fn get_category_key(&self, key: &str) -> Result<CategoryKey, ClientError> {
        self.send_json::<(), _>(
            Method::GET,
            &format!("/categories/{}", key),
            None,
            "get category key",
            &format!("category {}", key),
        )
        .await
    }

    async fn list_category_values(&self, key: &str) -> Result<Vec<String>, ClientError> {
        let values: Vec<CategoryValueEntity> = self
            .list_all(
                &format!("/categories/{}/list", key),
                "category",
                "",
                "list category values",
            )
            .await?;
        Ok(values.into_iter().map(|v| v.value).collect())
    }

    async fn delete_category_value(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.delete_no_content(
            &format!("/categories/{}/{}", key, value),
            "delete category value",
            &format!("category value {}:{}", key, value),
        )
        .await
    }

    async fn delete_category_key(&self, key: &str) -> Result<(), ClientError> {
        self.delete_no_content(
            &format!("/categories/{}", key),
            "delete category key",
            &format!("category {}", key),
        )
        .await
    }

    async fn get_task(&self, task_uuid: &str) -> Result<Task, ClientError> {
        let response: TaskResponse = self
            .send_json::<(), _>(
                Method::GET,
                &format!("/tasks/{}", task_uuid),
                None,
                "get task",
                &format!("task {}", task_uuid),
            )
            .await?;
        Ok(response.into_task(task_uuid))
    }
}
