use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use slipway_core::{CreateTaskRequest, CreatedTask, DesignRef, NodeFilter, TaskRecord};
use tracing::{debug, error};
use url::Url;

use crate::api::ProvisionerApi;
use crate::error::ClientError;

const AUTH_HEADER: &str = "X-Auth-Token";

/// HTTP implementation of [`ProvisionerApi`].
///
/// Endpoint and auth token are inputs: locating the service and obtaining
/// credentials happen before this client is built.
pub struct HttpProvisioner {
    base: Url,
    http: reqwest::Client,
}

impl HttpProvisioner {
    pub fn new(endpoint: &str, auth_token: &str) -> Result<Self, ClientError> {
        let base = Url::parse(endpoint)
            .map_err(|e| ClientError::Endpoint(format!("{}: {}", endpoint, e)))?;

        let token = HeaderValue::from_str(auth_token)
            .map_err(|_| ClientError::Endpoint("auth token is not valid header data".to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { base, http })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Endpoint(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, message });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProvisionerApi for HttpProvisioner {
    async fn create_task(
        &self,
        design_ref: &DesignRef,
        action: &str,
        node_filter: Option<&NodeFilter>,
    ) -> Result<CreatedTask, ClientError> {
        let url = self.url(&["tasks"])?;
        debug!(%url, action, "Creating provisioning task");

        let request = CreateTaskRequest {
            design_ref: design_ref.clone(),
            action: action.to_string(),
            node_filter: node_filter.cloned(),
        };

        let response = self.http.post(url).json(&request).send().await?;
        Self::decode(response).await.map_err(|e| {
            error!(error = %e, action, "Task creation request failed");
            e
        })
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, ClientError> {
        let url = self.url(&["tasks", task_id])?;
        debug!(%url, task_id, "Querying task state");

        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn get_tasks(&self) -> Result<Vec<TaskRecord>, ClientError> {
        let url = self.url(&["tasks"])?;
        debug!(%url, "Fetching task inventory");

        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(HttpProvisioner::new("not a url", "token").is_err());
    }

    #[test]
    fn test_rejects_invalid_token() {
        assert!(HttpProvisioner::new("http://drydock-api:9000/api/v1.0", "bad\ntoken").is_err());
    }

    #[test]
    fn test_url_building_appends_segments() {
        let client = HttpProvisioner::new("http://drydock-api:9000/api/v1.0", "token").unwrap();
        let url = client.url(&["tasks", "t-1"]).unwrap();
        assert_eq!(url.as_str(), "http://drydock-api:9000/api/v1.0/tasks/t-1");
    }

    #[test]
    fn test_url_building_tolerates_trailing_slash() {
        let client = HttpProvisioner::new("http://drydock-api:9000/api/v1.0/", "token").unwrap();
        let url = client.url(&["tasks"]).unwrap();
        assert_eq!(url.as_str(), "http://drydock-api:9000/api/v1.0/tasks");
    }
}
