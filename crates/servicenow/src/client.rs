//! REST client for the ServiceNow Table API.

use component::{ComponentError, IntegrationContext};
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{null_as_empty, IncidentRecord, ResourceInfo};

/// Table API path segments below the instance URL.
const TABLE_API_SEGMENTS: [&str; 3] = ["api", "now", "table"];

/// Secret holding the OAuth access token.
const SECRET_ACCESS_TOKEN: &str = "accessToken";

/// Errors from ServiceNow API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// ServiceNow answered with a non-success status
    #[error("ServiceNow returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body did not match the expected shape
    #[error("failed to parse ServiceNow response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request URL could not be built from the instance URL
    #[error("cannot build request URL for {0}")]
    Url(String),
}

/// How requests authenticate.
#[derive(Clone)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

/// Authentication scheme configured on the integration.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
enum AuthType {
    #[default]
    #[serde(rename = "basicAuth")]
    Basic,
    #[serde(rename = "oauth")]
    OAuth,
}

/// Connection settings stored on the integration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegrationConfig {
    #[serde(default)]
    instance_url: String,
    #[serde(default)]
    auth_type: AuthType,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Table API envelope.
#[derive(Debug, Deserialize)]
struct TableResponse<T> {
    result: T,
}

/// `sys_user_group` and `sys_user` records carry the same identity fields.
#[derive(Debug, Deserialize)]
struct IdentityRecord {
    sys_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    name: String,
}

impl From<IdentityRecord> for ResourceInfo {
    fn from(record: IdentityRecord) -> Self {
        Self {
            id: record.sys_id,
            name: record.name,
        }
    }
}

/// ServiceNow Table API client bound to one instance.
#[derive(Debug, Clone)]
pub struct ServiceNowClient {
    http: reqwest::Client,
    instance_url: String,
    base_url: Url,
    credentials: Credentials,
}

impl ServiceNowClient {
    /// Build a client from the host's HTTP client and integration connection.
    ///
    /// # Errors
    /// Returns [`ComponentError::ClientConstruction`] if the connection has no
    /// instance URL or lacks the credentials for its auth type.
    pub fn new(
        http: &reqwest::Client,
        integration: &dyn IntegrationContext,
    ) -> Result<Self, ComponentError> {
        let config = IntegrationConfig::deserialize(integration.configuration()).map_err(|e| {
            ComponentError::ClientConstruction(format!("invalid integration configuration: {e}"))
        })?;

        let credentials = match config.auth_type {
            AuthType::Basic => {
                if config.username.is_empty() || config.password.is_empty() {
                    return Err(ComponentError::ClientConstruction(
                        "username and password are required for basic auth".to_string(),
                    ));
                }
                Credentials::Basic {
                    username: config.username,
                    password: config.password,
                }
            }
            AuthType::OAuth => integration
                .secret(SECRET_ACCESS_TOKEN)
                .filter(|token| !token.is_empty())
                .map(Credentials::Bearer)
                .ok_or_else(|| {
                    ComponentError::ClientConstruction("access token is missing".to_string())
                })?,
        };

        Self::with_credentials(http.clone(), &config.instance_url, credentials)
    }

    /// Build a client for an explicit instance and credentials.
    ///
    /// # Errors
    /// Returns [`ComponentError::ClientConstruction`] if `instance_url` is blank
    /// or not an absolute http(s) URL.
    pub fn with_credentials(
        http: reqwest::Client,
        instance_url: &str,
        credentials: Credentials,
    ) -> Result<Self, ComponentError> {
        let instance_url = instance_url.trim().trim_end_matches('/');
        if instance_url.is_empty() {
            return Err(ComponentError::ClientConstruction(
                "instance URL is required".to_string(),
            ));
        }

        let base_url = Url::parse(instance_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                ComponentError::ClientConstruction(format!("invalid instance URL: {instance_url}"))
            })?;

        Ok(Self {
            http,
            instance_url: instance_url.to_string(),
            base_url,
            credentials,
        })
    }

    /// Base URL of the instance, without trailing slash.
    #[must_use]
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Table API URL with each segment percent-encoded as one path segment.
    fn table_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(self.instance_url.clone()))?
            .pop_if_empty()
            .extend(TABLE_API_SEGMENTS)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, url: Url) -> RequestBuilder {
        let request = self.http.get(url).header(ACCEPT, "application/json");

        match &self.credentials {
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::Bearer(token) => request.bearer_auth(token),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            warn!(
                status = %status,
                body = %body,
                "ServiceNow API request failed"
            );

            return Err(ClientError::Status { status, body });
        }

        let body = response.text().await?;
        let envelope: TableResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.result)
    }

    /// Look up an assignment group by `sys_id`.
    #[instrument(skip(self))]
    pub async fn get_assignment_group(&self, sys_id: &str) -> Result<ResourceInfo, ClientError> {
        let record: IdentityRecord = self
            .send(self.request(self.table_url(&["sys_user_group", sys_id])?))
            .await?;
        debug!(name = %record.name, "Assignment group verified");
        Ok(record.into())
    }

    /// Look up a user by `sys_id`.
    #[instrument(skip(self))]
    pub async fn get_user(&self, sys_id: &str) -> Result<ResourceInfo, ClientError> {
        let record: IdentityRecord = self
            .send(self.request(self.table_url(&["sys_user", sys_id])?))
            .await?;
        debug!(name = %record.name, "User verified");
        Ok(record.into())
    }

    /// List incidents matching an encoded query, at most `limit` of them.
    #[instrument(skip(self))]
    pub async fn get_incidents(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<IncidentRecord>, ClientError> {
        let request = self.request(self.table_url(&["incident"])?).query(&[
            ("sysparm_query", query.to_string()),
            ("sysparm_limit", limit.to_string()),
        ]);

        let incidents: Vec<IncidentRecord> = self.send(request).await?;
        debug!(count = incidents.len(), "Retrieved incidents");
        Ok(incidents)
    }
}
