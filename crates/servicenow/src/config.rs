//! Connection settings for running components outside the host.

use std::env;

use component::IntegrationContext;
use serde_json::{json, Value};

/// Environment variable for the instance base URL.
pub const ENV_INSTANCE_URL: &str = "SERVICENOW_INSTANCE_URL";
/// Environment variable for the basic auth user.
pub const ENV_USERNAME: &str = "SERVICENOW_USERNAME";
/// Environment variable for the basic auth password.
pub const ENV_PASSWORD: &str = "SERVICENOW_PASSWORD";
/// Environment variable for an OAuth access token. Takes precedence over basic auth.
pub const ENV_ACCESS_TOKEN: &str = "SERVICENOW_ACCESS_TOKEN";

/// ServiceNow connection read from the environment.
///
/// Implements [`IntegrationContext`] so it can stand in for the host's
/// integration when a component runs from the command line.
#[derive(Clone)]
pub struct ConnectionConfig {
    configuration: Value,
    access_token: Option<String>,
}

impl ConnectionConfig {
    /// Read the connection from `SERVICENOW_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        Self::new(
            &non_empty(ENV_INSTANCE_URL).unwrap_or_default(),
            non_empty(ENV_USERNAME),
            non_empty(ENV_PASSWORD),
            non_empty(ENV_ACCESS_TOKEN),
        )
    }

    /// Build a connection from explicit values.
    #[must_use]
    pub fn new(
        instance_url: &str,
        username: Option<String>,
        password: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        let configuration = if access_token.is_some() {
            json!({
                "instanceUrl": instance_url,
                "authType": "oauth",
            })
        } else {
            json!({
                "instanceUrl": instance_url,
                "authType": "basicAuth",
                "username": username.unwrap_or_default(),
                "password": password.unwrap_or_default(),
            })
        };

        Self {
            configuration,
            access_token,
        }
    }

    /// Instance URL as configured.
    #[must_use]
    pub fn instance_url(&self) -> &str {
        self.configuration["instanceUrl"].as_str().unwrap_or_default()
    }

    /// Whether the connection authenticates with an access token.
    #[must_use]
    pub fn uses_oauth(&self) -> bool {
        self.access_token.is_some()
    }
}

impl IntegrationContext for ConnectionConfig {
    fn configuration(&self) -> &Value {
        &self.configuration
    }

    fn secret(&self, name: &str) -> Option<String> {
        match name {
            "accessToken" => self.access_token.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceNowClient;

    #[test]
    fn test_basic_auth_connection() {
        let config = ConnectionConfig::new(
            "https://dev12345.service-now.com",
            Some("admin".to_string()),
            Some("secret".to_string()),
            None,
        );

        assert!(!config.uses_oauth());
        assert_eq!(config.configuration()["authType"], "basicAuth");
        assert_eq!(config.secret("accessToken"), None);
        assert!(ServiceNowClient::new(&reqwest::Client::new(), &config).is_ok());
    }

    #[test]
    fn test_access_token_takes_precedence() {
        let config = ConnectionConfig::new(
            "https://dev12345.service-now.com",
            Some("admin".to_string()),
            Some("secret".to_string()),
            Some("token".to_string()),
        );

        assert!(config.uses_oauth());
        assert_eq!(config.configuration()["authType"], "oauth");
        assert!(config.configuration().get("password").is_none());
        assert_eq!(config.secret("accessToken").as_deref(), Some("token"));
        assert_eq!(config.instance_url(), "https://dev12345.service-now.com");
    }

    #[test]
    fn test_missing_credentials_cannot_build_client() {
        let config = ConnectionConfig::new("https://dev12345.service-now.com", None, None, None);
        assert!(ServiceNowClient::new(&reqwest::Client::new(), &config).is_err());
    }
}
