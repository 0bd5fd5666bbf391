//! Collaborators the host hands to a component for one call.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BoxError;

/// Connection the component instance is bound to.
///
/// The host manages the credentials; components read them per call and never
/// persist them.
pub trait IntegrationContext: Send + Sync {
    /// Non-secret connection configuration (instance URL, auth type, ...).
    fn configuration(&self) -> &Value;

    /// Look up a secret by name (e.g. an OAuth access token).
    fn secret(&self, name: &str) -> Option<String>;
}

/// Per-instance metadata persisted by the host.
///
/// The host guarantees a single writer per component instance.
pub trait MetadataStore: Send {
    /// Current metadata, or `Value::Null` when nothing was stored yet.
    fn get(&self) -> Value;

    /// Replace the stored metadata.
    ///
    /// # Errors
    /// Returns an error if the host cannot persist the value.
    fn set(&mut self, value: Value) -> Result<(), BoxError>;
}

/// Sink for the payloads an execution produces.
pub trait ExecutionState: Send {
    /// Emit payloads on a named output channel.
    ///
    /// # Errors
    /// Returns an error if the host rejects the emission.
    fn emit(&mut self, channel: &str, payload_type: &str, payloads: Vec<Value>)
        -> Result<(), BoxError>;
}

/// Context for `setup` and `cleanup`.
pub struct SetupContext<'a> {
    /// Raw configuration as stored by the host.
    pub configuration: &'a Value,
    /// HTTP client for outbound calls.
    pub http: &'a reqwest::Client,
    /// Connection bound to this instance.
    pub integration: &'a dyn IntegrationContext,
    /// Persisted instance metadata.
    pub metadata: &'a mut dyn MetadataStore,
}

/// Context for `execute` and `cancel`.
pub struct ExecutionContext<'a> {
    /// Raw configuration as stored by the host.
    pub configuration: &'a Value,
    /// HTTP client for outbound calls.
    pub http: &'a reqwest::Client,
    /// Connection bound to this instance.
    pub integration: &'a dyn IntegrationContext,
    /// Where emitted payloads go.
    pub execution_state: &'a mut dyn ExecutionState,
}

/// Inbound webhook request forwarded by the host.
pub struct WebhookRequest<'a> {
    /// Request headers as received.
    pub headers: &'a HeaderMap,
    /// Raw request body.
    pub body: &'a [u8],
}

/// A user-invocable action declared by a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier passed back in [`ActionContext::name`].
    pub name: String,
    /// Display label.
    pub label: String,
    /// What the action does.
    pub description: String,
}

/// Context for `handle_action`.
pub struct ActionContext<'a> {
    /// Name of the invoked action.
    pub name: &'a str,
    /// Action parameters as submitted.
    pub parameters: &'a Value,
    /// Persisted instance metadata.
    pub metadata: &'a mut dyn MetadataStore,
}
