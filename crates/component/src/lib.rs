//! Execution contract for workflow integration components.
//!
//! A component is a pluggable unit the workflow host drives through a fixed
//! lifecycle:
//!
//! - `setup` runs once per accepted configuration and may be repeated; it is
//!   expected to be idempotent
//! - `execute` runs per trigger and emits exactly one payload to one of the
//!   component's declared output channels
//! - `cancel` signals that the host stops scheduling further work
//!
//! The host owns scheduling, persistence and credentials. Components only see
//! them through the collaborator traits in [`context`]:
//!
//! - [`IntegrationContext`] supplies the connection configuration and secrets
//! - [`MetadataStore`] persists per-instance metadata between calls
//! - [`ExecutionState`] receives emitted payloads
//!
//! Components also declare their configuration form ([`fields`]) and output
//! channels ([`OutputChannel`]) as plain data for the host UI.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod error;
pub mod fields;
pub mod memory;

pub use context::{
    Action, ActionContext, ExecutionContext, ExecutionState, IntegrationContext, MetadataStore,
    SetupContext, WebhookRequest,
};
pub use error::{BoxError, ComponentError};
pub use fields::{Field, FieldError, FieldType};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named output channel a component can emit to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChannel {
    /// Channel identifier used when emitting.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Short explanation of when the channel is selected.
    pub description: String,
}

impl OutputChannel {
    /// Create a channel descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Lifecycle every integration component implements.
///
/// The descriptive methods are static metadata the host renders; the async
/// methods are the operations it invokes on a worker.
#[async_trait]
pub trait Component: Send + Sync {
    /// Unique, namespaced component name (e.g. `servicenow.getIncidents`).
    fn name(&self) -> &'static str;

    /// Display label.
    fn label(&self) -> &'static str;

    /// One-line description.
    fn description(&self) -> &'static str;

    /// Markdown documentation rendered by the host.
    fn documentation(&self) -> &'static str;

    /// Icon slug.
    fn icon(&self) -> &'static str;

    /// Accent color name.
    fn color(&self) -> &'static str;

    /// Example of an emitted event, shown before the first execution.
    fn example_output(&self) -> &'static Value;

    /// Output channels for the given configuration.
    fn output_channels(&self, configuration: &Value) -> Vec<OutputChannel>;

    /// Configuration form fields.
    fn configuration(&self) -> Vec<Field>;

    /// User-invocable actions.
    fn actions(&self) -> Vec<Action> {
        Vec::new()
    }

    /// Validate configuration and prepare per-instance metadata.
    async fn setup(&self, ctx: SetupContext<'_>) -> Result<(), ComponentError>;

    /// Run the component once and emit its result.
    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<(), ComponentError>;

    /// Stop an execution. Outbound calls are not interrupted.
    async fn cancel(&self, _ctx: ExecutionContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Handle one of the declared [`actions`](Component::actions).
    async fn handle_action(&self, _ctx: ActionContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Handle an inbound webhook delivered by the host.
    ///
    /// Returns the status code the host answers the webhook with.
    async fn handle_webhook(
        &self,
        _request: WebhookRequest<'_>,
    ) -> Result<StatusCode, ComponentError> {
        Ok(StatusCode::OK)
    }

    /// Release external resources when the component instance is removed.
    async fn cleanup(&self, _ctx: SetupContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }
}
