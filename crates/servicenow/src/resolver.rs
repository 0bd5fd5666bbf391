//! Resource verification and the setup metadata gate.
//!
//! Setup resolves the referenced group and users once and stores their
//! canonical identity. Metadata that already carries an instance URL is
//! considered resolved and is never touched again.

use component::ComponentError;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ServiceNowClient;
use crate::models::NodeMetadata;

/// Raw identifiers to verify. Empty strings are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSpec {
    pub assignment_group: String,
    pub assigned_to: String,
    pub caller: String,
}

/// Decode metadata as stored by the host. `null` is empty metadata.
pub fn decode_metadata(value: &Value) -> Result<NodeMetadata, ComponentError> {
    if value.is_null() {
        return Ok(NodeMetadata::default());
    }
    NodeMetadata::deserialize(value).map_err(ComponentError::MetadataDecode)
}

/// Whether setup has to resolve resources for `existing` metadata.
#[must_use]
pub fn should_resolve(existing: &NodeMetadata) -> bool {
    existing.instance_url.is_empty()
}

/// Verify each referenced resource and collect its canonical identity.
///
/// Lookups run in order group, assignee, caller and stop at the first
/// failure; nothing is returned for a partial resolution.
pub async fn resolve_resource_metadata(
    client: &ServiceNowClient,
    spec: &ResourceSpec,
) -> Result<NodeMetadata, ComponentError> {
    let mut metadata = NodeMetadata {
        instance_url: client.instance_url().to_string(),
        ..NodeMetadata::default()
    };

    if !spec.assignment_group.is_empty() {
        let group = client
            .get_assignment_group(&spec.assignment_group)
            .await
            .map_err(|e| ComponentError::verification("assignment group", e))?;
        metadata.assignment_group = Some(group);
    }

    if !spec.assigned_to.is_empty() {
        let user = client
            .get_user(&spec.assigned_to)
            .await
            .map_err(|e| ComponentError::verification("assigned to user", e))?;
        metadata.assigned_to = Some(user);
    }

    if !spec.caller.is_empty() {
        let user = client
            .get_user(&spec.caller)
            .await
            .map_err(|e| ComponentError::verification("caller", e))?;
        metadata.caller = Some(user);
    }

    debug!(
        instance_url = %metadata.instance_url,
        assignment_group = metadata.assignment_group.is_some(),
        assigned_to = metadata.assigned_to.is_some(),
        caller = metadata.caller.is_some(),
        "Resolved resource metadata"
    );

    Ok(metadata)
}
