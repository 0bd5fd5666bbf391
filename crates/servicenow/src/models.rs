//! ServiceNow records and component metadata.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode a string field where ServiceNow (or the host) may send `null`.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Metadata persisted by the host for a component instance.
///
/// Populated once by setup; a non-empty `instance_url` marks it as resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_empty")]
    pub webhook_url: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_empty")]
    pub instance_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_group: Option<ResourceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<ResourceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<ResourceInfo>,
}

/// Canonical identity of a verified resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: String,
    pub name: String,
}

/// An incident as returned by the Table API.
///
/// Missing and `null` fields decode to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub sys_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub short_description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub urgency: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub impact: String,
}

/// Payload emitted by `servicenow.getIncidents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentsPayload {
    pub incidents: Vec<IncidentRecord>,
    pub total: usize,
}

impl From<Vec<IncidentRecord>> for IncidentsPayload {
    fn from(incidents: Vec<IncidentRecord>) -> Self {
        Self {
            total: incidents.len(),
            incidents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_omits_unresolved_resources() {
        let metadata = NodeMetadata {
            instance_url: "https://dev12345.service-now.com".to_string(),
            assignment_group: Some(ResourceInfo {
                id: "grp1".to_string(),
                name: "Network".to_string(),
            }),
            ..NodeMetadata::default()
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            json!({
                "instanceUrl": "https://dev12345.service-now.com",
                "assignmentGroup": { "id": "grp1", "name": "Network" }
            })
        );
    }

    #[test]
    fn test_incident_missing_fields_default_to_empty() {
        let incident: IncidentRecord =
            serde_json::from_value(json!({ "sys_id": "abc", "number": "INC0010001" })).unwrap();
        assert_eq!(incident.sys_id, "abc");
        assert_eq!(incident.urgency, "");
        assert_eq!(incident.short_description, "");
    }

    #[test]
    fn test_incident_null_fields_default_to_empty() {
        let incident: IncidentRecord = serde_json::from_value(json!({
            "sys_id": "abc",
            "number": "INC0010001",
            "short_description": null,
            "urgency": null
        }))
        .unwrap();
        assert_eq!(incident.number, "INC0010001");
        assert_eq!(incident.urgency, "");
        assert_eq!(incident.short_description, "");
    }

    #[test]
    fn test_metadata_null_instance_is_unresolved() {
        let metadata: NodeMetadata = serde_json::from_value(json!({
            "instanceUrl": null,
            "webhookUrl": null,
            "caller": null
        }))
        .unwrap();
        assert_eq!(metadata, NodeMetadata::default());
    }

    #[test]
    fn test_payload_counts_incidents() {
        let payload = IncidentsPayload::from(vec![IncidentRecord::default(); 3]);
        assert_eq!(payload.total, 3);
    }
}
