//! `servicenow.getIncidents` component.

use async_trait::async_trait;
use component::{Component, ComponentError, ExecutionContext, Field, OutputChannel, SetupContext};
use serde::{de, Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::client::ServiceNowClient;
use crate::models::IncidentsPayload;
use crate::query::{build_query, effective_limit, DEFAULT_LIMIT};
use crate::resolver::{decode_metadata, resolve_resource_metadata, should_resolve, ResourceSpec};
use crate::router::{route, Channel};
use crate::{example, PAYLOAD_TYPE_INCIDENTS};

const DOCUMENTATION: &str = r"The Get Incidents component queries ServiceNow for incidents and routes execution based on urgency levels.

## Use Cases

- **Health checks**: Check for active incidents and route based on severity
- **Incident monitoring**: Monitor incident status across assignment groups
- **Automated response**: Trigger workflows based on incident presence
- **Reporting**: Collect incident data for reporting or analysis

## Configuration

All filters are optional. Leave empty to query all incidents.

- **Assignment Group**: Filter by assignment group
- **Assigned To**: Filter by assigned user
- **Caller**: Filter by caller
- **Category**: Filter by category
- **Subcategory**: Filter by subcategory (depends on category)
- **Service**: Filter by business service
- **State**: Filter by incident state (comma-separated values allowed)
- **Urgency**: Filter by urgency level (comma-separated values allowed)
- **Impact**: Filter by impact level (comma-separated values allowed)
- **Priority**: Filter by priority level (comma-separated values allowed)
- **Limit**: Maximum number of incidents to return (default 10)

## Output Channels

- **Clear**: No incidents matched the filters
- **Low**: Incidents found, but none are high urgency
- **High**: At least one high-urgency incident found

## Output

Returns a list of incidents with:
- **sys_id**: Unique identifier
- **number**: Human-readable incident number
- **short_description**: Incident summary
- **state**: Current state
- **urgency**: Urgency level
- **impact**: Impact level";

/// Filters configured on the component.
///
/// Decoded from the host configuration on every call. Absent and empty
/// values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetIncidentsSpec {
    pub assignment_group: Option<String>,
    pub assigned_to: Option<String>,
    pub caller: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub service: Option<String>,
    pub state: Option<String>,
    pub urgency: Option<String>,
    pub impact: Option<String>,
    pub priority: Option<String>,
    #[serde(deserialize_with = "deserialize_limit")]
    pub limit: Option<i64>,
}

impl GetIncidentsSpec {
    /// Decode the host configuration. `null` is the empty spec.
    pub fn from_configuration(configuration: &Value) -> Result<Self, ComponentError> {
        if configuration.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(configuration).map_err(ComponentError::ConfigurationDecode)
    }

    /// Page size for the list call.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        effective_limit(self.limit.unwrap_or(0))
    }

    /// Identifiers verified during setup.
    #[must_use]
    pub fn resource_spec(&self) -> ResourceSpec {
        ResourceSpec {
            assignment_group: self.assignment_group.clone().unwrap_or_default(),
            assigned_to: self.assigned_to.clone().unwrap_or_default(),
            caller: self.caller.clone().unwrap_or_default(),
        }
    }
}

/// Number fields may arrive as floats from form input; fractions truncate.
#[allow(clippy::cast_possible_truncation)]
fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    number
        .as_i64()
        .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid limit: {number}")))
}

/// Queries incidents and routes by urgency.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetIncidents;

impl GetIncidents {
    fn fields() -> Vec<Field> {
        vec![
            Field::integration_resource("assignmentGroup", "Assignment Group", "assignment_group")
                .with_description("Filter incidents by assignment group")
                .with_placeholder("Select an assignment group"),
            Field::integration_resource("assignedTo", "Assigned To", "user")
                .with_description("Filter incidents by assigned user")
                .with_placeholder("Select a user")
                .depends_on("assignmentGroup", "assignmentGroup"),
            Field::integration_resource("caller", "Caller", "user")
                .with_description("Filter incidents by caller")
                .with_placeholder("Select a user"),
            Field::integration_resource("category", "Category", "category")
                .with_description("Filter incidents by category")
                .with_placeholder("Select a category"),
            Field::integration_resource("subcategory", "Subcategory", "subcategory")
                .with_description("Filter incidents by subcategory")
                .with_placeholder("Select a subcategory")
                .depends_on("category", "category"),
            Field::integration_resource("service", "Service", "service")
                .with_description("Filter incidents by business service")
                .with_placeholder("Select a service"),
            Field::integration_resource("state", "State", "state")
                .with_description("Filter incidents by state")
                .with_placeholder("Select a state"),
            Field::integration_resource("urgency", "Urgency", "urgency")
                .with_description("Filter incidents by urgency")
                .with_placeholder("Select an urgency"),
            Field::integration_resource("impact", "Impact", "impact")
                .with_description("Filter incidents by impact")
                .with_placeholder("Select an impact"),
            Field::integration_resource("priority", "Priority", "priority")
                .with_description("Filter incidents by priority")
                .with_placeholder("Select a priority"),
            Field::number("limit", "Limit")
                .with_default(json!(DEFAULT_LIMIT))
                .with_description("Maximum number of incidents to return"),
        ]
    }
}

#[async_trait]
impl Component for GetIncidents {
    fn name(&self) -> &'static str {
        "servicenow.getIncidents"
    }

    fn label(&self) -> &'static str {
        "Get Incidents"
    }

    fn description(&self) -> &'static str {
        "Query ServiceNow for incidents matching the specified filters"
    }

    fn documentation(&self) -> &'static str {
        DOCUMENTATION
    }

    fn icon(&self) -> &'static str {
        "servicenow"
    }

    fn color(&self) -> &'static str {
        "gray"
    }

    fn example_output(&self) -> &'static Value {
        example::get_incidents()
    }

    fn output_channels(&self, _configuration: &Value) -> Vec<OutputChannel> {
        Channel::ALL.iter().map(|c| c.output_channel()).collect()
    }

    fn configuration(&self) -> Vec<Field> {
        Self::fields()
    }

    #[instrument(skip_all, fields(component = "servicenow.getIncidents"))]
    async fn setup(&self, ctx: SetupContext<'_>) -> Result<(), ComponentError> {
        let existing = decode_metadata(&ctx.metadata.get())?;
        if !should_resolve(&existing) {
            debug!(instance_url = %existing.instance_url, "Metadata already resolved");
            return Ok(());
        }

        let spec = GetIncidentsSpec::from_configuration(ctx.configuration)?;
        let client = ServiceNowClient::new(ctx.http, ctx.integration)?;
        let metadata = resolve_resource_metadata(&client, &spec.resource_spec()).await?;

        let value =
            serde_json::to_value(&metadata).map_err(|e| ComponentError::Metadata(Box::new(e)))?;
        ctx.metadata.set(value).map_err(ComponentError::Metadata)?;

        info!(instance_url = %metadata.instance_url, "ServiceNow component set up");
        Ok(())
    }

    #[instrument(skip_all, fields(component = "servicenow.getIncidents"))]
    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<(), ComponentError> {
        let spec = GetIncidentsSpec::from_configuration(ctx.configuration)?;
        let client = ServiceNowClient::new(ctx.http, ctx.integration)?;

        let query = build_query(&spec);
        let incidents = client
            .get_incidents(&query, spec.effective_limit())
            .await
            .map_err(|e| ComponentError::external("failed to get incidents", e))?;

        let channel = route(&incidents);
        let payload = IncidentsPayload::from(incidents);
        info!(channel = %channel, total = payload.total, "Incidents retrieved");

        let payload =
            serde_json::to_value(&payload).map_err(|e| ComponentError::Emit(Box::new(e)))?;
        ctx.execution_state
            .emit(channel.as_str(), PAYLOAD_TYPE_INCIDENTS, vec![payload])
            .map_err(ComponentError::Emit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component::fields::{dependency_graph, validate_dependencies};

    #[test]
    fn test_spec_decodes_camel_case() {
        let spec = GetIncidentsSpec::from_configuration(&json!({
            "assignmentGroup": "grp1",
            "assignedTo": "user1",
            "state": "1,2",
            "limit": 20
        }))
        .unwrap();

        assert_eq!(spec.assignment_group.as_deref(), Some("grp1"));
        assert_eq!(spec.assigned_to.as_deref(), Some("user1"));
        assert_eq!(spec.state.as_deref(), Some("1,2"));
        assert_eq!(spec.effective_limit(), 20);
    }

    #[test]
    fn test_null_configuration_is_empty_spec() {
        let spec = GetIncidentsSpec::from_configuration(&Value::Null).unwrap();
        assert_eq!(spec, GetIncidentsSpec::default());
        assert_eq!(spec.effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_limit_accepts_integral_floats() {
        let spec = GetIncidentsSpec::from_configuration(&json!({ "limit": 25.0 })).unwrap();
        assert_eq!(spec.limit, Some(25));

        let spec = GetIncidentsSpec::from_configuration(&json!({ "limit": null })).unwrap();
        assert_eq!(spec.effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_non_positive_limit_uses_default() {
        let spec = GetIncidentsSpec::from_configuration(&json!({ "limit": -5 })).unwrap();
        assert_eq!(spec.effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        for configuration in [
            json!({ "limit": "ten" }),
            json!({ "state": 1 }),
            json!("assignmentGroup"),
        ] {
            let err = GetIncidentsSpec::from_configuration(&configuration).unwrap_err();
            assert!(matches!(err, ComponentError::ConfigurationDecode(_)));
            assert!(err.to_string().contains("error decoding configuration"));
        }
    }

    #[test]
    fn test_resource_spec_from_filters() {
        let spec = GetIncidentsSpec {
            assignment_group: Some("grp1".to_string()),
            caller: Some("user2".to_string()),
            ..GetIncidentsSpec::default()
        };

        assert_eq!(
            spec.resource_spec(),
            ResourceSpec {
                assignment_group: "grp1".to_string(),
                assigned_to: String::new(),
                caller: "user2".to_string(),
            }
        );
    }

    #[test]
    fn test_output_channels() {
        let channels = GetIncidents.output_channels(&Value::Null);
        let names: Vec<_> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["clear", "low", "high"]);
    }

    #[test]
    fn test_configuration_fields() {
        let fields = GetIncidents.configuration();
        assert_eq!(fields.len(), 11);
        assert!(fields.iter().all(|f| !f.required));

        let limit = fields.iter().find(|f| f.name == "limit").unwrap();
        assert_eq!(limit.default, Some(json!(10)));

        assert_eq!(
            dependency_graph(&fields),
            vec![("assignedTo", "assignmentGroup"), ("subcategory", "category")]
        );
        assert_eq!(validate_dependencies(&fields), Ok(()));
    }

    #[test]
    fn test_descriptive_surface() {
        assert_eq!(GetIncidents.name(), "servicenow.getIncidents");
        assert_eq!(GetIncidents.icon(), "servicenow");
        assert!(GetIncidents.documentation().contains("## Output Channels"));
        assert!(GetIncidents.actions().is_empty());
    }
}
