//! Declarative configuration fields.
//!
//! Fields are plain data rendered by the host UI. A field can take parameters
//! from the value of another field (e.g. users scoped by the selected group);
//! those references form a directed graph the host resolves. Components only
//! ever see the already-selected leaf values.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Field input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    String,
    Number,
    Bool,
    /// A resource picked from the integration (groups, users, categories, ...)
    IntegrationResource,
}

/// A configuration form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
}

/// Type-specific options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceTypeOptions>,
}

/// Options for [`FieldType::IntegrationResource`] fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTypeOptions {
    /// Resource type the host lists options for
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRef>,
}

/// A parameter passed when listing resource options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<ParameterValueFrom>,
}

/// Source of a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValueFrom {
    /// Name of the field whose value is used
    pub field: String,
}

impl Field {
    fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            default: None,
            description: String::new(),
            placeholder: String::new(),
            type_options: None,
        }
    }

    /// Create an optional number field.
    #[must_use]
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Number)
    }

    /// Create an optional string field.
    #[must_use]
    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::String)
    }

    /// Create an optional integration resource field.
    #[must_use]
    pub fn integration_resource(
        name: impl Into<String>,
        label: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        let mut field = Self::new(name, label, FieldType::IntegrationResource);
        field.type_options = Some(TypeOptions {
            resource: Some(ResourceTypeOptions {
                resource_type: resource_type.into(),
                parameters: Vec::new(),
            }),
        });
        field
    }

    /// Mark the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Scope resource options by the value of another field.
    ///
    /// Has no effect on fields that are not integration resources.
    #[must_use]
    pub fn depends_on(mut self, parameter: impl Into<String>, field: impl Into<String>) -> Self {
        if let Some(resource) = self
            .type_options
            .as_mut()
            .and_then(|options| options.resource.as_mut())
        {
            resource.parameters.push(ParameterRef {
                name: parameter.into(),
                value_from: Some(ParameterValueFrom {
                    field: field.into(),
                }),
            });
        }
        self
    }

    /// Names of the fields this field takes parameter values from.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.type_options
            .iter()
            .filter_map(|options| options.resource.as_ref())
            .flat_map(|resource| resource.parameters.iter())
            .filter_map(|parameter| parameter.value_from.as_ref())
            .map(|from| from.field.as_str())
    }
}

/// Errors in a field dependency graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("duplicate field: {0}")]
    Duplicate(String),

    #[error("field {field} depends on unknown field {dependency}")]
    UnknownDependency { field: String, dependency: String },

    #[error("dependency cycle through field {0}")]
    Cycle(String),
}

/// Directed edges `(field, depends_on)` in declaration order.
#[must_use]
pub fn dependency_graph(fields: &[Field]) -> Vec<(&str, &str)> {
    fields
        .iter()
        .flat_map(|field| {
            field
                .dependencies()
                .map(move |dependency| (field.name.as_str(), dependency))
        })
        .collect()
}

/// Check that field names are unique and dependencies reference declared
/// fields without forming a cycle.
///
/// # Errors
/// Returns the first problem found.
pub fn validate_dependencies(fields: &[Field]) -> Result<(), FieldError> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for field in fields {
        if edges.insert(field.name.as_str(), Vec::new()).is_some() {
            return Err(FieldError::Duplicate(field.name.clone()));
        }
    }

    for (field, dependency) in dependency_graph(fields) {
        if !edges.contains_key(dependency) {
            return Err(FieldError::UnknownDependency {
                field: field.to_string(),
                dependency: dependency.to_string(),
            });
        }
        edges.entry(field).or_default().push(dependency);
    }

    let mut done = HashSet::new();
    for field in fields {
        let mut visiting = HashSet::new();
        visit(field.name.as_str(), &edges, &mut visiting, &mut done)?;
    }

    Ok(())
}

fn visit<'a>(
    field: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    visiting: &mut HashSet<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), FieldError> {
    if done.contains(field) {
        return Ok(());
    }
    if !visiting.insert(field) {
        return Err(FieldError::Cycle(field.to_string()));
    }

    for &dependency in edges.get(field).into_iter().flatten() {
        visit(dependency, edges, visiting, done)?;
    }

    visiting.remove(field);
    done.insert(field);
    Ok(())
}
