//! Example outputs shown by the host before a component first runs.

use std::sync::LazyLock;

use serde_json::Value;

static GET_INCIDENTS: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../fixtures/example_output_get_incidents.json")).unwrap()
});

/// Example event emitted by `servicenow.getIncidents`.
#[must_use]
pub fn get_incidents() -> &'static Value {
    &GET_INCIDENTS
}
