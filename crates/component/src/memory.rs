//! In-process collaborators.
//!
//! Used by tests and by binaries that run a component outside the host.

use std::collections::HashMap;

use serde_json::Value;

use crate::context::{ExecutionState, IntegrationContext, MetadataStore};
use crate::error::BoxError;

/// Metadata kept in memory.
#[derive(Debug, Default)]
pub struct MemoryMetadata {
    /// Current value; `Value::Null` until the first write.
    pub metadata: Value,
    /// Number of successful writes.
    pub writes: usize,
    fail_writes: bool,
}

impl MemoryMetadata {
    /// Start from an existing value.
    #[must_use]
    pub fn with_value(metadata: Value) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// A store that rejects every write.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl MetadataStore for MemoryMetadata {
    fn get(&self) -> Value {
        self.metadata.clone()
    }

    fn set(&mut self, value: Value) -> Result<(), BoxError> {
        if self.fail_writes {
            return Err("metadata store is read-only".into());
        }
        self.metadata = value;
        self.writes += 1;
        Ok(())
    }
}

/// A single `emit` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub channel: String,
    pub payload_type: String,
    pub payloads: Vec<Value>,
}

/// Execution state that records every emission.
#[derive(Debug, Default)]
pub struct RecordingExecutionState {
    pub emissions: Vec<Emission>,
}

impl RecordingExecutionState {
    /// Whether anything was emitted.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.emissions.is_empty()
    }

    /// Channel of the last emission.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.emissions.last().map(|e| e.channel.as_str())
    }

    /// Payload type of the last emission.
    #[must_use]
    pub fn payload_type(&self) -> Option<&str> {
        self.emissions.last().map(|e| e.payload_type.as_str())
    }

    /// Payloads of the last emission.
    #[must_use]
    pub fn payloads(&self) -> &[Value] {
        match self.emissions.last() {
            Some(emission) => &emission.payloads,
            None => &[],
        }
    }
}

impl ExecutionState for RecordingExecutionState {
    fn emit(
        &mut self,
        channel: &str,
        payload_type: &str,
        payloads: Vec<Value>,
    ) -> Result<(), BoxError> {
        self.emissions.push(Emission {
            channel: channel.to_string(),
            payload_type: payload_type.to_string(),
            payloads,
        });
        Ok(())
    }
}

/// Integration backed by fixed configuration and secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticIntegration {
    configuration: Value,
    secrets: HashMap<String, String>,
}

impl StaticIntegration {
    #[must_use]
    pub fn new(configuration: Value) -> Self {
        Self {
            configuration,
            secrets: HashMap::new(),
        }
    }

    /// Add a secret.
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }
}

impl IntegrationContext for StaticIntegration {
    fn configuration(&self) -> &Value {
        &self.configuration
    }

    fn secret(&self, name: &str) -> Option<String> {
        self.secrets.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_metadata_counts_writes() {
        let mut store = MemoryMetadata::default();
        assert_eq!(store.get(), Value::Null);

        store.set(json!({ "a": 1 })).unwrap();
        assert_eq!(store.get(), json!({ "a": 1 }));
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_failing_metadata_keeps_value() {
        let mut store = MemoryMetadata::failing();
        assert!(store.set(json!({ "a": 1 })).is_err());
        assert_eq!(store.get(), Value::Null);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_recording_state_tracks_last_emission() {
        let mut state = RecordingExecutionState::default();
        assert!(!state.passed());
        assert!(state.payloads().is_empty());

        state.emit("low", "t", vec![json!(1)]).unwrap();
        assert!(state.passed());
        assert_eq!(state.channel(), Some("low"));
        assert_eq!(state.payload_type(), Some("t"));
    }

    #[test]
    fn test_static_integration_secrets() {
        let integration = StaticIntegration::new(json!({ "k": "v" })).with_secret("token", "abc");
        assert_eq!(integration.configuration()["k"], "v");
        assert_eq!(integration.secret("token").as_deref(), Some("abc"));
        assert_eq!(integration.secret("missing"), None);
    }
}
