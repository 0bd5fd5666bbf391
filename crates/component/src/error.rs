//! Error types returned to the host.

use thiserror::Error;

/// Boxed error used by host collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors a component operation can fail with.
///
/// Every variant carries a static description of the failed operation. None
/// of them are retried by the component; retry policy belongs to the host.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Configuration does not match the expected shape
    #[error("error decoding configuration: {0}")]
    ConfigurationDecode(#[source] serde_json::Error),

    /// Stored metadata does not match the expected shape
    #[error("failed to decode node metadata: {0}")]
    MetadataDecode(#[source] serde_json::Error),

    /// The integration connection cannot produce a usable client
    #[error("error creating client: {0}")]
    ClientConstruction(String),

    /// A referenced resource could not be confirmed to exist
    #[error("error verifying {field}: {source}")]
    ResourceVerification {
        /// Human-readable name of the offending field
        field: &'static str,
        #[source]
        source: BoxError,
    },

    /// An outbound call to the external system failed
    #[error("{context}: {source}")]
    ExternalCall {
        /// What the call was doing, e.g. "failed to get incidents"
        context: &'static str,
        #[source]
        source: BoxError,
    },

    /// The host could not persist metadata
    #[error("failed to store metadata: {0}")]
    Metadata(#[source] BoxError),

    /// The host rejected an emitted payload
    #[error("failed to emit output: {0}")]
    Emit(#[source] BoxError),
}

impl ComponentError {
    /// Wrap a lookup failure for `field`.
    pub fn verification(
        field: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ResourceVerification {
            field,
            source: Box::new(source),
        }
    }

    /// Wrap an outbound call failure with `context`.
    pub fn external(
        context: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ExternalCall {
            context,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_verification_names_field() {
        let err = ComponentError::verification("assignment group", std::io::Error::other("404"));
        assert_eq!(err.to_string(), "error verifying assignment group: 404");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_external_call_keeps_context() {
        let err = ComponentError::external("failed to get incidents", std::io::Error::other("401"));
        assert!(err.to_string().starts_with("failed to get incidents"));
    }

    #[test]
    fn test_decode_errors_are_prefixed() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ComponentError::ConfigurationDecode(source);
        assert!(err.to_string().starts_with("error decoding configuration"));
    }
}
