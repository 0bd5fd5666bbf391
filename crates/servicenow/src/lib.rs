//! ServiceNow integration components.
//!
//! This crate provides:
//! - A REST client for the ServiceNow Table API
//! - Resource verification and metadata caching for component setup
//! - The `servicenow.getIncidents` component, which queries incidents and
//!   routes the result by urgency to the `clear`, `low` or `high` channel
//!
//! # Configuration
//!
//! The component reads its connection from the host integration:
//!
//! - `instanceUrl`: base URL of the ServiceNow instance
//! - `authType`: `basicAuth` (with `username`/`password`) or `oauth` (with the
//!   `accessToken` secret)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod client;
pub mod config;
pub mod example;
pub mod get_incidents;
pub mod models;
pub mod query;
pub mod resolver;
pub mod router;

pub use client::{ClientError, Credentials, ServiceNowClient};
pub use config::ConnectionConfig;
pub use get_incidents::{GetIncidents, GetIncidentsSpec};
pub use models::{IncidentRecord, IncidentsPayload, NodeMetadata, ResourceInfo};
pub use router::Channel;

/// Payload type tag for emitted incident lists.
pub const PAYLOAD_TYPE_INCIDENTS: &str = "servicenow.incidents";
