//! Severity routing for incident results.

use std::fmt;

use component::OutputChannel;
use serde::{Deserialize, Serialize};

use crate::models::IncidentRecord;

/// ServiceNow urgency value for "1 - High".
pub const HIGH_URGENCY: &str = "1";

/// Output channels of `servicenow.getIncidents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// No incidents matched
    Clear,
    /// Incidents matched, none with high urgency
    Low,
    /// At least one high-urgency incident
    High,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Self; 3] = [Self::Clear, Self::Low, Self::High];

    /// Channel name used when emitting.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Low => "low",
            Self::High => "high",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Low => "Low",
            Self::High => "High",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Clear => "No incidents matched the filters",
            Self::Low => "Incidents found, but all are low or medium urgency",
            Self::High => "At least one high-urgency incident found",
        }
    }

    /// Descriptor declared to the host.
    #[must_use]
    pub fn output_channel(self) -> OutputChannel {
        OutputChannel::new(self.as_str(), self.label(), self.description())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the output channel for a result set.
///
/// A single high-urgency incident anywhere in the set selects `high`.
#[must_use]
pub fn route(incidents: &[IncidentRecord]) -> Channel {
    if incidents.is_empty() {
        return Channel::Clear;
    }

    if incidents
        .iter()
        .any(|incident| incident.urgency == HIGH_URGENCY)
    {
        Channel::High
    } else {
        Channel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(sys_id: &str, urgency: &str) -> IncidentRecord {
        IncidentRecord {
            sys_id: sys_id.to_string(),
            urgency: urgency.to_string(),
            ..IncidentRecord::default()
        }
    }

    #[test]
    fn test_no_incidents_is_clear() {
        assert_eq!(route(&[]), Channel::Clear);
    }

    #[test]
    fn test_high_urgency_is_high() {
        assert_eq!(route(&[incident("abc", "1")]), Channel::High);
    }

    #[test]
    fn test_medium_and_low_urgency_is_low() {
        assert_eq!(route(&[incident("abc", "2"), incident("def", "3")]), Channel::Low);
    }

    #[test]
    fn test_highest_urgency_wins_regardless_of_position() {
        let mixed = [incident("abc", "3"), incident("def", "1")];
        assert_eq!(route(&mixed), Channel::High);

        let mut reversed = mixed.to_vec();
        reversed.reverse();
        assert_eq!(route(&reversed), Channel::High);
    }

    #[test]
    fn test_missing_urgency_is_low() {
        assert_eq!(route(&[incident("abc", "")]), Channel::Low);
    }

    #[test]
    fn test_channel_names() {
        let names: Vec<_> = Channel::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["clear", "low", "high"]);
        assert_eq!(Channel::High.output_channel().label, "High");
    }
}
