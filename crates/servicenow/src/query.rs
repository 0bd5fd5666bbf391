//! Encoded query construction for the incident table.
//!
//! ServiceNow encoded queries join conditions with `^` (AND). Reference and
//! choice filters compare with `=`; list filters use `IN` followed by a
//! comma-separated value list, which is passed through untouched.

use crate::get_incidents::GetIncidentsSpec;

/// Page size used when the configured limit is not positive.
pub const DEFAULT_LIMIT: i64 = 10;

/// Separator between conditions.
const AND: &str = "^";

#[derive(Clone, Copy)]
enum Operator {
    Equals,
    In,
}

impl Operator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::In => "IN",
        }
    }
}

/// Build the `sysparm_query` value for the configured filters.
///
/// Conditions appear in a fixed order; empty filters are skipped.
#[must_use]
pub fn build_query(spec: &GetIncidentsSpec) -> String {
    let conditions = [
        ("assignment_group", Operator::Equals, &spec.assignment_group),
        ("assigned_to", Operator::Equals, &spec.assigned_to),
        ("caller_id", Operator::Equals, &spec.caller),
        ("category", Operator::Equals, &spec.category),
        ("subcategory", Operator::Equals, &spec.subcategory),
        ("business_service", Operator::Equals, &spec.service),
        ("state", Operator::In, &spec.state),
        ("urgency", Operator::In, &spec.urgency),
        ("impact", Operator::In, &spec.impact),
        ("priority", Operator::In, &spec.priority),
    ];

    conditions
        .iter()
        .filter_map(|(field, operator, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{field}{}{v}", operator.as_str()))
        })
        .collect::<Vec<_>>()
        .join(AND)
}

/// Page size actually requested for a configured limit.
#[must_use]
pub const fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit
    }
}
