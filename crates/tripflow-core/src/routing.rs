use serde::{Deserialize, Serialize};

/// Name of a specialist task node. A closed set: unknown names cannot be
/// routed to, they are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeName {
    /// Destination and weather lookups.
    Search,
    /// Itineraries and budget breakdowns.
    Planning,
    /// Accommodation/flight options and reservation confirmation.
    Booking,
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeName::Search => write!(f, "search"),
            NodeName::Planning => write!(f, "planning"),
            NodeName::Booking => write!(f, "booking"),
        }
    }
}

impl std::str::FromStr for NodeName {
    type Err = UnknownNodeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "search" => Ok(NodeName::Search),
            "planning" => Ok(NodeName::Planning),
            "booking" => Ok(NodeName::Booking),
            other => Err(UnknownNodeName(other.to_string())),
        }
    }
}

/// Error returned when parsing a string that names no registered task node.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown task node '{0}'")]
pub struct UnknownNodeName(pub String);

/// Where the router sends control next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Hand the turn to the named task node.
    Delegate(NodeName),
    /// Answer the user directly and end the turn.
    HandleDirectly {
        /// The supervisor's direct answer.
        answer: String,
    },
    /// The request is out of domain; append a rejection notice and end.
    Reject,
}

/// One routing decision, produced per router entry. Not persisted beyond
/// the turn that used it.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Where control goes next.
    pub target: RouteTarget,
    /// Free-text rationale, used only for logging.
    pub rationale: String,
}

impl RoutingDecision {
    /// Delegate to the named node.
    pub fn delegate(node: NodeName, rationale: impl Into<String>) -> Self {
        Self {
            target: RouteTarget::Delegate(node),
            rationale: rationale.into(),
        }
    }

    /// Answer the user directly.
    pub fn direct(answer: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            target: RouteTarget::HandleDirectly {
                answer: answer.into(),
            },
            rationale: rationale.into(),
        }
    }

    /// Reject an out-of-domain request.
    pub fn reject(rationale: impl Into<String>) -> Self {
        Self {
            target: RouteTarget::Reject,
            rationale: rationale.into(),
        }
    }
}
