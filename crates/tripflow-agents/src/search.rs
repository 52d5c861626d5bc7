use crate::catalog::{self, Category};
use async_trait::async_trait;
use tripflow_core::{
    ApprovalVerdict, ConversationState, Message, NodeName, PendingApproval, TripflowError,
    TripflowResult,
};
use tripflow_graph::{NodeOutcome, TaskNode};

/// Destination and weather search over the demo catalog.
///
/// Weather questions about a recognizable destination get a forecast;
/// anything else gets destination recommendations matched on the request's
/// interest keywords.
#[derive(Default)]
pub struct SearchNode;

impl SearchNode {
    /// Creates the node.
    pub fn new() -> Self {
        Self
    }

    fn weather_report(destination: &str) -> Message {
        let weather = catalog::weather_for(destination);
        let payload = serde_json::json!({
            "destination": destination,
            "temperature_range": weather.temp_range,
            "rainfall_level": weather.rainfall,
            "best_travel_months": weather.best_months,
        });
        Message::node(
            NodeName::Search,
            format!(
                "Weather for {destination}: {} with {} rainfall. Best months: {}.",
                weather.temp_range,
                weather.rainfall.to_lowercase(),
                weather.best_months
            ),
        )
        .with_payload(payload)
    }

    fn destination_report(query: &str) -> Message {
        let lower = query.to_lowercase();
        let mut wanted: Vec<Category> = Vec::new();
        if ["beach", "island", "coast", "tropical"].iter().any(|w| lower.contains(w)) {
            wanted.push(Category::Beach);
        }
        if ["culture", "history", "temple", "museum"].iter().any(|w| lower.contains(w)) {
            wanted.push(Category::Cultural);
        }
        if ["adventure", "hiking", "extreme", "outdoor"].iter().any(|w| lower.contains(w)) {
            wanted.push(Category::Adventure);
        }

        let matches: Vec<_> = if wanted.is_empty() {
            // No stated interest, offer the popular mix.
            catalog::DESTINATIONS
                .iter()
                .filter(|d| matches!(d.category, Category::Beach | Category::Cultural))
                .take(4)
                .collect()
        } else {
            catalog::DESTINATIONS
                .iter()
                .filter(|d| wanted.contains(&d.category))
                .collect()
        };

        let names: Vec<&str> = matches.iter().map(|d| d.name).collect();
        let payload = serde_json::json!({
            "search_query": query,
            "total_found": matches.len(),
            "destinations": matches.iter().map(|d| serde_json::json!({
                "name": d.name,
                "country": d.country,
                "avg_daily_cost": d.avg_daily_cost,
                "best_months": d.best_months,
                "highlights": d.highlights,
                "climate": d.climate,
            })).collect::<Vec<_>>(),
        });
        Message::node(
            NodeName::Search,
            format!("Found {} destinations: {}.", names.len(), names.join(", ")),
        )
        .with_payload(payload)
    }
}

#[async_trait]
impl TaskNode for SearchNode {
    fn name(&self) -> NodeName {
        NodeName::Search
    }

    async fn execute(&self, state: &ConversationState) -> TripflowResult<NodeOutcome> {
        let Some(request) = state.latest_user() else {
            return Err(TripflowError::NodeExecution {
                node: NodeName::Search,
                reason: "no user request in conversation".to_string(),
            });
        };

        let text = &request.content;
        let message = match (text.to_lowercase().contains("weather"), catalog::find_destination(text)) {
            (true, Some(dest)) => Self::weather_report(dest.name),
            _ => Self::destination_report(text),
        };
        Ok(NodeOutcome::Completed(message))
    }

    async fn resume(
        &self,
        _state: &ConversationState,
        pending: &PendingApproval,
        _verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome> {
        // Search never raises a gate, so there is nothing to resume.
        Err(TripflowError::NodeExecution {
            node: NodeName::Search,
            reason: format!("unexpected resume for action '{}'", pending.action),
        })
    }
}
