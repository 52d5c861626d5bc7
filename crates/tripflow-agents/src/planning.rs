use crate::catalog;
use async_trait::async_trait;
use tripflow_core::{
    ApprovalVerdict, ConversationState, Message, NodeName, PendingApproval, TripflowError,
    TripflowResult,
};
use tripflow_graph::{NodeOutcome, TaskNode};

const DEFAULT_DURATION_DAYS: u32 = 5;
const ITINERARY_DAY_CAP: u32 = 7;

/// Itinerary and budget planning over the demo catalog.
#[derive(Default)]
pub struct PlanningNode;

impl PlanningNode {
    /// Creates the node.
    pub fn new() -> Self {
        Self
    }

    fn itinerary(destination: &str, days: u32) -> (String, serde_json::Value) {
        let activities = catalog::activities_for(destination);
        let per_day = 3usize;

        let mut daily = Vec::new();
        for day in 1..=days.min(ITINERARY_DAY_CAP) {
            let start = (day as usize - 1) * per_day;
            // Activity lists are shorter than a full week at three slots a
            // day, so later days wrap around the list.
            let slot = |offset: usize| activities[(start + offset) % activities.len()];
            daily.push(serde_json::json!({
                "day": day,
                "morning": slot(0),
                "afternoon": slot(1),
                "evening": slot(2),
            }));
        }

        let summary = format!(
            "Planned a {days}-day itinerary for {destination}, starting with: {}.",
            activities.first().copied().unwrap_or("free exploration")
        );
        let payload = serde_json::json!({
            "destination": destination,
            "duration_days": days,
            "daily_itinerary": daily,
        });
        (summary, payload)
    }

    fn budget(destination: &str, days: u32, travelers: u32) -> (String, serde_json::Value) {
        // Mid-range daily base costs in USD, scaled by the destination.
        const ACCOMMODATION: f64 = 100.0;
        const FOOD: f64 = 60.0;
        const ACTIVITIES: f64 = 50.0;
        const TRANSPORT: f64 = 40.0;

        let factor = catalog::cost_factor(destination);
        let travelers = travelers.max(1) as f64;
        // Rooms are shared, the rest is per person.
        let accommodation = ACCOMMODATION * factor * (0.6 + 0.4 * travelers);
        let food = FOOD * factor * travelers;
        let activities = ACTIVITIES * factor * travelers;
        let transport = TRANSPORT * factor * travelers;
        let per_day = accommodation + food + activities + transport;
        let total = per_day * f64::from(days);

        let summary = format!(
            "Estimated budget for {days} days in {destination}: ${total:.0} total (${per_day:.0}/day).",
        );
        let payload = serde_json::json!({
            "destination": destination,
            "duration_days": days,
            "travelers": travelers as u32,
            "daily_breakdown": {
                "accommodation": accommodation.round(),
                "food": food.round(),
                "activities": activities.round(),
                "transport": transport.round(),
            },
            "total_per_day": per_day.round(),
            "total_trip_cost": total.round(),
            "currency": "USD",
        });
        (summary, payload)
    }
}

/// First number in the text, used as a trip duration in days.
fn parse_days(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0 && n <= 60)
}

#[async_trait]
impl TaskNode for PlanningNode {
    fn name(&self) -> NodeName {
        NodeName::Planning
    }

    async fn execute(&self, state: &ConversationState) -> TripflowResult<NodeOutcome> {
        let Some(request) = state.latest_user() else {
            return Err(TripflowError::NodeExecution {
                node: NodeName::Planning,
                reason: "no user request in conversation".to_string(),
            });
        };

        let text = &request.content;
        let destination = catalog::find_destination(text)
            .map_or("your destination", |d| d.name);
        let days = parse_days(text).unwrap_or(DEFAULT_DURATION_DAYS);

        let (summary, payload) = if text.to_lowercase().contains("budget") {
            Self::budget(destination, days, 1)
        } else {
            Self::itinerary(destination, days)
        };
        Ok(NodeOutcome::Completed(
            Message::node(NodeName::Planning, summary).with_payload(payload),
        ))
    }

    async fn resume(
        &self,
        _state: &ConversationState,
        pending: &PendingApproval,
        _verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome> {
        Err(TripflowError::NodeExecution {
            node: NodeName::Planning,
            reason: format!("unexpected resume for action '{}'", pending.action),
        })
    }
}
