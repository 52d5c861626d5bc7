use crate::catalog;
use async_trait::async_trait;
use tripflow_core::{
    ApprovalVerdict, ConversationState, Message, NodeName, PendingApproval, TripflowError,
    TripflowResult,
};
use tripflow_graph::{NodeOutcome, TaskNode};
use uuid::Uuid;

/// The action name raised at the approval gate.
pub const CONFIRM_BOOKING: &str = "confirm_booking";

struct Accommodation {
    name: &'static str,
    kind: &'static str,
    rating: f64,
    price_per_night: u32,
    location: &'static str,
}

const ACCOMMODATIONS: &[Accommodation] = &[
    Accommodation {
        name: "Grand Palace Hotel",
        kind: "Hotel",
        rating: 4.5,
        price_per_night: 150,
        location: "City Center",
    },
    Accommodation {
        name: "Boutique Heritage Inn",
        kind: "Boutique Hotel",
        rating: 4.3,
        price_per_night: 120,
        location: "Historic District",
    },
    Accommodation {
        name: "Backpacker's Paradise Hostel",
        kind: "Hostel",
        rating: 4.0,
        price_per_night: 35,
        location: "Downtown",
    },
    Accommodation {
        name: "Luxury Resort & Spa",
        kind: "Resort",
        rating: 4.8,
        price_per_night: 300,
        location: "Beachfront",
    },
];

struct Flight {
    airline: &'static str,
    departure_time: &'static str,
    duration: &'static str,
    price: u32,
    stops: u32,
}

const FLIGHTS: &[Flight] = &[
    Flight { airline: "Global Airways", departure_time: "06:30", duration: "6h 15m", price: 400, stops: 0 },
    Flight { airline: "Sky Connect", departure_time: "09:30", duration: "7h 25m", price: 460, stops: 1 },
    Flight { airline: "Premium Air", departure_time: "12:30", duration: "8h 35m", price: 520, stops: 0 },
    Flight { airline: "Budget Wings", departure_time: "15:30", duration: "9h 45m", price: 580, stops: 1 },
];

/// Accommodation and flight bookings.
///
/// Searching options is a plain read and completes normally. Confirming a
/// reservation is the one side-effecting action in the system, so it is
/// raised as an approval gate; the confirmation itself only runs inside
/// `resume`, after an explicit approval.
#[derive(Default)]
pub struct BookingNode;

impl BookingNode {
    /// Creates the node.
    pub fn new() -> Self {
        Self
    }

    fn accommodation_options(destination: &str) -> Message {
        let options: Vec<_> = ACCOMMODATIONS
            .iter()
            .map(|a| serde_json::json!({
                "name": format!("{} - {destination}", a.name),
                "type": a.kind,
                "rating": a.rating,
                "price_per_night": a.price_per_night,
                "location": a.location,
            }))
            .collect();
        let names: Vec<String> = ACCOMMODATIONS
            .iter()
            .map(|a| format!("{} (${}/night)", a.name, a.price_per_night))
            .collect();
        Message::node(
            NodeName::Booking,
            format!("Found {} stays in {destination}: {}.", options.len(), names.join(", ")),
        )
        .with_payload(serde_json::json!({
            "destination": destination,
            "accommodations": options,
            "total_options": options.len(),
        }))
    }

    fn flight_options(destination: &str) -> Message {
        let options: Vec<_> = FLIGHTS
            .iter()
            .map(|f| serde_json::json!({
                "airline": f.airline,
                "departure_time": f.departure_time,
                "duration": f.duration,
                "price": f.price,
                "stops": f.stops,
            }))
            .collect();
        let names: Vec<String> = FLIGHTS
            .iter()
            .map(|f| format!("{} (${})", f.airline, f.price))
            .collect();
        Message::node(
            NodeName::Booking,
            format!("Found {} flights to {destination}: {}.", options.len(), names.join(", ")),
        )
        .with_payload(serde_json::json!({
            "destination": destination,
            "flight_options": options,
            "total_options": options.len(),
        }))
    }

    fn confirmation_gate(destination: &str, flight: bool) -> PendingApproval {
        if flight {
            let best = &FLIGHTS[0];
            PendingApproval::new(
                CONFIRM_BOOKING,
                NodeName::Booking,
                format!(
                    "Book {} flight to {destination}, departing {} (${}).",
                    best.airline, best.departure_time, best.price
                ),
            )
            .with_arg("kind", serde_json::json!("flight"))
            .with_arg("name", serde_json::json!(best.airline))
            .with_arg("destination", serde_json::json!(destination))
            .with_arg("price", serde_json::json!(best.price))
        } else {
            let best = &ACCOMMODATIONS[0];
            PendingApproval::new(
                CONFIRM_BOOKING,
                NodeName::Booking,
                format!(
                    "Book {} in {destination} at ${}/night.",
                    best.name, best.price_per_night
                ),
            )
            .with_arg("kind", serde_json::json!("accommodation"))
            .with_arg("name", serde_json::json!(best.name))
            .with_arg("destination", serde_json::json!(destination))
            .with_arg("price", serde_json::json!(best.price_per_night))
        }
    }
}

/// Opaque reference for a confirmed booking, e.g. `HTL-9F21A3`.
fn booking_reference(kind: &str) -> String {
    let prefix = if kind == "flight" { "FLT" } else { "HTL" };
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}-{suffix}")
}

#[async_trait]
impl TaskNode for BookingNode {
    fn name(&self) -> NodeName {
        NodeName::Booking
    }

    async fn execute(&self, state: &ConversationState) -> TripflowResult<NodeOutcome> {
        let Some(request) = state.latest_user() else {
            return Err(TripflowError::NodeExecution {
                node: NodeName::Booking,
                reason: "no user request in conversation".to_string(),
            });
        };

        let text = request.content.to_lowercase();
        let destination = catalog::find_destination(&request.content)
            .map_or("your destination", |d| d.name);
        let flight = text.contains("flight") || text.contains("fly");
        let wants_confirmation =
            ["book", "reserve", "confirm"].iter().any(|w| text.contains(w));

        if wants_confirmation {
            Ok(NodeOutcome::NeedsApproval(Self::confirmation_gate(
                destination,
                flight,
            )))
        } else if flight {
            Ok(NodeOutcome::Completed(Self::flight_options(destination)))
        } else {
            Ok(NodeOutcome::Completed(Self::accommodation_options(destination)))
        }
    }

    async fn resume(
        &self,
        _state: &ConversationState,
        pending: &PendingApproval,
        _verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome> {
        if pending.action != CONFIRM_BOOKING {
            return Err(TripflowError::NodeExecution {
                node: NodeName::Booking,
                reason: format!("unknown gated action '{}'", pending.action),
            });
        }

        let kind = pending.args.get("kind").and_then(|v| v.as_str()).unwrap_or("accommodation");
        let name = pending.args.get("name").and_then(|v| v.as_str()).unwrap_or("the selected option");
        let reference = booking_reference(kind);

        Ok(NodeOutcome::Completed(
            Message::node(
                NodeName::Booking,
                format!("Your {kind} booking for {name} is confirmed! Reference: {reference}."),
            )
            .with_payload(serde_json::json!({
                "status": "confirmed",
                "booking_reference": reference,
                "kind": kind,
                "name": name,
            })),
        ))
    }
}
