#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tripflow_core::{
    ApprovalVerdict, ConversationId, ConversationState, Message, NodeName, PendingApproval,
    RoutingDecision, TripflowError, TripflowResult,
};
use tripflow_graph::{
    DecisionOracle, GraphConfig, NodeOutcome, NodeRegistry, RunCheckpoint, SupervisorGraph,
    TaskNode,
};
use tripflow_session::{
    CheckpointStore, FileCheckpointStore, MemoryCheckpointStore, MemoryConversationStore,
    SessionService, TurnResult,
};

/// Oracle that routes on a simple keyword test: "book" → booking node,
/// anything else → weather/search node; once a node has answered, wrap up.
struct TestOracle;

#[async_trait]
impl DecisionOracle for TestOracle {
    async fn decide(
        &self,
        latest_user: &Message,
        history: &ConversationState,
    ) -> TripflowResult<RoutingDecision> {
        if let Some(last) = history.last() {
            if last.origin.is_some() {
                return Ok(RoutingDecision::direct(last.content.clone(), "node answered"));
            }
        }
        let text = latest_user.content.to_lowercase();
        if text.contains("book") {
            Ok(RoutingDecision::delegate(NodeName::Booking, "booking request"))
        } else {
            Ok(RoutingDecision::delegate(NodeName::Search, "info request"))
        }
    }
}

/// Oracle that always returns garbage-equivalent delegations (what an
/// unparseable model reply maps to).
struct GarbageOracle;

#[async_trait]
impl DecisionOracle for GarbageOracle {
    async fn decide(
        &self,
        _latest_user: &Message,
        _history: &ConversationState,
    ) -> TripflowResult<RoutingDecision> {
        Ok(RoutingDecision::delegate(NodeName::Search, "unparseable output"))
    }
}

struct WeatherNode;

#[async_trait]
impl TaskNode for WeatherNode {
    fn name(&self) -> NodeName {
        NodeName::Search
    }

    async fn execute(&self, _state: &ConversationState) -> TripflowResult<NodeOutcome> {
        Ok(NodeOutcome::Completed(Message::node(
            NodeName::Search,
            "Sunny, 24C in Rome",
        )))
    }

    async fn resume(
        &self,
        _state: &ConversationState,
        _pending: &PendingApproval,
        _verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome> {
        unreachable!("weather node never suspends")
    }
}

struct BookingNode {
    confirmations: AtomicUsize,
}

impl BookingNode {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            confirmations: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TaskNode for BookingNode {
    fn name(&self) -> NodeName {
        NodeName::Booking
    }

    async fn execute(&self, _state: &ConversationState) -> TripflowResult<NodeOutcome> {
        Ok(NodeOutcome::NeedsApproval(
            PendingApproval::new("confirm_booking", NodeName::Booking, "Book Hotel X, Dec 1-3")
                .with_arg("hotel", serde_json::json!("Hotel X"))
                .with_arg("check_in", serde_json::json!("Dec 1"))
                .with_arg("check_out", serde_json::json!("Dec 3")),
        ))
    }

    async fn resume(
        &self,
        _state: &ConversationState,
        pending: &PendingApproval,
        _verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome> {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        Ok(NodeOutcome::Completed(Message::node(
            NodeName::Booking,
            format!("Booking confirmed for {}", pending.args["hotel"].as_str().unwrap()),
        )))
    }
}

fn service_with(
    oracle: Arc<dyn DecisionOracle>,
    booking: Arc<BookingNode>,
    checkpoints: Arc<dyn CheckpointStore>,
) -> SessionService {
    let registry = NodeRegistry::new(
        NodeName::Search,
        vec![Arc::new(WeatherNode), booking as Arc<dyn TaskNode>],
    )
    .unwrap();
    let graph = Arc::new(SupervisorGraph::new(registry, oracle, GraphConfig::default()));
    SessionService::new(graph, Arc::new(MemoryConversationStore::new()), checkpoints)
}

#[tokio::test]
async fn scenario_a_weather_request_answers_without_checkpoint() {
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
    let service = service_with(Arc::new(TestOracle), BookingNode::new(), checkpoints.clone());
    let id = ConversationId::from("c1");

    let result = service
        .submit(&id, "What's the weather in Rome?")
        .await
        .unwrap();
    match result {
        TurnResult::Answer { text } => assert!(text.contains("Sunny")),
        other => panic!("expected Answer, got {other:?}"),
    }
    assert!(checkpoints.load(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_b_booking_suspends_and_persists_a_checkpoint() {
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
    let service = service_with(Arc::new(TestOracle), BookingNode::new(), checkpoints.clone());
    let id = ConversationId::from("c2");

    let result = service.submit(&id, "Book Hotel X for Dec 1-3").await.unwrap();
    match result {
        TurnResult::NeedsApproval { action, summary, args } => {
            assert_eq!(action, "confirm_booking");
            assert!(summary.contains("Hotel X"));
            assert_eq!(args["hotel"], "Hotel X");
        }
        other => panic!("expected NeedsApproval, got {other:?}"),
    }
    let cp = checkpoints.load(&id).await.unwrap().expect("checkpoint saved");
    assert_eq!(cp.node, NodeName::Booking);
}

#[tokio::test]
async fn scenario_c_approved_resume_confirms_and_clears_the_checkpoint() {
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
    let booking = BookingNode::new();
    let service = service_with(Arc::new(TestOracle), booking.clone(), checkpoints.clone());
    let id = ConversationId::from("c2");

    service.submit(&id, "Book Hotel X for Dec 1-3").await.unwrap();
    let result = service.resume(&id, ApprovalVerdict::approve()).await.unwrap();
    match result {
        TurnResult::Answer { text } => assert!(text.contains("confirmed")),
        other => panic!("expected Answer, got {other:?}"),
    }
    assert_eq!(booking.confirmations.load(Ordering::SeqCst), 1);
    assert!(checkpoints.load(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_d_resume_without_checkpoint_fails() {
    let service = service_with(
        Arc::new(TestOracle),
        BookingNode::new(),
        Arc::new(MemoryCheckpointStore::new()),
    );

    let err = service
        .resume(&"c3".into(), ApprovalVerdict::approve())
        .await
        .unwrap_err();
    assert!(matches!(err, TripflowError::NoPendingApproval(id) if id.as_str() == "c3"));
}

#[tokio::test]
async fn scenario_e_garbage_routing_fails_instead_of_looping() {
    let service = service_with(
        Arc::new(GarbageOracle),
        BookingNode::new(),
        Arc::new(MemoryCheckpointStore::new()),
    );

    let err = service.submit(&"c4".into(), "anything").await.unwrap_err();
    assert!(matches!(err, TripflowError::RoutingNotConverged(_)));
}

#[tokio::test]
async fn rejected_resume_appends_one_notice_and_skips_the_action() {
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
    let booking = BookingNode::new();
    let service = service_with(Arc::new(TestOracle), booking.clone(), checkpoints.clone());
    let id = ConversationId::from("c5");

    service.submit(&id, "Book Hotel X").await.unwrap();
    let result = service
        .resume(&id, ApprovalVerdict::deny().with_note("changed my mind"))
        .await
        .unwrap();
    match result {
        TurnResult::Answer { text } => assert!(text.contains("not performed")),
        other => panic!("expected Answer, got {other:?}"),
    }
    assert_eq!(booking.confirmations.load(Ordering::SeqCst), 0);
    assert!(checkpoints.load(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn submit_while_suspended_is_a_caller_error() {
    let service = service_with(
        Arc::new(TestOracle),
        BookingNode::new(),
        Arc::new(MemoryCheckpointStore::new()),
    );
    let id = ConversationId::from("c6");

    service.submit(&id, "Book Hotel X").await.unwrap();
    let err = service.submit(&id, "actually, what's the weather?").await.unwrap_err();
    assert!(matches!(err, TripflowError::ApprovalPending(pid) if pid.as_str() == "c6"));
}

#[tokio::test]
async fn distinct_conversations_are_independent() {
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
    let service = Arc::new(service_with(
        Arc::new(TestOracle),
        BookingNode::new(),
        checkpoints.clone(),
    ));

    // c7 suspends on a booking; c8 still answers normally.
    service.submit(&"c7".into(), "Book Hotel X").await.unwrap();
    let result = service
        .submit(&"c8".into(), "weather in Rome?")
        .await
        .unwrap();
    assert!(matches!(result, TurnResult::Answer { .. }));
    assert!(checkpoints.load(&"c7".into()).await.unwrap().is_some());
    assert!(checkpoints.load(&"c8".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn file_checkpoint_store_round_trips_and_clears() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileCheckpointStore::new(tmp.path().join("checkpoints"))
        .await
        .unwrap();
    let id = ConversationId::from("c9");

    let mut state = ConversationState::new();
    state.push(Message::user("Book Hotel X"));
    let cp = RunCheckpoint::new(
        id.clone(),
        state,
        PendingApproval::new("confirm_booking", NodeName::Booking, "Book Hotel X")
            .with_arg("hotel", serde_json::json!("Hotel X")),
        1,
    );

    store.save(&cp).await.unwrap();
    let loaded = store.load(&id).await.unwrap().unwrap();
    assert_eq!(loaded.pending.args, cp.pending.args);
    assert_eq!(loaded.state.len(), cp.state.len());
    assert_eq!(loaded.created_at, cp.created_at);

    store.clear(&id).await.unwrap();
    store.clear(&id).await.unwrap(); // idempotent
    assert!(store.load(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn corrupted_checkpoint_file_is_surfaced_not_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("checkpoints");
    let store = FileCheckpointStore::new(dir.clone()).await.unwrap();

    tokio::fs::write(dir.join("c10.checkpoint.json"), "{ not json")
        .await
        .unwrap();
    let err = store.load(&"c10".into()).await.unwrap_err();
    assert!(matches!(err, TripflowError::MalformedCheckpoint(id, _) if id.as_str() == "c10"));
}

#[tokio::test]
async fn file_store_survives_reopen_like_a_process_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("checkpoints");
    let id = ConversationId::from("c11");

    {
        let store = FileCheckpointStore::new(dir.clone()).await.unwrap();
        let mut state = ConversationState::new();
        state.push(Message::user("Book Hotel X"));
        let cp = RunCheckpoint::new(
            id.clone(),
            state,
            PendingApproval::new("confirm_booking", NodeName::Booking, "Book Hotel X"),
            1,
        );
        store.save(&cp).await.unwrap();
    }

    let reopened = FileCheckpointStore::new(dir).await.unwrap();
    assert!(reopened.load(&id).await.unwrap().is_some());
}

/// Scripted oracle used by the multi-gate test below.
struct ScriptedOracle(Mutex<VecDeque<RoutingDecision>>);

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    async fn decide(
        &self,
        _latest_user: &Message,
        _history: &ConversationState,
    ) -> TripflowResult<RoutingDecision> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TripflowError::OracleUnavailable("script exhausted".into()))
    }
}

/// Node whose resume raises a second gate before completing.
struct TwoGateNode {
    effects: AtomicUsize,
}

#[async_trait]
impl TaskNode for TwoGateNode {
    fn name(&self) -> NodeName {
        NodeName::Booking
    }

    async fn execute(&self, _state: &ConversationState) -> TripflowResult<NodeOutcome> {
        Ok(NodeOutcome::NeedsApproval(PendingApproval::new(
            "confirm_hotel",
            NodeName::Booking,
            "Book the hotel",
        )))
    }

    async fn resume(
        &self,
        _state: &ConversationState,
        pending: &PendingApproval,
        _verdict: &ApprovalVerdict,
    ) -> TripflowResult<NodeOutcome> {
        self.effects.fetch_add(1, Ordering::SeqCst);
        if pending.action == "confirm_hotel" {
            Ok(NodeOutcome::NeedsApproval(PendingApproval::new(
                "confirm_flight",
                NodeName::Booking,
                "Book the flight",
            )))
        } else {
            Ok(NodeOutcome::Completed(Message::node(
                NodeName::Booking,
                "Hotel and flight confirmed",
            )))
        }
    }
}

#[tokio::test]
async fn sequential_gates_suspend_twice_within_one_turn() {
    let oracle = Arc::new(ScriptedOracle(Mutex::new(
        vec![
            RoutingDecision::delegate(NodeName::Booking, "booking request"),
            RoutingDecision::direct("All booked.", "wrap up"),
        ]
        .into(),
    )));
    let node = Arc::new(TwoGateNode {
        effects: AtomicUsize::new(0),
    });
    let registry = NodeRegistry::new(
        NodeName::Search,
        vec![Arc::new(WeatherNode), node.clone() as Arc<dyn TaskNode>],
    )
    .unwrap();
    let graph = Arc::new(SupervisorGraph::new(registry, oracle, GraphConfig::default()));
    let service = SessionService::new(
        graph,
        Arc::new(MemoryConversationStore::new()),
        Arc::new(MemoryCheckpointStore::new()),
    );
    let id = ConversationId::from("c12");

    let first = service.submit(&id, "Book hotel and flight").await.unwrap();
    assert!(matches!(first, TurnResult::NeedsApproval { ref action, .. } if action == "confirm_hotel"));

    let second = service.resume(&id, ApprovalVerdict::approve()).await.unwrap();
    assert!(matches!(second, TurnResult::NeedsApproval { ref action, .. } if action == "confirm_flight"));

    let last = service.resume(&id, ApprovalVerdict::approve()).await.unwrap();
    assert!(matches!(last, TurnResult::Answer { .. }));
    assert_eq!(node.effects.load(Ordering::SeqCst), 2);
}
