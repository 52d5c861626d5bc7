//! Interactive terminal front end for the Tripflow travel-planning
//! orchestrator.
//!
//! Reads user requests line by line, routes them through the supervisor
//! graph, and prompts on stdin whenever a booking reaches the approval
//! gate. Conversation state and suspensions persist under the configured
//! data directory, so an unanswered approval prompt survives a restart.

use clap::Parser;
use serde::Deserialize;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tripflow_agents::{
    BookingNode, ChatClient, ChatConfig, KeywordOracle, LlmOracle, PlanningNode, SearchNode,
};
use tripflow_core::{ApprovalVerdict, ConversationId, NodeName};
use tripflow_graph::{DecisionOracle, GraphConfig, NodeRegistry, SupervisorGraph, TaskNode};
use tripflow_session::{
    FileCheckpointStore, FileConversationStore, SessionService, TurnResult,
};

#[derive(Parser)]
#[command(name = "tripflow", about = "Tripflow — multi-agent travel planner")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "tripflow.toml")]
    config: PathBuf,

    /// Conversation to open or continue
    #[arg(long, default_value = "default")]
    conversation: String,

    /// Route with the offline keyword heuristic instead of the model
    #[arg(long)]
    offline: bool,
}

#[derive(Deserialize)]
struct TripflowConfig {
    #[serde(default)]
    model: ModelSettings,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default)]
    graph: GraphSettings,
}

#[derive(Deserialize)]
struct ModelSettings {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Deserialize)]
struct GraphSettings {
    #[serde(default = "default_max_delegations")]
    max_delegations: usize,
    #[serde(default = "default_oracle_retries")]
    oracle_retries: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            max_delegations: default_max_delegations(),
            oracle_retries: default_oracle_retries(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_delegations() -> usize {
    4
}

fn default_oracle_retries() -> usize {
    2
}

fn load_config(path: &Path) -> Result<TripflowConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    } else {
        // All fields default, so an absent file means a default config.
        Ok(toml::from_str("")?)
    }
}

fn build_oracle(config: &TripflowConfig, offline: bool) -> Arc<dyn DecisionOracle> {
    if offline {
        return Arc::new(KeywordOracle::new());
    }
    let mut api_key = config.model.api_key.clone();
    if api_key.is_empty() {
        api_key = std::env::var("TRIPFLOW_API_KEY").unwrap_or_default();
    }
    Arc::new(LlmOracle::new(ChatClient::new(ChatConfig {
        base_url: config.model.base_url.clone(),
        model: config.model.model.clone(),
        api_key,
        max_tokens: config.model.max_tokens,
    })))
}

fn format_approval_prompt(action: &str, summary: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("\n\x1b[1;37m== APPROVAL REQUIRED ==\x1b[0m\n");
    prompt.push_str(&format!("  Action:  {action}\n"));
    prompt.push_str(&format!("  Detail:  {summary}\n"));
    prompt.push_str("  Approve? [y/N/reason]: ");
    prompt
}

fn parse_verdict(input: &str) -> ApprovalVerdict {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "y" | "yes" => ApprovalVerdict::approve(),
        "n" | "no" | "" => ApprovalVerdict::deny(),
        _ => ApprovalVerdict::deny().with_note(trimmed),
    }
}

type StdinLines = Lines<BufReader<Stdin>>;

/// Drives one turn result to a final answer, prompting through any
/// approval gates it raises along the way.
async fn settle_turn(
    service: &SessionService,
    id: &ConversationId,
    mut result: TurnResult,
    lines: &mut StdinLines,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match result {
            TurnResult::Answer { text } => {
                println!("{text}");
                return Ok(());
            }
            TurnResult::NeedsApproval { action, summary, .. } => {
                eprint!("{}", format_approval_prompt(&action, &summary));
                std::io::stderr().flush()?;
                let verdict = match lines.next_line().await? {
                    Some(line) => parse_verdict(&line),
                    // stdin closed mid-prompt: leave the suspension on disk.
                    None => return Ok(()),
                };
                result = service.resume(id, verdict).await?;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let registry = NodeRegistry::new(
        NodeName::Search,
        vec![
            Arc::new(SearchNode::new()) as Arc<dyn TaskNode>,
            Arc::new(PlanningNode::new()),
            Arc::new(BookingNode::new()),
        ],
    )?;
    let graph = Arc::new(SupervisorGraph::new(
        registry,
        build_oracle(&config, cli.offline),
        GraphConfig {
            max_delegations: config.graph.max_delegations,
            oracle_retries: config.graph.oracle_retries,
        },
    ));

    let conversations = FileConversationStore::new(config.data_dir.join("conversations")).await?;
    let checkpoints = FileCheckpointStore::new(config.data_dir.join("checkpoints")).await?;
    let service = SessionService::new(graph, Arc::new(conversations), Arc::new(checkpoints));

    let id = ConversationId::from(cli.conversation.clone());
    info!(conversation = %id, offline = cli.offline, "session ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // A suspension left over from a previous run must be settled before
    // new messages are accepted.
    if let Some(checkpoint) = service.checkpoints().load(&id).await? {
        println!("A booking from a previous session is awaiting your approval.");
        let pending = TurnResult::NeedsApproval {
            action: checkpoint.pending.action.clone(),
            summary: checkpoint.pending.summary.clone(),
            args: checkpoint.pending.args.clone(),
        };
        settle_turn(&service, &id, pending, &mut lines).await?;
    }

    println!("Tripflow travel planner. Empty line or Ctrl-D exits.");
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            break;
        }

        match service.submit(&id, text).await {
            Ok(result) => settle_turn(&service, &id, result, &mut lines).await?,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
