//! The dialogue graph and its executor.
//!
//! ```text
//!            ┌──────────────┐
//!   input ──▶│     chat     │──▶ END
//!            └──┬────────▲──┘
//!       ┌───────┘        └────────┐
//!       ▼                         │ prepared prompt
//! ┌──────────────┐   ┌────────────┴─┐
//! │ subject_info │   │  rag_review  │
//! └──────────────┘   └──────────────┘
//! ```
//!
//! Specialists never answer on their own: they return to `chat` with a
//! prepared prompt, and `chat` makes the turn's single model call.
//!
//! Executor rules, checked after every handler step:
//!
//! - a handler may not both write output and name a non-END target
//! - the named target must be wired from the current node (END included)
//! - the same target requested twice while output is still empty is a cycle
//! - a turn may reach END only with output written and no prepared prompt left
//! - a finished turn has appended exactly one `(input, output)` pair to history
//!
//! A failed turn leaves the state as it was before the turn, minus the reply.

use reelchat_core::error::{Error, GraphError, Result};
use reelchat_core::message::Message;
use reelchat_core::provider::Provider;
use reelchat_core::retriever::Retriever;
use reelchat_core::state::{ConversationState, Target};
use reelchat_knowledge::SubjectTable;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::handlers::{ChatHandler, Handler, RagReviewHandler, SubjectInfoHandler};
use crate::intent::IntentClassifier;
use crate::settings::DialogueSettings;

/// Hard bound on handler invocations in one turn.
pub const MAX_STEPS: usize = 8;

static GRAPH: OnceLock<Arc<DialogueGraph>> = OnceLock::new();

/// Install the process-wide graph. Fails if one is already installed.
pub fn init(graph: DialogueGraph) -> std::result::Result<Arc<DialogueGraph>, GraphError> {
    let graph = Arc::new(graph);
    GRAPH
        .set(Arc::clone(&graph))
        .map_err(|_| GraphError::AlreadyInitialized)?;
    info!(entry = %graph.entry(), nodes = graph.handlers.len(), "Dialogue graph initialized");
    Ok(graph)
}

/// The process-wide graph, if [`init`] has run.
pub fn global() -> Option<Arc<DialogueGraph>> {
    GRAPH.get().cloned()
}

pub struct GraphBuilder {
    entry: Target,
    handlers: Vec<Arc<dyn Handler>>,
    edges: Vec<(Target, Target)>,
}

impl GraphBuilder {
    pub fn new(entry: Target) -> Self {
        Self {
            entry,
            handlers: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn edge(mut self, from: Target, to: Target) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> std::result::Result<DialogueGraph, GraphError> {
        if self.entry.is_end() {
            return Err(GraphError::InvalidNode(Target::End));
        }

        let mut handlers: HashMap<Target, Arc<dyn Handler>> = HashMap::new();
        for handler in self.handlers {
            let target = handler.target();
            if target.is_end() {
                return Err(GraphError::InvalidNode(target));
            }
            if handlers.insert(target, handler).is_some() {
                return Err(GraphError::DuplicateHandler(target));
            }
        }

        if !handlers.contains_key(&self.entry) {
            return Err(GraphError::MissingHandler(self.entry));
        }

        let mut edges: HashMap<Target, HashSet<Target>> = HashMap::new();
        for (from, to) in self.edges {
            if from.is_end() {
                return Err(GraphError::InvalidNode(from));
            }
            for node in [from, to] {
                if !node.is_end() && !handlers.contains_key(&node) {
                    return Err(GraphError::MissingHandler(node));
                }
            }
            edges.entry(from).or_default().insert(to);
        }

        Ok(DialogueGraph {
            entry: self.entry,
            handlers,
            edges,
        })
    }
}

pub struct DialogueGraph {
    entry: Target,
    handlers: HashMap<Target, Arc<dyn Handler>>,
    edges: HashMap<Target, HashSet<Target>>,
}

impl std::fmt::Debug for DialogueGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut nodes: Vec<&str> = self.handlers.keys().map(|t| t.as_str()).collect();
        nodes.sort_unstable();
        f.debug_struct("DialogueGraph")
            .field("entry", &self.entry)
            .field("nodes", &nodes)
            .finish()
    }
}

impl DialogueGraph {
    /// The chat / subject_info / rag_review graph with explicit return edges.
    pub fn standard(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        subjects: Arc<SubjectTable>,
        settings: &DialogueSettings,
    ) -> std::result::Result<Self, GraphError> {
        let classifier = IntentClassifier::new(Arc::clone(&subjects), &settings.routing);

        GraphBuilder::new(Target::Chat)
            .handler(Arc::new(ChatHandler::new(provider, classifier, settings)))
            .handler(Arc::new(SubjectInfoHandler::new(
                subjects,
                settings.delegate_window,
            )))
            .handler(Arc::new(RagReviewHandler::new(
                retriever,
                settings.top_k,
                settings.delegate_window,
            )))
            .edge(Target::Chat, Target::SubjectInfo)
            .edge(Target::Chat, Target::RagReview)
            .edge(Target::Chat, Target::End)
            .edge(Target::SubjectInfo, Target::Chat)
            .edge(Target::RagReview, Target::Chat)
            .build()
    }

    pub fn entry(&self) -> Target {
        self.entry
    }

    pub fn is_wired(&self, from: Target, to: Target) -> bool {
        self.edges.get(&from).is_some_and(|targets| targets.contains(&to))
    }

    /// Start a new turn with `input` and run it to completion.
    pub async fn run_turn(&self, state: &mut ConversationState, input: &str) -> Result<()> {
        state.begin_turn(input);
        self.run(state).await
    }

    /// Run one turn on a state whose `input` is already set.
    ///
    /// Leftover routing fields from an earlier turn are discarded first. On
    /// success `output` holds the reply and history has grown by one pair.
    pub async fn run(&self, state: &mut ConversationState) -> Result<()> {
        let span = info_span!("turn", conversation = %state.id);

        async move {
            state.clear_turn();
            if state.input.trim().is_empty() {
                return Err(Error::MalformedState("input is empty".into()));
            }

            let checkpoint = state.history.clone();
            let result = self.drive(state, checkpoint.len()).await;
            if let Err(e) = &result {
                warn!(error = %e, "Turn failed");
                state.clear_turn();
                state.history = checkpoint;
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, state: &mut ConversationState, history_before: usize) -> Result<()> {
        let mut current = self.entry;
        let mut requested: HashSet<Target> = HashSet::new();

        for step in 1..=MAX_STEPS {
            let handler = self
                .handlers
                .get(&current)
                .ok_or(GraphError::MissingHandler(current))?;

            debug!(step, node = %current, "Running handler");
            handler.handle(state).await?;
            let next = state.take_next_target();

            if !state.output.is_empty() && !next.is_end() {
                return Err(GraphError::ConflictingHandoff(current).into());
            }
            if !self.is_wired(current, next) {
                return Err(GraphError::UnwiredRoute {
                    from: current,
                    to: next,
                }
                .into());
            }

            if next.is_end() {
                if state.prepared_prompt.is_some() {
                    return Err(GraphError::UnfinishedTurn(format!(
                        "{current} ended the turn with a prepared prompt pending"
                    ))
                    .into());
                }
                if state.output.is_empty() {
                    return Err(GraphError::UnfinishedTurn(format!(
                        "{current} ended the turn without output"
                    ))
                    .into());
                }
                if !recorded_one_turn(state, history_before) {
                    return Err(GraphError::UnfinishedTurn(format!(
                        "{current} ended the turn without recording exactly one exchange"
                    ))
                    .into());
                }
                info!(steps = step, "Turn complete");
                return Ok(());
            }

            if !requested.insert(next) {
                return Err(GraphError::RoutingCycle(next).into());
            }
            current = next;
        }

        Err(GraphError::StepLimit(MAX_STEPS).into())
    }
}

/// History grew by exactly one pair, and that pair is this turn's exchange.
fn recorded_one_turn(state: &ConversationState, history_before: usize) -> bool {
    let entries = state.history.entries();
    if entries.len() != history_before + 2 {
        return false;
    }
    entries[history_before..]
        == [
            Message::user(state.input.as_str()),
            Message::assistant(state.output.as_str()),
        ]
}
