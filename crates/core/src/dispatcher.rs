//! Sub-Agent Dispatcher
//!
//! Resolves task types to agents through a fixed routing table, invokes the
//! selected agents concurrently and collects exactly one [`AgentResponse`]
//! per agent, whatever happens to the others.

use futures::FutureExt;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::agents::{
    Agent, AgentContext, ContentAgent, StoryAgent, TranslationAgent, VisualAidAgent,
    WorksheetAgent,
};
use crate::error::{Result, SahayakError};
use crate::settings::ORCHESTRATOR_VERSION;
use crate::task::{AgentKind, AgentResponse, TaskRequest, TaskType};
use crate::validation::validate_task_request;

/// Agent name used for responses produced by the dispatcher itself.
pub const ORCHESTRATOR_AGENT: &str = "orchestrator";

/// Task type to agent, in the order aggregated results are reported.
pub const ROUTING_TABLE: [(TaskType, AgentKind); 6] = [
    (TaskType::Story, AgentKind::StoryAgent),
    (TaskType::Worksheet, AgentKind::WorksheetAgent),
    (TaskType::VisualAid, AgentKind::VisualAidAgent),
    (TaskType::LessonPlan, AgentKind::ContentAgent),
    (TaskType::Qna, AgentKind::ContentAgent),
    (TaskType::Translation, AgentKind::TranslationAgent),
];

pub fn route(task: TaskType) -> AgentKind {
    ROUTING_TABLE
        .iter()
        .find(|(t, _)| *t == task)
        .map(|(_, agent)| *agent)
        .unwrap_or(AgentKind::StoryAgent)
}

fn routing_position(task: TaskType) -> usize {
    ROUTING_TABLE
        .iter()
        .position(|(t, _)| *t == task)
        .unwrap_or(ROUTING_TABLE.len())
}

/// One agent selected for a request, with the request it will receive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub task_type: TaskType,
    pub agent: AgentKind,
    pub request: TaskRequest,
}

/// The resolved set of agents for one caller request, in routing-table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchPlan {
    entries: Vec<PlanEntry>,
}

impl DispatchPlan {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn agent_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.agent.name()).collect()
    }
}

/// Aggregate result of dispatching a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    /// One response per plan entry, in plan order.
    pub responses: Vec<AgentResponse>,
    pub issued: usize,
}

impl DispatchOutcome {
    /// Complete once every issued invocation produced a response.
    pub fn is_complete(&self) -> bool {
        self.responses.len() == self.issued
    }

    pub fn all_succeeded(&self) -> bool {
        self.responses.iter().all(|r| r.success)
    }

    /// `(agent name, content)` for every successful response.
    pub fn successful_contents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.responses
            .iter()
            .filter(|r| r.success)
            .map(|r| (r.agent_type.as_str(), r.content.as_str()))
    }
}

/// Registry of agents plus the routing logic in front of them.
pub struct Dispatcher {
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
    supported_languages: Vec<String>,
}

impl Dispatcher {
    /// An empty dispatcher; agents are added with [`Dispatcher::register`].
    pub fn new(supported_languages: Vec<String>) -> Self {
        Self {
            agents: HashMap::new(),
            supported_languages,
        }
    }

    /// A dispatcher with every built-in agent registered.
    pub fn with_builtin_agents(ctx: AgentContext) -> Self {
        let mut dispatcher = Self::new(ctx.languages.supported_languages.clone());
        dispatcher.register(Arc::new(StoryAgent::new(ctx.clone())));
        dispatcher.register(Arc::new(WorksheetAgent::new(ctx.clone())));
        dispatcher.register(Arc::new(VisualAidAgent::new(ctx.clone())));
        dispatcher.register(Arc::new(ContentAgent::new(ctx.clone())));
        dispatcher.register(Arc::new(TranslationAgent::new(ctx)));
        dispatcher
    }

    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.kind(), agent);
    }

    pub fn registered_agents(&self) -> Vec<AgentKind> {
        let mut kinds: Vec<_> = self.agents.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Routes a single request to its agent.
    ///
    /// Never fails: unknown task types and invalid requests come back as a
    /// failed response from the orchestrator itself.
    #[instrument(skip_all, fields(task_type = %request.task_type))]
    pub async fn dispatch(&self, request: &TaskRequest) -> AgentResponse {
        let task = match request.kind() {
            Ok(task) => task,
            Err(e) => {
                warn!(error = %e, "Rejecting request");
                return AgentResponse::failed(ORCHESTRATOR_AGENT, e.to_string());
            }
        };
        if let Err(e) = validate_task_request(request, &self.supported_languages) {
            warn!(error = %e, "Request failed validation");
            return AgentResponse::failed(ORCHESTRATOR_AGENT, e.to_string());
        }
        let Some(agent) = self.agents.get(&route(task)) else {
            return AgentResponse::failed(
                ORCHESTRATOR_AGENT,
                SahayakError::UnregisteredAgent(route(task).name().to_string()).to_string(),
            );
        };

        stamp(invoke_guarded(agent.as_ref(), request).await)
    }

    /// Builds a plan that sends `request` to the agent of every task type in `task_types`.
    ///
    /// Entries follow the routing table; when two task types share an agent the
    /// first one wins. Each retargeted request is validated up front.
    ///
    /// Translation is only planned on its own. Next to other task types it is
    /// dropped, since every agent already writes in `request.language`.
    pub fn plan(&self, request: &TaskRequest, task_types: &[TaskType]) -> Result<DispatchPlan> {
        let mut ordered = task_types.to_vec();
        ordered.sort_by_key(|t| routing_position(*t));
        ordered.dedup();
        if ordered.len() > 1 {
            ordered.retain(|t| *t != TaskType::Translation);
        }

        let mut entries: Vec<PlanEntry> = Vec::new();
        for task_type in ordered {
            let agent = route(task_type);
            if entries.iter().any(|e| e.agent == agent) {
                continue;
            }
            if !self.agents.contains_key(&agent) {
                return Err(SahayakError::UnregisteredAgent(agent.name().to_string()));
            }
            let retargeted = request.retarget(task_type);
            validate_task_request(&retargeted, &self.supported_languages)?;
            entries.push(PlanEntry {
                task_type,
                agent,
                request: retargeted,
            });
        }
        Ok(DispatchPlan { entries })
    }

    /// Invokes every agent in `plan` concurrently and waits for all of them.
    ///
    /// Dropping the returned future cancels the in-flight invocations.
    #[instrument(skip_all, fields(agents = ?plan.agent_names()))]
    pub async fn dispatch_plan(&self, plan: &DispatchPlan) -> DispatchOutcome {
        let calls = plan.entries.iter().map(|entry| async move {
            match self.agents.get(&entry.agent) {
                Some(agent) => stamp(invoke_guarded(agent.as_ref(), &entry.request).await),
                None => AgentResponse::failed(
                    entry.agent.name(),
                    SahayakError::UnregisteredAgent(entry.agent.name().to_string()).to_string(),
                ),
            }
        });
        let responses = join_all(calls).await;

        let outcome = DispatchOutcome {
            responses,
            issued: plan.len(),
        };
        let failed = outcome.responses.iter().filter(|r| !r.success).count();
        info!(
            issued = outcome.issued,
            received = outcome.responses.len(),
            failed,
            "Dispatch finished"
        );
        if !outcome.is_complete() {
            warn!("Dispatch returned fewer responses than invocations issued");
        }
        outcome
    }
}

/// Runs one agent, turning a panic into a failed response.
async fn invoke_guarded(agent: &dyn Agent, request: &TaskRequest) -> AgentResponse {
    let kind = agent.kind();
    let call = async { agent.invoke(request).await };
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(response) => response,
        Err(_) => {
            warn!(agent = %kind, "Agent panicked");
            AgentResponse::failed(kind.name(), format!("{kind} panicked during generation"))
        }
    }
}

/// Marks a successful response as having passed through the dispatcher.
fn stamp(response: AgentResponse) -> AgentResponse {
    if !response.success {
        return response;
    }
    response
        .with_metadata("orchestrator_version", ORCHESTRATOR_VERSION)
        .with_metadata("request_validated", true)
        .with_metadata("routing_successful", true)
}
