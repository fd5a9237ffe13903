//! Registry and lifecycle control for every agent in the process
//!
//! The composition root builds one [`AgentOrchestrator`] from the agents it
//! wants and hands it to whatever needs control (the CLI supervisor, the
//! admin commands). Agents are registered at construction; names are unique.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::AgentsConfig;
use crate::error::{Error, Result};

use super::runtime::ManagedAgent;
use super::types::AgentStatus;

/// Lifecycle operation fanned out across agents
#[derive(Debug, Clone, Copy)]
enum Lifecycle {
    Start,
    Stop,
    Restart,
}

impl Lifecycle {
    fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Start => "start",
            Lifecycle::Stop => "stop",
            Lifecycle::Restart => "restart",
        }
    }

    async fn apply(self, agent: &dyn ManagedAgent) -> Result<()> {
        match self {
            Lifecycle::Start => agent.start().await,
            Lifecycle::Stop => agent.stop().await,
            Lifecycle::Restart => {
                agent.stop().await?;
                agent.start().await
            }
        }
    }
}

/// Owns the set of running agents
pub struct AgentOrchestrator {
    agents: Vec<Arc<dyn ManagedAgent>>,
}

impl AgentOrchestrator {
    /// Register agents; a repeated name is rejected
    pub fn new(agents: Vec<Arc<dyn ManagedAgent>>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name().to_string()) {
                return Err(Error::DuplicateAgent(agent.name().to_string()));
            }
        }

        info!(count = agents.len(), "Agent orchestrator initialized");
        Ok(Self { agents })
    }

    /// Registered agent names, in registration order
    pub fn list_agents(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name().to_string()).collect()
    }

    /// Look up an agent by name
    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn ManagedAgent>> {
        self.agents.iter().find(|a| a.name() == name).cloned()
    }

    fn require(&self, name: &str) -> Result<Arc<dyn ManagedAgent>> {
        let agent = self.get_agent(name);
        agent.ok_or_else(|| Error::AgentNotFound(name.to_string()))
    }

    /// Start every agent concurrently
    ///
    /// Returns once each agent's first cycle has finished. Failures are
    /// logged and do not prevent other agents from starting.
    pub async fn start_all(&self) {
        info!("Starting all agents");
        self.fan_out(Lifecycle::Start).await;
    }

    /// Stop every agent concurrently
    pub async fn stop_all(&self) {
        info!("Stopping all agents");
        self.fan_out(Lifecycle::Stop).await;
    }

    /// Stop then start every agent
    pub async fn restart_all(&self) {
        info!("Restarting all agents");
        self.fan_out(Lifecycle::Restart).await;
    }

    pub async fn start_agent(&self, name: &str) -> Result<()> {
        self.require(name)?.start().await
    }

    pub async fn stop_agent(&self, name: &str) -> Result<()> {
        self.require(name)?.stop().await
    }

    pub async fn restart_agent(&self, name: &str) -> Result<()> {
        Lifecycle::Restart.apply(self.require(name)?.as_ref()).await
    }

    /// Per-agent scheduling snapshot
    pub fn status(&self) -> Vec<AgentStatus> {
        self.agents.iter().map(|a| a.status()).collect()
    }

    /// Start everything if the environment asks for it
    ///
    /// Returns whether agents were started.
    pub async fn auto_start(&self, config: &AgentsConfig) -> bool {
        if !config.auto_start {
            return false;
        }

        info!("Auto-starting agents");
        self.start_all().await;
        true
    }

    async fn fan_out(&self, op: Lifecycle) {
        let mut tasks = JoinSet::new();
        for agent in &self.agents {
            let agent = Arc::clone(agent);
            tasks.spawn(async move {
                let result = op.apply(agent.as_ref()).await;
                (agent.name().to_string(), result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((name, Err(e))) => {
                    warn!(agent = %name, error = %e, "Failed to {} agent", op.as_str());
                }
                Err(e) => {
                    error!(error = %e, "Agent {} task aborted", op.as_str());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::agents::runtime::{AgentRunner, CycleOutcome};
    use crate::test_utils::ScriptedAgent;

    const TICK: Duration = Duration::from_secs(60);

    async fn settle() {
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
    }

    fn managed(name: &str) -> (Arc<AgentRunner<ScriptedAgent>>, Arc<dyn ManagedAgent>) {
        let runner = Arc::new(AgentRunner::with_interval(ScriptedAgent::new(name), TICK));
        let handle: Arc<dyn ManagedAgent> = runner.clone();
        (runner, handle)
    }

    /// Agent whose start always fails
    struct BrokenAgent;

    #[async_trait]
    impl ManagedAgent for BrokenAgent {
        fn name(&self) -> &str {
            "Broken"
        }

        async fn start(&self) -> Result<()> {
            Err(Error::Agent("cannot start".to_string()))
        }

        async fn stop(&self) -> Result<()> {
            Ok(())
        }

        async fn run_once(&self) -> Result<CycleOutcome> {
            Err(Error::Agent("cannot run".to_string()))
        }

        fn status(&self) -> AgentStatus {
            AgentStatus {
                name: "Broken".to_string(),
                running: false,
                interval_ms: 0,
                cycles_completed: 0,
                cycles_failed: 0,
                last_cycle_at: None,
                last_error: None,
            }
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let (_, a) = managed("Same");
        let (_, b) = managed("Same");

        let result = AgentOrchestrator::new(vec![a, b]);
        assert!(matches!(result, Err(Error::DuplicateAgent(name)) if name == "Same"));
    }

    #[test]
    fn test_list_and_get() {
        let (_, a) = managed("Alpha");
        let (_, b) = managed("Beta");
        let orchestrator = AgentOrchestrator::new(vec![a, b]).unwrap();

        assert_eq!(orchestrator.list_agents(), vec!["Alpha", "Beta"]);
        assert!(orchestrator.get_agent("Beta").is_some());
        assert!(orchestrator.get_agent("Gamma").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_unknown_agent_leaves_others_running() {
        let (alpha, alpha_handle) = managed("Alpha");
        let (beta, beta_handle) = managed("Beta");
        let orchestrator = AgentOrchestrator::new(vec![alpha_handle, beta_handle]).unwrap();

        orchestrator.start_all().await;
        orchestrator.stop_agent("Beta").await.unwrap();
        settle().await;
        assert!(alpha.is_running());
        assert!(!beta.is_running());

        let result = orchestrator.stop_agent("Nonexistent").await;
        match result {
            Err(e @ Error::AgentNotFound(_)) => {
                assert_eq!(e.to_string(), "Agent \"Nonexistent\" not found");
            }
            other => panic!("expected AgentNotFound, got {:?}", other.err()),
        }

        // Neither agent changed state
        let status = orchestrator.status();
        assert!(status[0].running);
        assert!(!status[1].running);

        tokio::time::advance(TICK).await;
        settle().await;
        assert_eq!(alpha.agent().observe_calls(), 2);
        assert_eq!(beta.agent().observe_calls(), 1);

        orchestrator.stop_all().await;
    }

    #[tokio::test]
    async fn test_start_unknown_agent() {
        let (_, handle) = managed("Alpha");
        let orchestrator = AgentOrchestrator::new(vec![handle]).unwrap();

        assert!(matches!(
            orchestrator.start_agent("Nope").await,
            Err(Error::AgentNotFound(_))
        ));
        assert!(matches!(
            orchestrator.restart_agent("Nope").await,
            Err(Error::AgentNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_start_does_not_block_others() {
        let (runner, handle) = managed("Alpha");
        let orchestrator = AgentOrchestrator::new(vec![Arc::new(BrokenAgent), handle]).unwrap();

        orchestrator.start_all().await;

        assert!(runner.is_running());
        assert_eq!(runner.agent().observe_calls(), 1);

        let status = orchestrator.status();
        assert_eq!(status.len(), 2);
        assert!(!status[0].running);
        assert!(status[1].running);

        orchestrator.stop_all().await;
        assert!(!runner.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_single_agent() {
        let (alpha, a) = managed("Alpha");
        let (beta, b) = managed("Beta");
        let orchestrator = AgentOrchestrator::new(vec![a, b]).unwrap();

        orchestrator.start_agent("Beta").await.unwrap();
        assert!(beta.is_running());
        assert!(!alpha.is_running());

        orchestrator.stop_agent("Beta").await.unwrap();
        assert!(!beta.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_runs_a_fresh_first_cycle() {
        let (runner, handle) = managed("Alpha");
        let orchestrator = AgentOrchestrator::new(vec![handle]).unwrap();

        orchestrator.start_agent("Alpha").await.unwrap();
        assert_eq!(runner.agent().observe_calls(), 1);

        orchestrator.restart_agent("Alpha").await.unwrap();
        assert!(runner.is_running());
        assert_eq!(runner.agent().observe_calls(), 2);

        orchestrator.restart_all().await;
        assert_eq!(runner.agent().observe_calls(), 3);

        orchestrator.stop_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_start_follows_config() {
        let (runner, handle) = managed("Alpha");
        let orchestrator = AgentOrchestrator::new(vec![handle]).unwrap();

        let off = AgentsConfig::default();
        assert!(!orchestrator.auto_start(&off).await);
        assert!(!runner.is_running());

        let on = AgentsConfig {
            auto_start: true,
            ..AgentsConfig::default()
        };
        assert!(orchestrator.auto_start(&on).await);
        assert!(runner.is_running());

        orchestrator.stop_all().await;
    }
}
