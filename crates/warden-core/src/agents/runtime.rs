//! Agent runtime: the stage trait, the cycle driver and the scheduler
//!
//! An agent implements the five stages of [`Agent`]. The runtime owns the
//! order they run in ([`run_cycle`]) and when they run ([`AgentRunner`]):
//!
//! - `start()` runs one cycle immediately, then one per interval in a
//!   background task
//! - a failing or panicking cycle is logged and the next tick proceeds
//! - cycles of one agent never overlap; a cycle that outlasts the interval
//!   pushes the next tick a full interval past its completion, so missed
//!   ticks are dropped rather than fired late
//! - `stop()` only prevents future ticks, an in-flight cycle runs to
//!   completion
//!
//! No timeout is enforced on stages: a hung external call stalls that
//! agent's cycle (and therefore its later ticks) until it returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

use super::types::{
    high_severity_count, Action, AgentState, AgentStatus, Cycle, DecisionLog, DecisionMetadata,
    Insight,
};

/// Default time between cycles (1 hour)
pub const DEFAULT_RUN_INTERVAL: Duration = Duration::from_millis(3_600_000);

/// The five pluggable stages of an autonomous agent
///
/// `analyze` and `decide` are synchronous: they are pure computation over
/// what `observe` returned.
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    /// Payload of the observed state
    type Observation: Serialize + Send + Sync;
    /// Insight kinds this agent detects
    type Insight: Serialize + Send + Sync;
    /// Actions this agent can take
    type Action: Serialize + Send + Sync;

    /// Registry name, also recorded as the decision log's agent type
    fn name(&self) -> &str;

    /// Gather the current state
    async fn observe(&self) -> Result<AgentState<Self::Observation>>;

    /// Detect patterns, anomalies and risks in the observed state
    fn analyze(&self, state: &AgentState<Self::Observation>) -> Result<Vec<Insight<Self::Insight>>>;

    /// Turn insights into actions
    fn decide(&self, insights: &[Insight<Self::Insight>]) -> Result<Vec<Action<Self::Action>>>;

    /// Execute actions
    async fn act(&self, actions: &[Action<Self::Action>]) -> Result<()>;

    /// Record outcomes for future tuning
    async fn learn(
        &self,
        cycle: &Cycle<'_, Self::Observation, Self::Insight, Self::Action>,
    ) -> Result<()>;

    /// Persist the audit record of a cycle
    ///
    /// Best-effort: implementations report failures through tracing and
    /// never return them, so an audit failure cannot undo or abort a cycle.
    async fn log_decision(
        &self,
        log: &DecisionLog<'_, Self::Observation, Self::Insight, Self::Action>,
    );

    /// Hook invoked after the runtime has logged a failed cycle
    async fn handle_error(&self, _error: &Error) {}
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutcome {
    pub insights_count: usize,
    pub actions_count: usize,
    pub high_severity_count: usize,
    pub reasoning: String,
    pub execution_time_ms: u64,
}

/// Human-readable summary of a cycle's reasoning
pub fn summarize<K, P>(insights: &[Insight<K>], actions: &[Action<P>]) -> String {
    if insights.is_empty() {
        return "No significant patterns detected. No action required.".to_string();
    }

    let high = high_severity_count(insights);
    if high == 0 && actions.is_empty() {
        return format!(
            "Analyzed {} patterns; all within normal parameters.",
            insights.len()
        );
    }

    format!(
        "Detected {} high-priority patterns. Recommended {} actions.",
        high,
        actions.len()
    )
}

/// Run one observe → analyze → decide → act → learn → log pass
///
/// The first stage error aborts the cycle and is returned; `log_decision` is
/// only reached when every stage succeeded.
pub async fn run_cycle<A: Agent>(agent: &A) -> Result<CycleOutcome> {
    let started = Instant::now();

    let state = agent.observe().await?;
    let insights = agent.analyze(&state)?;
    let actions = agent.decide(&insights)?;

    agent.act(&actions).await?;

    agent
        .learn(&Cycle {
            state: &state,
            insights: &insights,
            actions: &actions,
        })
        .await?;

    let reasoning = summarize(&insights, &actions);
    let execution_time_ms = started.elapsed().as_millis() as u64;

    let log = DecisionLog {
        agent_type: agent.name(),
        observation: &state,
        insights: &insights,
        actions: &actions,
        reasoning: reasoning.clone(),
        timestamp: Utc::now(),
        metadata: DecisionMetadata { execution_time_ms },
    };
    agent.log_decision(&log).await;

    Ok(CycleOutcome {
        insights_count: insights.len(),
        actions_count: actions.len(),
        high_severity_count: high_severity_count(&insights),
        reasoning,
        execution_time_ms,
    })
}

/// Object-safe lifecycle handle, so agents of different types can share a
/// registry
#[async_trait]
pub trait ManagedAgent: Send + Sync {
    fn name(&self) -> &str;

    /// Run the first cycle and schedule the rest
    async fn start(&self) -> Result<()>;

    /// Cancel future cycles; does not wait for an in-flight cycle
    async fn stop(&self) -> Result<()>;

    /// Run a single cycle now, outside the schedule
    async fn run_once(&self) -> Result<CycleOutcome>;

    fn status(&self) -> AgentStatus;
}

#[derive(Debug, Default)]
struct RunStats {
    completed: u64,
    failed: u64,
    last_cycle_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

struct RunnerShared {
    running: AtomicBool,
    /// Present while running; dropping or signalling it ends the loop
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    /// Held for the duration of each cycle
    cycle_lock: tokio::sync::Mutex<()>,
    stats: Mutex<RunStats>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Schedules an [`Agent`] on a fixed interval
pub struct AgentRunner<A: Agent> {
    name: String,
    agent: Arc<A>,
    interval: Duration,
    shared: Arc<RunnerShared>,
}

impl<A: Agent> AgentRunner<A> {
    /// Create a runner with the default one-hour interval
    pub fn new(agent: A) -> Self {
        Self::with_interval(agent, DEFAULT_RUN_INTERVAL)
    }

    /// Create a runner with a custom interval
    pub fn with_interval(agent: A, interval: Duration) -> Self {
        let name = agent.name().to_string();
        let interval = if interval.is_zero() {
            warn!(agent = %name, "Zero run interval requested, using default");
            DEFAULT_RUN_INTERVAL
        } else {
            interval
        };

        Self {
            name,
            agent: Arc::new(agent),
            interval,
            shared: Arc::new(RunnerShared {
                running: AtomicBool::new(false),
                shutdown: Mutex::new(None),
                cycle_lock: tokio::sync::Mutex::new(()),
                stats: Mutex::new(RunStats::default()),
            }),
        }
    }

    /// The scheduled agent
    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Run one cycle with failure containment and bookkeeping
    async fn execute(agent: &Arc<A>, shared: &RunnerShared) -> Result<CycleOutcome> {
        let _cycle = shared.cycle_lock.lock().await;
        let name = agent.name().to_string();

        // A separate task turns a panicking stage into a JoinError
        let task_agent = Arc::clone(agent);
        let task = tokio::spawn(async move { run_cycle(task_agent.as_ref()).await });
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Agent(format!("cycle aborted: {}", e))),
        };

        match &result {
            Ok(outcome) => {
                debug!(
                    agent = %name,
                    insights = outcome.insights_count,
                    actions = outcome.actions_count,
                    elapsed_ms = outcome.execution_time_ms,
                    "Agent cycle complete"
                );
                let mut stats = lock(&shared.stats);
                stats.completed += 1;
                stats.last_cycle_at = Some(Utc::now());
            }
            Err(e) => {
                error!(agent = %name, error = %e, "Agent cycle failed");
                {
                    let mut stats = lock(&shared.stats);
                    stats.failed += 1;
                    stats.last_cycle_at = Some(Utc::now());
                    stats.last_error = Some(e.to_string());
                }
                agent.handle_error(e).await;
            }
        }

        result
    }

    async fn run_loop(
        agent: Arc<A>,
        shared: Arc<RunnerShared>,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The immediate first tick belongs to the cycle start() already ran
        ticker.tick().await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            if *shutdown.borrow() {
                break;
            }

            let started = tokio::time::Instant::now();
            // Errors are already logged and recorded
            let _ = Self::execute(&agent, &shared).await;

            // An overrun would otherwise leave a late tick ready to fire at once
            if started.elapsed() >= period {
                ticker.reset();
            }
        }

        debug!(agent = agent.name(), "Agent loop exited");
    }
}

#[async_trait]
impl<A: Agent> ManagedAgent for AgentRunner<A> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<()> {
        let shutdown = {
            let mut slot = lock(&self.shared.shutdown);
            if self.shared.running.load(Ordering::SeqCst) {
                warn!(agent = %self.name, "Agent is already running");
                return Ok(());
            }
            let (tx, rx) = watch::channel(false);
            *slot = Some(tx);
            self.shared.running.store(true, Ordering::SeqCst);
            rx
        };

        info!(
            agent = %self.name,
            interval_ms = self.interval.as_millis() as u64,
            "Agent started"
        );

        // First cycle runs before start() returns; its failure is contained
        let _ = Self::execute(&self.agent, &self.shared).await;

        tokio::spawn(Self::run_loop(
            Arc::clone(&self.agent),
            Arc::clone(&self.shared),
            self.interval,
            shutdown,
        ));

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let sender = {
            let mut slot = lock(&self.shared.shutdown);
            self.shared.running.store(false, Ordering::SeqCst);
            slot.take()
        };

        if let Some(tx) = sender {
            tx.send_replace(true);
            info!(agent = %self.name, "Agent stopped");
        }

        Ok(())
    }

    async fn run_once(&self) -> Result<CycleOutcome> {
        Self::execute(&self.agent, &self.shared).await
    }

    fn status(&self) -> AgentStatus {
        let stats = lock(&self.shared.stats);
        AgentStatus {
            name: self.name.clone(),
            running: self.is_running(),
            interval_ms: self.interval.as_millis() as u64,
            cycles_completed: stats.completed,
            cycles_failed: stats.failed,
            last_cycle_at: stats.last_cycle_at,
            last_error: stats.last_error.clone(),
        }
    }
}
