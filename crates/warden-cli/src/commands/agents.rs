//! Agent supervisor and control commands
//!
//! This is the composition root: it wires the store, the guardian thresholds
//! and the environment settings into one orchestrator.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use warden_core::db::Database;
use warden_core::{
    AgentOrchestrator, AgentRunner, AgentsConfig, BudgetGuardian, GuardianConfig, ManagedAgent,
};

/// Build the orchestrator with every agent this binary knows about
pub fn build_orchestrator(
    db: Database,
    config_path: Option<&Path>,
    agents_config: &AgentsConfig,
) -> Result<AgentOrchestrator> {
    let guardian_config =
        GuardianConfig::load(config_path).context("Failed to load guardian config")?;

    let guardian = BudgetGuardian::from_store(Arc::new(db)).with_config(guardian_config);
    let runner: Arc<dyn ManagedAgent> = Arc::new(AgentRunner::with_interval(
        guardian,
        agents_config.guardian_interval,
    ));

    AgentOrchestrator::new(vec![runner]).context("Failed to register agents")
}

pub async fn cmd_run(db: Database, config_path: Option<&Path>, force: bool) -> Result<()> {
    let agents_config = AgentsConfig::from_env();
    let orchestrator = build_orchestrator(db, config_path, &agents_config)?;

    if !orchestrator.auto_start(&agents_config).await {
        if !force {
            println!("Auto-start is disabled. Set WARDEN_AUTO_START_AGENTS=true or pass --force.");
            return Ok(());
        }
        orchestrator.start_all().await;
    }

    println!(
        "Supervising {} agent(s): {}",
        orchestrator.list_agents().len(),
        orchestrator.list_agents().join(", ")
    );
    println!("   Press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutdown requested");
    orchestrator.stop_all().await;
    print_status(&orchestrator);

    Ok(())
}

pub fn cmd_agents_list(db: Database, config_path: Option<&Path>) -> Result<()> {
    let orchestrator = build_orchestrator(db, config_path, &AgentsConfig::from_env())?;

    println!();
    println!("Registered Agents");
    println!("   ─────────────────────────────");
    for name in orchestrator.list_agents() {
        println!("   {}", name);
    }

    Ok(())
}

/// Runtime status of a freshly built orchestrator
///
/// Agents live inside `warden run`; a separate invocation only sees its own
/// stopped runners plus the configured interval.
pub fn cmd_agents_status(db: Database, config_path: Option<&Path>) -> Result<()> {
    let orchestrator = build_orchestrator(db, config_path, &AgentsConfig::from_env())?;
    print_status(&orchestrator);
    Ok(())
}

pub async fn cmd_agents_cycle(db: Database, config_path: Option<&Path>, name: &str) -> Result<()> {
    let orchestrator = build_orchestrator(db, config_path, &AgentsConfig::from_env())?;

    let Some(agent) = orchestrator.get_agent(name) else {
        bail!(
            "Agent \"{}\" not found. Known agents: {}",
            name,
            orchestrator.list_agents().join(", ")
        );
    };

    let outcome = agent
        .run_once()
        .await
        .with_context(|| format!("{} cycle failed", name))?;

    println!();
    println!("{} cycle complete", name);
    println!("   ─────────────────────────────");
    println!("   Insights:      {}", outcome.insights_count);
    println!("   High severity: {}", outcome.high_severity_count);
    println!("   Actions:       {}", outcome.actions_count);
    println!("   Took:          {} ms", outcome.execution_time_ms);
    println!("   {}", outcome.reasoning);

    Ok(())
}

fn print_status(orchestrator: &AgentOrchestrator) {
    println!();
    println!("Agent Status");
    println!("   ─────────────────────────────────────────────────────────────");

    for status in orchestrator.status() {
        let state = if status.running { "running" } else { "stopped" };
        println!(
            "   {:<16} │ {:<7} │ every {}s │ {} ok, {} failed",
            status.name,
            state,
            status.interval_ms / 1000,
            status.cycles_completed,
            status.cycles_failed
        );
        if let Some(at) = status.last_cycle_at {
            println!(
                "   {:<16} │ last cycle {}",
                "",
                at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        if let Some(err) = &status.last_error {
            println!("   {:<16} │ last error: {}", "", err);
        }
    }
}
