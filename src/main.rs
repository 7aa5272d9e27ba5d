//! # JMeter DSL - Main Entry Point
//!
//! 1. **Initialize logging**: coloured console output, `RUST_LOG` aware
//! 2. **Parse arguments**: subcommand plus plan flags
//! 3. **Execute**: bridge calls block, so they run on the blocking pool while
//!    the main task watches for Ctrl-C
//!
//! The worker shares our process group and receives Ctrl-C itself; we only
//! report the interruption and wait for it to wind down.

use anyhow::{Context, Result};
use clap::Parser;
use jmeter_dsl::bridge::serializer::to_yaml_string;
use jmeter_dsl::cli::{Args, Command};
use jmeter_dsl::engines::{EmbeddedJmeterEngine, JmeterEngine};
use jmeter_dsl::utils::print_stats_table;
use jmeter_dsl::{logging, BridgeConfig, BridgeService, TestPlanStats};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = args.bridge_config();
    info!("Starting JMeter DSL {}", jmeter_dsl::VERSION);

    match args.command {
        Command::Run { plan, output } => {
            let plan = plan.build_plan().context("Invalid test plan")?;
            let stats = blocking(move || {
                let engine = EmbeddedJmeterEngine::new();
                BridgeService::new(config)
                    .jvm_args(engine.jvm_args())
                    .run_test_plan_in_engine(&plan, &engine)
                    .context("Test plan execution failed")
            })
            .await?;
            match stats {
                Some(stats) => {
                    print_stats_table(&stats);
                    if let Some(path) = output {
                        write_stats(&stats, &path)?;
                    }
                }
                None => warn!("The engine did not report any statistics"),
            }
        }
        Command::SaveJmx { plan, path } => {
            let plan = plan.build_plan().context("Invalid test plan")?;
            let target = path.clone();
            blocking(move || {
                BridgeService::new(config)
                    .save_test_plan_as_jmx(&plan, &target)
                    .with_context(|| format!("Failed to save plan as {}", target.display()))
            })
            .await?;
            info!("Test plan saved to {}", path.display());
        }
        Command::Print { plan } => {
            let plan = plan.build_plan().context("Invalid test plan")?;
            print!("{}", to_yaml_string(&plan).context("Failed to serialize test plan")?);
        }
        Command::ClearCache => clear_cache(&config)?,
    }

    Ok(())
}

/// Run a bridge call on the blocking pool, logging Ctrl-C while it runs.
async fn blocking<T, F>(call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(call);
    tokio::select! {
        joined = &mut task => joined.context("Bridge task panicked")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            warn!("Interrupted, waiting for the worker to stop...");
            task.await.context("Bridge task panicked")?
        }
    }
}

fn write_stats(stats: &TestPlanStats, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, stats)
        .with_context(|| format!("Failed to write statistics to {}", path.display()))?;
    info!("Statistics written to {}", path.display());
    Ok(())
}

fn clear_cache(config: &BridgeConfig) -> Result<()> {
    let cache = config.artifact_cache();
    let dir: PathBuf = cache.dir().to_path_buf();
    if cache
        .clear()
        .with_context(|| format!("Failed to remove {}", dir.display()))?
    {
        println!("Removed {}", dir.display());
    } else {
        println!("Nothing to remove at {}", dir.display());
    }
    Ok(())
}
