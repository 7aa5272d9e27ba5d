//! # Command-Line Interface
//!
//! Builds a one-thread-group plan from flags and runs it, saves it as JMX or
//! prints the document the worker would receive:
//!
//! ```text
//! jmeter-dsl run --threads 10 --ramp-up 5s --duration 1m --url http://localhost:8080
//! jmeter-dsl save-jmx --dummy OK plan.jmx
//! jmeter-dsl print --threads 2 --iterations 5 --url http://localhost
//! jmeter-dsl clear-cache
//! ```

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{split_jvm_args, BridgeConfig};
use crate::dsl::{dummy_sampler, http_sampler, thread_group_named};
use crate::elements::test_plan::DslTestPlan;
use crate::elements::thread_group::DslThreadGroup;
use crate::elements::TestElement;
use crate::error::Result;

/// JMeter DSL - run quick load tests through the JMeter bridge
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Java executable used to launch the bridge
    #[clap(long, global = true)]
    pub java: Option<PathBuf>,

    /// Extra JVM arguments, e.g. "-Xmx2g -Dfoo=bar"
    #[clap(long, global = true, allow_hyphen_values = true)]
    pub jvm_args: Option<String>,

    /// Verbose output
    #[clap(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the plan in the embedded engine and print its statistics
    Run {
        #[clap(flatten)]
        plan: PlanArgs,

        /// Also write the statistics to this file (JSON format)
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Save the plan as a JMX file
    SaveJmx {
        #[clap(flatten)]
        plan: PlanArgs,

        /// Destination JMX file
        path: PathBuf,
    },

    /// Print the document sent to the worker, without launching it
    Print {
        #[clap(flatten)]
        plan: PlanArgs,
    },

    /// Delete the cached bridge artifacts
    ClearCache,
}

#[derive(clap::Args, Debug, Clone)]
#[clap(group(ArgGroup::new("sampler").required(true).args(["url", "dummy"])))]
pub struct PlanArgs {
    /// Number of threads
    #[clap(short = 't', long, default_value_t = crate::defaults::THREADS)]
    pub threads: u32,

    /// Iterations per thread (ignored if duration is specified)
    #[clap(short = 'i', long, conflicts_with = "duration")]
    pub iterations: Option<u32>,

    /// Time to keep all threads running (e.g. 30s, 5m)
    #[clap(short = 'd', long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Time to start all threads, instead of starting them at once
    #[clap(long, value_parser = parse_duration)]
    pub ramp_up: Option<Duration>,

    /// URL requested by an HTTP sampler
    #[clap(long)]
    pub url: Option<String>,

    /// Response body of a dummy sampler, no network involved
    #[clap(long)]
    pub dummy: Option<String>,
}

impl PlanArgs {
    pub fn build_plan(&self) -> Result<DslTestPlan> {
        let sampler: Box<dyn TestElement> = match (&self.url, &self.dummy) {
            (Some(url), _) => Box::new(http_sampler(url)),
            (None, body) => Box::new(
                dummy_sampler(body.as_deref().unwrap_or("OK"))
                    .response_time(crate::defaults::DUMMY_RESPONSE_TIME)
                    .simulate_response_time(true),
            ),
        };
        let thread_group = self.thread_group()?.children(vec![sampler])?;
        DslTestPlan::new(vec![Box::new(thread_group)])
    }

    fn thread_group(&self) -> Result<DslThreadGroup> {
        let iterations = self.iterations.unwrap_or(crate::defaults::ITERATIONS);
        let tg = thread_group_named(None);
        match (self.ramp_up, self.duration) {
            (Some(ramp_up), Some(duration)) => tg.ramp_to(self.threads, ramp_up)?.hold_for(duration),
            (Some(ramp_up), None) => tg.ramp_to(self.threads, ramp_up)?.hold_iterating(iterations),
            (None, Some(duration)) => tg.ramp_to_and_hold(self.threads, Duration::ZERO, duration),
            (None, None) => tg.ramp_to(self.threads, Duration::ZERO)?.hold_iterating(iterations),
        }
    }
}

impl Args {
    /// Bridge configuration from the environment, overridden by flags.
    pub fn bridge_config(&self) -> BridgeConfig {
        let mut config = BridgeConfig::from_env();
        if let Some(java) = &self.java {
            config = config.with_java(java.clone());
        }
        if let Some(args) = &self.jvm_args {
            config = config.with_jvm_args(split_jvm_args(args));
        }
        config
    }
}

/// Parse durations like `10s`, `5m`, `1h` or `500ms`; bare numbers are seconds.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else {
        (s, "s")
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number in duration: {}", num_str))?;
    if !num.is_finite() {
        return Err(format!("Invalid number in duration: {}", num_str));
    }
    if num < 0.0 {
        return Err(format!("Duration cannot be negative: {}", s));
    }

    let secs = match unit {
        "ms" => num / 1000.0,
        "s" => num,
        "m" => num * 60.0,
        "h" => num * 3600.0,
        _ => return Err(format!("Invalid duration unit: {}", unit)),
    };

    Duration::try_from_secs_f64(secs).map_err(|e| format!("Invalid duration {}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::StageKind;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("invalid").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("NaN").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("-inf").is_err());
        assert!(parse_duration("1e30s").is_err());
    }

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("jmeter-dsl").chain(args.iter().copied()))
    }

    fn plan_args(args: &[&str]) -> PlanArgs {
        match parse(args).unwrap().command {
            Command::Run { plan, .. } | Command::Print { plan } | Command::SaveJmx { plan, .. } => plan,
            Command::ClearCache => panic!("no plan arguments"),
        }
    }

    #[test]
    fn test_sampler_is_required() {
        assert!(parse(&["run", "--threads", "2"]).is_err());
        assert!(parse(&["run", "--url", "http://a", "--dummy", "x"]).is_err());
        assert!(parse(&["clear-cache"]).is_ok());
    }

    #[test]
    fn test_iterations_conflict_with_duration() {
        assert!(parse(&["print", "--dummy", "x", "--iterations", "3", "--duration", "1m"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["run", "--dummy", "x", "--jvm-args", "-Xmx1g -ea", "-v"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.jvm_args.as_deref(), Some("-Xmx1g -ea"));
    }

    #[test]
    fn test_iteration_plan_starts_threads_at_once() {
        let plan = plan_args(&["print", "--threads", "3", "--iterations", "4", "--dummy", "x"]);
        let tg = plan.thread_group().unwrap();
        let stages = tg.stages().unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].thread_count().value(), Some(&3));
        assert_eq!(stages[0].duration().and_then(|d| d.value()), Some(&Duration::ZERO));
        assert!(matches!(stages[1].kind(), StageKind::HoldIterating { .. }));
    }

    #[test]
    fn test_ramp_up_and_duration_plan() {
        let plan = plan_args(&[
            "run", "--threads", "10", "--ramp-up", "5s", "--duration", "1m", "--url", "http://a",
        ]);
        let tg = plan.thread_group().unwrap();
        let stages = tg.stages().unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].duration().and_then(|d| d.value()), Some(&Duration::from_secs(5)));
        assert!(matches!(stages[1].kind(), StageKind::Hold { .. }));
        assert!(plan.build_plan().is_ok());
    }
}
