//! # JMeter DSL
//!
//! A fluent API for describing load tests as JMeter test plans, and a bridge
//! that runs them in a JVM worker process.
//!
//! ## How a run works
//!
//! The test plan is an in-memory tree of elements. Nothing in this crate
//! executes load itself; running a plan means:
//!
//! 1. serializing the plan, together with the engine that should run it, as
//!    a tagged YAML document
//! 2. launching the JVM bridge with the artifacts the document needs on its
//!    class path, and feeding it the document on stdin
//! 3. reading back the statistics document the worker writes
//!
//! ## Architecture Overview
//!
//! - `elements`: the capability-typed test plan tree
//! - `stages`: thread group concurrency profiles (ramp and hold stages)
//! - `codec`: duration and enumeration wire formats
//! - `bridge`: serializer, artifact cache and worker process
//! - `engines`: where a plan runs (embedded, BlazeMeter, Azure)
//! - `stats`: the statistics a run reports
//! - `config`: executable, cache and artifact locations
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use jmeter_dsl::children;
//! use jmeter_dsl::dsl::*;
//! use std::time::Duration;
//!
//! fn main() -> jmeter_dsl::Result<()> {
//!     let stats = test_plan(children![
//!         thread_group(2, 10, children![
//!             http_sampler("http://my.service").children(children![
//!                 response_assertion().contains_substrings(&["OK"]),
//!             ])?,
//!         ])?,
//!     ])?
//!     .run()?
//!     .expect("embedded engine reports statistics");
//!
//!     assert!(stats.overall.sample_time_percentile99() < Duration::from_secs(5));
//!     Ok(())
//! }
//! ```

/// Execution bridge
///
/// Serializes requests, materializes runtime artifacts and drives the JVM
/// worker process.
pub mod bridge;

/// Command-line interface for quick plans
pub mod cli;

pub mod codec;

/// Bridge configuration resolved from setters, environment and defaults
pub mod config;

/// Free functions building test elements, the entry point of the DSL
pub mod dsl;

pub mod elements;
pub mod engines;
pub mod error;
pub mod logging;
pub mod stages;
pub mod stats;
pub mod utils;

pub use bridge::BridgeService;
pub use config::BridgeConfig;
pub use elements::test_plan::DslTestPlan;
pub use elements::TestElement;
pub use engines::{AzureEngine, BlazeMeterEngine, EmbeddedJmeterEngine, JmeterEngine};
pub use error::{DslError, Result};
pub use stats::{StatsSummary, TestPlanStats};

/// Crate version, reported to the engine as part of the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// Names and locations shared with the JVM bridge. Changing any of the
/// bridge related values requires a matching bridge artifact.
pub mod defaults {
    use std::time::Duration;

    /// Entry point of the bridge artifact.
    pub const MAIN_CLASS: &str = "us.abstracta.jmeter.javadsl.bridge.BridgeService";

    /// System property the bridge reads the user agent from.
    pub const USER_AGENT_PROPERTY: &str = "us.abstracta.jmeterdsl.userAgent";

    pub const USER_AGENT_PRODUCT: &str = "jmeter-rust-dsl";

    /// Test name used by cloud engines unless one is given.
    pub const CLOUD_TEST_NAME: &str = "jmeter-rust-dsl";

    /// Statistics document written by the worker, inside the run's temporary
    /// directory.
    pub const RESULT_FILE: &str = "stats.yml";

    pub const TEMP_DIR_PREFIX: &str = "jmeter-dsl";

    /// Cache root, relative to the user's home directory.
    pub const CACHE_ROOT_DIR: &str = ".jmeter-dsl";

    /// Artifact cache, relative to the cache root.
    pub const JARS_DIR: &str = "jars";

    /// Bundled artifacts, relative to the executable's directory.
    pub const ARTIFACTS_DIR: &str = "artifacts";

    /// Engine logging configuration, probed in the working directory.
    pub const LOG_CONFIG_FILE: &str = "log4j2.xml";

    pub const JAVA_EXECUTABLE: &str = "java";

    /// Threads used by CLI plans.
    pub const THREADS: u32 = 1;

    /// Iterations per thread used by CLI plans without `--duration`.
    pub const ITERATIONS: u32 = 1;

    /// Response time simulated by CLI dummy samplers.
    pub const DUMMY_RESPONSE_TIME: Duration = Duration::from_millis(100);
}
