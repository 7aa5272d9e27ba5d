//! # Engines
//!
//! Where a test plan runs. Every engine is serialized into the run request
//! with its own settings; the JVM arguments it carries only affect the local
//! worker process and are never sent.

use std::fmt;

use crate::bridge::serializer::{AsBridged, BridgedObject};
use crate::bridge::BridgeService;
use crate::elements::test_plan::DslTestPlan;
use crate::error::Result;
use crate::stats::TestPlanStats;

pub mod azure;
pub mod blazemeter;
pub mod embedded;

pub use azure::AzureEngine;
pub use blazemeter::BlazeMeterEngine;
pub use embedded::EmbeddedJmeterEngine;

pub trait JmeterEngine: BridgedObject + AsBridged + fmt::Debug {
    /// Extra JVM arguments for the worker process.
    fn jvm_args(&self) -> &[String];

    fn run(&self, test_plan: &DslTestPlan) -> Result<Option<TestPlanStats>> {
        BridgeService::from_env()
            .jvm_args(self.jvm_args())
            .run_test_plan_in_engine(test_plan, self.as_bridged())
    }
}
