//! Thread group with a staged concurrency profile.
//!
//! ```ignore
//! let tg = DslThreadGroup::new(Some("load"))
//!     .ramp_to(10, Duration::from_secs(10))?
//!     .hold_for(Duration::from_secs(10))?
//!     .ramp_to(0, Duration::from_secs(5))?
//!     .children(children![http_sampler("http://localhost")])?;
//! ```

use std::time::Duration;

use super::{Category, Children, TestElement, TEST_PLAN_CHILD};
use crate::bridge::serializer::{BridgedObject, Field, WireValue};
use crate::error::Result;
use crate::stages::{Param, Stage, StageProfile};

#[derive(Debug)]
pub struct DslThreadGroup {
    name: Option<String>,
    profile: StageProfile,
    children: Children,
}

impl DslThreadGroup {
    /// Thread group with no stages yet.
    pub fn new(name: Option<&str>) -> Self {
        Self::with_profile(name, StageProfile::new())
    }

    /// `threads` threads started at once, each running `iterations` times.
    pub fn with_iterations(
        name: Option<&str>,
        threads: impl Into<Param<u32>>,
        iterations: impl Into<Param<u32>>,
        children: Vec<Box<dyn TestElement>>,
    ) -> Result<Self> {
        Self::with_profile(name, StageProfile::fixed_iterations(threads, iterations)).children(children)
    }

    /// `threads` threads started at once, running for `duration`.
    pub fn with_duration(
        name: Option<&str>,
        threads: impl Into<Param<u32>>,
        duration: impl Into<Param<Duration>>,
        children: Vec<Box<dyn TestElement>>,
    ) -> Result<Self> {
        Self::with_profile(name, StageProfile::fixed_duration(threads, duration)).children(children)
    }

    fn with_profile(name: Option<&str>, profile: StageProfile) -> Self {
        Self {
            name: name.map(str::to_string),
            profile,
            children: Children::new("DslThreadGroup", Category::ThreadGroupChild),
        }
    }

    pub fn ramp_to(
        mut self,
        threads: impl Into<Param<u32>>,
        duration: impl Into<Param<Duration>>,
    ) -> Result<Self> {
        self.profile.ramp_to(threads, duration)?;
        Ok(self)
    }

    pub fn hold_for(mut self, duration: impl Into<Param<Duration>>) -> Result<Self> {
        self.profile.hold_for(duration)?;
        Ok(self)
    }

    pub fn hold_iterating(mut self, iterations: impl Into<Param<u32>>) -> Result<Self> {
        self.profile.hold_iterating(iterations)?;
        Ok(self)
    }

    /// Shorthand for [`ramp_to`](Self::ramp_to) followed by [`hold_for`](Self::hold_for).
    pub fn ramp_to_and_hold(
        self,
        threads: impl Into<Param<u32>>,
        ramp: impl Into<Param<Duration>>,
        hold: impl Into<Param<Duration>>,
    ) -> Result<Self> {
        self.ramp_to(threads, ramp)?.hold_for(hold)
    }

    pub fn children(mut self, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        self.children.extend(children)?;
        Ok(self)
    }

    pub fn stages(&self) -> Result<&[Stage]> {
        self.profile.compile()
    }
}

impl BridgedObject for DslThreadGroup {
    fn type_name(&self) -> &'static str {
        "DslThreadGroup"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", self.name.as_ref()),
            Field {
                name: "__propsList",
                value: WireValue::Nodes(
                    self.profile
                        .stages()
                        .iter()
                        .map(|s| s as &dyn BridgedObject)
                        .collect(),
                ),
            },
            Field {
                name: "children",
                value: self.children.wire(),
            },
        ]
    }
}

impl TestElement for DslThreadGroup {
    fn categories(&self) -> &'static [Category] {
        TEST_PLAN_CHILD
    }
}
