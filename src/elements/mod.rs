//! # Test Elements
//!
//! The test plan is a tree of [`TestElement`]s. Every element declares the
//! categories it belongs to, and every container declares the single category
//! it accepts. Children are checked when they are added, so a plan that was
//! built successfully is always well formed:
//!
//! ```text
//! DslTestPlan          accepts TestPlanChild
//! └─ DslThreadGroup    is TestPlanChild, accepts ThreadGroupChild
//!    └─ DslHttpSampler is ThreadGroupChild, accepts SamplerChild
//!       └─ DslResponseAssertion (multi-level: any of the three)
//! ```
//!
//! Elements are plain values assembled with consuming builder methods; once
//! they are placed in a container they are not mutated again.

use std::fmt;
use std::time::Duration;

use crate::bridge::serializer::{AsBridged, BridgedObject, WireEnum, WireValue};
use crate::bridge::BridgeService;
use crate::error::{DslError, Result};
use crate::stages::Param;

pub mod assertions;
pub mod configs;
pub mod controllers;
pub mod extractors;
pub mod http;
pub mod listeners;
pub mod preprocessors;
pub mod samplers;
pub mod test_plan;
pub mod thread_group;
pub mod timers;

/// Position in the tree an element may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TestPlanChild,
    ThreadGroupChild,
    SamplerChild,
}

pub const TEST_PLAN_CHILD: &[Category] = &[Category::TestPlanChild];
pub const THREAD_GROUP_CHILD: &[Category] = &[Category::ThreadGroupChild];
/// Elements that apply at any level: timers, assertions, configs, listeners...
pub const MULTI_LEVEL: &[Category] = &[
    Category::TestPlanChild,
    Category::ThreadGroupChild,
    Category::SamplerChild,
];

pub trait TestElement: BridgedObject + AsBridged + fmt::Debug {
    fn categories(&self) -> &'static [Category];

    /// Open the element in the engine's viewer. Blocks until it is closed.
    fn show_in_gui(&self) -> Result<()> {
        BridgeService::from_env().show_test_element_in_gui(self.as_bridged())
    }
}

/// Ordered children of a container, restricted to one category.
#[derive(Debug)]
pub struct Children {
    parent: &'static str,
    accepts: Category,
    items: Vec<Box<dyn TestElement>>,
}

impl Children {
    pub fn new(parent: &'static str, accepts: Category) -> Self {
        Self {
            parent,
            accepts,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, child: Box<dyn TestElement>) -> Result<()> {
        if !child.categories().contains(&self.accepts) {
            return Err(DslError::UnsupportedChild {
                parent: self.parent,
                child: child.type_name(),
                accepted: self.accepts,
            });
        }
        self.items.push(child);
        Ok(())
    }

    pub fn extend<I>(&mut self, children: I) -> Result<()>
    where
        I: IntoIterator<Item = Box<dyn TestElement>>,
    {
        for child in children {
            self.push(child)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TestElement> {
        self.items.iter().map(|c| c.as_ref())
    }

    pub fn wire(&self) -> WireValue<'_> {
        WireValue::Nodes(self.items.iter().map(|c| c.as_bridged()).collect())
    }
}

/// Which samples a scoped element (assertion, extractor) looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    AllSamples,
    MainSample,
    SubSamples,
}

impl WireEnum for Scope {
    fn identifier(&self) -> &'static str {
        match self {
            Scope::AllSamples => "AllSamples",
            Scope::MainSample => "MainSample",
            Scope::SubSamples => "SubSamples",
        }
    }
}

/// Durations some elements take as engine text: whole milliseconds, or an
/// expression passed through untouched.
pub(crate) fn millis_text(param: Param<Duration>) -> String {
    match param {
        Param::Value(d) => d.as_millis().to_string(),
        Param::Expression(e) => e,
    }
}

/// Box a list of elements for a container.
///
/// ```ignore
/// let plan = test_plan(children![
///     http_headers().header("X-Test", "1"),
///     thread_group(1, 1, children![dummy_sampler("ok")])?,
/// ])?;
/// ```
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::<::std::boxed::Box<dyn $crate::elements::TestElement>>::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$(
            ::std::boxed::Box::new($child) as ::std::boxed::Box<dyn $crate::elements::TestElement>
        ),+]
    };
}
