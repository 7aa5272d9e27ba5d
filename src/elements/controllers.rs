//! Logic controllers: containers that group thread group children.

use super::{Category, Children, TestElement, THREAD_GROUP_CHILD};
use crate::bridge::serializer::{BridgedObject, Field};
use crate::error::Result;

fn controller_children(parent: &'static str, children: Vec<Box<dyn TestElement>>) -> Result<Children> {
    let mut container = Children::new(parent, Category::ThreadGroupChild);
    container.extend(children)?;
    Ok(container)
}

/// Groups elements without affecting execution; useful to scope timers or
/// assertions to a subset of samplers.
#[derive(Debug)]
pub struct DslSimpleController {
    name: Option<String>,
    children: Children,
}

impl DslSimpleController {
    pub fn new(name: Option<&str>, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        Ok(Self {
            name: name.map(str::to_string),
            children: controller_children("DslSimpleController", children)?,
        })
    }
}

impl BridgedObject for DslSimpleController {
    fn type_name(&self) -> &'static str {
        "DslSimpleController"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", self.name.as_ref()),
            Field {
                name: "children",
                value: self.children.wire(),
            },
        ]
    }
}

impl TestElement for DslSimpleController {
    fn categories(&self) -> &'static [Category] {
        THREAD_GROUP_CHILD
    }
}

/// Measures the time of all contained samplers as a single transaction.
#[derive(Debug)]
pub struct DslTransactionController {
    name: String,
    include_timers_and_processors_time: bool,
    generate_parent_sample: bool,
    children: Children,
}

impl DslTransactionController {
    pub fn new(name: &str, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            include_timers_and_processors_time: false,
            generate_parent_sample: false,
            children: controller_children("DslTransactionController", children)?,
        })
    }

    pub fn include_timers_and_processors_time(mut self, enable: bool) -> Self {
        self.include_timers_and_processors_time = enable;
        self
    }

    /// Report the transaction as a parent sample of its samplers instead of
    /// an additional sibling sample.
    pub fn generate_parent_sample(mut self, enable: bool) -> Self {
        self.generate_parent_sample = enable;
        self
    }
}

impl BridgedObject for DslTransactionController {
    fn type_name(&self) -> &'static str {
        "DslTransactionController"
    }

    fn tag(&self) -> Option<&'static str> {
        Some("transaction")
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", &self.name),
            Field::new(
                "includeTimersAndProcessorsTime",
                self.include_timers_and_processors_time,
            ),
            Field::new("generateParentSample", self.generate_parent_sample),
            Field {
                name: "children",
                value: self.children.wire(),
            },
        ]
    }
}

impl TestElement for DslTransactionController {
    fn categories(&self) -> &'static [Category] {
        THREAD_GROUP_CHILD
    }
}

/// Repeats its children a fixed number of times (literal or expression).
#[derive(Debug)]
pub struct ForLoopController {
    name: Option<String>,
    count: String,
    children: Children,
}

impl ForLoopController {
    pub fn new(name: Option<&str>, count: &str, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        Ok(Self {
            name: name.map(str::to_string),
            count: count.to_string(),
            children: controller_children("ForLoopController", children)?,
        })
    }
}

impl BridgedObject for ForLoopController {
    fn type_name(&self) -> &'static str {
        "ForLoopController"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", self.name.as_ref()),
            Field::new("count", &self.count),
            Field {
                name: "children",
                value: self.children.wire(),
            },
        ]
    }
}

impl TestElement for ForLoopController {
    fn categories(&self) -> &'static [Category] {
        THREAD_GROUP_CHILD
    }
}
