use std::path::Path;

use super::{Category, Children, TestElement};
use crate::bridge::serializer::{BridgedObject, Field};
use crate::bridge::BridgeService;
use crate::engines::{EmbeddedJmeterEngine, JmeterEngine};
use crate::error::Result;
use crate::stats::TestPlanStats;

/// Root of every plan.
#[derive(Debug)]
pub struct DslTestPlan {
    children: Children,
}

impl DslTestPlan {
    pub fn new(children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        let mut plan = Self {
            children: Children::new("DslTestPlan", Category::TestPlanChild),
        };
        plan.children.extend(children)?;
        Ok(plan)
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Append more top level elements.
    pub fn with_children(mut self, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        self.children.extend(children)?;
        Ok(self)
    }

    /// Run the plan locally in an embedded engine.
    ///
    /// Returns `None` when the engine finished successfully without producing
    /// statistics.
    pub fn run(&self) -> Result<Option<TestPlanStats>> {
        EmbeddedJmeterEngine::new().run(self)
    }

    pub fn run_in(&self, engine: &dyn JmeterEngine) -> Result<Option<TestPlanStats>> {
        engine.run(self)
    }

    /// Save the plan in the engine's native (JMX) format.
    pub fn save_as_jmx(&self, path: impl AsRef<Path>) -> Result<()> {
        BridgeService::from_env().save_test_plan_as_jmx(self, path.as_ref())
    }
}

impl BridgedObject for DslTestPlan {
    fn type_name(&self) -> &'static str {
        "DslTestPlan"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field {
            name: "children",
            value: self.children.wire(),
        }]
    }
}

impl TestElement for DslTestPlan {
    fn categories(&self) -> &'static [Category] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::to_yaml_string;
    use crate::elements::samplers::DslDummySampler;
    use crate::elements::thread_group::DslThreadGroup;
    use crate::error::DslError;

    #[test]
    fn test_empty_plan_has_empty_body() {
        let plan = DslTestPlan::new(crate::children![]).unwrap();
        let yaml = to_yaml_string(&plan).unwrap();
        assert!(yaml.starts_with("!testPlan"));
        assert!(!yaml.contains("children"));
    }

    #[test]
    fn test_plan_rejects_samplers_at_top_level() {
        let err = DslTestPlan::new(crate::children![DslDummySampler::new("ok")]).unwrap_err();
        assert!(matches!(err, DslError::UnsupportedChild { .. }));
    }

    #[test]
    fn test_plan_serializes_thread_groups() {
        let plan = DslTestPlan::new(crate::children![DslThreadGroup::with_iterations(
            None,
            1,
            1,
            crate::children![DslDummySampler::new("ok")],
        )
        .unwrap()])
        .unwrap();
        let yaml = to_yaml_string(&plan).unwrap();
        assert!(yaml.contains("!threadGroup"));
        assert!(yaml.contains("!dummySampler"));
        assert!(yaml.contains("!rampTo"));
        assert!(yaml.contains("!holdIterating"));
    }
}
