//! # Execution Bridge
//!
//! Runs test plans in an external JVM worker:
//!
//! 1. a unique temporary directory is created for the result file
//! 2. the artifacts needed by the plan and the engine are materialized in the
//!    shared cache and turned into a class path
//! 3. the request (engine + plan) is serialized as a tagged YAML document
//! 4. the worker is launched, fed the document and waited for, while its
//!    output is relayed to ours
//! 5. the result file, if any, is parsed into [`TestPlanStats`]
//!
//! The temporary directory is removed on every exit path. Calls block the
//! current thread until the worker exits; independent calls may run in
//! parallel from different threads.

pub mod artifacts;
pub mod serializer;
pub mod worker;

use std::path::Path;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::defaults;
use crate::elements::test_plan::DslTestPlan;
use crate::error::Result;
use crate::stats::TestPlanStats;
use crate::utils::generate_execution_id;
use serializer::{BridgedObject, Field, WireValue};
use worker::{run_worker, BridgeCommand};

/// The document sent to the worker for a run.
pub struct TestPlanExecution<'a> {
    engine: &'a dyn BridgedObject,
    test_plan: &'a DslTestPlan,
}

impl<'a> TestPlanExecution<'a> {
    pub fn new(engine: &'a dyn BridgedObject, test_plan: &'a DslTestPlan) -> Self {
        Self { engine, test_plan }
    }
}

impl<'a> BridgedObject for TestPlanExecution<'a> {
    fn type_name(&self) -> &'static str {
        "TestPlanExecution"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field {
                name: "engine",
                value: WireValue::Node(self.engine),
            },
            Field {
                name: "testPlan",
                value: WireValue::Node(self.test_plan),
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BridgeService {
    config: BridgeConfig,
}

impl BridgeService {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(BridgeConfig::from_env())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Append JVM arguments to the configured ones.
    pub fn jvm_args(mut self, args: &[String]) -> Self {
        self.config.jvm_args.extend_from_slice(args);
        self
    }

    /// Run `test_plan` in `engine` and parse the statistics it reports.
    ///
    /// `Ok(None)` means the worker succeeded without writing a result file.
    pub fn run_test_plan_in_engine(
        &self,
        test_plan: &DslTestPlan,
        engine: &dyn BridgedObject,
    ) -> Result<Option<TestPlanStats>> {
        let execution_id = generate_execution_id();
        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("{}-{}-", defaults::TEMP_DIR_PREFIX, execution_id))
            .tempdir()?;
        debug!("Execution {} using {}", execution_id, temp_dir.path().display());

        let result_file = temp_dir.path().join(defaults::RESULT_FILE);
        let execution = TestPlanExecution::new(engine, test_plan);
        self.run_bridge_command(BridgeCommand::Run, &execution, Some(&result_file))?;

        if !result_file.exists() {
            info!("Worker finished without reporting statistics");
            return Ok(None);
        }
        let stats = TestPlanStats::from_file(&result_file)?;
        // temp_dir is removed on drop, including on the early returns above
        Ok(Some(stats))
    }

    pub fn save_test_plan_as_jmx(&self, test_plan: &DslTestPlan, path: &Path) -> Result<()> {
        self.run_bridge_command(BridgeCommand::SaveAsJmx, test_plan, Some(path))
    }

    /// Blocks until the viewer window is closed.
    pub fn show_test_element_in_gui(&self, element: &dyn BridgedObject) -> Result<()> {
        self.run_bridge_command(BridgeCommand::ShowInGui, element, None)
    }

    fn run_bridge_command(
        &self,
        command: BridgeCommand,
        request: &dyn BridgedObject,
        output: Option<&Path>,
    ) -> Result<()> {
        let classpath = self.config.artifact_cache().resolve_classpath(request)?;
        let mut document = Vec::new();
        serializer::write_yaml(request, &mut document)?;
        info!("Running bridge command '{}'", command);
        run_worker(&self.config, &classpath, command, output, &document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::EmbeddedJmeterEngine;
    use serializer::to_yaml_string;

    #[test]
    fn test_execution_document_shape() {
        let plan = DslTestPlan::new(crate::children![]).unwrap();
        let engine = EmbeddedJmeterEngine::new();
        let yaml = to_yaml_string(&TestPlanExecution::new(&engine, &plan)).unwrap();
        assert!(yaml.starts_with("!testPlanExecution"));
        let engine_pos = yaml.find("engine: !embeddedJmeterEngine").unwrap();
        let plan_pos = yaml.find("testPlan: !testPlan").unwrap();
        assert!(engine_pos < plan_pos);
    }

    #[test]
    fn test_jvm_args_are_appended() {
        let config = BridgeConfig::from_lookup(|_| None).with_jvm_args(vec!["-Xmx1g".to_string()]);
        let service = BridgeService::new(config).jvm_args(&["-ea".to_string()]);
        assert_eq!(service.config().jvm_args, vec!["-Xmx1g", "-ea"]);
    }
}
