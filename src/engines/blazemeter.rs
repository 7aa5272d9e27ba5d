//! BlazeMeter cloud engine.
//!
//! The plan is uploaded as a BlazeMeter test and run there; statistics are
//! collected from the BlazeMeter API once the run ends. Thread group
//! settings can be overridden for the whole test with [`total_users`],
//! [`ramp_up_for`], [`iterations`] and [`hold_for`].
//!
//! [`total_users`]: BlazeMeterEngine::total_users
//! [`ramp_up_for`]: BlazeMeterEngine::ramp_up_for
//! [`iterations`]: BlazeMeterEngine::iterations
//! [`hold_for`]: BlazeMeterEngine::hold_for

use std::time::Duration;

use super::JmeterEngine;
use crate::bridge::artifacts::{Component, BLAZEMETER};
use crate::bridge::serializer::{BridgedObject, Field, Namespace, WireValue};
use crate::defaults;

const NAMESPACE: Namespace = Namespace::Extension("BlazeMeter");

#[derive(Debug, Clone)]
pub struct BlazeMeterEngine {
    auth_token: String,
    test_name: String,
    project_id: Option<i64>,
    test_timeout: Option<Duration>,
    available_data_timeout: Option<Duration>,
    total_users: Option<u32>,
    ramp_up: Option<Duration>,
    iterations: Option<u32>,
    hold_for: Option<Duration>,
    threads_per_engine: Option<u32>,
    use_debug_run: Option<bool>,
    locations: Vec<Location>,
    jvm_args: Vec<String>,
}

impl BlazeMeterEngine {
    /// `auth_token` has the form `<key id>:<secret>`.
    pub fn new(auth_token: &str) -> Self {
        Self {
            auth_token: auth_token.to_string(),
            test_name: defaults::CLOUD_TEST_NAME.to_string(),
            project_id: None,
            test_timeout: None,
            available_data_timeout: None,
            total_users: None,
            ramp_up: None,
            iterations: None,
            hold_for: None,
            threads_per_engine: None,
            use_debug_run: None,
            locations: Vec::new(),
            jvm_args: Vec::new(),
        }
    }

    pub fn test_name(mut self, name: &str) -> Self {
        self.test_name = name.to_string();
        self
    }

    pub fn project_id(mut self, id: i64) -> Self {
        self.project_id = Some(id);
        self
    }

    /// Time to wait for the test to finish before failing the run.
    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = Some(timeout);
        self
    }

    /// Time to wait for statistics to become available after the test ends.
    pub fn available_data_timeout(mut self, timeout: Duration) -> Self {
        self.available_data_timeout = Some(timeout);
        self
    }

    pub fn total_users(mut self, users: u32) -> Self {
        self.total_users = Some(users);
        self
    }

    pub fn ramp_up_for(mut self, ramp_up: Duration) -> Self {
        self.ramp_up = Some(ramp_up);
        self
    }

    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn hold_for(mut self, hold: Duration) -> Self {
        self.hold_for = Some(hold);
        self
    }

    pub fn threads_per_engine(mut self, threads: u32) -> Self {
        self.threads_per_engine = Some(threads);
        self
    }

    /// Add a location, with the share of load it receives relative to the
    /// other locations.
    pub fn location(mut self, location: &str, weight: u32) -> Self {
        self.locations.push(Location {
            location: location.to_string(),
            weight,
        });
        self
    }

    /// Run as a debug test: limited load, detailed logs.
    pub fn use_debug_run(mut self, enable: bool) -> Self {
        self.use_debug_run = Some(enable);
        self
    }

    pub fn with_jvm_args(mut self, args: Vec<String>) -> Self {
        self.jvm_args = args;
        self
    }
}

impl BridgedObject for BlazeMeterEngine {
    fn type_name(&self) -> &'static str {
        "BlazeMeterEngine"
    }

    fn namespace(&self) -> Namespace {
        NAMESPACE
    }

    fn component(&self) -> &'static Component {
        &BLAZEMETER
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("authToken", &self.auth_token),
            Field::new("testName", &self.test_name),
            Field::new("projectId", self.project_id),
            Field::new("testTimeout", self.test_timeout),
            Field::new("availableDataTimeout", self.available_data_timeout),
            Field::new("totalUsers", self.total_users),
            Field::new("rampUp", self.ramp_up),
            Field::new("iterations", self.iterations),
            Field::new("holdFor", self.hold_for),
            Field::new("threadsPerEngine", self.threads_per_engine),
            Field::new("useDebugRun", self.use_debug_run),
            Field {
                name: "__propsList",
                value: WireValue::Nodes(
                    self.locations
                        .iter()
                        .map(|l| l as &dyn BridgedObject)
                        .collect(),
                ),
            },
        ]
    }
}

impl JmeterEngine for BlazeMeterEngine {
    fn jvm_args(&self) -> &[String] {
        &self.jvm_args
    }
}

#[derive(Debug, Clone)]
struct Location {
    location: String,
    weight: u32,
}

impl BridgedObject for Location {
    fn type_name(&self) -> &'static str {
        "BlazeMeterEngine+DslLocation"
    }

    fn namespace(&self) -> Namespace {
        NAMESPACE
    }

    fn component(&self) -> &'static Component {
        &BLAZEMETER
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("location", &self.location),
            Field::new("weight", self.weight),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::artifacts::required_components;
    use crate::bridge::serializer::{tag_name, to_wire_document, to_yaml_string};
    use serde_yaml::Value;

    #[test]
    fn test_blazemeter_tag_and_defaults() {
        let engine = BlazeMeterEngine::new("key:secret");
        assert_eq!(tag_name(&engine), "blazemeter.BlazeMeterEngine");
        let doc = to_wire_document(&engine);
        let body = match &doc {
            Value::Tagged(tagged) => tagged.value.as_mapping().unwrap(),
            other => panic!("unexpected document {:?}", other),
        };
        assert_eq!(body.get("authToken").and_then(Value::as_str), Some("key:secret"));
        assert_eq!(body.get("testName").and_then(Value::as_str), Some("jmeter-rust-dsl"));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_blazemeter_locations_and_durations() {
        let engine = BlazeMeterEngine::new("key:secret")
            .test_timeout(Duration::from_secs(20 * 60))
            .location("us-east-1", 70)
            .location("eu-west-1", 30);
        let yaml = to_yaml_string(&engine).unwrap();
        assert!(yaml.contains("testTimeout: PT20M"));
        assert!(yaml.contains("_propsList"));
        assert_eq!(yaml.matches("!blazemeter.BlazeMeterEngine+DslLocation").count(), 2);
        assert!(yaml.contains("weight: 70"));
    }

    #[test]
    fn test_blazemeter_needs_its_component() {
        let names: Vec<_> = required_components(&BlazeMeterEngine::new("k:s"))
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["blazemeter"]);
    }
}
