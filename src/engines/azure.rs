//! Azure Load Testing engine.

use std::time::Duration;

use super::JmeterEngine;
use crate::bridge::artifacts::{Component, AZURE};
use crate::bridge::serializer::{BridgedObject, Field, Namespace};
use crate::defaults;

/// Runs the plan as an Azure Load Testing test.
///
/// Credentials have the form `<tenant id>:<client id>:<client secret>`.
#[derive(Debug, Clone)]
pub struct AzureEngine {
    credentials: String,
    subscription_id: Option<String>,
    resource_group_name: Option<String>,
    location: Option<String>,
    test_resource_name: Option<String>,
    test_name: String,
    test_timeout: Option<Duration>,
    engines: Option<u32>,
    jvm_args: Vec<String>,
}

impl AzureEngine {
    pub fn new(credentials: &str) -> Self {
        Self {
            credentials: credentials.to_string(),
            subscription_id: None,
            resource_group_name: None,
            location: None,
            test_resource_name: None,
            test_name: defaults::CLOUD_TEST_NAME.to_string(),
            test_timeout: None,
            engines: None,
            jvm_args: Vec::new(),
        }
    }

    pub fn from_client_secret(tenant_id: &str, client_id: &str, client_secret: &str) -> Self {
        Self::new(&format!("{}:{}:{}", tenant_id, client_id, client_secret))
    }

    /// Defaults to the first subscription the credentials can see.
    pub fn subscription_id(mut self, id: &str) -> Self {
        self.subscription_id = Some(id.to_string());
        self
    }

    pub fn resource_group_name(mut self, name: &str) -> Self {
        self.resource_group_name = Some(name.to_string());
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn test_resource_name(mut self, name: &str) -> Self {
        self.test_resource_name = Some(name.to_string());
        self
    }

    pub fn test_name(mut self, name: &str) -> Self {
        self.test_name = name.to_string();
        self
    }

    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = Some(timeout);
        self
    }

    /// Number of load generating instances.
    pub fn engines(mut self, count: u32) -> Self {
        self.engines = Some(count);
        self
    }

    pub fn with_jvm_args(mut self, args: Vec<String>) -> Self {
        self.jvm_args = args;
        self
    }
}

impl BridgedObject for AzureEngine {
    fn type_name(&self) -> &'static str {
        "AzureEngine"
    }

    fn namespace(&self) -> Namespace {
        Namespace::Extension("Azure")
    }

    fn component(&self) -> &'static Component {
        &AZURE
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("credentials", &self.credentials),
            Field::new("subscriptionId", self.subscription_id.as_deref()),
            Field::new("resourceGroupName", self.resource_group_name.as_deref()),
            Field::new("location", self.location.as_deref()),
            Field::new("testResourceName", self.test_resource_name.as_deref()),
            Field::new("testName", &self.test_name),
            Field::new("testTimeout", self.test_timeout),
            Field::new("engines", self.engines),
        ]
    }
}

impl JmeterEngine for AzureEngine {
    fn jvm_args(&self) -> &[String] {
        &self.jvm_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::{tag_name, to_wire_document, to_yaml_string};
    use serde_yaml::Value;

    #[test]
    fn test_client_secret_credentials() {
        let engine = AzureEngine::from_client_secret("tenant", "client", "secret");
        assert_eq!(tag_name(&engine), "azure.AzureEngine");
        let doc = to_wire_document(&engine);
        let body = match &doc {
            Value::Tagged(tagged) => tagged.value.as_mapping().unwrap(),
            other => panic!("unexpected document {:?}", other),
        };
        assert_eq!(
            body.get("credentials").and_then(Value::as_str),
            Some("tenant:client:secret")
        );
        assert!(body.get("subscriptionId").is_none());
    }

    #[test]
    fn test_optional_settings() {
        let engine = AzureEngine::new("t:c:s")
            .location("eastus")
            .engines(2)
            .test_timeout(Duration::from_secs(3600));
        let yaml = to_yaml_string(&engine).unwrap();
        assert!(yaml.contains("location: eastus"));
        assert!(yaml.contains("engines: 2"));
        assert!(yaml.contains("testTimeout: PT1H"));
    }
}
