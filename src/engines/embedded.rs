use super::JmeterEngine;
use crate::bridge::serializer::{BridgedObject, Field};

/// Runs the plan inside the worker process itself.
#[derive(Debug, Default, Clone)]
pub struct EmbeddedJmeterEngine {
    jvm_args: Vec<String>,
}

impl EmbeddedJmeterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// e.g. `["-Xmx4g"]` for memory hungry plans.
    pub fn with_jvm_args(mut self, args: Vec<String>) -> Self {
        self.jvm_args = args;
        self
    }
}

impl BridgedObject for EmbeddedJmeterEngine {
    fn type_name(&self) -> &'static str {
        "EmbeddedJmeterEngine"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![]
    }
}

impl JmeterEngine for EmbeddedJmeterEngine {
    fn jvm_args(&self) -> &[String] {
        &self.jvm_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::{tag_name, to_yaml_string};

    #[test]
    fn test_jvm_args_are_not_serialized() {
        let engine = EmbeddedJmeterEngine::new().with_jvm_args(vec!["-Xmx4g".to_string()]);
        assert_eq!(tag_name(&engine), "embeddedJmeterEngine");
        assert!(!to_yaml_string(&engine).unwrap().contains("Xmx"));
        assert_eq!(engine.jvm_args(), ["-Xmx4g".to_string()]);
    }
}
