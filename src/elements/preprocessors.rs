use super::{Category, TestElement, MULTI_LEVEL};
use crate::bridge::serializer::{BridgedObject, Field};

/// Script run before each sampler in scope (Groovy unless another JSR-223
/// language is set).
#[derive(Debug)]
pub struct DslJsr223PreProcessor {
    name: Option<String>,
    script: String,
    language: Option<String>,
}

impl DslJsr223PreProcessor {
    pub fn new(name: Option<&str>, script: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            script: script.to_string(),
            language: None,
        }
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }
}

impl BridgedObject for DslJsr223PreProcessor {
    fn type_name(&self) -> &'static str {
        "DslJsr223PreProcessor"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", self.name.as_ref()),
            Field::new("script", &self.script),
            Field::new("language", self.language.as_ref()),
        ]
    }
}

impl TestElement for DslJsr223PreProcessor {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::to_yaml_string;

    #[test]
    fn test_jsr223_tag_and_script() {
        let pre = DslJsr223PreProcessor::new(None, "vars.put('A', '1')").language("groovy");
        let yaml = to_yaml_string(&pre).unwrap();
        assert!(yaml.starts_with("!jsr223PreProcessor"));
        assert!(yaml.contains("language: groovy"));
    }
}
