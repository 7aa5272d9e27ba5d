use super::{Category, Scope, TestElement, MULTI_LEVEL};
use crate::bridge::serializer::{BridgedObject, Field, WireEnum, WireValue};

/// Part of the sample a regex extractor reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    ResponseBody,
    ResponseBodyUnescaped,
    ResponseBodyAsDocument,
    ResponseHeaders,
    RequestHeaders,
    RequestUrl,
    ResponseCode,
    ResponseMessage,
}

impl WireEnum for TargetField {
    fn identifier(&self) -> &'static str {
        match self {
            TargetField::ResponseBody => "ResponseBody",
            TargetField::ResponseBodyUnescaped => "ResponseBodyUnescaped",
            TargetField::ResponseBodyAsDocument => "ResponseBodyAsDocument",
            TargetField::ResponseHeaders => "ResponseHeaders",
            TargetField::RequestHeaders => "RequestHeaders",
            TargetField::RequestUrl => "RequestUrl",
            TargetField::ResponseCode => "ResponseCode",
            TargetField::ResponseMessage => "ResponseMessage",
        }
    }
}

/// Stores the first regex match of a sample field into a variable.
#[derive(Debug)]
pub struct DslRegexExtractor {
    scope: Option<Scope>,
    scope_variable: Option<String>,
    variable_name: String,
    match_number: Option<i32>,
    default_value: Option<String>,
    regex: String,
    template: Option<String>,
    field_to_check: Option<TargetField>,
}

impl DslRegexExtractor {
    pub fn new(variable_name: &str, regex: &str) -> Self {
        Self {
            scope: None,
            scope_variable: None,
            variable_name: variable_name.to_string(),
            match_number: None,
            default_value: None,
            regex: regex.to_string(),
            template: None,
            field_to_check: None,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn scope_variable(mut self, variable: &str) -> Self {
        self.scope_variable = Some(variable.to_string());
        self
    }

    /// Which match to keep; 0 picks a random one, negative values keep all.
    pub fn match_number(mut self, number: i32) -> Self {
        self.match_number = Some(number);
        self
    }

    /// Template built from regex groups, e.g. `$1$-$2$`.
    pub fn template(mut self, template: &str) -> Self {
        self.template = Some(template.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn field_to_check(mut self, field: TargetField) -> Self {
        self.field_to_check = Some(field);
        self
    }
}

impl BridgedObject for DslRegexExtractor {
    fn type_name(&self) -> &'static str {
        "DslRegexExtractor"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("scope", WireValue::opt_enum(self.scope)),
            Field::new("scopeVariable", self.scope_variable.as_ref()),
            Field::new("variableName", &self.variable_name),
            Field::new("matchNumber", self.match_number),
            Field::new("defaultValue", self.default_value.as_ref()),
            Field::new("regex", &self.regex),
            Field::new("template", self.template.as_ref()),
            Field::new("fieldToCheck", WireValue::opt_enum(self.field_to_check)),
        ]
    }
}

impl TestElement for DslRegexExtractor {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::to_yaml_string;

    #[test]
    fn test_regex_extractor_wire_form() {
        let extractor = DslRegexExtractor::new("USER_ID", r#""id":(\d+)"#)
            .field_to_check(TargetField::ResponseBodyUnescaped)
            .match_number(2);
        let yaml = to_yaml_string(&extractor).unwrap();
        assert!(yaml.starts_with("!regexExtractor"));
        assert!(yaml.contains("variableName: USER_ID"));
        assert!(yaml.contains("matchNumber: 2"));
        assert!(yaml.contains("fieldToCheck: RESPONSE_BODY_UNESCAPED"));
        assert!(!yaml.contains("template"));
    }
}
