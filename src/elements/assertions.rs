use super::{Category, Scope, TestElement, MULTI_LEVEL};
use crate::bridge::serializer::{BridgedObject, Field, WireEnum, WireValue};

/// Part of the sample a response assertion checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    ResponseBody,
    ResponseBodyAsDocument,
    ResponseCode,
    ResponseMessage,
    ResponseHeaders,
    RequestHeaders,
    RequestUrl,
    RequestBody,
}

impl WireEnum for TargetField {
    fn identifier(&self) -> &'static str {
        match self {
            TargetField::ResponseBody => "ResponseBody",
            TargetField::ResponseBodyAsDocument => "ResponseBodyAsDocument",
            TargetField::ResponseCode => "ResponseCode",
            TargetField::ResponseMessage => "ResponseMessage",
            TargetField::ResponseHeaders => "ResponseHeaders",
            TargetField::RequestHeaders => "RequestHeaders",
            TargetField::RequestUrl => "RequestUrl",
            TargetField::RequestBody => "RequestBody",
        }
    }
}

/// Marks samples as failed when the checked field does not match.
///
/// All configured checks must pass unless [`any_match`](Self::any_match) is
/// set; [`invert_check`](Self::invert_check) negates the outcome.
#[derive(Debug)]
pub struct DslResponseAssertion {
    name: Option<String>,
    scope: Option<Scope>,
    scope_variable: Option<String>,
    field_to_test: TargetField,
    ignore_status: bool,
    contains_substrings: Vec<String>,
    equals_to_strings: Vec<String>,
    contains_regexes: Vec<String>,
    matches_regexes: Vec<String>,
    invert_check: bool,
    any_match: bool,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl DslResponseAssertion {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            scope: None,
            scope_variable: None,
            field_to_test: TargetField::ResponseBody,
            ignore_status: false,
            contains_substrings: Vec::new(),
            equals_to_strings: Vec::new(),
            contains_regexes: Vec::new(),
            matches_regexes: Vec::new(),
            invert_check: false,
            any_match: false,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Check a variable instead of a sample field.
    pub fn scope_variable(mut self, variable: &str) -> Self {
        self.scope_variable = Some(variable.to_string());
        self
    }

    pub fn field_to_test(mut self, field: TargetField) -> Self {
        self.field_to_test = field;
        self
    }

    /// Don't let the sample status (e.g. a 4xx code) fail the sample by itself.
    pub fn ignore_status(mut self, enable: bool) -> Self {
        self.ignore_status = enable;
        self
    }

    pub fn contains_substrings(mut self, substrings: &[&str]) -> Self {
        self.contains_substrings = owned(substrings);
        self
    }

    pub fn equals_to_strings(mut self, strings: &[&str]) -> Self {
        self.equals_to_strings = owned(strings);
        self
    }

    pub fn contains_regexes(mut self, regexes: &[&str]) -> Self {
        self.contains_regexes = owned(regexes);
        self
    }

    pub fn matches_regexes(mut self, regexes: &[&str]) -> Self {
        self.matches_regexes = owned(regexes);
        self
    }

    pub fn invert_check(mut self, enable: bool) -> Self {
        self.invert_check = enable;
        self
    }

    pub fn any_match(mut self, enable: bool) -> Self {
        self.any_match = enable;
        self
    }
}

impl BridgedObject for DslResponseAssertion {
    fn type_name(&self) -> &'static str {
        "DslResponseAssertion"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", self.name.as_ref()),
            Field::new("scope", WireValue::opt_enum(self.scope)),
            Field::new("scopeVariable", self.scope_variable.as_ref()),
            Field::new("fieldToTest", WireValue::enumeration(self.field_to_test)),
            Field::new("ignoreStatus", self.ignore_status),
            Field::new("containsSubstrings", self.contains_substrings.as_slice()),
            Field::new("equalsToStrings", self.equals_to_strings.as_slice()),
            Field::new("containsRegexes", self.contains_regexes.as_slice()),
            Field::new("matchesRegexes", self.matches_regexes.as_slice()),
            Field::new("invertCheck", self.invert_check),
            Field::new("anyMatch", self.any_match),
        ]
    }
}

impl TestElement for DslResponseAssertion {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}
