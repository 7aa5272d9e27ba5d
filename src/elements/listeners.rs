//! Listeners that persist or display sample results.

use super::{Category, TestElement, MULTI_LEVEL};
use crate::bridge::serializer::{BridgedObject, Field};

const JTL_FIELD_COUNT: usize = 28;

/// Optional columns of a JTL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JtlField {
    SaveAsXml,
    ElapsedTime,
    ResponseMessage,
    Success,
    SentByteCount,
    ResponseFilename,
    Encoding,
    IdleTime,
    ResponseHeaders,
    AssertionResults,
    FieldNames,
    Label,
    ThreadName,
    AssertionFailureMessage,
    ActiveThreadCounts,
    Latency,
    SampleAndErrorCounts,
    RequestHeaders,
    ResponseData,
    TimeStamp,
    ResponseCode,
    DataType,
    ReceivedByteCount,
    Url,
    ConnectTime,
    Hostname,
    SamplerData,
    SubResults,
}

impl JtlField {
    pub const ALL: [JtlField; JTL_FIELD_COUNT] = [
        JtlField::SaveAsXml,
        JtlField::ElapsedTime,
        JtlField::ResponseMessage,
        JtlField::Success,
        JtlField::SentByteCount,
        JtlField::ResponseFilename,
        JtlField::Encoding,
        JtlField::IdleTime,
        JtlField::ResponseHeaders,
        JtlField::AssertionResults,
        JtlField::FieldNames,
        JtlField::Label,
        JtlField::ThreadName,
        JtlField::AssertionFailureMessage,
        JtlField::ActiveThreadCounts,
        JtlField::Latency,
        JtlField::SampleAndErrorCounts,
        JtlField::RequestHeaders,
        JtlField::ResponseData,
        JtlField::TimeStamp,
        JtlField::ResponseCode,
        JtlField::DataType,
        JtlField::ReceivedByteCount,
        JtlField::Url,
        JtlField::ConnectTime,
        JtlField::Hostname,
        JtlField::SamplerData,
        JtlField::SubResults,
    ];

    fn wire_name(self) -> &'static str {
        match self {
            JtlField::SaveAsXml => "saveAsXml",
            JtlField::ElapsedTime => "withElapsedTime",
            JtlField::ResponseMessage => "withResponseMessage",
            JtlField::Success => "withSuccess",
            JtlField::SentByteCount => "withSentByteCount",
            JtlField::ResponseFilename => "withResponseFilename",
            JtlField::Encoding => "withEncoding",
            JtlField::IdleTime => "withIdleTime",
            JtlField::ResponseHeaders => "withResponseHeaders",
            JtlField::AssertionResults => "withAssertionResults",
            JtlField::FieldNames => "withFieldNames",
            JtlField::Label => "withLabel",
            JtlField::ThreadName => "withThreadName",
            JtlField::AssertionFailureMessage => "withAssertionFailureMessage",
            JtlField::ActiveThreadCounts => "withActiveThreadCounts",
            JtlField::Latency => "withLatency",
            JtlField::SampleAndErrorCounts => "withSampleAndErrorCounts",
            JtlField::RequestHeaders => "withRequestHeaders",
            JtlField::ResponseData => "withResponseData",
            JtlField::TimeStamp => "withTimeStamp",
            JtlField::ResponseCode => "withResponseCode",
            JtlField::DataType => "withDataType",
            JtlField::ReceivedByteCount => "withReceivedByteCount",
            JtlField::Url => "withUrl",
            JtlField::ConnectTime => "withConnectTime",
            JtlField::Hostname => "withHostname",
            JtlField::SamplerData => "withSamplerData",
            JtlField::SubResults => "withSubResults",
        }
    }
}

/// Writes every sample to a JTL file inside `directory`.
///
/// When no file name is given the engine generates a unique one, so several
/// runs can share a directory.
#[derive(Debug)]
pub struct JtlWriter {
    directory: String,
    file_name: Option<String>,
    with_all_fields: Option<bool>,
    flags: [Option<bool>; JTL_FIELD_COUNT],
    with_variables: Vec<String>,
}

impl JtlWriter {
    pub fn new(directory: &str, file_name: Option<&str>) -> Self {
        Self {
            directory: directory.to_string(),
            file_name: file_name.map(str::to_string),
            with_all_fields: None,
            flags: [None; JTL_FIELD_COUNT],
            with_variables: Vec::new(),
        }
    }

    pub fn with_all_fields(mut self, enabled: bool) -> Self {
        self.with_all_fields = Some(enabled);
        self
    }

    pub fn with_field(mut self, field: JtlField, enabled: bool) -> Self {
        self.flags[field as usize] = Some(enabled);
        self
    }

    pub fn save_as_xml(self, enabled: bool) -> Self {
        self.with_field(JtlField::SaveAsXml, enabled)
    }

    /// Extra variables saved as additional columns.
    pub fn with_variables(mut self, variables: &[&str]) -> Self {
        self.with_variables = variables.iter().map(|v| v.to_string()).collect();
        self
    }
}

impl BridgedObject for JtlWriter {
    fn type_name(&self) -> &'static str {
        "JtlWriter"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::new("directory", &self.directory),
            Field::new("fileName", self.file_name.as_ref()),
            Field::new("withAllFields", self.with_all_fields),
        ];
        fields.extend(
            JtlField::ALL
                .iter()
                .zip(self.flags.iter())
                .map(|(field, flag)| Field::new(field.wire_name(), *flag)),
        );
        fields.push(Field::new("withVariables", self.with_variables.as_slice()));
        fields
    }
}

impl TestElement for JtlWriter {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

/// Saves each response body to `<prefix><n>.<ext>` files.
#[derive(Debug)]
pub struct ResponseFileSaver {
    file_name_prefix: String,
}

impl ResponseFileSaver {
    pub fn new(file_name_prefix: &str) -> Self {
        Self {
            file_name_prefix: file_name_prefix.to_string(),
        }
    }
}

impl BridgedObject for ResponseFileSaver {
    fn type_name(&self) -> &'static str {
        "ResponseFileSaver"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("fileNamePrefix", &self.file_name_prefix)]
    }
}

impl TestElement for ResponseFileSaver {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

/// Shows samples live in the engine's results tree window.
#[derive(Debug, Default)]
pub struct ResultsTreeVisualizer {
    results_limit: Option<i32>,
}

impl ResultsTreeVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_limit(mut self, limit: i32) -> Self {
        self.results_limit = Some(limit);
        self
    }
}

impl BridgedObject for ResultsTreeVisualizer {
    fn type_name(&self) -> &'static str {
        "ResultsTreeVisualizer"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("resultsLimit", self.results_limit)]
    }
}

impl TestElement for ResultsTreeVisualizer {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}
