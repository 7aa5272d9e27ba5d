use super::{Category, TestElement, MULTI_LEVEL};
use crate::bridge::serializer::{BridgedObject, Field, WireEnum, WireValue};

/// How CSV lines are shared between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    AllThreads,
    ThreadGroup,
    Thread,
}

impl WireEnum for Sharing {
    fn identifier(&self) -> &'static str {
        match self {
            Sharing::AllThreads => "AllThreads",
            Sharing::ThreadGroup => "ThreadGroup",
            Sharing::Thread => "Thread",
        }
    }
}

/// Feeds variables from the lines of a CSV file.
///
/// By default the first line holds variable names, the delimiter is a comma
/// and the file is re-read from the start when exhausted.
#[derive(Debug)]
pub struct DslCsvDataSet {
    csv_file: String,
    delimiter: Option<String>,
    encoding: Option<String>,
    variable_names: Vec<String>,
    ignore_first_line: Option<bool>,
    stop_thread_on_eof: Option<bool>,
    shared_in: Option<Sharing>,
    random_order: Option<bool>,
}

impl DslCsvDataSet {
    pub fn new(csv_file: &str) -> Self {
        Self {
            csv_file: csv_file.to_string(),
            delimiter: None,
            encoding: None,
            variable_names: Vec::new(),
            ignore_first_line: None,
            stop_thread_on_eof: None,
            shared_in: None,
            random_order: None,
        }
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = Some(delimiter.to_string());
        self
    }

    pub fn encoding(mut self, encoding: &str) -> Self {
        self.encoding = Some(encoding.to_string());
        self
    }

    pub fn variable_names(mut self, names: &[&str]) -> Self {
        self.variable_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn ignore_first_line(mut self, enable: bool) -> Self {
        self.ignore_first_line = Some(enable);
        self
    }

    pub fn stop_thread_on_eof(mut self, enable: bool) -> Self {
        self.stop_thread_on_eof = Some(enable);
        self
    }

    pub fn shared_in(mut self, sharing: Sharing) -> Self {
        self.shared_in = Some(sharing);
        self
    }

    pub fn random_order(mut self, enable: bool) -> Self {
        self.random_order = Some(enable);
        self
    }
}

impl BridgedObject for DslCsvDataSet {
    fn type_name(&self) -> &'static str {
        "DslCsvDataSet"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("csvFile", &self.csv_file),
            Field::new("delimiter", self.delimiter.as_ref()),
            Field::new("encoding", self.encoding.as_ref()),
            Field::new("variableNames", self.variable_names.as_slice()),
            Field::new("ignoreFirstLine", self.ignore_first_line),
            Field::new("stopThreadOnEOF", self.stop_thread_on_eof),
            Field::new("sharedIn", WireValue::opt_enum(self.shared_in)),
            Field::new("randomOrder", self.random_order),
        ]
    }
}

impl TestElement for DslCsvDataSet {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}
