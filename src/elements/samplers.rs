use std::time::Duration;

use super::{millis_text, Category, Children, TestElement, THREAD_GROUP_CHILD};
use crate::bridge::serializer::{BridgedObject, Field};
use crate::error::Result;
use crate::stages::Param;

/// Sampler that produces a canned response without any network traffic.
#[derive(Debug)]
pub struct DslDummySampler {
    name: Option<String>,
    response_body: String,
    successful: Option<bool>,
    response_code: Option<String>,
    response_message: Option<String>,
    response_time: Option<String>,
    simulate_response_time: Option<bool>,
    url: Option<String>,
    request_body: Option<String>,
    children: Children,
}

impl DslDummySampler {
    pub fn new(response_body: &str) -> Self {
        Self::named(None, response_body)
    }

    pub fn named(name: Option<&str>, response_body: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            response_body: response_body.to_string(),
            successful: None,
            response_code: None,
            response_message: None,
            response_time: None,
            simulate_response_time: None,
            url: None,
            request_body: None,
            children: Children::new("DslDummySampler", Category::SamplerChild),
        }
    }

    pub fn successful(mut self, successful: bool) -> Self {
        self.successful = Some(successful);
        self
    }

    pub fn response_code(mut self, code: &str) -> Self {
        self.response_code = Some(code.to_string());
        self
    }

    pub fn response_message(mut self, message: &str) -> Self {
        self.response_message = Some(message.to_string());
        self
    }

    /// Fixed time, or an expression such as `${__Random(100,300)}`.
    pub fn response_time(mut self, time: impl Into<Param<Duration>>) -> Self {
        self.response_time = Some(millis_text(time.into()));
        self
    }

    /// Whether the sampler actually waits for the response time.
    pub fn simulate_response_time(mut self, simulate: bool) -> Self {
        self.simulate_response_time = Some(simulate);
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn request_body(mut self, body: &str) -> Self {
        self.request_body = Some(body.to_string());
        self
    }

    pub fn children(mut self, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        self.children.extend(children)?;
        Ok(self)
    }
}

impl BridgedObject for DslDummySampler {
    fn type_name(&self) -> &'static str {
        "DslDummySampler"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("name", self.name.as_ref()),
            Field::new("responseBody", &self.response_body),
            Field::new("successful", self.successful),
            Field::new("responseCode", self.response_code.as_ref()),
            Field::new("responseMessage", self.response_message.as_ref()),
            Field::new("responseTime", self.response_time.as_ref()),
            Field::new("simulateResponseTime", self.simulate_response_time),
            Field::new("url", self.url.as_ref()),
            Field::new("requestBody", self.request_body.as_ref()),
            Field {
                name: "children",
                value: self.children.wire(),
            },
        ]
    }
}

impl TestElement for DslDummySampler {
    fn categories(&self) -> &'static [Category] {
        THREAD_GROUP_CHILD
    }
}

/// Pauses the thread for a while, recorded as its own sample.
#[derive(Debug)]
pub struct DslFlowControlAction {
    duration: String,
}

impl DslFlowControlAction {
    pub fn pause_thread(duration: impl Into<Param<Duration>>) -> Self {
        Self {
            duration: millis_text(duration.into()),
        }
    }
}

impl BridgedObject for DslFlowControlAction {
    fn type_name(&self) -> &'static str {
        "DslFlowControlAction"
    }

    fn tag(&self) -> Option<&'static str> {
        Some("threadPause")
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("duration", &self.duration)]
    }
}

impl TestElement for DslFlowControlAction {
    fn categories(&self) -> &'static [Category] {
        THREAD_GROUP_CHILD
    }
}
