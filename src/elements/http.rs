//! HTTP protocol elements.

use super::{Category, Children, TestElement, MULTI_LEVEL, THREAD_GROUP_CHILD};
use crate::bridge::serializer::{BridgedObject, Field, Namespace, WireEnum, WireValue};
use crate::error::Result;

const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl WireEnum for HttpMethod {
    fn identifier(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Post => "Post",
            HttpMethod::Put => "Put",
            HttpMethod::Patch => "Patch",
            HttpMethod::Delete => "Delete",
            HttpMethod::Head => "Head",
            HttpMethod::Options => "Options",
        }
    }
}

/// Request headers. Setting an existing header replaces its value and keeps
/// its position.
#[derive(Debug, Default, Clone)]
pub struct HttpHeaders {
    headers: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn content_type(self, value: &str) -> Self {
        self.header(CONTENT_TYPE, value)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    fn set(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }
}

impl BridgedObject for HttpHeaders {
    fn type_name(&self) -> &'static str {
        "HttpHeaders"
    }

    fn namespace(&self) -> Namespace {
        Namespace::Http
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field {
            name: "headers",
            value: WireValue::StrMap(&self.headers),
        }]
    }
}

impl TestElement for HttpHeaders {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

/// Sends an HTTP request. Defaults to `GET` without a body.
#[derive(Debug)]
pub struct DslHttpSampler {
    name: Option<String>,
    url: String,
    method: Option<HttpMethod>,
    body: Option<String>,
    headers: HttpHeaders,
    children: Children,
}

impl DslHttpSampler {
    pub fn new(name: Option<&str>, url: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            url: url.to_string(),
            method: None,
            body: None,
            headers: HttpHeaders::new(),
            children: Children::new("DslHttpSampler", Category::SamplerChild),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// `POST` with the given body and content type.
    pub fn post(self, body: &str, content_type: &str) -> Self {
        self.method(HttpMethod::Post)
            .body(body)
            .content_type(content_type)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn content_type(self, value: &str) -> Self {
        self.header(CONTENT_TYPE, value)
    }

    pub fn children(mut self, children: Vec<Box<dyn TestElement>>) -> Result<Self> {
        self.children.extend(children)?;
        Ok(self)
    }
}

impl BridgedObject for DslHttpSampler {
    fn type_name(&self) -> &'static str {
        "DslHttpSampler"
    }

    fn namespace(&self) -> Namespace {
        Namespace::Http
    }

    fn fields(&self) -> Vec<Field<'_>> {
        let headers = if self.headers.is_empty() {
            WireValue::Null
        } else {
            WireValue::Node(&self.headers)
        };
        vec![
            Field::new("name", self.name.as_ref()),
            Field::new("url", &self.url),
            Field::new("method", WireValue::opt_enum(self.method)),
            Field::new("body", self.body.as_ref()),
            Field::new("headers", headers),
            Field {
                name: "children",
                value: self.children.wire(),
            },
        ]
    }
}

impl TestElement for DslHttpSampler {
    fn categories(&self) -> &'static [Category] {
        THREAD_GROUP_CHILD
    }
}

/// Cookie manager; enabled by default in every plan.
#[derive(Debug, Default)]
pub struct DslHttpCookies {
    disable: Option<bool>,
    clear_cookies_between_iterations: Option<bool>,
}

impl DslHttpCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(mut self) -> Self {
        self.disable = Some(true);
        self
    }

    pub fn clear_cookies_between_iterations(mut self, clear: bool) -> Self {
        self.clear_cookies_between_iterations = Some(clear);
        self
    }
}

impl BridgedObject for DslHttpCookies {
    fn type_name(&self) -> &'static str {
        "DslHttpCookies"
    }

    fn namespace(&self) -> Namespace {
        Namespace::Http
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("disable", self.disable),
            Field::new(
                "clearCookiesBetweenIterations",
                self.clear_cookies_between_iterations,
            ),
        ]
    }
}

impl TestElement for DslHttpCookies {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

/// Cache manager; enabled by default in every plan.
#[derive(Debug, Default)]
pub struct DslHttpCache {
    disable: Option<bool>,
}

impl DslHttpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(mut self) -> Self {
        self.disable = Some(true);
        self
    }
}

impl BridgedObject for DslHttpCache {
    fn type_name(&self) -> &'static str {
        "DslHttpCache"
    }

    fn namespace(&self) -> Namespace {
        Namespace::Http
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("disable", self.disable)]
    }
}

impl TestElement for DslHttpCache {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}
