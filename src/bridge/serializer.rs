//! # Object Graph Serializer
//!
//! Converts a tree of [`BridgedObject`]s into the tagged YAML document the
//! JVM bridge consumes. Each node becomes `!<tag>` followed by a mapping of
//! its non-empty fields, in the order the node declares them.
//!
//! Nodes describe themselves through [`BridgedObject::fields`] instead of
//! relying on runtime introspection, so the omit-empty and map-flattening
//! rules are applied here, once, for every element type.
//!
//! ## Tag names
//!
//! - built-in elements (`Core`, `Http`, `Java` namespaces) use the type name
//!   with the `Dsl` prefix stripped and the first letter lowercased
//!   (`DslThreadGroup` -> `threadGroup`)
//! - extension elements use their full type path with namespace segments
//!   lowercased (`BlazeMeter.BlazeMeterEngine` -> `blazemeter.BlazeMeterEngine`)
//! - a node may declare an explicit tag which takes precedence over both

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::io::Write;
use std::time::Duration;

use super::artifacts::{Component, CORE};
use crate::codec::{encode_duration, encode_enum};
use crate::error::Result;

const DSL_CLASS_PREFIX: &str = "Dsl";

/// Namespace owning a bridged type; decides how its tag is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Core,
    Http,
    Java,
    /// Dotted path of an extension module, e.g. `"BlazeMeter"`.
    Extension(&'static str),
}

impl Namespace {
    fn is_built_in(&self) -> bool {
        matches!(self, Namespace::Core | Namespace::Http | Namespace::Java)
    }
}

/// A value a node exposes for one of its fields.
#[derive(Debug, Clone)]
pub enum WireValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
    Duration(Duration),
    /// Camel case variant identifier, encoded as upper snake case.
    Enum(&'static str),
    StrList(&'a [String]),
    /// Ordered string map (e.g. HTTP headers).
    StrMap(&'a [(String, String)]),
    Node(&'a dyn BridgedObject),
    Nodes(Vec<&'a dyn BridgedObject>),
}

impl<'a> WireValue<'a> {
    /// Whether the field should be left out of the document entirely.
    pub fn is_omitted(&self) -> bool {
        match self {
            WireValue::Null => true,
            WireValue::StrList(items) => items.is_empty(),
            WireValue::StrMap(entries) => entries.is_empty(),
            WireValue::Nodes(nodes) => nodes.is_empty(),
            _ => false,
        }
    }

    pub fn enumeration<E: WireEnum>(value: E) -> Self {
        WireValue::Enum(value.identifier())
    }

    pub fn opt_enum<E: WireEnum>(value: Option<E>) -> Self {
        value.map_or(WireValue::Null, WireValue::enumeration)
    }
}

impl<'a> std::fmt::Debug for dyn BridgedObject + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl<'a> From<bool> for WireValue<'a> {
    fn from(value: bool) -> Self {
        WireValue::Bool(value)
    }
}

impl<'a> From<i64> for WireValue<'a> {
    fn from(value: i64) -> Self {
        WireValue::Int(value)
    }
}

impl<'a> From<i32> for WireValue<'a> {
    fn from(value: i32) -> Self {
        WireValue::Int(value.into())
    }
}

impl<'a> From<u32> for WireValue<'a> {
    fn from(value: u32) -> Self {
        WireValue::Int(value.into())
    }
}

impl<'a> From<f64> for WireValue<'a> {
    fn from(value: f64) -> Self {
        WireValue::Float(value)
    }
}

impl<'a> From<Duration> for WireValue<'a> {
    fn from(value: Duration) -> Self {
        WireValue::Duration(value)
    }
}

impl<'a> From<&'a str> for WireValue<'a> {
    fn from(value: &'a str) -> Self {
        WireValue::Str(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for WireValue<'a> {
    fn from(value: &'a String) -> Self {
        WireValue::Str(Cow::Borrowed(value.as_str()))
    }
}

impl<'a> From<String> for WireValue<'a> {
    fn from(value: String) -> Self {
        WireValue::Str(Cow::Owned(value))
    }
}

impl<'a> From<&'a [String]> for WireValue<'a> {
    fn from(value: &'a [String]) -> Self {
        WireValue::StrList(value)
    }
}

impl<'a, T: Into<WireValue<'a>>> From<Option<T>> for WireValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(WireValue::Null, Into::into)
    }
}

/// One named field of a node, in declaration order.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: WireValue<'a>,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: impl Into<WireValue<'a>>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Enumerations serialized through the enum codec.
pub trait WireEnum: Copy {
    /// Camel case variant name, e.g. `MainSample`.
    fn identifier(&self) -> &'static str;
}

/// Anything that can be handed to the bridge: test elements, engines,
/// stage properties and the run request itself.
pub trait BridgedObject: Send + Sync {
    /// Concrete type name, e.g. `DslThreadGroup`.
    fn type_name(&self) -> &'static str;

    fn namespace(&self) -> Namespace {
        Namespace::Core
    }

    /// Explicit tag overriding the derived one.
    fn tag(&self) -> Option<&'static str> {
        None
    }

    /// Component whose runtime artifacts the engine needs to load this type.
    fn component(&self) -> &'static Component {
        &CORE
    }

    fn fields(&self) -> Vec<Field<'_>>;
}

/// Upcast helper so trait objects built on [`BridgedObject`] can be walked
/// by the serializer.
pub trait AsBridged {
    fn as_bridged(&self) -> &dyn BridgedObject;
}

impl<T: BridgedObject> AsBridged for T {
    fn as_bridged(&self) -> &dyn BridgedObject {
        self
    }
}

/// Full type path used for tags and for type de-duplication.
pub fn type_path(obj: &dyn BridgedObject) -> String {
    match obj.namespace() {
        Namespace::Core => format!("Core.{}", obj.type_name()),
        Namespace::Http => format!("Http.{}", obj.type_name()),
        Namespace::Java => format!("Java.{}", obj.type_name()),
        Namespace::Extension(path) => format!("{}.{}", path, obj.type_name()),
    }
}

/// Tag for a node, without the leading `!`.
pub fn tag_name(obj: &dyn BridgedObject) -> String {
    if let Some(tag) = obj.tag() {
        return tag.to_string();
    }
    if obj.namespace().is_built_in() {
        simple_tag_name(obj.type_name())
    } else {
        lower_namespaces(&type_path(obj))
    }
}

fn simple_tag_name(type_name: &str) -> String {
    let name = type_name.strip_prefix(DSL_CLASS_PREFIX).unwrap_or(type_name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_namespaces(full_name: &str) -> String {
    match full_name.rfind('.') {
        Some(pos) => format!(
            "{}{}",
            full_name[..=pos].to_lowercase(),
            &full_name[pos + 1..]
        ),
        None => full_name.to_string(),
    }
}

/// Field names drop the leading underscore used to mark internal fields.
fn wire_field_name(name: &str) -> &str {
    name.strip_prefix('_').unwrap_or(name)
}

/// Build the document tree for a node and everything below it.
pub fn to_wire_document(obj: &dyn BridgedObject) -> Value {
    let mut fields = obj.fields();
    fields.retain(|f| !(f.name == "name" && matches!(f.value, WireValue::Null)));

    let flattened = match fields.as_slice() {
        [Field {
            value: WireValue::StrMap(entries),
            ..
        }] => Some(*entries),
        _ => None,
    };

    let mut body = Mapping::new();
    if let Some(entries) = flattened {
        for (key, value) in entries {
            body.insert(Value::String(key.clone()), Value::String(value.clone()));
        }
    } else {
        for field in fields {
            if field.value.is_omitted() {
                continue;
            }
            body.insert(
                Value::String(wire_field_name(field.name).to_string()),
                value_to_document(field.value),
            );
        }
    }

    Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag_name(obj)),
        value: Value::Mapping(body),
    }))
}

fn value_to_document(value: WireValue<'_>) -> Value {
    match value {
        WireValue::Null => Value::Null,
        WireValue::Bool(b) => Value::Bool(b),
        WireValue::Int(i) => Value::Number(i.into()),
        WireValue::Float(f) => Value::Number(f.into()),
        WireValue::Str(s) => Value::String(s.into_owned()),
        WireValue::Duration(d) => Value::String(encode_duration(d)),
        WireValue::Enum(id) => Value::String(encode_enum(id)),
        WireValue::StrList(items) => {
            Value::Sequence(items.iter().cloned().map(Value::String).collect())
        }
        WireValue::StrMap(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), Value::String(v.clone())))
                .collect(),
        ),
        WireValue::Node(node) => to_wire_document(node),
        WireValue::Nodes(nodes) => {
            Value::Sequence(nodes.into_iter().map(to_wire_document).collect())
        }
    }
}

/// Render a node as YAML text.
pub fn to_yaml_string(obj: &dyn BridgedObject) -> Result<String> {
    Ok(serde_yaml::to_string(&to_wire_document(obj))?)
}

/// Stream a node as YAML into `writer`.
pub fn write_yaml<W: Write>(obj: &dyn BridgedObject, writer: W) -> Result<()> {
    serde_yaml::to_writer(writer, &to_wire_document(obj))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        name: Option<String>,
        timeout: Option<Duration>,
        tags: Vec<String>,
    }

    impl BridgedObject for Leaf {
        fn type_name(&self) -> &'static str {
            "DslLeafSampler"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("name", self.name.as_ref()),
                Field::new("timeout", self.timeout),
                Field::new("tags", self.tags.as_slice()),
            ]
        }
    }

    struct Headers(Vec<(String, String)>);

    impl BridgedObject for Headers {
        fn type_name(&self) -> &'static str {
            "HttpHeaders"
        }

        fn namespace(&self) -> Namespace {
            Namespace::Http
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("name", None::<&String>),
                Field {
                    name: "headers",
                    value: WireValue::StrMap(&self.0),
                },
            ]
        }
    }

    struct Parent {
        children: Vec<Box<dyn BridgedObject>>,
    }

    impl BridgedObject for Parent {
        fn type_name(&self) -> &'static str {
            "Report"
        }

        fn namespace(&self) -> Namespace {
            Namespace::Extension("Dashboard.Reports")
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("__propsList", None::<bool>),
                Field {
                    name: "children",
                    value: WireValue::Nodes(self.children.iter().map(|c| c.as_ref()).collect()),
                },
            ]
        }
    }

    fn mapping_of(value: &Value) -> &Mapping {
        match value {
            Value::Tagged(tagged) => tagged.value.as_mapping().expect("mapping body"),
            other => panic!("expected tagged value, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_tag_strips_dsl_prefix() {
        let leaf = Leaf {
            name: None,
            timeout: None,
            tags: vec![],
        };
        assert_eq!(tag_name(&leaf), "leafSampler");
        assert_eq!(tag_name(&Headers(vec![])), "httpHeaders");
    }

    #[test]
    fn test_extension_tag_lowers_namespaces() {
        let parent = Parent { children: vec![] };
        assert_eq!(tag_name(&parent), "dashboard.reports.Report");
    }

    #[test]
    fn test_null_and_empty_fields_are_omitted() {
        let leaf = Leaf {
            name: None,
            timeout: None,
            tags: vec![],
        };
        let doc = to_wire_document(&leaf);
        assert!(mapping_of(&doc).is_empty());
        let yaml = to_yaml_string(&leaf).unwrap();
        assert!(yaml.starts_with("!leafSampler"));
        assert!(!yaml.contains(':'));
    }

    #[test]
    fn test_scalar_fields_use_codec() {
        let leaf = Leaf {
            name: Some("login".to_string()),
            timeout: Some(Duration::from_millis(2500)),
            tags: vec!["a".to_string()],
        };
        let doc = to_wire_document(&leaf);
        let body = mapping_of(&doc);
        assert_eq!(body.get("name").and_then(Value::as_str), Some("login"));
        assert_eq!(body.get("timeout").and_then(Value::as_str), Some("PT2.500S"));
        assert_eq!(body.get("tags").and_then(Value::as_sequence).map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_sole_string_map_is_flattened() {
        let headers = Headers(vec![
            ("X-Test".to_string(), "Val".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ]);
        let doc = to_wire_document(&headers);
        let body = mapping_of(&doc);
        assert_eq!(body.len(), 2);
        assert_eq!(body.get("X-Test").and_then(Value::as_str), Some("Val"));
        assert!(body.get("headers").is_none());
    }

    #[test]
    fn test_empty_children_emit_empty_body() {
        let parent = Parent { children: vec![] };
        let doc = to_wire_document(&parent);
        assert!(mapping_of(&doc).get("children").is_none());
        assert!(mapping_of(&doc).is_empty());
    }

    #[test]
    fn test_nested_nodes_recurse_in_order() {
        let parent = Parent {
            children: vec![
                Box::new(Leaf {
                    name: Some("first".to_string()),
                    timeout: None,
                    tags: vec![],
                }),
                Box::new(Headers(vec![("k".to_string(), "v".to_string())])),
            ],
        };
        let yaml = to_yaml_string(&parent).unwrap();
        assert!(yaml.starts_with("!dashboard.reports.Report"));
        let first = yaml.find("!leafSampler").unwrap();
        let second = yaml.find("!httpHeaders").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_leading_underscore_is_stripped() {
        assert_eq!(wire_field_name("__propsList"), "_propsList");
        assert_eq!(wire_field_name("_url"), "url");
        assert_eq!(wire_field_name("url"), "url");
    }
}
