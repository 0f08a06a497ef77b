use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;

/// The part of a request a model is mapped from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamGroup {
    /// Parsed request body.
    Body,
    /// URL query parameters.
    Query,
    /// Path parameters captured by the router.
    Params,
    /// Request headers (names normalised to `snake_case`).
    Headers,
    /// Values of the `Cookie` header.
    Cookies,
    /// A custom group attached to the request by earlier middleware.
    Other(String),
}

impl ParamGroup {
    pub fn as_str(&self) -> &str {
        match self {
            ParamGroup::Body => "body",
            ParamGroup::Query => "query",
            ParamGroup::Params => "params",
            ParamGroup::Headers => "headers",
            ParamGroup::Cookies => "cookies",
            ParamGroup::Other(name) => name,
        }
    }
}

impl fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ParamGroup {
    fn from(name: &str) -> Self {
        match name {
            "body" => ParamGroup::Body,
            "query" => ParamGroup::Query,
            "params" => ParamGroup::Params,
            "headers" => ParamGroup::Headers,
            "cookies" => ParamGroup::Cookies,
            other => ParamGroup::Other(other.to_string()),
        }
    }
}

impl From<String> for ParamGroup {
    fn from(name: String) -> Self {
        ParamGroup::from(name.as_str())
    }
}

/// Framework-independent view of one request.
///
/// Integrations fill it from their native request type; the
/// [`Validation`](crate::Validation) adapter only ever reads from it.
///
/// Groups inserted with [`insert_text`](Self::insert_text) hold raw strings
/// and are deserialized with [`from_text_value`](crate::from_text_value);
/// the others must already match the model's types.
#[derive(Debug, Clone, Default)]
pub struct RequestData {
    content_type: Option<String>,
    groups: HashMap<ParamGroup, Value>,
    text_groups: HashSet<ParamGroup>,
}

impl RequestData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<ParamGroup>, value: Value) -> Self {
        self.insert(group, value);
        self
    }

    pub fn with_text_group(mut self, group: impl Into<ParamGroup>, value: Value) -> Self {
        self.insert_text(group, value);
        self
    }

    /// Insert a group of typed JSON values.
    pub fn insert(&mut self, group: impl Into<ParamGroup>, value: Value) {
        let group = group.into();
        self.text_groups.remove(&group);
        self.groups.insert(group, value);
    }

    /// Insert a group whose values are the raw strings of the request.
    pub fn insert_text(&mut self, group: impl Into<ParamGroup>, value: Value) {
        let group = group.into();
        self.text_groups.insert(group.clone());
        self.groups.insert(group, value);
    }

    pub fn set_content_type(&mut self, content_type: Option<String>) {
        self.content_type = content_type;
    }

    /// Raw `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Value of `group`, or `None` when the group is missing.
    ///
    /// Absent, `null` and empty-string values all count as missing.
    pub fn group(&self, group: &ParamGroup) -> Option<&Value> {
        self.groups.get(group).filter(|value| !is_missing(value))
    }

    pub fn is_text(&self, group: &ParamGroup) -> bool {
        self.text_groups.contains(group)
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
