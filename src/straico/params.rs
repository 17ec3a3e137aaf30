//! Input items and the collaborator seams that hand their values to the core.
//!
//! The platform resolves, defaults and validates every parameter before the
//! core sees it. The core only reads values by item index and name.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::straico::error::StraicoError;

/// Binary payload attached to an input item under a field name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(deserialize_with = "decode_base64")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl Attachment {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

fn decode_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.trim())
        .map_err(|err| serde::de::Error::custom(format!("invalid base64 binary data: {err}")))
}

/// One element of the input batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub binary: BTreeMap<String, Attachment>,
}

impl InputItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_binary(mut self, field: impl Into<String>, attachment: Attachment) -> Self {
        self.binary.insert(field.into(), attachment);
        self
    }
}

/// Resolved parameter values, addressed by item index and name.
pub trait ParameterResolver {
    fn item_count(&self) -> usize;

    fn parameter(&self, index: usize, name: &str) -> Option<&Value>;
}

/// Binary attachments, addressed by item index and field name.
pub trait BinaryStore {
    fn binary(&self, index: usize, field: &str) -> Option<&Attachment>;
}

/// In-memory batch of input items; the default collaborator for both seams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    items: Vec<InputItem>,
}

impl Batch {
    pub fn new(items: Vec<InputItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InputItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_params(&self, index: usize) -> ItemParams<'_> {
        ItemParams::new(self, index)
    }
}

impl From<Vec<InputItem>> for Batch {
    fn from(items: Vec<InputItem>) -> Self {
        Self::new(items)
    }
}

impl ParameterResolver for Batch {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn parameter(&self, index: usize, name: &str) -> Option<&Value> {
        self.items.get(index).and_then(|item| item.params.get(name))
    }
}

impl BinaryStore for Batch {
    fn binary(&self, index: usize, field: &str) -> Option<&Attachment> {
        self.items.get(index).and_then(|item| item.binary.get(field))
    }
}

/// Typed view of one item's parameters.
#[derive(Clone, Copy)]
pub struct ItemParams<'a> {
    resolver: &'a dyn ParameterResolver,
    index: usize,
}

impl<'a> ItemParams<'a> {
    pub fn new(resolver: &'a dyn ParameterResolver, index: usize) -> Self {
        Self { resolver, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.resolver
            .parameter(self.index, name)
            .filter(|value| !value.is_null())
    }

    /// String parameter; numbers are rendered as their decimal text.
    pub fn string(&self, name: &str) -> Result<Option<String>, StraicoError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(Value::Number(value)) => Ok(Some(value.to_string())),
            Some(other) => Err(StraicoError::Builder(format!(
                "Parameter '{name}' must be a string, got {}",
                type_name(other)
            ))),
        }
    }

    pub fn required_string(&self, name: &str) -> Result<String, StraicoError> {
        self.string(name)?
            .ok_or_else(|| StraicoError::Builder(format!("Missing required parameter '{name}'")))
    }

    pub fn boolean(&self, name: &str) -> Result<bool, StraicoError> {
        match self.get(name) {
            None => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(Value::String(value)) if value.eq_ignore_ascii_case("true") => Ok(true),
            Some(Value::String(value)) if value.eq_ignore_ascii_case("false") => Ok(false),
            Some(other) => Err(StraicoError::Builder(format!(
                "Parameter '{name}' must be a boolean, got {}",
                type_name(other)
            ))),
        }
    }

    /// Object parameter; absent means empty.
    pub fn object(&self, name: &str) -> Result<Map<String, Value>, StraicoError> {
        match self.get(name) {
            None => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(StraicoError::Builder(format!(
                "Parameter '{name}' must be an object, got {}",
                type_name(other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
