//! Request builder: maps a route and one item's parameters to an abstract
//! HTTP request. No I/O happens here.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::straico::error::StraicoError;
use crate::straico::operation::{Operation, Resource, Route};
use crate::straico::params::{Attachment, ItemParams};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// One named multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text(String),
    File {
        data: Vec<u8>,
        file_name: String,
        mime_type: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(Value),
    Multipart(Vec<(String, FormField)>),
}

impl RequestBody {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Json(_) => "json",
            Self::Multipart(_) => "multipart",
        }
    }
}

/// Abstract HTTP request for one input item.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
}

impl RequestDescriptor {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: RequestBody::None,
        }
    }

    fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    fn multipart(mut self, fields: Vec<(String, FormField)>) -> Self {
        self.headers
            .insert(CONTENT_TYPE.to_string(), MULTIPART_FORM_DATA.to_string());
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn multipart_field(&self, name: &str) -> Option<&FormField> {
        match &self.body {
            RequestBody::Multipart(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// Dry-run rendering; file parts are summarized rather than dumped.
impl Serialize for RequestDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("method", self.method.as_str())?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("headers", &self.headers)?;
        map.serialize_entry("bodyKind", self.body.kind())?;
        match &self.body {
            RequestBody::None => map.serialize_entry("body", &Value::Null)?,
            RequestBody::Json(body) => map.serialize_entry("body", body)?,
            RequestBody::Multipart(fields) => {
                let rendered: Map<String, Value> = fields
                    .iter()
                    .map(|(name, field)| (name.clone(), summarize_field(field)))
                    .collect();
                map.serialize_entry("body", &rendered)?;
            }
        }
        map.end()
    }
}

fn summarize_field(field: &FormField) -> Value {
    match field {
        FormField::Text(text) => Value::String(text.clone()),
        FormField::File {
            data,
            file_name,
            mime_type,
        } => serde_json::json!({
            "filename": file_name,
            "mimeType": mime_type,
            "size": data.len(),
        }),
    }
}

/// Builds the request for `(resource, operation)` from one item's parameters.
///
/// `attachment` is the binary payload the caller selected for this item; it
/// is only read by `rag/update` when `fileBinaryData` is set.
pub fn build(
    resource: Resource,
    operation: Operation,
    params: &ItemParams<'_>,
    attachment: Option<&Attachment>,
) -> Result<RequestDescriptor, StraicoError> {
    match Route::resolve(resource, operation)? {
        Route::ModelsGet => Ok(models_request()),
        Route::PromptCompletionExecute => prompt_completion(params),
        Route::RagGet => Ok(RequestDescriptor::new(Method::GET, rag_path(params)?)),
        Route::RagDelete => Ok(RequestDescriptor::new(Method::DELETE, rag_path(params)?)),
        Route::RagUpdate => rag_update(params, attachment),
        Route::RagPrompt => rag_prompt(params),
        Route::AgentsGet => Ok(RequestDescriptor::new(Method::GET, "/v0/agents")),
    }
}

/// `GET /v0/models`; also the credential test probe.
pub fn models_request() -> RequestDescriptor {
    RequestDescriptor::new(Method::GET, "/v0/models")
}

fn prompt_completion(params: &ItemParams<'_>) -> Result<RequestDescriptor, StraicoError> {
    let model = params.required_string("model")?;
    let message = params.required_string("message")?;
    let additional = params.object("additionalFields")?;

    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model));
    body.insert("message".to_string(), Value::String(message));
    body.extend(additional);

    Ok(RequestDescriptor::new(Method::POST, "/v0/prompt/completion").json(Value::Object(body)))
}

fn rag_path(params: &ItemParams<'_>) -> Result<String, StraicoError> {
    let rag_id = params.required_string("ragId")?;
    if rag_id.trim().is_empty() {
        return Err(StraicoError::Builder(
            "Parameter 'ragId' must not be empty".to_string(),
        ));
    }
    // URL parsing collapses dot segments even when percent-encoded.
    if matches!(rag_id.as_str(), "." | "..") {
        return Err(StraicoError::Builder(format!(
            "Parameter 'ragId' must not be a dot segment, got '{rag_id}'"
        )));
    }
    Ok(format!("/v0/rag/{}", urlencoding::encode(&rag_id)))
}

fn rag_update(
    params: &ItemParams<'_>,
    attachment: Option<&Attachment>,
) -> Result<RequestDescriptor, StraicoError> {
    let descriptor = RequestDescriptor::new(Method::PUT, rag_path(params)?);
    if !params.boolean("fileBinaryData")? {
        return Ok(descriptor);
    }

    // A missing attachment still yields a multipart request, only without the file part.
    let fields = attachment
        .map(|attachment| {
            vec![(
                "file".to_string(),
                FormField::File {
                    data: attachment.data.clone(),
                    file_name: attachment
                        .file_name
                        .clone()
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| "file".to_string()),
                    mime_type: attachment.mime_type.clone(),
                },
            )]
        })
        .unwrap_or_default();
    Ok(descriptor.multipart(fields))
}

fn rag_prompt(params: &ItemParams<'_>) -> Result<RequestDescriptor, StraicoError> {
    let path = format!("{}/prompt", rag_path(params)?);
    let prompt = params.required_string("prompt")?;
    let additional = params.object("additionalFields")?;

    let mut fields = vec![("prompt".to_string(), FormField::Text(prompt))];
    for key in ["temperature", "max_tokens"] {
        if let Some(value) = additional.get(key).and_then(form_value) {
            fields.push((key.to_string(), FormField::Text(value)));
        }
    }

    Ok(RequestDescriptor::new(Method::POST, path).multipart(fields))
}

/// Text for an optional form field: any number (zero included), `true`, or a
/// non-empty string; null, `false` and empty strings are left out.
fn form_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}
