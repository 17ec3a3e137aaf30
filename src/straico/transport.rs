use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use tracing::debug;

use crate::straico::auth::{self, CredentialStore};
use crate::straico::error::{StraicoError, TransportError};
use crate::straico::request::{self, FormField, RequestBody, RequestDescriptor};

pub const DEFAULT_BASE_URL: &str = "https://api.straico.com";
const APPLICATION_JSON: &str = "application/json";

/// Executes one request descriptor and returns the parsed JSON response.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Value, TransportError>;
}

/// reqwest-backed transport bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Value, TransportError> {
        let url = self.url(&descriptor.path);
        let is_multipart = matches!(descriptor.body, RequestBody::Multipart(_));

        let mut request = self
            .client
            .request(descriptor.method.clone(), &url)
            .header(ACCEPT, APPLICATION_JSON);
        if !is_multipart {
            request = request.header(CONTENT_TYPE, APPLICATION_JSON);
        }
        for (name, value) in &descriptor.headers {
            // reqwest supplies the multipart content type with its boundary.
            if is_multipart && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }
        request = match &descriptor.body {
            RequestBody::None => request,
            RequestBody::Json(body) => request.json(body),
            RequestBody::Multipart(fields) => request.multipart(multipart_form(fields)?),
        };
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!(
            method = %descriptor.method,
            url = %url,
            body = descriptor.body.kind(),
            "sending Straico request"
        );

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::network(format!("Request to {url} failed: {source}")))?;
        let status = response.status();
        let text = response.text().await.map_err(|source| {
            TransportError::network(format!("Failed to read response from {url}: {source}"))
        })?;
        debug!(status = status.as_u16(), bytes = text.len(), "Straico response");

        if !status.is_success() {
            return Err(TransportError::api(status, text));
        }
        Ok(parse_body(&text))
    }
}

fn multipart_form(fields: &[(String, FormField)]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, field) in fields {
        form = match field {
            FormField::Text(text) => form.text(name.clone(), text.clone()),
            FormField::File {
                data,
                file_name,
                mime_type,
            } => {
                let mut part = Part::bytes(data.clone()).file_name(file_name.clone());
                if let Some(mime_type) = mime_type {
                    part = part.mime_str(mime_type).map_err(|err| {
                        TransportError::network(format!("Invalid MIME type '{mime_type}': {err}"))
                    })?;
                }
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

/// Empty bodies become an empty object; non-JSON bodies are kept as text.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Credential test: `GET /v0/models` must answer 2xx.
pub async fn verify_credential(
    transport: &dyn Transport,
    credentials: &dyn CredentialStore,
) -> Result<(), StraicoError> {
    let credential = credentials.credential()?;
    let descriptor = auth::attach(request::models_request(), &credential)?;
    transport.send(&descriptor).await?;
    Ok(())
}
