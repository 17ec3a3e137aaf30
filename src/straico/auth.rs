use std::env;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::straico::error::StraicoError;
use crate::straico::request::RequestDescriptor;

pub const DEFAULT_API_KEY_ENV: &str = "STRAICO_API_KEY";
pub const AUTHORIZATION: &str = "Authorization";

/// Straico API credential. `Debug` never prints the key.
pub struct Credential {
    api_key: SecretString,
}

impl Credential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.expose_secret().trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .finish()
    }
}

/// Source of the active credential, read once per request.
pub trait CredentialStore: Send + Sync {
    fn credential(&self) -> Result<Credential, StraicoError>;
}

/// Reads the API key from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
    var: String,
}

impl EnvCredentialStore {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn is_present(&self) -> bool {
        env::var(&self.var)
            .ok()
            .is_some_and(|value| !value.trim().is_empty())
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_ENV)
    }
}

impl CredentialStore for EnvCredentialStore {
    fn credential(&self) -> Result<Credential, StraicoError> {
        env::var(&self.var)
            .map(Credential::new)
            .map_err(|_| StraicoError::Auth(format!("{} is not set in the environment", self.var)))
    }
}

/// Fixed key, mostly for embedding and tests.
pub struct StaticCredentialStore {
    api_key: SecretString,
}

impl StaticCredentialStore {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
        }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn credential(&self) -> Result<Credential, StraicoError> {
        Ok(Credential::new(self.api_key.expose_secret()))
    }
}

/// Adds `Authorization: Bearer <key>` to the descriptor.
pub fn attach(
    mut descriptor: RequestDescriptor,
    credential: &Credential,
) -> Result<RequestDescriptor, StraicoError> {
    if credential.is_empty() {
        return Err(StraicoError::Auth("API key is empty".to_string()));
    }
    descriptor.headers.insert(
        AUTHORIZATION.to_string(),
        format!("Bearer {}", credential.api_key.expose_secret()),
    );
    Ok(descriptor)
}
