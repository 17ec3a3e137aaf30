use std::fmt;
use std::str::FromStr;

use crate::straico::error::StraicoError;

/// Top-level category of upstream operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Models,
    PromptCompletion,
    Rag,
    Agents,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Models,
        Resource::PromptCompletion,
        Resource::Rag,
        Resource::Agents,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::PromptCompletion => "promptCompletion",
            Self::Rag => "rag",
            Self::Agents => "agents",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == value.trim())
            .ok_or_else(|| {
                format!(
                    "Invalid resource '{value}'. Supported values: {}.",
                    supported(Self::ALL.iter().map(|resource| resource.as_str()))
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Execute,
    Delete,
    Update,
    Prompt,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Get,
        Operation::Execute,
        Operation::Delete,
        Operation::Update,
        Operation::Prompt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Execute => "execute",
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == value.trim())
            .ok_or_else(|| {
                format!(
                    "Invalid operation '{value}'. Supported values: {}.",
                    supported(Self::ALL.iter().map(|operation| operation.as_str()))
                )
            })
    }
}

fn supported<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

/// One valid (resource, operation) pair of the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ModelsGet,
    PromptCompletionExecute,
    RagGet,
    RagDelete,
    RagUpdate,
    RagPrompt,
    AgentsGet,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::ModelsGet,
        Route::PromptCompletionExecute,
        Route::RagGet,
        Route::RagDelete,
        Route::RagUpdate,
        Route::RagPrompt,
        Route::AgentsGet,
    ];

    /// Looks up the route for a pair, or a configuration error when the
    /// upstream API has no such operation.
    pub fn resolve(resource: Resource, operation: Operation) -> Result<Self, StraicoError> {
        match (resource, operation) {
            (Resource::Models, Operation::Get) => Ok(Self::ModelsGet),
            (Resource::PromptCompletion, Operation::Execute) => Ok(Self::PromptCompletionExecute),
            (Resource::Rag, Operation::Get) => Ok(Self::RagGet),
            (Resource::Rag, Operation::Delete) => Ok(Self::RagDelete),
            (Resource::Rag, Operation::Update) => Ok(Self::RagUpdate),
            (Resource::Rag, Operation::Prompt) => Ok(Self::RagPrompt),
            (Resource::Agents, Operation::Get) => Ok(Self::AgentsGet),
            _ => Err(StraicoError::configuration(
                resource.as_str(),
                operation.as_str(),
            )),
        }
    }

    pub fn resource(self) -> Resource {
        match self {
            Self::ModelsGet => Resource::Models,
            Self::PromptCompletionExecute => Resource::PromptCompletion,
            Self::RagGet | Self::RagDelete | Self::RagUpdate | Self::RagPrompt => Resource::Rag,
            Self::AgentsGet => Resource::Agents,
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            Self::ModelsGet | Self::RagGet | Self::AgentsGet => Operation::Get,
            Self::PromptCompletionExecute => Operation::Execute,
            Self::RagDelete => Operation::Delete,
            Self::RagUpdate => Operation::Update,
            Self::RagPrompt => Operation::Prompt,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ModelsGet => "Get a list of available models",
            Self::PromptCompletionExecute => "Execute a prompt completion",
            Self::RagGet => "Get details about a RAG",
            Self::RagDelete => "Delete a RAG",
            Self::RagUpdate => "Update a RAG",
            Self::RagPrompt => "Execute a RAG prompt",
            Self::AgentsGet => "Get a list of agents",
        }
    }
}
