//! Batch driver: one build → authenticate → send → normalize pass per item.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::straico::auth::{self, CredentialStore};
use crate::straico::error::StraicoError;
use crate::straico::normalize::normalize;
use crate::straico::operation::{Operation, Resource, Route};
use crate::straico::params::{BinaryStore, ItemParams, ParameterResolver};
use crate::straico::request::{self, RequestDescriptor};
use crate::straico::transport::Transport;

/// Binary field read for file uploads when the item does not name one.
pub const DEFAULT_FILE_DATA_FIELD: &str = "data";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessorOptions {
    /// Record failures as `{"error": message}` instead of aborting the batch.
    pub continue_on_fail: bool,
}

pub struct ItemProcessor<T, C> {
    transport: T,
    credentials: C,
    options: ProcessorOptions,
}

impl<T, C> ItemProcessor<T, C>
where
    T: Transport,
    C: CredentialStore,
{
    pub fn new(transport: T, credentials: C, options: ProcessorOptions) -> Self {
        Self {
            transport,
            credentials,
            options,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Processes every item in order and returns the output sequence.
    ///
    /// Without continue-on-fail the first failure is returned and no partial
    /// output survives.
    pub async fn process<B>(
        &self,
        resource: Resource,
        operation: Operation,
        batch: &B,
    ) -> Result<Vec<Value>, StraicoError>
    where
        B: ParameterResolver + BinaryStore + Sync,
    {
        let count = batch.item_count();
        let action = Route::resolve(resource, operation)
            .map(Route::description)
            .unwrap_or("unsupported");
        info!(%resource, %operation, action, items = count, "processing batch");

        let mut output = Vec::with_capacity(count);
        for index in 0..count {
            match self.process_item(resource, operation, batch, index).await {
                Ok(value) => normalize(value, &mut output),
                Err(err) if self.options.continue_on_fail => {
                    warn!(index, kind = err.kind(), error = %err, "item failed, continuing");
                    output.push(json!({ "error": err.to_string() }));
                }
                Err(err) => {
                    warn!(index, kind = err.kind(), error = %err, "item failed, aborting batch");
                    return Err(err);
                }
            }
        }

        info!(outputs = output.len(), "batch finished");
        Ok(output)
    }

    async fn process_item<B>(
        &self,
        resource: Resource,
        operation: Operation,
        batch: &B,
        index: usize,
    ) -> Result<Value, StraicoError>
    where
        B: ParameterResolver + BinaryStore + Sync,
    {
        let descriptor = build_item(resource, operation, batch, index)?;
        let credential = self.credentials.credential()?;
        let descriptor = auth::attach(descriptor, &credential)?;
        debug!(
            index,
            method = %descriptor.method,
            path = %descriptor.path,
            body = descriptor.body.kind(),
            "item request built"
        );
        Ok(self.transport.send(&descriptor).await?)
    }
}

/// Builds the unauthenticated request for one item, selecting its file
/// attachment from the field named by `fileDataField`.
pub fn build_item<B>(
    resource: Resource,
    operation: Operation,
    batch: &B,
    index: usize,
) -> Result<RequestDescriptor, StraicoError>
where
    B: ParameterResolver + BinaryStore,
{
    let route = Route::resolve(resource, operation)?;
    let params = ItemParams::new(batch, index);
    let attachment = if route == Route::RagUpdate && params.boolean("fileBinaryData")? {
        let field = params
            .string("fileDataField")?
            .filter(|field| !field.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_DATA_FIELD.to_string());
        batch.binary(index, &field)
    } else {
        None
    };
    request::build(resource, operation, &params, attachment)
}
