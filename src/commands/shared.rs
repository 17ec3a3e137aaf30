use std::io::{self, Write};

use clap::Args;
use serde_json::{Value, json};

use crate::config::{OutputFormat, Overrides, Settings};
use crate::logging::{self, Verbosity};
use crate::straico::auth::EnvCredentialStore;
use crate::straico::operation::{Operation, Resource, Route};
use crate::straico::params::Batch;
use crate::straico::processor::{self, ItemProcessor, ProcessorOptions};
use crate::straico::transport::HttpTransport;

/// Connection, output and logging flags shared by every API command.
#[derive(Debug, Args, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(long, help = "Profile name from the config file")]
    pub profile: Option<String>,
    #[arg(long, help = "API base URL (default https://api.straico.com)")]
    pub base_url: Option<String>,
    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
    #[arg(long, value_parser = parse_output, help = "Output format: json or lines")]
    pub output: Option<OutputFormat>,
    #[arg(long, short = 'v', help = "Log requests to stderr")]
    pub verbose: bool,
    #[arg(long, short = 'q', help = "Suppress all logs")]
    pub quiet: bool,
}

impl ConnectionArgs {
    pub fn init_logging(&self) {
        logging::init(Verbosity::from_flags(self.verbose, self.quiet));
    }

    pub fn settings(&self, continue_on_fail: bool) -> Result<Settings, String> {
        let overrides = Overrides {
            profile: self.profile.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            continue_on_fail,
            output: self.output,
        };
        Settings::load(&overrides).map_err(|err| err.to_string())
    }
}

fn parse_output(raw: &str) -> Result<OutputFormat, String> {
    raw.parse()
        .map_err(|_| format!("Invalid output '{raw}'. Supported values: json, lines."))
}

pub fn transport(settings: &Settings) -> HttpTransport {
    HttpTransport::new(settings.base_url.clone()).with_timeout(settings.timeout)
}

pub fn credentials(settings: &Settings) -> EnvCredentialStore {
    EnvCredentialStore::new(settings.api_key_env.clone())
}

/// Sends every item of the batch and returns the output sequence.
pub async fn execute(
    settings: &Settings,
    resource: Resource,
    operation: Operation,
    batch: &Batch,
) -> Result<Vec<Value>, String> {
    let credentials = credentials(settings);
    tracing::debug!(
        base_url = %settings.base_url,
        api_key_env = credentials.var(),
        api_key_present = credentials.is_present(),
        "resolved connection"
    );
    let processor = ItemProcessor::new(
        transport(settings),
        credentials,
        ProcessorOptions {
            continue_on_fail: settings.continue_on_fail,
        },
    );
    processor
        .process(resource, operation, batch)
        .await
        .map_err(|err| err.to_string())
}

/// Builds every item's request without sending anything.
pub fn dry_run(
    settings: &Settings,
    resource: Resource,
    operation: Operation,
    batch: &Batch,
) -> Result<Vec<Value>, String> {
    let action = Route::resolve(resource, operation)
        .map(Route::description)
        .ok();
    let mut output = Vec::with_capacity(batch.items().len());
    for index in 0..batch.items().len() {
        match processor::build_item(resource, operation, batch, index) {
            Ok(descriptor) => output.push(json!({
                "dry_run": true,
                "action": action,
                "base_url": settings.base_url,
                "request": descriptor,
            })),
            Err(err) if settings.continue_on_fail => output.push(json!({ "error": err.to_string() })),
            Err(err) => return Err(err.to_string()),
        }
    }
    Ok(output)
}

pub fn print_values(values: &[Value], format: OutputFormat) -> Result<(), String> {
    let mut stdout = io::stdout().lock();
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(values)
            .map(|text| format!("{text}\n"))
            .map_err(|err| format!("Failed to render output: {err}"))?,
        OutputFormat::Lines => values
            .iter()
            .map(|value| serde_json::to_string(value).map(|line| format!("{line}\n")))
            .collect::<Result<String, _>>()
            .map_err(|err| format!("Failed to render output: {err}"))?,
    };
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| format!("Failed to write output: {err}"))
}
