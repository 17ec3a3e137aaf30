use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::commands::shared::{self, ConnectionArgs};
use crate::straico::operation::{Operation, Resource};
use crate::straico::params::{Attachment, Batch, InputItem};

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[arg(long, value_parser = parse_resource, help = "models, promptCompletion, rag or agents")]
    pub resource: Resource,
    #[arg(long, value_parser = parse_operation, help = "get, execute, delete, update or prompt")]
    pub operation: Operation,
    #[arg(long, short = 'i', help = "JSON file with input items ('-' for stdin)")]
    pub input: Option<PathBuf>,
    #[arg(
        long = "param",
        short = 'p',
        value_name = "KEY=VALUE",
        help = "Parameter applied to every item; VALUE is parsed as JSON, else taken as text"
    )]
    pub params: Vec<String>,
    #[arg(
        long = "file",
        value_name = "FIELD=PATH",
        help = "Attach a file to every item under a binary field"
    )]
    pub files: Vec<String>,
    #[arg(long, help = "Record per-item failures instead of aborting")]
    pub continue_on_fail: bool,
    #[arg(long, help = "Print the requests instead of sending them")]
    pub dry_run: bool,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

fn parse_resource(raw: &str) -> Result<Resource, String> {
    raw.parse()
}

fn parse_operation(raw: &str) -> Result<Operation, String> {
    raw.parse()
}

pub async fn run(args: RunArgs) -> Result<(), String> {
    args.connection.init_logging();
    let settings = args.connection.settings(args.continue_on_fail)?;

    let mut items = match &args.input {
        Some(path) => read_items(path)?,
        None => vec![InputItem::new()],
    };
    for raw in &args.params {
        let (key, value) = parse_param(raw)?;
        for item in &mut items {
            item.params.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    for raw in &args.files {
        let (field, attachment) = load_file(raw)?;
        for item in &mut items {
            item.binary
                .entry(field.clone())
                .or_insert_with(|| attachment.clone());
        }
    }
    let batch = Batch::new(items);
    info!(items = batch.items().len(), dry_run = args.dry_run, "input loaded");

    let output = if args.dry_run {
        shared::dry_run(&settings, args.resource, args.operation, &batch)?
    } else {
        shared::execute(&settings, args.resource, args.operation, &batch).await?
    };
    shared::print_values(&output, settings.output)
}

/// Reads a JSON array of items, or a single item object.
pub fn read_items(path: &Path) -> Result<Vec<InputItem>, String> {
    let raw = if path == Path::new("-") {
        io::read_to_string(io::stdin()).map_err(|err| format!("Failed to read stdin: {err}"))?
    } else {
        fs::read_to_string(path)
            .map_err(|err| format!("Failed to read input file '{}': {err}", path.display()))?
    };
    parse_items(&raw).map_err(|err| format!("Invalid input items in '{}': {err}", path.display()))
}

fn parse_items(raw: &str) -> Result<Vec<InputItem>, serde_json::Error> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(values) => values.into_iter().map(serde_json::from_value).collect(),
        value => Ok(vec![serde_json::from_value(value)?]),
    }
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| format!("Invalid --param '{raw}'. Expected KEY=VALUE."))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

fn load_file(raw: &str) -> Result<(String, Attachment), String> {
    let (field, path) = raw
        .split_once('=')
        .filter(|(field, path)| !field.trim().is_empty() && !path.is_empty())
        .ok_or_else(|| format!("Invalid --file '{raw}'. Expected FIELD=PATH."))?;
    let path = Path::new(path);
    let data = fs::read(path)
        .map_err(|err| format!("Failed to read file '{}': {err}", path.display()))?;

    let mut attachment = Attachment::new(data);
    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        attachment = attachment.with_file_name(name);
    }
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        attachment = attachment.with_mime_type(mime);
    }
    Ok((field.trim().to_string(), attachment))
}
