use std::env;
use std::io::{self, IsTerminal};

use clap::Args;
use serde_json::{Map, Value};

use crate::commands::shared::{self, ConnectionArgs};
use crate::straico::operation::{Operation, Resource};
use crate::straico::params::{Batch, InputItem};

#[derive(Debug, Args, Clone)]
pub struct CompleteArgs {
    #[arg(long, short = 'm', help = "Model id (or set STRAICO_MODEL)")]
    pub model: Option<String>,
    #[arg(long, short = 't', help = "Sampling temperature, 0 to 2")]
    pub temperature: Option<f64>,
    #[arg(long, help = "Maximum number of tokens to generate")]
    pub max_tokens: Option<u64>,
    #[arg(long, help = "Print the request instead of sending it")]
    pub dry_run: bool,
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[arg(help = "Message to complete; read from stdin when omitted")]
    pub message: Option<String>,
}

pub async fn run(args: CompleteArgs) -> Result<(), String> {
    args.connection.init_logging();
    let settings = args.connection.settings(false)?;

    let model = args
        .model
        .clone()
        .or_else(|| env::var("STRAICO_MODEL").ok())
        .filter(|model| !model.trim().is_empty())
        .ok_or_else(|| "No model provided. Use --model or set STRAICO_MODEL.".to_string())?;
    let message = read_message(args.message.as_deref())?;
    if let Some(temperature) = args.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(format!(
                "Invalid temperature '{temperature}'. Expected a value between 0 and 2."
            ));
        }
    }

    let batch = Batch::new(vec![completion_item(
        model,
        message,
        args.temperature,
        args.max_tokens,
    )]);
    let resource = Resource::PromptCompletion;
    let operation = Operation::Execute;

    let output = if args.dry_run {
        shared::dry_run(&settings, resource, operation, &batch)?
    } else {
        shared::execute(&settings, resource, operation, &batch).await?
    };
    shared::print_values(&output, settings.output)
}

fn read_message(argument: Option<&str>) -> Result<String, String> {
    if let Some(message) = argument.filter(|message| !message.trim().is_empty()) {
        return Ok(message.to_string());
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err("No message provided. Pass it as an argument or pipe it on stdin.".to_string());
    }
    let message =
        io::read_to_string(stdin).map_err(|err| format!("Failed to read stdin: {err}"))?;
    if message.trim().is_empty() {
        return Err("No message provided. Pass it as an argument or pipe it on stdin.".to_string());
    }
    Ok(message)
}

fn completion_item(
    model: String,
    message: String,
    temperature: Option<f64>,
    max_tokens: Option<u64>,
) -> InputItem {
    let mut additional = Map::new();
    if let Some(temperature) = temperature {
        additional.insert("temperature".to_string(), Value::from(temperature));
    }
    if let Some(max_tokens) = max_tokens {
        additional.insert("max_tokens".to_string(), Value::from(max_tokens));
    }
    InputItem::new()
        .with_param("model", model)
        .with_param("message", message)
        .with_param("additionalFields", Value::Object(additional))
}
