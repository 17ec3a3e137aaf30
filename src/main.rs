use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use owo_colors::OwoColorize;
use straico::LONG_VERSION;
use straico::commands::complete::{self, CompleteArgs};
use straico::commands::config::{self, ConfigArgs};
use straico::commands::credential::{self, CredentialArgs};
use straico::commands::run::{self, RunArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  straico run --resource models --operation get\n  straico run --resource rag --operation prompt --param ragId=abc123 --param prompt=\"What changed?\"\n  straico run --resource rag --operation update --param ragId=abc123 --param fileBinaryData=true --file data=./notes.pdf\n  straico complete --model gpt-4o-mini \"2+2?\"\n  straico credential test\n  straico completion bash > ~/.local/share/bash-completion/completions/straico";

const RUN_HELP_EXAMPLES: &str = "Examples:\n  straico run --resource agents --operation get --output lines\n  straico run --resource rag --operation get --input items.json --continue-on-fail\n  straico run --resource promptCompletion --operation execute --param model=gpt-4o-mini --param message=hi --dry-run";

#[derive(Debug, Parser)]
#[command(
    name = "straico",
    about = "Command-line adapter for the Straico API",
    version = LONG_VERSION,
    propagate_version = true,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run one operation over a batch of input items", after_help = RUN_HELP_EXAMPLES)]
    Run(RunArgs),
    #[command(about = "Execute a single prompt completion")]
    Complete(CompleteArgs),
    #[command(about = "Check the configured API credential")]
    Credential(CredentialArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "straico", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "straico", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "straico", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Complete(args) => complete::run(args).await,
        Commands::Credential(args) => credential::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red().bold());
        process::exit(1);
    }
}
