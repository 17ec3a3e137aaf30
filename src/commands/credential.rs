use clap::{Args, Subcommand};

use crate::commands::shared::{self, ConnectionArgs};
use crate::straico::transport;

#[derive(Debug, Args, Clone)]
pub struct CredentialArgs {
    #[command(subcommand)]
    command: CredentialSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum CredentialSubcommand {
    #[command(about = "Check the API key against GET /v0/models")]
    Test {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

pub async fn run(args: CredentialArgs) -> Result<(), String> {
    match args.command {
        CredentialSubcommand::Test { connection } => {
            connection.init_logging();
            let settings = connection.settings(false)?;
            transport::verify_credential(
                &shared::transport(&settings),
                &shared::credentials(&settings),
            )
            .await
            .map_err(|err| format!("credential test failed: {err}"))?;
            println!("credential OK: {}", settings.base_url);
            Ok(())
        }
    }
}
