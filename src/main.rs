use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiterm::{
    app::ConfigStore,
    cli::{commands, Cli},
    runtime::{Runtime, SECURITY_NEWS_REQUEST},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "kiterm=debug" } else { "kiterm=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Configuration commands work without an API key
    if cli.setup || cli.init || cli.edit_instructions.is_some() {
        let store = ConfigStore::open()?;
        if cli.init {
            return commands::reset_config(&store);
        }
        if let Some(mode) = &cli.edit_instructions {
            return commands::edit_instructions(&store, mode);
        }
        return commands::open_config(&store);
    }

    let runtime = Runtime::new()?;

    if cli.security_news {
        runtime
            .run_one_shot("security", Some(SECURITY_NEWS_REQUEST.to_string()), false)
            .await
    } else if let Some(text) = cli.mail {
        runtime.run_one_shot("mail", text, true).await
    } else if let Some(text) = cli.translate {
        runtime.run_one_shot("translate", text, true).await
    } else if cli.websearch {
        runtime.run_interactive("websearch", cli.resume).await
    } else if let Some(codex) = cli.codex {
        match codex {
            Some(text) => runtime.run_one_shot("codex", Some(text), true).await,
            None => runtime.run_interactive("codex", cli.resume).await,
        }
    } else {
        runtime.run_interactive("normal", cli.resume).await
    }
}
