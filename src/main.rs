use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wikidash::app::AppContext;
use wikidash::cli::{browse, commands, Cli, Commands};
use wikidash::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // RUST_LOG wins over the config file
    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.logging.level.as_deref().unwrap_or(default_level))
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let ctx = if cli.ephemeral {
        AppContext::in_memory(config)?
    } else {
        AppContext::new(config, None)?
    };

    match cli.command {
        Commands::Fetch {
            language,
            date,
            page,
            page_size,
        } => {
            commands::fetch_featured(&ctx, language, date, page, page_size).await?;
        }
        Commands::Languages { remote } => {
            if remote {
                commands::list_remote_languages(&ctx).await?;
            } else {
                commands::list_languages();
            }
        }
        Commands::Translate { text, target } => {
            commands::translate(&ctx, &text, &target).await?;
        }
        Commands::Browse { language, date } => {
            browse::run(&ctx, language, date).await?;
        }
        Commands::Serve { bind } => {
            commands::serve(&ctx, bind).await?;
        }
    }

    Ok(())
}
