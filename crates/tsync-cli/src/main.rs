//! tsync CLI - Main entry point

use clap::Parser;
use std::process;
use tracing::error;
use tsync_cli::commands::{self, sync::SyncRequest};
use tsync_cli::interrupt::cancel_on_ctrl_c;
use tsync_cli::{AppContext, Cli, Commands, ConfigCommand, MappingCommand, SelectCommand};
use tsync_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("tsync-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> tsync_cli::Result<()> {
    let ctx = AppContext::load(cli.graph_url.as_deref())?;

    match &cli.command {
        Commands::Sites => commands::sites::run(&ctx).await,

        Commands::Lists { site } => commands::lists::run(&ctx, site.clone()).await,

        Commands::Select { command } => match command {
            SelectCommand::Site { id } => commands::select::site(&ctx, id).await,
            SelectCommand::List { id } => commands::select::list(&ctx, id).await,
            SelectCommand::Show => commands::select::show(&ctx).await,
        },

        Commands::Columns => commands::columns::run(&ctx).await,

        Commands::Messages { limit } => commands::messages::run(&ctx, *limit).await,

        Commands::Mapping { command } => match command {
            MappingCommand::Show => commands::mapping::show(&ctx).await,
            MappingCommand::Set { field, column } => {
                commands::mapping::set(&ctx, field, column).await
            },
            MappingCommand::Unset { field } => commands::mapping::unset(&ctx, field).await,
            MappingCommand::Auto { save } => commands::mapping::auto(&ctx, *save).await,
            MappingCommand::Delete => commands::mapping::delete(&ctx).await,
        },

        Commands::Sync {
            ids,
            all,
            limit,
            to,
        } => {
            let cancel = cancel_on_ctrl_c();
            let request = SyncRequest {
                ids: ids.clone(),
                all: *all,
                limit: *limit,
                to: to.clone(),
            };
            commands::sync::run(&ctx, request, cancel).await.map(|_| ())
        },

        Commands::Reset { yes } => commands::reset::run(&ctx, *yes).await,

        Commands::Config { command } => match command {
            ConfigCommand::Get { key } => commands::config::get(&ctx.config, key).await,
            ConfigCommand::Show => commands::config::show(&ctx.config).await,
        },
    }
}
