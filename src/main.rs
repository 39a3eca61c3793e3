use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod migrations;
mod state;
#[cfg(test)]
mod test_helpers;
mod users;

use crate::{
    config::{AppConfig, DatabaseConfig},
    state::AppState,
    users::repo::PgUserStore,
};

#[derive(Debug, Parser)]
#[command(name = "todoapp-users", about = "Todo application user service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Inspect or change the database schema.
    #[command(subcommand)]
    Migrate(MigrateCommand),
}

#[derive(Debug, Subcommand)]
enum MigrateCommand {
    /// Apply every pending migration.
    Upgrade,
    /// Revert to `--target` (0 = empty schema); one step back when omitted.
    Downgrade {
        #[arg(long)]
        target: Option<i64>,
    },
    /// List migrations and whether each is applied.
    History,
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "todoapp_users=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    // Migrations only need the database; JWT settings are required for serving.
    let (config, db_config) = match command {
        Command::Serve => {
            let config = Arc::new(AppConfig::from_env()?);
            let db_config = config.database.clone();
            (Some(config), db_config)
        }
        Command::Migrate(_) => (None, DatabaseConfig::from_env()),
    };
    let pool = db::connect(&db_config).await?;

    match command {
        Command::Serve => {
            let config = config.context("serve requires app config")?;
            if config.database.run_migrations {
                migrations::upgrade(&pool).await?;
            }
            let users = Arc::new(PgUserStore::new(pool));
            let state = AppState::new(config.clone(), users);
            app::serve(app::build_app(state), &config.host, config.port).await?;
        }
        Command::Migrate(MigrateCommand::Upgrade) => migrations::upgrade(&pool).await?,
        Command::Migrate(MigrateCommand::Downgrade { target }) => {
            let target = match target {
                Some(t) => t,
                None => migrations::previous_revision(&pool).await?,
            };
            migrations::downgrade(&pool, target).await?;
        }
        Command::Migrate(MigrateCommand::History) => {
            for rev in migrations::history(&pool).await? {
                let down = rev
                    .down_revision
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<base>".into());
                let mark = if rev.applied { "applied" } else { "pending" };
                println!("{down} -> {} ({mark}) {}", rev.version, rev.description);
            }
        }
    }

    Ok(())
}
