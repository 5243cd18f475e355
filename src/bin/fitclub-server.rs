// ABOUTME: Fitness club API server binary
// ABOUTME: Loads configuration, prepares the database, seeds default accounts, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # FitClub Server Binary

use anyhow::Result;
use clap::Parser;
use fitclub_server::{
    config::environment::ServerConfig, database::seed::seed_default_users, database::Database,
    logging, resources::ServerResources, server::ClubServer,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fitclub-server")]
#[command(about = "Fitness club management API with role-based access and PDF reports")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;
    info!("Starting FitClub Server");
    info!("{}", config.summary());

    let database = Database::new(
        &config.database.url.to_connection_string(),
        config.database.max_connections,
    )
    .await?;
    info!("Database ready: {}", config.database.url);

    let today = chrono::Utc::now().date_naive();
    let expired = database
        .memberships()
        .refresh_expired_memberships(today)
        .await?;
    if expired > 0 {
        info!(expired, "Marked memberships past their end date as expired");
    }

    if config.club.seed_default_users {
        seed_default_users(&database, config.auth.bcrypt_cost).await?;
    }

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, Arc::new(config)));

    if let Err(e) = ClubServer::new(resources).run(port).await {
        error!("Server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
