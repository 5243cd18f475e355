// ABOUTME: Command-line tool for club administration tasks outside the HTTP API
// ABOUTME: Creates staff accounts, resets passwords, sweeps expired memberships, exports reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! Usage:
//! ```bash
//! # Create a manager account
//! fitclub-admin create-user --username anna --password secret1 --role manager
//!
//! # Reset a forgotten password
//! fitclub-admin set-password --username anna --password newsecret
//!
//! # Mark memberships past their end date as expired
//! fitclub-admin expire-memberships
//!
//! # Write the revenue report to a file
//! fitclub-admin export-report revenue --output revenue.pdf --date-from 2025-01-01
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fitclub_core::constants::{auth::MIN_PASSWORD_LENGTH, defaults};
use fitclub_core::models::UserRole;
use fitclub_server::{
    auth::hash_password,
    config::environment::ServerConfig,
    database::{users::UserRecord, Database},
    reports::{render, ReportFormat, ReportKind, ReportParams, ReportService},
};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "fitclub-admin",
    about = "FitClub administration CLI",
    long_about = "Manage staff accounts, membership expiry, and report exports directly against the club database."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a staff account
    CreateUser {
        /// Login name
        #[arg(long)]
        username: String,

        /// Password
        #[arg(long)]
        password: String,

        /// Role: admin, manager, or trainer
        #[arg(long, default_value = "admin")]
        role: String,

        /// Trainer record to link a trainer account to
        #[arg(long)]
        trainer_id: Option<i64>,
    },

    /// Replace an account's password
    SetPassword {
        /// Login name
        #[arg(long)]
        username: String,

        /// New password
        #[arg(long)]
        password: String,
    },

    /// Mark memberships whose end date has passed as expired
    ExpireMemberships,

    /// Render a report to a file
    ExportReport {
        /// revenue, attendance, trainer_performance, or expiring_memberships
        kind: String,

        /// Output file
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// pdf or json
        #[arg(long, default_value = "pdf")]
        format: String,

        /// First day of the revenue period
        #[arg(long)]
        date_from: Option<NaiveDate>,

        /// Last day of the revenue period
        #[arg(long)]
        date_to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let database_url = cli
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());
    info!("Connecting to database: {database_url}");
    let database = Database::new(&database_url, 1).await?;

    match cli.command {
        Command::CreateUser {
            username,
            password,
            role,
            trainer_id,
        } => create_user(&database, &username, &password, &role, trainer_id).await,
        Command::SetPassword { username, password } => {
            set_password(&database, &username, &password).await
        }
        Command::ExpireMemberships => {
            let today = chrono::Utc::now().date_naive();
            let expired = database
                .memberships()
                .refresh_expired_memberships(today)
                .await?;
            println!("Marked {expired} membership(s) as expired");
            Ok(())
        }
        Command::ExportReport {
            kind,
            output,
            format,
            date_from,
            date_to,
        } => export_report(database, &kind, &output, &format, date_from, date_to).await,
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        bail!("Password must be at least {MIN_PASSWORD_LENGTH} characters");
    }
    Ok(())
}

fn bcrypt_cost() -> u32 {
    env::var("BCRYPT_COST")
        .ok()
        .and_then(|cost| cost.parse().ok())
        .unwrap_or(fitclub_core::constants::auth::DEFAULT_BCRYPT_COST)
}

async fn create_user(
    database: &Database,
    username: &str,
    password: &str,
    role: &str,
    trainer_id: Option<i64>,
) -> Result<()> {
    let role = UserRole::parse(role)
        .with_context(|| format!("Unknown role '{role}', expected admin, manager, or trainer"))?;
    check_password(password)?;
    if trainer_id.is_some() && role != UserRole::Trainer {
        bail!("Only trainer accounts can be linked to a trainer record");
    }

    let password_hash = hash_password(password, bcrypt_cost()).await?;
    let user = database
        .users()
        .create(
            &UserRecord {
                username: username.trim().to_owned(),
                email: None,
                role,
                trainer_id,
                is_active: true,
            },
            &password_hash,
        )
        .await?;

    println!("Created {} account '{}' (id {})", user.role, user.username, user.id);
    Ok(())
}

async fn set_password(database: &Database, username: &str, password: &str) -> Result<()> {
    check_password(password)?;
    let password_hash = hash_password(password, bcrypt_cost()).await?;
    if !database
        .users()
        .set_password_hash(username, &password_hash)
        .await?
    {
        bail!("No account named '{username}'");
    }
    println!("Password updated for '{username}'");
    Ok(())
}

async fn export_report(
    database: Database,
    kind: &str,
    output: &Path,
    format: &str,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> Result<()> {
    let kind: ReportKind = kind.parse()?;
    let format = ReportFormat::from_str_param(format);

    let club = ServerConfig::from_env()
        .map(|config| config.club)
        .unwrap_or_else(|_| ServerConfig::default().club);
    let service = ReportService::new(Arc::new(database), club);

    let params = ReportParams {
        date_from,
        date_to,
        ..ReportParams::now()
    };
    let document = service.build(kind, &params).await?;
    let rendered = render(&document, format)?;

    tokio::fs::write(output, &rendered.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} report ({} bytes) to {}",
        kind,
        rendered.bytes.len(),
        output.display()
    );
    Ok(())
}
