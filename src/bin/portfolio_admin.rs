//! Operator tasks that run against the configured database.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use portfolio_cms::{
    db::postgres::{create_pool, run_migrations},
    entities::about::AboutPatch,
    settings::AppConfig,
    use_cases::{about::AboutFiles, auth::AdminProvision},
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "portfolio_admin", version, about = "Administrative tasks for the portfolio CMS")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the admin account. Does nothing if it already exists.
    CreateAdmin {
        /// Defaults to the configured `admin_username`
        #[arg(long)]
        username: Option<String>,

        /// Defaults to the configured `admin_password`
        #[arg(long, env = "APP_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Overwrite the password of an existing account
        #[arg(long)]
        reset_password: bool,
    },
    /// Create or replace the About record from a JSON file.
    SeedAbout {
        #[arg(long, default_value = "about.json")]
        file: PathBuf,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::new().context("Failed to load configuration")?;
    let pool = create_pool(&config.database_url, 2)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool).await.context("Failed to run migrations")?;

    match cli.command {
        Command::Migrate => {
            println!("Migrations applied");
        }
        Command::CreateAdmin { username, password, reset_password } => {
            let username = username.unwrap_or_else(|| config.admin_username.clone());
            let Some(password) = password.or_else(|| config.admin_password.clone()) else {
                bail!("No password given: pass --password or set APP_ADMIN_PASSWORD");
            };

            let state = AppState::new(&config, pool)?;
            match state.auth_handler.provision_admin(&username, &password, reset_password).await? {
                AdminProvision::Created => println!("Admin user created: {}", username),
                AdminProvision::PasswordReset => println!("Password reset for admin: {}", username),
                AdminProvision::AlreadyExists => println!("Admin already exists: {}", username),
            }
        }
        Command::SeedAbout { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let patch: AboutPatch = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid About document", file.display()))?;

            let state = AppState::new(&config, pool)?;
            let about = state.about_handler.update(patch, AboutFiles::default()).await?;
            println!("About seeded for {}", about.name);
        }
    }

    Ok(())
}
