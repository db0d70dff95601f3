use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopminder::auth::{GoTrueAuth, SessionStorage};
use shopminder::commands::{
    config_error_view, explain, AuthCommand, ConfigCommand, ItemCommand, ListCommand,
};
use shopminder::{Config, PostgrestStore, SupabaseClient, ViewController};

#[derive(Parser)]
#[command(name = "shopminder")]
#[command(version)]
#[command(about = "Shopping lists backed by a hosted Supabase project", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, sign in and sign out
    Auth(AuthCommand),

    /// Manage shopping lists
    List(ListCommand),

    /// Manage the items of a list
    Item(ItemCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopminder=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Where a parsed invocation goes once the config is known.
enum Route {
    Config(ConfigCommand),
    Help,
    /// Backend settings are missing; holds the view listing them.
    NotConfigured(String),
    Backend(Commands),
}

fn route(command: Option<Commands>, config: &Config) -> Route {
    let command = match command {
        Some(Commands::Config(cmd)) => return Route::Config(cmd),
        Some(command) => command,
        None => return Route::Help,
    };

    let missing = config.missing_backend_settings();
    if !missing.is_empty() {
        return Route::NotConfigured(config_error_view(&missing));
    }
    Route::Backend(command)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    let command = match route(cli.command, &config) {
        Route::Config(cmd) => return cmd.run(&config),
        Route::Help => {
            println!("Use --help to see available commands");
            return Ok(());
        }
        Route::NotConfigured(view) => {
            print!("{}", view);
            std::process::exit(1);
        }
        Route::Backend(command) => command,
    };

    let client = Arc::new(SupabaseClient::from_config(&config)?);
    tracing::debug!("Backend: {}", client.base_url());
    let store = Arc::new(PostgrestStore::new(client.clone()));
    let auth = Arc::new(GoTrueAuth::new(
        client,
        SessionStorage::new(config.session_path()),
    ));

    match command {
        Commands::Auth(cmd) => {
            cmd.run(auth.as_ref(), &config).await?;
        }
        Commands::List(cmd) => {
            let mut controller = ViewController::new(store, auth);
            controller
                .start()
                .await
                .map_err(|e| explain(&controller, e.into()))?;
            cmd.run(&mut controller).await?;
        }
        Commands::Item(cmd) => {
            let mut controller = ViewController::new(store, auth);
            controller
                .start()
                .await
                .map_err(|e| explain(&controller, e.into()))?;
            cmd.run(&mut controller).await?;
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
