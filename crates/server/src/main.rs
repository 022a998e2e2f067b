use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use joingate_core::FileId;
use joingate_crypto::TokenCodec;
use joingate_gateway::deep_link;
use joingate_platform::Platform;
use joingate_server::build_gateway;
use joingate_server::config::{ConfigError, JoingateConfig};
use joingate_server::dispatcher::Dispatcher;
use joingate_server::state_factory::create_record_store;
use joingate_telegram::TelegramClient;

/// Telegram bot that hands out archived files to channel members.
#[derive(Parser, Debug)]
#[command(name = "joingate", about = "Gate file delivery behind channel membership")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "joingate.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot. This is the default.
    Run,
    /// Print the signed token and deep link for an archived file id.
    Token {
        /// Identifier of an existing file record.
        file_id: String,

        /// Bot username for the deep link. Looked up with `getMe` when omitted.
        #[arg(long)]
        bot_username: Option<String>,
    },
    /// Validate the configuration and print the parsed join targets.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = Path::new(&cli.config);
    let config = JoingateConfig::load(config_path)?;
    joingate_server::telemetry::init(&config.logging);

    if !config_path.exists() {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Token {
            file_id,
            bot_username,
        } => print_token(&config, &file_id, bot_username).await,
        Commands::CheckConfig => check_config(&config),
    }
}

async fn run(config: JoingateConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let telegram_config = config
        .bot
        .telegram_config()
        .ok_or(ConfigError::Missing("bot.token"))?;
    let store = create_record_store(&config.state)?;
    let client = Arc::new(TelegramClient::new(telegram_config)?);

    let gateway = build_gateway(&config, client.clone(), store).await?;
    let gateway = Arc::new(gateway);

    info!(
        targets = gateway.settings().targets.len(),
        admins = gateway.settings().admins.len(),
        archive_chat = %gateway.settings().archive_chat,
        "gate configured"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    Dispatcher::new(
        client,
        Arc::clone(&gateway),
        config.bot.max_concurrent_updates,
    )
    .run(shutdown)
    .await;

    let snapshot = gateway.metrics().snapshot();
    info!(?snapshot, "joingate stopped");
    Ok(())
}

async fn print_token(
    config: &JoingateConfig,
    raw_id: &str,
    bot_username: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let secret = config
        .gate
        .secret_key
        .as_ref()
        .ok_or(ConfigError::Missing("gate.secret_key"))?;
    let codec = TokenCodec::from_secret(secret)?;
    let file_id = FileId::parse(raw_id)?;

    // The in-memory store starts empty in every process, so only persistent
    // backends can confirm the record exists.
    if config.state.backend != "memory" {
        let store = create_record_store(&config.state)?;
        if store.get(&file_id).await?.is_none() {
            warn!(file_id = %file_id, "no record with this id in the configured store");
        }
    }

    let token = codec.issue(file_id.as_str());
    println!("{token}");

    let username = match (bot_username, config.bot.telegram_config()) {
        (Some(username), _) => Some(username),
        (None, Some(telegram_config)) => {
            let client = TelegramClient::new(telegram_config)?;
            Some(client.get_me().await?.username)
        }
        (None, None) => None,
    };
    match username {
        Some(username) => println!("{}", deep_link(&username, &token)),
        None => warn!("no bot token configured and no --bot-username given; deep link omitted"),
    }
    Ok(())
}

fn check_config(config: &JoingateConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    if let Some(secret) = &config.gate.secret_key {
        TokenCodec::from_secret(secret)?;
    }

    println!("configuration OK");
    println!("state backend: {}", config.state.backend);
    if let Some(chat) = &config.gate.archive_chat {
        println!("archive chat: {chat}");
    }
    println!("admins: {}", config.gate.admins.len());
    println!("join targets: {}", config.gate.targets.len());
    for (i, target) in config.gate.targets.iter().enumerate() {
        let note = if target.is_checkable() {
            ""
        } else {
            "  [membership cannot be checked]"
        };
        println!(
            "  {}. check {} / join {}{note}",
            i + 1,
            target.check_ref(),
            target.join_url()
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
