//! Binary entry point for the parlo relay.
//!
//! With no subcommand the relay server starts; `send` and `history` are
//! operator utilities that reuse the same configuration and store.

use {
    clap::{Parser, Subcommand},
    parlo_core::{DeliverySender, HistoryStore},
    parlo_gateway::RelayConfig,
    parlo_history::SqliteHistoryStore,
    parlo_whatsapp::CloudApiSender,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "parlo", about = "Parlo — WhatsApp conversational relay")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides PARLO_BIND).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides PARLO_PORT).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Path to the sqlite database file (overrides PARLO_DB).
    #[arg(long, global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server (default when no subcommand is provided).
    Serve,
    /// Send a text message through the WhatsApp Cloud API.
    Send {
        /// WhatsApp id of the recipient.
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        message: String,
    },
    /// Show the stored conversation for a user.
    History {
        /// WhatsApp id of the user.
        user: String,
        /// Number of most recent messages to show.
        #[arg(long, default_value_t = parlo_core::DEFAULT_HISTORY_LIMIT)]
        limit: u32,
        /// Show only the most recent user-authored message.
        #[arg(long, default_value_t = false)]
        last: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match cli.command {
        // Default: start the relay when no subcommand is provided.
        None | Some(Commands::Serve) => {
            info!(version = env!("CARGO_PKG_VERSION"), "parlo starting");

            let mut config = RelayConfig::from_env()?;
            if let Some(bind) = cli.bind {
                config.bind = bind;
            }
            if let Some(port) = cli.port {
                config.port = port;
            }
            if let Some(db) = cli.db {
                config.db_path = db;
            }
            parlo_gateway::start_server(config).await
        },
        Some(Commands::Send { to, message }) => {
            let config = RelayConfig::from_env()?;
            let sender = CloudApiSender::new(config.whatsapp);

            let receipt = sender.send_text(&to, &message).await;
            if !receipt.success {
                anyhow::bail!("send to {to} failed");
            }
            println!(
                "sent to {to} ({})",
                receipt.external_message_id.as_deref().unwrap_or("no id")
            );
            Ok(())
        },
        Some(Commands::History { user, limit, last }) => {
            let db = cli
                .db
                .or_else(|| std::env::var("PARLO_DB").ok())
                .unwrap_or_else(|| "parlo.db".into());
            let pool = sqlx::SqlitePool::connect(&format!("sqlite:{db}?mode=rwc")).await?;
            SqliteHistoryStore::init(&pool).await?;
            let store = SqliteHistoryStore::new(pool);

            if last {
                match store.last_user_message(&user).await? {
                    Some(message) => println!("{}", message.content),
                    None => println!("No messages stored for {user}."),
                }
                return Ok(());
            }

            let messages = store.list_by_user(&user, limit).await?;
            if messages.is_empty() {
                println!("No messages stored for {user}.");
                return Ok(());
            }
            for message in &messages {
                let status = message
                    .delivery_status
                    .as_deref()
                    .map(|s| format!(" [{s}]"))
                    .unwrap_or_default();
                println!("{:>9}: {}{}", message.role, message.content, status);
            }
            Ok(())
        },
    }
}
