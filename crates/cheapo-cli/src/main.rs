mod preview;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cheapo-cli")]
#[command(about = "Cheapo bot operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage the Telegram webhook registration
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
    /// Run a search and print the rendered reply and keyboard
    Preview {
        /// Latitude of the search centre
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the search centre
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in metres (backend default when omitted)
        #[arg(long)]
        radius: Option<u32>,
        /// Page to render
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Delete the cached search state of a chat
    Forget {
        #[arg(allow_negative_numbers = true)]
        chat_id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum WebhookCommands {
    /// Point Telegram at `url`, sending the configured secret token
    Set { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = cheapo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Migrate => {
            let pool = connect(&config).await?;
            let applied = cheapo_db::run_migrations(&pool).await?;
            println!("migrations applied: {applied}");
        }
        Commands::Webhook {
            command: WebhookCommands::Set { url },
        } => {
            let telegram = cheapo_telegram::TelegramClient::from_app_config(&config)?;
            if config.webhook_secret.is_none() {
                tracing::warn!("registering webhook without a secret token");
            }
            telegram
                .set_webhook(&url, config.webhook_secret.as_deref())
                .await?;
            println!("webhook set to {url}");
        }
        Commands::Preview {
            lat,
            lng,
            radius,
            page,
        } => {
            let output = preview::run(&config, lat, lng, radius, page).await?;
            print!("{output}");
        }
        Commands::Forget { chat_id } => {
            let pool = connect(&config).await?;
            if cheapo_db::delete_conversation_state(&pool, chat_id).await? {
                println!("forgot state for chat {chat_id}");
            } else {
                println!("no state stored for chat {chat_id}");
            }
        }
    }

    Ok(())
}

async fn connect(config: &cheapo_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = cheapo_db::PoolConfig::from_app_config(config);
    Ok(cheapo_db::connect_pool(&config.database_url, pool_config).await?)
}
