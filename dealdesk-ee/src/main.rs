//! dealdesk-ee - Deal Evaluation Engine service
//!
//! HTTP service backing the deal-evaluation dashboards: criteria template
//! validation, external research enrichment, and weighted deal scoring.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dealdesk_common::events::EventBus;
use dealdesk_ee::services::{
    GoogleSearchClient, OpenAiClient, PerplexityClient, ProviderSet,
};
use dealdesk_ee::AppState;

#[derive(Parser, Debug)]
#[command(name = "dealdesk-ee", about = "DealDesk evaluation engine service")]
struct Args {
    /// Root data folder (overrides DEALDESK_ROOT and the TOML config)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port
    #[arg(long, default_value_t = 5810, env = "DEALDESK_EE_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting dealdesk-ee (Evaluation Engine) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder and open the shared database
    let root_folder = dealdesk_common::config::resolve_root_folder(
        args.root_folder.as_deref(),
        "DEALDESK_ROOT",
    )?;
    let db_path = dealdesk_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = dealdesk_common::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Provider keys resolve Database -> ENV -> TOML; missing required keys
    // abort startup here rather than degrading at request time.
    let toml_config = dealdesk_common::config::load_toml_config().unwrap_or_default();
    let keys = dealdesk_ee::config::resolve_provider_keys(&db_pool, &toml_config).await?;

    let providers = ProviderSet {
        research: std::sync::Arc::new(PerplexityClient::new(keys.perplexity_api_key)?),
        synthesis: std::sync::Arc::new(OpenAiClient::new(keys.openai_api_key)?),
        search: match keys.google_search {
            Some(google) => Some(std::sync::Arc::new(GoogleSearchClient::new(
                google.api_key,
                google.engine_id,
            )?)),
            None => None,
        },
    };

    let event_bus = EventBus::new(100);
    let state = AppState::new(db_pool, event_bus, providers);
    let app = dealdesk_ee::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("Listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
