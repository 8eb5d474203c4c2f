//! Precinct - incident case registry for citizens and police

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use precinct::{
    clock::SystemClock,
    config::Args,
    db::{
        AccountStore, CaseStore, InMemoryAccountStore, InMemoryCaseStore, MongoAccountStore,
        MongoCaseStore, MongoClient,
    },
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("precinct={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Precinct - incident case registry");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db: {})", args.mongodb_uri, args.mongodb_db);
    info!("Allowed origin: {}", args.allowed_origin);
    info!("Token lifetime: {}s", args.jwt_expiry_seconds);
    info!("======================================");

    // MongoDB is optional in dev mode
    let stores: Option<(Arc<dyn AccountStore>, Arc<dyn CaseStore>)> =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                let accounts = MongoAccountStore::new(&client).await?;
                let cases = MongoCaseStore::new(&client).await?;
                Some((Arc::new(accounts), Arc::new(cases)))
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory stores): {}", e);
                    None
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    let state = match stores {
        Some((accounts, cases)) => {
            AppState::new(args, accounts, cases, "mongodb", Arc::new(SystemClock))?
        }
        None => AppState::new(
            args,
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryCaseStore::new()),
            "memory",
            Arc::new(SystemClock),
        )?,
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
