/// Tapcard - digital business-card directory server
///
/// Serves public card profiles at username-keyed URLs and the admin
/// dashboard API that manages them.

mod account;
mod api;
mod auth;
mod config;
mod context;
mod db;
mod directory;
mod error;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tapcard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   __                                  __
  / /_____ _____  _________ ___________/ /
 / __/ __ `/ __ \/ ___/ __ `/ ___/ __  /
/ /_/ /_/ / /_/ / /__/ /_/ / /  / /_/ /
\__/\__,_/ .___/\___/\__,_/_/   \__,_/
        /_/

        Tapcard directory server v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
