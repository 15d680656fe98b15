//! sub-serve - HTTP service for flair lookup and posting to Reddit

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use libsubcast::platforms::reddit::RedditClient;
use libsubcast::platforms::Platform;
use libsubcast::{logging, Config, Result};
use sub_serve::{build_router, AppState};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sub-serve")]
#[command(version)]
#[command(about = "HTTP service for Reddit flair lookup and posting")]
#[command(long_about = "\
sub-serve - HTTP service for Reddit flair lookup and posting

DESCRIPTION:
    sub-serve holds one authenticated Reddit session and exposes it over
    HTTP. Every route except GET / requires the configured bearer token.

ROUTES:
    GET  /                         Liveness check (no auth)
    GET  /secure-ping              Token check
    GET  /subreddit-flairs/{name}  List a community's post flairs
    POST /post/{name}              Submit a text or link post

CONFIGURATION:
    Read from the environment, or from a .env file in the working directory.

    REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_USER_AGENT,
    REDDIT_USERNAME, REDDIT_PASSWORD   Reddit script app credentials
    BEARER_TOKEN                       Token clients must present
    SUBCAST_BIND                       Listen address (default 127.0.0.1:8000)
    SUBCAST_LOG_FORMAT, SUBCAST_LOG_LEVEL, SUBCAST_LOG_FILE

SIGNALS:
    SIGINT - Graceful shutdown (in-flight requests finish)

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Configuration error
")]
struct Cli {
    /// Listen address (overrides SUBCAST_BIND)
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    logging::from_env(cli.verbose).init();

    info!("Starting sub-serve v{}", env!("CARGO_PKG_VERSION"));

    let reddit = RedditClient::new(config.reddit)?;

    // Credential problems show up in the log now rather than on the first request
    match reddit.authenticate().await {
        Ok(()) => info!("Authenticated with {}", reddit.name()),
        Err(e) => warn!(
            "{} authentication failed, will retry per request: {}",
            reddit.name(),
            e
        ),
    }

    let state = AppState::new(Arc::new(reddit), config.server.bearer_token);
    let app = build_router(state);

    let bind = cli.bind.unwrap_or(config.server.bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("sub-serve stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, stopping gracefully..."),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
