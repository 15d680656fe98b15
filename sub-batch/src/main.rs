//! sub-batch - Post once to every community listed in a file

mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libsubcast::config::DEFAULT_API_URL;
use libsubcast::platforms::NewPost;
use libsubcast::service::batch::{self, FirstFlair, FlairSelector, PlannedPost};
use libsubcast::service::events::{Event, EventBus};
use libsubcast::{
    logging, ApiClient, BearerToken, ClientError, ConfigError, PostRequest, SubcastError,
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "sub-batch")]
#[command(version)]
#[command(about = "Post once to every community listed in a file")]
#[command(long_about = "\
sub-batch - Post once to every community listed in a file

DESCRIPTION:
    Reads a text file with one community per line, looks up each
    community's post flairs through sub-serve, then submits the same post
    to every community in file order. A failure in one community never
    stops the others.

FILE FORMAT:
    Only lines starting with r/ are used:

        r/learnpython
        r/programming
        r/python

USAGE:
    # Text post, choosing flairs interactively
    sub-batch subs.txt --title \"Hello\" --body \"First post\"

    # Link post, first flair everywhere, no questions asked
    sub-batch subs.txt --title \"Hello\" --url https://example.com --yes

EXIT CODES:
    0 - Every post succeeded
    1 - At least one post failed, or a runtime error
    2 - Configuration error
    3 - Invalid input
")]
struct Cli {
    /// File listing the target communities
    file: PathBuf,

    /// Post title (prompted when omitted on a terminal)
    #[arg(short, long)]
    title: Option<String>,

    /// Body for a text post (prompted when neither body nor url is given)
    #[arg(short, long)]
    body: Option<String>,

    /// URL for a link post
    #[arg(short, long)]
    url: Option<String>,

    /// Base URL of the sub-serve service
    #[arg(long, env = "SUBCAST_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token for sub-serve
    #[arg(long, env = "BEARER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Never prompt: use the first flair offered and skip confirmation
    #[arg(short, long)]
    yes: bool,

    /// Post without flairs and skip flair lookup
    #[arg(long)]
    no_flair: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut log = logging::from_env(cli.verbose);
    if std::env::var("SUBCAST_LOG_LEVEL").is_err() {
        log.level = "warn".to_string();
    }
    log.init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e.downcast_ref::<SubcastError>().map_or(1, SubcastError::exit_code);
            std::process::exit(code);
        }
    }
}

/// Run one batch; `Ok(false)` when at least one post failed
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let interactive = !cli.yes && atty::is(atty::Stream::Stdin);

    let token = bearer_token(cli.token.as_deref())?;
    let template = build_post(&cli, interactive)?;

    let path = PathBuf::from(shellexpand::tilde(&cli.file.to_string_lossy()).to_string());
    let communities = batch::load_communities(&path)
        .with_context(|| format!("Failed to load communities from {}", path.display()))?;
    info!("Loaded {} communities from {}", communities.len(), path.display());

    let api = ApiClient::new(&cli.api_url, token)?;
    check_token(&api).await?;

    let events = EventBus::default();

    let plan = if cli.no_flair {
        communities.into_iter().map(PlannedPost::without_flair).collect()
    } else {
        let mut selector: Box<dyn FlairSelector> = if interactive {
            Box::new(ui::PromptSelector)
        } else {
            Box::new(FirstFlair)
        };
        batch::resolve_flairs(&api, &communities, selector.as_mut(), &events).await?
    };

    println!("{}", ui::plan_table(&plan));

    if interactive && !ui::confirm_post(plan.len())? {
        println!("Nothing posted.");
        return Ok(true);
    }

    let printer = tokio::spawn(print_progress(events.subscribe()));
    let report = batch::submit_all(&api, &plan, &template, &events).await;
    if let Err(e) = printer.await {
        debug!("Progress printer stopped early: {}", e);
    }

    for error in report.errors() {
        println!("{}", error);
    }
    println!(
        "Job finished. Total successful posts: {}.",
        report.success_count()
    );

    Ok(report.all_succeeded())
}

/// The service token; blank counts as missing
fn bearer_token(raw: Option<&str>) -> libsubcast::Result<BearerToken> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => Ok(BearerToken::new(token)),
        None => Err(ConfigError::MissingField("BEARER_TOKEN".to_string()).into()),
    }
}

/// Stop before any lookup when the service rejects the token
///
/// Other ping failures are only logged; the batch records them per community.
async fn check_token(api: &ApiClient) -> libsubcast::Result<()> {
    match api.secure_ping().await {
        Ok(()) => Ok(()),
        Err(ClientError::Status { status: 401, detail }) => Err(ConfigError::InvalidValue {
            field: "BEARER_TOKEN".to_string(),
            reason: format!("rejected by {}: {}", api.base_url(), detail),
        }
        .into()),
        Err(e) => {
            warn!("Could not verify the token with {}: {}", api.base_url(), e);
            Ok(())
        }
    }
}

/// Assemble and validate the post shared by every community
fn build_post(cli: &Cli, interactive: bool) -> libsubcast::Result<PostRequest> {
    let title = match &cli.title {
        Some(title) => title.clone(),
        None if interactive => ui::prompt_title()?,
        None => String::new(),
    };

    let body = match (&cli.body, &cli.url) {
        (None, None) if interactive => Some(ui::prompt_body()?),
        (body, _) => body.clone(),
    };

    let request = PostRequest {
        title,
        body,
        url: cli.url.clone(),
        flair_id: None,
    };

    NewPost::from_request(&request)?;
    Ok(request)
}

/// Print one line per finished post until the batch completes
async fn print_progress(mut receiver: libsubcast::service::EventReceiver) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match receiver.recv().await {
            Ok(Event::PostSucceeded {
                community,
                post_url,
                ..
            }) => println!("Post sent for {}: {}", community, post_url),
            Ok(Event::BatchCompleted { .. }) | Err(RecvError::Closed) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!("Progress printer skipped {} events", skipped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_missing_or_blank() {
        for raw in [None, Some(""), Some("  \t")] {
            let err = bearer_token(raw).unwrap_err();
            assert_eq!(err.exit_code(), 2);
            assert!(err.to_string().contains("Missing required field: BEARER_TOKEN"));
        }
    }

    #[test]
    fn test_bearer_token_is_trimmed() {
        let token = bearer_token(Some(" token-123\n")).unwrap();
        assert!(token.verify("token-123"));
    }
}
