//! Proust chat - terminal client
//!
//! Starts one session from the command line and chats over stdin and
//! stdout until input runs out and the last reply has been printed.

use clap::Parser;
use proust_chat::{client, ClientConfig, HttpTransport, LoggingTransport, SessionController};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "proust-chat", about = "Chat with ProustGPT from the terminal")]
struct Cli {
    /// Conversation mode: qa, explore_lost_time or refine_prose
    #[arg(short, long, default_value = "qa")]
    mode: String,

    /// Opening prompt, sent as the first message
    #[arg(short, long)]
    prompt: Option<String>,

    /// Backend base URL (overrides PROUST_API_BASE)
    #[arg(long)]
    api_base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proust_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_base) = cli.api_base {
        config = config.with_api_base(api_base);
    }
    tracing::info!(
        api_base = %config.api_base,
        timeout_secs = ?config.request_timeout.map(|d| d.as_secs()),
        "Client configured"
    );

    let transport = LoggingTransport::new(Arc::new(HttpTransport::new(&config)?));
    let mut handle = SessionController::spawn(&cli.mode, cli.prompt, transport);
    tracing::info!(session_id = %handle.session_id(), "Session started");

    let stdin = BufReader::new(tokio::io::stdin());
    client::run(&mut handle, stdin, &mut std::io::stdout()).await?;

    Ok(())
}
