mod client;
mod command;
mod config;
mod dispatch;
mod nav;
mod repl;
mod session;
mod store;
mod transcript;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reddish")]
#[command(about = "A terminal-style command interpreter for browsing Reddit")]
struct Cli {
    /// Authorization code from the OAuth redirect callback
    #[arg(long)]
    code: Option<String>,

    /// State parameter from the OAuth redirect callback
    #[arg(long)]
    state: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config()?;

    let store = store::SessionStore::open()?;
    let auth = session::RedditAuth::new(config.oauth.clone());
    let mut session =
        session::SessionManager::new(config.oauth.clone(), store, Box::new(auth))?;

    // A pending login resumes here, after restoration, and may override it.
    if let (Some(code), Some(state)) = (cli.code.as_deref(), cli.state.as_deref()) {
        match session.resume_from_callback(code, state).await {
            Ok(session::CallbackOutcome::LoggedIn(user)) => {
                println!("Authenticated as: {}", user);
            }
            // A state mismatch is dropped without comment.
            Ok(session::CallbackOutcome::Ignored) => {}
            Err(e) => {
                eprintln!("Login failed: {:#}", e);
            }
        }
    }

    let content = client::RedditClient::new(config.oauth.api_base.clone());
    let dispatcher = dispatch::Dispatcher::new(session, Box::new(content));

    repl::run(dispatcher, config.repl.save_history).await
}
