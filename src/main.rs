use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use order_desk::{config::Settings, constants, llm_interaction::LlmClient, terminal, web_server};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API key for the chat completion endpoint.
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,
    /// Model used for every turn.
    #[arg(long, global = true, env = "ORDER_DESK_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the support chat page and its WebSocket endpoint.
    Serve {
        #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat with the support agent in this terminal.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for OPENAI_API_KEY)
    if std::env::var_os(constants::NO_DOTENV_VAR).is_none() {
        dotenvy::dotenv().ok();
    }

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,order_desk=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Order desk starting with command: {:?}", cli.command);

    // Without a key there is nothing useful to do, so fail before serving anything.
    let settings = Settings::new(cli.api_key, cli.base_url, cli.model).context("Invalid configuration")?;
    let llm = LlmClient::new(settings);

    match cli.command {
        Commands::Serve { port } => {
            info!("Starting order desk on port {}...", port);

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, llm).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            terminal::run_chat(&llm, stdin, tokio::io::stdout())
                .await
                .context("Chat session failed")?;
        }
    }

    Ok(())
}
