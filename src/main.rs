use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gemini_chat_server::build_collaborators;
use gemini_chat_server::chat::StreamingOrchestrator;
use gemini_chat_server::cli::ChatContext;
use gemini_chat_server::config::AppConfig;
use gemini_chat_server::server::{run_server, ServerConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the streaming chat endpoint over HTTP (default)
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },
    /// Chat in the terminal
    Chat {
        /// Single question to answer, then exit
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::from_env()?;
    let orchestrator = StreamingOrchestrator::new(build_collaborators(&config)?)?;

    match cli.command {
        Some(Commands::Chat { input }) => {
            let mut chat_context = ChatContext::new(Box::new(io::stdout()), input, orchestrator);
            chat_context.run().await
        }
        Some(Commands::Serve { host, port }) => {
            info!("Starting Gemini chat server");
            run_server(orchestrator, ServerConfig { host, port }).await?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            info!("Starting Gemini chat server");
            run_server(orchestrator, ServerConfig::default()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
