mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use runtime::{McpToolHost, Session, UserInput};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{Config, DEFAULT_CONFIG_FILE};
use error::Result;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Chat with a local model that can call MCP tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        error!(error = %e, "fatal");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Structured logs go to stderr; stdout is the conversation.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env();

    let server_config = config.server();
    info!(
        config = %cli.config.display(),
        command = %server_config.command,
        args = ?server_config.args,
        base_url = %config.model.base_url,
        model = %config.model.name,
        "starting ferry"
    );

    let backend = config.backend()?;

    info!("connecting to tool server");
    let host = McpToolHost::connect(server_config).await?;

    let mut session = Session::new(backend, host, config.session());
    let tool_names = session.tool_names().join(", ");
    info!(tools = %tool_names, "connected");
    println!("Connected. Tools available: {tool_names}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nYou> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = match UserInput::parse(&line) {
            UserInput::Exit => {
                info!("user exited");
                break;
            }
            UserInput::Blank => continue,
            UserInput::Message(text) => text,
        };

        info!(input_length = input.len(), "user input");

        match session.chat(input).await {
            Ok(turn) => {
                info!(
                    iterations = turn.iterations,
                    tool_calls = turn.tool_calls,
                    "turn finished"
                );
                println!("\nAssistant> {}", turn.outcome);
            }
            Err(e) => {
                error!(error = %e, "turn failed");
                eprintln!("Error: {e}");
            }
        }
    }

    session.into_host().shutdown().await;
    Ok(())
}
