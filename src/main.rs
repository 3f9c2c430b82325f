use std::path::PathBuf;

use clap::Parser;

use genai_proxy::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "genai-proxy")]
#[command(about = "Keeps a generative API key server-side and forwards browser requests", long_about = None)]
struct Cli {
    /// TOML config file; watched for changes. Without it, defaults plus
    /// FRONTEND_URL / VERCEL_URL / GEMINI_API_KEY are used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        bind_override: cli.bind,
    })
    .await
}
