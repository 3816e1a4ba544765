mod cli;
mod client;
mod config;
mod dto;
mod error;
mod provider;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use config::{ClientConfig, RelayConfig};
use log::error;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = match RelayConfig::from_env() {
                Ok(config) => config,
                Err(e) => {
                    error!("Configuration error: {e}");
                    std::process::exit(1);
                }
            };
            server::run_server(host, port, config).await?;
        }
        Commands::TranscribeFile {
            audio_file,
            server_url,
            language,
            model,
            timestamps,
        } => {
            let config = ClientConfig {
                server_url,
                audio_file,
                language,
                model,
                timestamps,
            };
            client::run_client(config).await?;
        }
    }

    Ok(())
}
