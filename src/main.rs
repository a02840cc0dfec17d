use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::env;
use std::net::SocketAddr;

use gemchat::{Cli, ClientConfig, WebServer, WebServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client_config = ClientConfig::from_env()?;
    if let Some(model) = cli.model {
        client_config.model = model;
    }

    let bind_addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    let log_dir = match cli.log_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    println!("{}", "🤖 GemChat - AI Coding Agent Backend".bright_cyan().bold());
    println!("{}", format!("Model: {}", client_config.model).bright_black());
    println!(
        "{}",
        format!("Allowed origins: {}", client_config.allowed_origins.join(", ")).bright_black()
    );

    let server = WebServer::new(WebServerConfig {
        bind_addr,
        client_config,
        log_dir,
    });
    server.start().await
}
