use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for gemchat
#[derive(Parser)]
#[command(name = "gemchat")]
#[command(about = "AI Coding Agent backend - Gemini chat streaming with code artifact extraction")]
#[command(version)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Override the Gemini model name (otherwise GEMINI_MODEL or the built-in default)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory to write conversation logs under (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
