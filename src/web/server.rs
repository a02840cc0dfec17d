use anyhow::Result;
use axum::http::HeaderValue;
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ClientConfig;
use crate::llm::{ChatModelClient, GeminiClient};
use crate::logging::ConversationLogger;
use crate::web::routes::{self, AppState};

/// Web server configuration
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub client_config: ClientConfig,
    pub log_dir: PathBuf,
}

/// Web server instance
pub struct WebServer {
    config: WebServerConfig,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig) -> Self {
        Self { config }
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let client_config = self.config.client_config;

        let client: Arc<dyn ChatModelClient> = Arc::new(GeminiClient::new(
            client_config.api_key.clone(),
            client_config.api_base_url.clone(),
            client_config.model.clone(),
        ));

        let logger = ConversationLogger::new(&self.config.log_dir).await?;
        println!(
            "{}",
            format!("Conversation log: {}", logger.path().display()).bright_black()
        );

        let state = AppState {
            client,
            logger: Arc::new(Mutex::new(logger)),
            model: client_config.model.clone(),
        };

        let mut app = routes::create_router(&client_config.api_prefix, state);
        app = app.layer(cors_layer(&client_config.allowed_origins));

        println!("🌐 Web server starting on http://{}", self.config.bind_addr);
        println!(
            "   Chat endpoint: http://{}{}/chat",
            self.config.bind_addr, client_config.api_prefix
        );
        println!(
            "   Streaming endpoint: http://{}{}/chat/stream",
            self.config.bind_addr, client_config.api_prefix
        );

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the CORS layer from the configured origin list; a literal
/// "*" entry allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
