// Web server module
pub mod routes;
pub mod server;

pub use routes::AppState;
pub use server::{WebServer, WebServerConfig};
