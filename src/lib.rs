//! # gemchat
//!
//! Backend service for an AI coding agent. Forwards chat messages and
//! conversation history to Google's Gemini streaming API, relays the
//! incremental response to clients over Server-Sent Events, and
//! extracts completed fenced code blocks from the accumulating text
//! as structured `code` events with synthesized filenames.

pub mod chat;
pub mod cli;
pub mod codeblocks;
pub mod config;
pub mod llm;
pub mod logging;
pub mod models;
pub mod web;

// Re-export commonly used types
pub use chat::{collect_response, stream_chat_events};
pub use cli::Cli;
pub use codeblocks::{extension_for, CodeBlockDetector, DetectedCodeBlock};
pub use config::ClientConfig;
pub use llm::{ChatModelClient, ChatStream, ChatTurn, GeminiClient, LlmError, TurnRole};
pub use logging::ConversationLogger;
pub use models::{ChatRequest, ChatResponse, ChunkKind, Message, StreamChunk};
pub use web::{WebServer, WebServerConfig};
