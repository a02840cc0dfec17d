// Models module - data structures for API communication
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ChatRequest, Message};
pub use responses::{ChatResponse, ChunkKind, StreamChunk};
