// Chat module - history adaptation and response stream orchestration
pub mod history;
pub mod stream;

// Re-export commonly used items
pub use history::adapt_history;
pub use stream::{collect_response, stream_chat_events};
