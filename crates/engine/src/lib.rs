pub mod api;
pub mod config;
pub mod job;
pub mod prompt;
pub mod provider;
pub mod stream;
pub mod trace;

pub use caregate_shared::{ChatMessage, StreamEvent};
