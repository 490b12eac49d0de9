pub mod events;
pub mod messages;

pub use events::StreamEvent;
pub use messages::ChatMessage;
