// Public modules
pub mod chat_request;
pub mod completion;
pub mod message;
pub mod transcript;

// Re-exports
pub use chat_request::{ChatRequest, ErrorBody};
pub use completion::{Choice, ChoiceMessage, CompletionRequest, CompletionResponse};
pub use message::{Message, MessageRole};
pub use transcript::Transcript;
