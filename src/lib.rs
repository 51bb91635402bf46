pub mod app;
pub mod backend;
pub mod chat_view;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod markdown;
pub mod message;
pub mod session;
pub mod storage;
pub mod syntax;
pub mod tui;
pub mod ui;
pub mod wrap;

// Re-export main types for convenience
pub use backend::{Backend, QueryClient};
pub use config::Config;
pub use error::{BackendError, StorageError};
pub use message::{Conversation, Message, Role};
pub use session::ChatSession;
pub use storage::{FileStorage, MemoryStorage, Storage};
