pub mod api;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod indicator;
pub mod location;
pub mod logging;
pub mod markup;
pub mod page;
pub mod state;

// Re-export main types for convenience
pub use api::{Answer, RagClient};
pub use clipboard::{ClipboardPayload, Selection};
pub use config::{Config, CopyFormat};
pub use controller::{ChatController, KeyOutcome, KeyPress, Layout, Navigation, Submission};
pub use error::{AskError, AskResult};
pub use indicator::PendingIndicator;
pub use location::Location;
pub use page::Page;
pub use state::{Message, Role, Transcript};
pub use url::Url;
