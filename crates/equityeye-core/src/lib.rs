pub mod ai;
pub mod audit;
pub mod config;
pub mod encode;
pub mod persona;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::gemini::{GeminiClient, GeminiError};
pub use config::Config;
pub use encode::{EncodeError, UploadedFile};
pub use session::{SessionError, SessionManager};
pub use state::{
    AuditResult, ChatMessage, ChatRole, Controller, DeliveryStatus, Phase, TransitionError,
};
