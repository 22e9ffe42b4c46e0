pub mod adapters;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod navigation;
pub mod storage;
pub mod stores;
pub mod validation;

// Re-export core components
pub use crate::adapters::{ApiRequest, HttpClient, ReqwestHttpClient, SimpleHttpResponse};
pub use crate::auth::{CredentialPair, CredentialStore, Session};
pub use crate::client::{ApiClient, PendingRequest};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ClientResult, ErrorCategory, ErrorCode};
pub use crate::events::{SessionEvent, SessionEventBus, SessionNotice, TerminationReason};
pub use crate::navigation::{Navigation, Navigator, RouteGuard, SessionRedirector};
pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::stores::{AnalysisStore, ExerciseStore, UserStore, WorkoutStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
