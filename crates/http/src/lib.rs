//! CareerPath HTTP client
//!
//! Typed access to the career prediction API. Requests to protected endpoints
//! go through a gateway that attaches the stored access token, refreshes it at
//! most once at a time when the server answers 401, and replays the failed
//! requests with the new token.

pub mod client;
pub mod types;

pub use client::config::ClientConfig;
pub use client::error::ClientError;
pub use client::request::ApiRequest;
pub use client::session::{SessionEvent, SessionSignal};
pub use client::storage::{FileStorage, KeyValueStorage, MemoryStorage, TokenStore};
pub use client::{ApiClient, ApiClientBuilder};
