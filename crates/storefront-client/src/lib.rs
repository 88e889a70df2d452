//! # storefront-client: Backend Client for the Storefront
//!
//! Everything in the storefront that waits on something: the REST backend,
//! the search-box debounce timer and the session file on disk.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Client                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 StorefrontService (service.rs)                   │  │
//! │  │                                                                  │  │
//! │  │  login / cart / addresses / checkout                             │  │
//! │  │  rules delegated to storefront-core                              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionStore   │  │ StorefrontBack │  │  SearchDispatcher      │    │
//! │  │                │  │ end (trait)    │  │                        │    │
//! │  │ JSON file in   │  │                │  │ One search per quiet   │    │
//! │  │ the data dir   │  │ HttpBackend    │◄─│ period, stale results  │    │
//! │  │                │  │ (reqwest)      │  │ dropped by sequence    │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ClientConfig: client.toml + STOREFRONT_* environment variables        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`backend`] - `StorefrontBackend` trait
//! - [`http`] - REST implementation of the backend
//! - [`search`] - Debounced search dispatcher
//! - [`service`] - Shopper-facing operations
//! - [`session`] - Session persistence
//! - [`config`] - Client configuration
//! - [`error`] - Client error types

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod search;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{LoginResponse, StorefrontBackend};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use search::{SearchDispatcher, SearchState, SearchTicket};
pub use service::{CartUpdateOutcome, CheckoutOutcome, StorefrontService};
pub use session::{Session, SessionStore};
