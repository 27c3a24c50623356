//! # API Module
//!
//! HTTP endpoints for the local callback server that backs the GitHub OAuth
//! sign-in flow. The authorization server redirects the user's browser here
//! after consent; the handler finishes the handshake that the CLI's login
//! flow is polling for.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the authorization redirect, exchanges the code
//!   with the Quill backend, persists the resulting session, and publishes
//!   exactly one completion message to the waiting login flow.
//! - [`health`] - Health check returning application status and version.
//!
//! The module is built on [Axum](https://docs.rs/axum); each endpoint is an
//! async function wired into the router in [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
