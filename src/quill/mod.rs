//! # Quill Backend Integration Module
//!
//! This module is the integration layer between the CLI and the Quill REST
//! backend. It owns all HTTP communication, the session token lifecycle, and
//! the sign-in flows, and exposes typed functions for every backend
//! operation the CLI uses.
//!
//! ## Architecture
//!
//! ```text
//! Command Layer (CLI)
//!          ↓
//! Quill Integration Layer
//!     ├── Client (request pipelines, locale header, bearer attach)
//!     ├── Refresh (single-flight token refresh on 401)
//!     ├── Auth (password sign-in, GitHub OAuth handshake, logout)
//!     ├── Posts (paginated list, test-post creation)
//!     └── Account (API key, password change)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Quill REST API
//! ```
//!
//! ## Request pipelines
//!
//! [`client::ApiClient`] holds two configured pipelines over one base
//! address and one fixed timeout:
//!
//! - **anno** — unauthenticated requests: sign-in, the OAuth URL and code
//!   exchange, the token refresh call, and the capability-keyed test-post
//!   endpoint.
//! - **auth** — authenticated requests: re-reads the persisted login record
//!   before every request, attaches the bearer token when one is stored,
//!   and drives the refresh protocol on 401.
//!
//! Both pipelines attach an `Accept-Language` header computed from the
//! active UI language.
//!
//! ## Token refresh strategy
//!
//! A 401 on the authenticated pipeline does not surface to the caller
//! directly. The client joins the [`refresh::RefreshCoordinator`]: the
//! first caller becomes the leader and issues exactly one refresh call with
//! the stored refresh token; every request failing concurrently is queued
//! and replayed with the leader's outcome. Each request is retried at most
//! once — a retried request that is rejected again, a missing refresh
//! token, or a failed or malformed refresh all end the session: the stored
//! record is removed and [`crate::error::ApiError::SessionExpired`] (or the
//! refresh error itself) propagates.
//!
//! ## Sign-in flows
//!
//! [`auth`] implements both entry points that produce a persisted login
//! record:
//!
//! - **Password**: one request, response validated as a complete record
//!   before anything is stored.
//! - **GitHub OAuth**: browser handshake. The backend hands out an
//!   authorization URL carrying a one-time `state` value; the flow persists
//!   it, opens the URL in the system browser, and polls a shared slot for
//!   the completion message the local callback handler publishes after
//!   exchanging the authorization code. The handler guards its exchange
//!   against re-entry and publishes at most one message; the poller takes
//!   it at most once.
//!
//! ## Error handling
//!
//! All functions return [`crate::error::ApiError`]. Transport failures
//! never trigger the refresh protocol; non-success statuses carry the
//! server's `message`/`error` body field when it parses; incomplete login
//! or refresh payloads are hard failures and never become a session.

pub mod account;
pub mod auth;
pub mod client;
pub mod posts;
pub mod refresh;
