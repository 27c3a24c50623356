//! Quill CLI Library
//!
//! This library implements a command-line client for the Quill publishing
//! service. It covers account access (password and GitHub OAuth sign-in with
//! a persisted token session), the API-key dashboard, the paginated post
//! list, test-post creation, and password changes.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy for client operations
//! - `management` - Persisted session storage
//! - `quill` - Quill backend client (HTTP layer, token refresh, endpoints)
//! - `server` - Local HTTP server for OAuth callbacks
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use quillcli::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> quillcli::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod quill;
pub mod server;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for top-level plumbing using a
/// boxed dynamic error trait object, keeping Send + Sync bounds for async
/// contexts. Typed client errors live in [`error::ApiError`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Waiting for the browser sign-in to finish...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Signed in as {}", username);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Used for unrecoverable errors that require immediate termination; code
/// after this macro will not execute.
///
/// # Example
///
/// ```
/// error!("Cannot load environment. Err: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues or important notices that do not terminate
/// the program.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser. Please navigate to the URL manually.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
