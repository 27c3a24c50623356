//! Configuration management for the Quill CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including the backend address, the local
//! callback server, and the active UI language.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `quillcli/.env`. A missing file is not an
/// error; configuration may come entirely from the process environment.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/quillcli/.env`
/// - macOS: `~/Library/Application Support/quillcli/.env`
/// - Windows: `%LOCALAPPDATA%/quillcli/.env`
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - An existing `.env` file cannot be read or parsed
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("quillcli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the base URL of the Quill backend.
///
/// Retrieves the `QUILL_API_URL` environment variable, e.g.
/// `https://quill.example.com`. All API paths are joined onto this address.
///
/// # Panics
///
/// Panics if the `QUILL_API_URL` environment variable is not set.
pub fn api_base_url() -> String {
    env::var("QUILL_API_URL").expect("QUILL_API_URL must be set")
}

/// Returns the server address for the local OAuth callback server.
///
/// Retrieves the `SERVER_ADDRESS` environment variable which specifies the
/// address and port where the local HTTP server should bind for handling
/// OAuth callbacks during the sign-in flow.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:8910"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the active UI language for the Accept-Language header.
///
/// Retrieves the `QUILL_LANGUAGE` environment variable. Defaults to `en`
/// when unset; unknown values fall back to the English mapping when the
/// header is computed.
pub fn language() -> String {
    env::var("QUILL_LANGUAGE").unwrap_or_else(|_| "en".to_string())
}
