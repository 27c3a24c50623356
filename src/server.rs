use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, error, quill::client::ApiClient, types::HandshakeSlot};

/// State shared between the sign-in flow and the callback handler: the
/// client used for the code exchange and the slot the completion message
/// travels through.
pub struct CallbackContext {
    pub client: ApiClient,
    pub slot: Arc<Mutex<HandshakeSlot>>,
}

pub async fn start_callback_server(context: Arc<CallbackContext>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(context)));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
