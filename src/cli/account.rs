use std::time::Duration;

use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    cli::{api_client, fail, require_session},
    error, info,
    quill::account,
    success, utils,
};

pub async fn dashboard() {
    let client = api_client();
    require_session(&client).await;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching API key...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let api_key = match account::get_api_key(&client).await {
        Ok(api_key) => {
            pb.finish_and_clear();
            api_key
        }
        Err(e) => {
            pb.finish_and_clear();
            fail(e)
        }
    };

    info!("API key:    {}", api_key.post_key);
    info!("Created at: {}", utils::format_timestamp(&api_key.created_at));
    info!(
        "Posts are created with: POST {}/{}",
        crate::config::api_base_url().trim_end_matches('/'),
        api_key.post_key
    );
}

pub async fn change_password() {
    let client = api_client();
    require_session(&client).await;

    let current = match Password::new().with_prompt("Current password").interact() {
        Ok(secret) => secret,
        Err(e) => error!("Cannot read password: {}", e),
    };
    let new = match Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()
    {
        Ok(secret) => secret,
        Err(e) => error!("Cannot read password: {}", e),
    };

    if new.is_empty() {
        error!("The new password cannot be empty.");
    }
    if new == current {
        error!("The new password must differ from the current one.");
    }

    match account::change_password(&client, &current, &new).await {
        Ok(()) => success!("Password changed."),
        Err(e) => fail(e),
    }
}
