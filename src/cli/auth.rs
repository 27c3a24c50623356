use std::time::Duration;

use dialoguer::{Input, Password};

use crate::{
    cli::{api_client, fail, require_session},
    error, info,
    quill::auth::{self, OauthLogin},
    success,
};

/// Short pause between the sign-in confirmation and the dashboard, so the
/// confirmation is readable before the screen moves on.
const POST_LOGIN_DELAY: Duration = Duration::from_secs(1);

pub async fn login(username: Option<String>, password: Option<String>, github: bool) {
    let client = api_client();

    // Inverse route guard: a valid session means there is nothing to do.
    if let Some(record) = client.session().login().await {
        let name = record.user.map(|u| u.username).unwrap_or_default();
        info!("Already signed in as {}. Run quillcli logout first.", name);
        return;
    }

    if github {
        match auth::login_with_github(&client).await {
            Ok(OauthLogin::Completed) => {
                success!("Sign-in successful!");
                tokio::time::sleep(POST_LOGIN_DELAY).await;
                crate::cli::dashboard().await;
            }
            Ok(OauthLogin::Failed(message)) => error!("Sign-in failed: {}", message),
            // The browser window was abandoned; back to the prompt without
            // a success or failure notice.
            Ok(OauthLogin::Abandoned) => {}
            Err(e) => fail(e),
        }
        return;
    }

    let username = match username {
        Some(name) => name,
        None => match Input::new().with_prompt("Username").interact_text() {
            Ok(name) => name,
            Err(e) => error!("Cannot read username: {}", e),
        },
    };
    let password = match password {
        Some(secret) => secret,
        None => match Password::new().with_prompt("Password").interact() {
            Ok(secret) => secret,
            Err(e) => error!("Cannot read password: {}", e),
        },
    };

    match auth::login_with_password(&client, &username, &password).await {
        Ok(record) => {
            let name = record.user.map(|u| u.username).unwrap_or_default();
            success!("Signed in as {}.", name);
            tokio::time::sleep(POST_LOGIN_DELAY).await;
            crate::cli::dashboard().await;
        }
        Err(e) => fail(e),
    }
}

pub async fn logout() {
    let client = api_client();
    auth::logout(&client).await;
    success!("Signed out.");
}

pub async fn whoami() {
    let client = api_client();
    let record = require_session(&client).await;

    if let Some(user) = record.user {
        let id = user.id.map(|id| id.to_string()).unwrap_or_default();
        info!("{} (id {})", user.username, id);
        if let Some(github_id) = user.github_id {
            info!("GitHub account: {}", github_id);
        }
    }
}
