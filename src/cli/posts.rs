use std::time::Duration;

use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::{api_client, fail, require_session},
    error, info,
    quill::{account, posts},
    success,
    types::PostTableRow,
    utils,
};

pub async fn list_posts(page: Option<u32>, limit: Option<u32>) {
    let client = api_client();
    require_session(&client).await;

    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(20);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching posts...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let posts_page = match posts::fetch_posts(&client, page, limit).await {
        Ok(posts_page) => {
            pb.finish_and_clear();
            posts_page
        }
        Err(e) => {
            pb.finish_and_clear();
            fail(e)
        }
    };

    if posts_page.posts.is_empty() {
        info!("No posts on page {}.", posts_page.pagination.page);
        return;
    }

    let rows: Vec<PostTableRow> = posts_page
        .posts
        .into_iter()
        .map(|p| PostTableRow {
            id: p.id,
            title: p.title,
            created: utils::format_timestamp(&p.created_at),
        })
        .collect();

    let table = Table::new(rows);
    println!("{table}");
    info!(
        "Page {page}/{pages} — {total} posts",
        page = posts_page.pagination.page,
        pages = posts_page.pagination.total_pages,
        total = posts_page.pagination.total
    );
}

pub async fn create_test_post(title: Option<String>, body: Option<String>) {
    let client = api_client();
    let record = require_session(&client).await;

    // The capability key usually rides along in the stored user; fall back
    // to fetching it when it does not.
    let post_key = match record.user.and_then(|u| u.post_key) {
        Some(key) => key,
        None => match account::get_api_key(&client).await {
            Ok(api_key) => api_key.post_key,
            Err(e) => fail(e),
        },
    };

    let title = match title {
        Some(title) => title,
        None => match Input::new().with_prompt("Title").interact_text() {
            Ok(title) => title,
            Err(e) => error!("Cannot read title: {}", e),
        },
    };
    let body = match body {
        Some(body) => body,
        None => match Input::new().with_prompt("Body").interact_text() {
            Ok(body) => body,
            Err(e) => error!("Cannot read body: {}", e),
        },
    };
    if body.trim().is_empty() {
        error!("The post body cannot be empty.");
    }

    match posts::create_test_post(&client, &post_key, &title, &body).await {
        Ok(created) => success!("Created test post {}.", created.id),
        Err(e) => fail(e),
    }
}
