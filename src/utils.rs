use chrono::{DateTime, Local};

use crate::types::LoginRecord;

/// Fixed table mapping the active UI language to an Accept-Language value.
/// Unknown languages fall back to the English mapping.
pub fn accept_language_header(language: &str) -> &'static str {
    match language {
        "zh" => "zh-CN,zh;q=0.9,en;q=0.8",
        _ => "en-US,en;q=0.9",
    }
}

/// Extracts the `state` query parameter from an authorization URL.
pub fn extract_state_param(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
}

/// Returns whether a login record is complete enough to act as a session:
/// both tokens present and a user with a non-null id and non-empty username.
/// Partial records must be treated as absent by every consumer.
pub fn check_login_record(record: Option<&LoginRecord>) -> bool {
    let Some(record) = record else {
        return false;
    };
    let Some(user) = record.user.as_ref() else {
        return false;
    };
    !record.access_token.is_empty()
        && !record.refresh_token.is_empty()
        && user.id.is_some()
        && !user.username.is_empty()
}

/// Renders a server timestamp in local time, falling back to the raw string
/// when it does not parse as RFC 3339.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
