use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use plume_composer::{Network, ScheduleError, ScheduleWindow};
use plume_types::api::UpdatePostRequest;
use plume_types::models::Post;

/// Partial update from edit flags. A new time must fall inside the usual
/// schedule window; empty `networks` leaves them unchanged.
pub fn update_request<Tz: TimeZone>(
    content: Option<String>,
    networks: &[Network],
    at: Option<&str>,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<UpdatePostRequest, ScheduleError> {
    let scheduled_at = at
        .map(|raw| ScheduleWindow::default().parse(raw, tz, now))
        .transpose()?
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true));

    Ok(UpdatePostRequest {
        content,
        networks: (!networks.is_empty()).then(|| networks.iter().map(|n| n.id().to_string()).collect()),
        media_urls: None,
        scheduled_at,
    })
}

pub fn render_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No posts yet.\n".into();
    }
    let mut out = String::new();
    for post in posts {
        let when = post
            .scheduled_at
            .or(post.published_at)
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        let preview: String = post.content.chars().take(48).collect();
        let _ = writeln!(
            out,
            "{:<12} {:<10} {:<16} {:<24} {}",
            post.id,
            format!("{:?}", post.status).to_lowercase(),
            when,
            post.networks.join(","),
            preview
        );
        if let Some(err) = &post.error {
            let _ = writeln!(out, "{:<12} error: {}", "", err);
        }
    }
    out
}
