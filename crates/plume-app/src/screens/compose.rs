use std::fmt::Write;

use chrono::{DateTime, Utc};

use plume_composer::Composer;

/// Draft summary as shown beside the editor.
pub fn render_draft(composer: &Composer, now: DateTime<Utc>) -> String {
    let draft = composer.draft();
    let stats = composer.stats();
    let mut out = String::new();

    let _ = writeln!(out, "{}", if draft.content.is_empty() { "(empty)" } else { draft.content.as_str() });
    let _ = writeln!(
        out,
        "{} characters · {} words · {} hashtags · {} mentions · {} links",
        stats.character_count, stats.word_count, stats.hashtag_count, stats.mention_count, stats.link_count
    );

    let networks: Vec<&str> = draft.target_networks.iter().map(|n| n.label()).collect();
    let _ = writeln!(
        out,
        "Networks: {}",
        if networks.is_empty() { "none".to_string() } else { networks.join(", ") }
    );
    for item in composer.media() {
        let status = match (&item.error, item.upload_progress) {
            (Some(err), _) => format!("failed: {}", err),
            (None, Some(p)) => format!("{}%", p),
            (None, None) => "queued".into(),
        };
        let _ = writeln!(out, "Media: {} ({}, {} bytes) {}", item.file_name(), item.mime_type, item.size, status);
    }
    match draft.scheduled_for {
        Some(at) => {
            let _ = writeln!(out, "Scheduled for {}", at.format("%Y-%m-%d %H:%M UTC"));
        }
        None => {
            let _ = writeln!(out, "Publish immediately");
        }
    }
    if let Some(err) = composer.schedule().error() {
        let _ = writeln!(out, "Schedule: {}", err);
    }
    for warning in composer.warnings() {
        let _ = writeln!(out, "Warning: {}", warning);
    }
    let _ = writeln!(
        out,
        "Complete: {}%{}",
        composer.completion_percent(),
        if composer.can_submit(now) { "" } else { " (not ready to submit)" }
    );
    out
}
