use std::fmt::Write;

use chrono::{DateTime, Utc};

use plume_client::{ApiClient, ClientError, accounts, posts};
use plume_types::models::{ConnectedAccount, Post, PostStatus};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub drafts: usize,
    pub scheduled: usize,
    pub published: usize,
    pub failed: usize,
    pub connected_accounts: usize,
    /// Earliest scheduled post still in the future.
    pub next_scheduled: Option<(String, DateTime<Utc>)>,
}

impl DashboardSummary {
    pub fn build(posts: &[Post], accounts: &[ConnectedAccount], now: DateTime<Utc>) -> Self {
        let mut summary = Self {
            connected_accounts: accounts.len(),
            ..Default::default()
        };
        for post in posts {
            match post.status {
                PostStatus::Draft => summary.drafts += 1,
                PostStatus::Scheduled | PostStatus::Publishing => summary.scheduled += 1,
                PostStatus::Published => summary.published += 1,
                PostStatus::Failed => summary.failed += 1,
            }
        }
        summary.next_scheduled = posts
            .iter()
            .filter(|p| p.status == PostStatus::Scheduled)
            .filter_map(|p| p.scheduled_at.filter(|at| *at > now).map(|at| (p.id.clone(), at)))
            .min_by_key(|(_, at)| *at);
        summary
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Scheduled: {}", self.scheduled);
        let _ = writeln!(out, "Published: {}", self.published);
        let _ = writeln!(out, "Drafts:    {}", self.drafts);
        let _ = writeln!(out, "Failed:    {}", self.failed);
        let _ = writeln!(out, "Connected accounts: {}", self.connected_accounts);
        match &self.next_scheduled {
            Some((id, at)) => {
                let _ = writeln!(out, "Next post: {} at {}", id, at.format("%Y-%m-%d %H:%M UTC"));
            }
            None => {
                let _ = writeln!(out, "Nothing scheduled.");
            }
        }
        out
    }
}

pub async fn load(client: &ApiClient) -> Result<DashboardSummary, ClientError> {
    let (posts, accounts) = tokio::try_join!(posts::list(client, None), accounts::connected(client))?;
    Ok(DashboardSummary::build(&posts, &accounts, Utc::now()))
}
