use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use plume_client::{ApiClient, ClientError, posts};
use plume_store::Store;
use plume_types::models::Post;

use crate::autosave::DraftAutosave;
use crate::draft::{DraftWarning, PostDraft};
use crate::media::MediaItem;
use crate::networks::Network;
use crate::schedule::{QuickSelect, ScheduleError, ScheduleField};
use crate::stats::DraftStats;

/// Where the composer is in its edit/submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    Editing,
    Submitting,
    /// Last submit failed; the draft is intact and editable.
    Error { message: String },
}

/// Composer screen logic: one draft, its autosave timer and its media.
pub struct Composer {
    client: ApiClient,
    draft: PostDraft,
    schedule: ScheduleField,
    media: Vec<MediaItem>,
    autosave: DraftAutosave,
    state: ComposerState,
}

impl Composer {
    /// Mount the composer, restoring a saved draft if there is one.
    pub fn mount(client: ApiClient) -> Self {
        let store: Arc<Store> = client.session().store().clone();
        let autosave = DraftAutosave::new(store.clone());
        Self::mount_with(client, autosave)
    }

    pub fn mount_with(client: ApiClient, autosave: DraftAutosave) -> Self {
        let store = client.session().store().clone();
        let mut schedule = ScheduleField::default();
        let (draft, state) = match DraftAutosave::load(&store) {
            Some(snapshot) => {
                info!(saved_at = %snapshot.saved_at, "Restored saved draft");
                autosave.mark_persisted();
                schedule.set(snapshot.draft.scheduled_for);
                (snapshot.draft, ComposerState::Editing)
            }
            None => (PostDraft::default(), ComposerState::Idle),
        };

        Self {
            client,
            draft,
            schedule,
            media: Vec::new(),
            autosave,
            state,
        }
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    pub fn stats(&self) -> DraftStats {
        self.draft.stats()
    }

    pub fn warnings(&self) -> Vec<DraftWarning> {
        self.draft.warnings()
    }

    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    pub fn schedule(&self) -> &ScheduleField {
        &self.schedule
    }

    pub fn is_draft_persisted(&self) -> bool {
        self.autosave.is_persisted()
    }

    pub fn completion_percent(&self) -> u8 {
        self.draft.completion_percent()
    }

    pub fn can_submit(&self, now: DateTime<Utc>) -> bool {
        self.state != ComposerState::Submitting && self.draft.can_submit(self.schedule.window(), now)
    }

    // -- Edits --

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
        self.edited();
    }

    pub fn toggle_network(&mut self, network: Network) {
        if !self.draft.target_networks.remove(&network) {
            self.draft.target_networks.insert(network);
        }
        self.edited();
    }

    pub fn set_networks(&mut self, networks: impl IntoIterator<Item = Network>) {
        self.draft.target_networks = networks.into_iter().collect();
        self.edited();
    }

    /// Manual schedule entry. Rejected input leaves the draft untouched.
    pub fn schedule_input<Tz: TimeZone>(&mut self, raw: &str, tz: &Tz, now: DateTime<Utc>) -> Result<(), ScheduleError> {
        let value = self.schedule.input(raw, tz, now)?;
        self.draft.scheduled_for = value;
        self.edited();
        Ok(())
    }

    pub fn quick_schedule<Tz: TimeZone>(&mut self, choice: QuickSelect, tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
        let at = self.schedule.quick_select(choice, tz, now);
        self.draft.scheduled_for = Some(at);
        self.edited();
        at
    }

    /// Back to "publish immediately".
    pub fn clear_schedule(&mut self) {
        self.schedule.clear();
        self.draft.scheduled_for = None;
        self.edited();
    }

    /// Add an accepted file. Only uploaded items become media references.
    pub fn attach_media(&mut self, item: MediaItem) {
        if item.is_uploaded() {
            self.draft.media_references.push(item.id.clone());
        }
        self.media.push(item);
        self.edited();
    }

    pub fn remove_media(&mut self, id: &str) {
        self.media.retain(|m| m.id != id);
        self.draft.media_references.retain(|m| m != id);
        self.edited();
    }

    fn edited(&mut self) {
        if matches!(self.state, ComposerState::Idle | ComposerState::Error { .. }) {
            self.state = ComposerState::Editing;
        }
        self.autosave.touch(&self.draft);
    }

    // -- Submit / reset --

    /// Send the draft. Blocked drafts fail locally without a request. On
    /// success everything local is cleared; on failure the draft is kept.
    pub async fn submit(&mut self, now: DateTime<Utc>) -> Result<Post, ClientError> {
        self.draft.submission_blockers(self.schedule.window(), now)?;

        self.state = ComposerState::Submitting;
        let req = self.draft.to_request();
        match posts::create(&self.client, &req).await {
            Ok(post) => {
                // The post is already created; a leftover snapshot is only logged.
                if let Err(e) = self.clear_local() {
                    warn!(post_id = %post.id, "Could not discard saved draft after submit: {}", e);
                }
                info!(post_id = %post.id, scheduled = req.scheduled_at.is_some(), "Draft submitted");
                Ok(post)
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Submit failed: {}", e);
                self.state = ComposerState::Error { message };
                Err(e)
            }
        }
    }

    /// Persist the draft immediately. Returns false when it is too short to keep.
    pub fn save_draft(&mut self) -> Result<bool, ClientError> {
        self.autosave.flush(&self.draft).map_err(ClientError::storage)
    }

    /// Throw the draft away, including the saved snapshot.
    pub fn reset(&mut self) -> Result<(), ClientError> {
        self.clear_local()
    }

    fn clear_local(&mut self) -> Result<(), ClientError> {
        self.draft = PostDraft::default();
        self.schedule.clear();
        self.media.clear();
        self.state = ComposerState::Idle;
        self.autosave.discard().map_err(ClientError::storage)
    }
}
