use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use plume_store::{Store, keys};

use crate::draft::PostDraft;

/// Quiet period after the last edit before the draft is written.
pub const AUTOSAVE_DELAY: Duration = Duration::from_secs(3);

/// Drafts this short are not worth keeping.
pub const AUTOSAVE_MIN_CHARS: usize = 10;

/// What lands in durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub draft: PostDraft,
    pub saved_at: DateTime<Utc>,
}

/// Debounced draft persistence. Every edit restarts the pending timer, so
/// only the last edit of a quiet window is written. The timer dies with the
/// composer.
pub struct DraftAutosave {
    store: Arc<Store>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    persisted: Arc<AtomicBool>,
}

impl DraftAutosave {
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_delay(store, AUTOSAVE_DELAY)
    }

    pub fn with_delay(store: Arc<Store>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: None,
            persisted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Read the saved snapshot, if any. A corrupt snapshot is dropped.
    pub fn load(store: &Store) -> Option<DraftSnapshot> {
        match store.get_json::<DraftSnapshot>(keys::POST_DRAFT) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Discarding unreadable draft snapshot: {:#}", e);
                let _ = store.delete(keys::POST_DRAFT);
                None
            }
        }
    }

    /// True once the latest edit has been written.
    pub fn is_persisted(&self) -> bool {
        self.persisted.load(Ordering::Acquire)
    }

    /// The store already holds the current draft (it was just restored).
    pub fn mark_persisted(&self) {
        self.persisted.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Note an edit. Must be called from within a Tokio runtime.
    pub fn touch(&mut self, draft: &PostDraft) {
        self.cancel();
        self.persisted.store(false, Ordering::Release);

        if draft.content.chars().count() <= AUTOSAVE_MIN_CHARS {
            return;
        }

        let store = self.store.clone();
        let persisted = self.persisted.clone();
        let deadline = tokio::time::Instant::now() + self.delay;
        let draft = draft.clone();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let snapshot = DraftSnapshot {
                draft,
                saved_at: Utc::now(),
            };
            match store.put_json(keys::POST_DRAFT, &snapshot) {
                Ok(()) => {
                    persisted.store(true, Ordering::Release);
                    debug!(chars = snapshot.draft.content.chars().count(), "Draft autosaved");
                }
                Err(e) => warn!("Draft autosave failed: {:#}", e),
            }
        }));
    }

    /// Write now instead of waiting out the quiet period. Short drafts are
    /// still skipped.
    pub fn flush(&mut self, draft: &PostDraft) -> anyhow::Result<bool> {
        self.cancel();
        if draft.content.chars().count() <= AUTOSAVE_MIN_CHARS {
            return Ok(false);
        }
        let snapshot = DraftSnapshot {
            draft: draft.clone(),
            saved_at: Utc::now(),
        };
        self.store.put_json(keys::POST_DRAFT, &snapshot)?;
        self.persisted.store(true, Ordering::Release);
        Ok(true)
    }

    /// Drop the pending write, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Forget the draft entirely: no pending write, no snapshot.
    pub fn discard(&mut self) -> anyhow::Result<()> {
        self.cancel();
        self.persisted.store(false, Ordering::Release);
        self.store.delete(keys::POST_DRAFT)
    }
}

impl Drop for DraftAutosave {
    fn drop(&mut self) {
        self.cancel();
    }
}
