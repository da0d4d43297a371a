use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use plume_types::api::CreatePostRequest;
use plume_types::validation::ValidationErrors;

use crate::networks::Network;
use crate::schedule::ScheduleWindow;
use crate::stats::DraftStats;

pub const MAX_CONTENT_CHARS: usize = 2200;

/// A per-network constraint the draft currently breaks. Any warning blocks
/// submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftWarning {
    TooLong { network: Network, max: usize, actual: usize },
    MediaUnsupported { network: Network },
    TooManyMedia { network: Network, max: usize, actual: usize },
    SchedulingUnsupported { network: Network },
}

impl fmt::Display for DraftWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { network, max, actual } => {
                write!(f, "{} allows {} characters ({} over)", network, max, actual - max)
            }
            Self::MediaUnsupported { network } => write!(f, "{} does not support media", network),
            Self::TooManyMedia { network, max, actual } => {
                write!(f, "{} allows at most {} media items (you have {})", network, max, actual)
            }
            Self::SchedulingUnsupported { network } => {
                write!(f, "{} does not support scheduled posts", network)
            }
        }
    }
}

/// In-memory composer form state. Statistics are derived from `content` on
/// demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub content: String,
    pub target_networks: BTreeSet<Network>,
    pub media_references: Vec<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl PostDraft {
    pub fn stats(&self) -> DraftStats {
        DraftStats::compute(&self.content)
    }

    pub fn is_empty(&self) -> bool {
        *self == PostDraft::default()
    }

    /// Constraint violations for every selected network, in network order.
    pub fn warnings(&self) -> Vec<DraftWarning> {
        let chars = self.stats().character_count;
        let media = self.media_references.len();
        let mut warnings = Vec::new();

        for &network in &self.target_networks {
            let c = network.constraints();
            if chars > c.max_length {
                warnings.push(DraftWarning::TooLong {
                    network,
                    max: c.max_length,
                    actual: chars,
                });
            }
            if media > 0 && !c.supports_media {
                warnings.push(DraftWarning::MediaUnsupported { network });
            } else if media > c.max_media_count {
                warnings.push(DraftWarning::TooManyMedia {
                    network,
                    max: c.max_media_count,
                    actual: media,
                });
            }
            if self.scheduled_for.is_some() && !c.supports_scheduling {
                warnings.push(DraftWarning::SchedulingUnsupported { network });
            }
        }
        warnings
    }

    /// Required-field checks. The schedule is rechecked against `now` since
    /// time passes between picking it and submitting.
    pub fn validate(&self, window: &ScheduleWindow, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let chars = self.stats().character_count;

        if self.content.trim().is_empty() {
            errors.push("content", "Content is required");
        } else if chars > MAX_CONTENT_CHARS {
            errors.push(
                "content",
                format!("Content must be at most {} characters", MAX_CONTENT_CHARS),
            );
        }
        if self.target_networks.is_empty() {
            errors.push("targetNetworks", "Select at least one network");
        }
        if let Some(at) = self.scheduled_for {
            if let Err(e) = window.check(at, now) {
                errors.push("scheduledFor", e.to_string());
            }
        }

        errors.into_result()
    }

    /// Everything that stands between the draft and a submit: field errors
    /// first, then constraint warnings under `targetNetworks`.
    pub fn submission_blockers(&self, window: &ScheduleWindow, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = self.validate(window, now).err().unwrap_or_default();
        for warning in self.warnings() {
            errors.push("targetNetworks", warning.to_string());
        }
        errors.into_result()
    }

    pub fn can_submit(&self, window: &ScheduleWindow, now: DateTime<Utc>) -> bool {
        self.submission_blockers(window, now).is_ok()
    }

    /// Cosmetic 0/25/50/75/100 progress over the four fillable parts.
    pub fn completion_percent(&self) -> u8 {
        let filled = [
            !self.content.trim().is_empty(),
            !self.target_networks.is_empty(),
            !self.media_references.is_empty(),
            self.scheduled_for.is_some(),
        ]
        .into_iter()
        .filter(|f| *f)
        .count();
        (filled * 25) as u8
    }

    pub fn to_request(&self) -> CreatePostRequest {
        CreatePostRequest {
            content: self.content.clone(),
            networks: self.target_networks.iter().map(|n| n.id().to_string()).collect(),
            media_urls: self.media_references.clone(),
            scheduled_at: self
                .scheduled_for
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}
