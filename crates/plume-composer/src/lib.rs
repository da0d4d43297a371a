//! Post composer: draft state, derived statistics, per-network constraint
//! checks, schedule input, debounced autosave and the submit protocol.

pub mod autosave;
pub mod composer;
pub mod draft;
pub mod media;
pub mod networks;
pub mod schedule;
pub mod stats;

pub use autosave::DraftAutosave;
pub use composer::{Composer, ComposerState};
pub use draft::{DraftWarning, PostDraft};
pub use networks::Network;
pub use schedule::{QuickSelect, ScheduleError, ScheduleField, ScheduleWindow};
pub use stats::DraftStats;
