use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A target social platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Twitter,
    LinkedIn,
    Facebook,
    Instagram,
    Threads,
    Mastodon,
}

/// Static per-network limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConstraints {
    pub max_length: usize,
    pub supports_media: bool,
    pub max_media_count: usize,
    pub supports_scheduling: bool,
}

impl Network {
    pub const ALL: [Network; 6] = [
        Network::Twitter,
        Network::LinkedIn,
        Network::Facebook,
        Network::Instagram,
        Network::Threads,
        Network::Mastodon,
    ];

    /// Wire identifier.
    pub fn id(self) -> &'static str {
        match self {
            Network::Twitter => "twitter",
            Network::LinkedIn => "linkedin",
            Network::Facebook => "facebook",
            Network::Instagram => "instagram",
            Network::Threads => "threads",
            Network::Mastodon => "mastodon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Network::Twitter => "X (Twitter)",
            Network::LinkedIn => "LinkedIn",
            Network::Facebook => "Facebook",
            Network::Instagram => "Instagram",
            Network::Threads => "Threads",
            Network::Mastodon => "Mastodon",
        }
    }

    pub fn constraints(self) -> NetworkConstraints {
        match self {
            Network::Twitter => NetworkConstraints {
                max_length: 280,
                supports_media: true,
                max_media_count: 4,
                supports_scheduling: true,
            },
            Network::LinkedIn => NetworkConstraints {
                max_length: 3000,
                supports_media: true,
                max_media_count: 9,
                supports_scheduling: true,
            },
            Network::Facebook => NetworkConstraints {
                max_length: 63206,
                supports_media: true,
                max_media_count: 10,
                supports_scheduling: true,
            },
            Network::Instagram => NetworkConstraints {
                max_length: 2200,
                supports_media: true,
                max_media_count: 10,
                supports_scheduling: true,
            },
            Network::Threads => NetworkConstraints {
                max_length: 500,
                supports_media: true,
                max_media_count: 10,
                supports_scheduling: false,
            },
            Network::Mastodon => NetworkConstraints {
                max_length: 500,
                supports_media: true,
                max_media_count: 4,
                supports_scheduling: true,
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "x" => Ok(Network::Twitter),
            other => Network::ALL
                .into_iter()
                .find(|n| n.id() == other)
                .ok_or_else(|| UnknownNetwork(s.to_string())),
        }
    }
}
