use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ASCII word characters, the way browsers count them.
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[0-9A-Za-z_]+").unwrap());
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[0-9A-Za-z_]+").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Statistics derived from draft content. Always recomputed, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStats {
    pub character_count: usize,
    pub word_count: usize,
    pub hashtag_count: usize,
    pub mention_count: usize,
    pub link_count: usize,
}

impl DraftStats {
    pub fn compute(content: &str) -> Self {
        Self {
            character_count: content.chars().count(),
            word_count: content.split_whitespace().count(),
            hashtag_count: HASHTAG.find_iter(content).count(),
            mention_count: MENTION.find_iter(content).count(),
            link_count: LINK.find_iter(content).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_example() {
        let stats = DraftStats::compute("Check this #launch @team https://x.co");
        assert_eq!(
            stats,
            DraftStats {
                character_count: 37,
                word_count: 5,
                hashtag_count: 1,
                mention_count: 1,
                link_count: 1,
            }
        );
    }

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(DraftStats::compute(""), DraftStats::default());
        let stats = DraftStats::compute("  \n\t ");
        assert_eq!(stats.character_count, 5);
        assert_eq!(stats.word_count, 0);
    }

    #[test]
    fn counts_every_match() {
        let stats = DraftStats::compute("#a #b_c # #! @x@y http://a.b https://c.d/e?f=1 ftp://no");
        assert_eq!(stats.hashtag_count, 2);
        assert_eq!(stats.mention_count, 2);
        assert_eq!(stats.link_count, 2);
    }

    #[test]
    fn character_count_is_chars_not_bytes() {
        let content = "café ☕";
        assert_eq!(DraftStats::compute(content).character_count, content.chars().count());
        assert_eq!(DraftStats::compute(content).character_count, 6);
    }
}
