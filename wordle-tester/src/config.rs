use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::wordle::SelectorMap;

pub const EXPECTED_TITLE: &str = "Wordle — The New York Times";
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(3);
pub const EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the interaction layer needs to know about the game under test.
#[derive(Debug, Clone)]
pub struct WordleConfig {
    /// Address of the game. Required before navigating.
    pub base_url: Option<String>,
    pub expected_title: String,
    pub notification_timeout: Duration,
    /// Ceiling for visibility assertions.
    pub expect_timeout: Duration,
    pub selectors: SelectorMap,
}

impl Default for WordleConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            expected_title: EXPECTED_TITLE.to_string(),
            notification_timeout: NOTIFICATION_TIMEOUT,
            expect_timeout: EXPECT_TIMEOUT,
            selectors: SelectorMap::default(),
        }
    }
}

impl WordleConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|url| !url.trim().is_empty());
        self
    }
}

pub fn load_selector_map(path: &Path) -> Result<SelectorMap> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read selectors from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse selectors in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::locators::Selector;

    #[test]
    fn blank_base_url_counts_as_missing() {
        let cfg = WordleConfig::default().with_base_url(Some("  ".to_string()));
        assert!(cfg.base_url.is_none());
        let cfg = WordleConfig::default().with_base_url(Some("https://example.test".into()));
        assert_eq!(cfg.base_url.as_deref(), Some("https://example.test"));
    }

    #[test]
    fn defaults_match_the_live_game() {
        let cfg = WordleConfig::default();
        assert_eq!(cfg.expected_title, "Wordle — The New York Times");
        assert_eq!(cfg.notification_timeout, Duration::from_secs(3));
    }

    #[test]
    fn load_selector_map_reads_partial_overrides() {
        let path = std::env::temp_dir().join(format!(
            "wordle-selectors-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&path, r#"{ "play_button": { "by": "css", "css": "button.play" } }"#)
            .expect("write selectors");
        let map = load_selector_map(&path).expect("load selectors");
        assert_eq!(map.play_button, Selector::css("button.play"));
        assert_eq!(map.modal_overlay, Selector::test_id("modal-overlay"));
    }

    #[test]
    fn load_selector_map_reports_missing_file() {
        let err = load_selector_map(Path::new("/nonexistent/selectors.json"))
            .expect_err("missing file");
        assert!(err.to_string().contains("failed to read selectors"));
    }
}
