use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::{Duration, Instant};

use crate::browser::PageHost;
use crate::wordle::{ErrorKind, WordleError, WordlePage};

pub mod catalog;

use catalog::{catalog_scenarios, find_catalog_scenario};

/// One game-level action or check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    VerifyBoardVisible,
    VerifyPageTitle,
    VerifyBoardDimensions,
    EnterWord(&'static str),
    ExpectErrorMessage(&'static str),
    ExpectNoErrorMessage(&'static str),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VerifyBoardVisible => f.write_str("verify board is visible"),
            Self::VerifyPageTitle => f.write_str("verify page title"),
            Self::VerifyBoardDimensions => f.write_str("verify board dimensions"),
            Self::EnterWord(word) => write!(f, "enter word {word:?}"),
            Self::ExpectErrorMessage(text) => write!(f, "expect error message {text:?}"),
            Self::ExpectNoErrorMessage(text) => write!(f, "expect no error message {text:?}"),
        }
    }
}

impl Step {
    async fn run<H: PageHost>(&self, page: &WordlePage<'_, H>) -> crate::wordle::Result<()> {
        match self {
            Self::VerifyBoardVisible => page.verify_board_visible().await,
            Self::VerifyPageTitle => page.verify_page_title().await,
            Self::VerifyBoardDimensions => page.verify_board_dimensions().await,
            Self::EnterWord(word) => page.enter_word(word).await,
            Self::ExpectErrorMessage(text) => page.expect_error_message(text).await,
            Self::ExpectNoErrorMessage(text) => page.expect_no_error_message(text).await,
        }
    }
}

/// A fresh game followed by a fixed list of steps.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(key: &'static str, name: &'static str, steps: Vec<Step>) -> Self {
        Self { key, name, steps }
    }

    /// Stops at the first failing step.
    pub async fn run<H: PageHost>(&self, page: &WordlePage<'_, H>, verbose: bool) -> Result<()> {
        page.setup_game().await.context("setting up game")?;
        if verbose {
            println!("  🎮 Game ready");
        }

        for step in &self.steps {
            step.run(page).await.with_context(|| format!("{step}"))?;
            if verbose {
                println!("  ✔️  {step}");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub browser: String,
    pub passed: bool,
    pub failure: Option<String>,
    pub failure_kind: Option<ErrorKind>,
    #[serde(serialize_with = "serialize_millis", deserialize_with = "deserialize_millis")]
    pub duration: Duration,
}

impl ScenarioResult {
    pub fn from_outcome(
        scenario: &Scenario,
        browser: &str,
        outcome: &Result<()>,
        started: Instant,
    ) -> Self {
        Self {
            scenario_name: scenario.name.to_string(),
            browser: browser.to_string(),
            passed: outcome.is_ok(),
            failure: outcome.as_ref().err().map(|e| format!("{e:#}")),
            failure_kind: outcome
                .as_ref()
                .err()
                .and_then(|e| e.downcast_ref::<WordleError>())
                .map(WordleError::kind),
            duration: started.elapsed(),
        }
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

fn deserialize_millis<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

pub fn get_scenario(name: &str) -> Option<Scenario> {
    let key = match name.to_lowercase().as_str() {
        "board-visible" | "visible" => "board-visible",
        "page-title" | "title" => "page-title",
        "board-dimensions" | "dimensions" => "board-dimensions",
        "invalid-word" | "invalid" => "invalid-word",
        "valid-word" | "valid" => "valid-word",
        "another-valid-word" | "stone" => "another-valid-word",
        _ => return None,
    };
    find_catalog_scenario(key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}

/// Expand `all` into every catalog key, keeping explicit names in order.
pub fn expand_scenarios(names: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = names.iter().filter(|n| *n != "all").cloned().collect();
    if names.iter().any(|n| n == "all") {
        for (key, _) in list_scenarios() {
            if !expanded.iter().any(|n| n == key) {
                expanded.push(key.to_string());
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeHost;
    use crate::config::WordleConfig;
    use crate::wordle::WordleLocators;
    use tokio_test::block_on;

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        assert_eq!(get_scenario("invalid").map(|s| s.key), Some("invalid-word"));
        assert_eq!(get_scenario("STONE").map(|s| s.key), Some("another-valid-word"));
        assert!(get_scenario("hard-mode").is_none());
    }

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, name) in list_scenarios() {
            let scenario = get_scenario(key).expect("listed scenario");
            assert_eq!(scenario.name, name);
        }
    }

    #[test]
    fn expand_all_appends_missing_keys() {
        let expanded = expand_scenarios(&["valid-word".to_string(), "all".to_string()]);
        assert_eq!(expanded[0], "valid-word");
        assert_eq!(expanded.len(), list_scenarios().len());
    }

    #[test]
    fn expand_without_all_preserves_order() {
        let names = vec!["title".to_string(), "invalid".to_string()];
        assert_eq!(expand_scenarios(&names), names);
    }

    #[test]
    fn scenario_stops_at_setup_failure() {
        let cfg = WordleConfig::default();
        let host = FakeHost::new();
        let page = WordlePage::new(&host, &cfg);
        let scenario = get_scenario("title").expect("scenario");

        let err = block_on(scenario.run(&page, false)).expect_err("no base url");
        let chain = format!("{err:#}");
        assert!(chain.starts_with("setting up game"));
        assert!(chain.contains("BASE_URL"));
    }

    #[test]
    fn scenario_reports_failing_step() {
        let cfg = WordleConfig::default().with_base_url(Some("https://wordle.test".into()));
        let locators = WordleLocators::default();
        let host = FakeHost::new()
            .with_title("Wordle — The New York Times")
            .with_element(&locators.play_button, true)
            .with_element(&locators.modal_overlay, true)
            .with_element(&locators.modal_close_button, true)
            .on_click(&locators.modal_close_button, &locators.modal_overlay, false);
        let page = WordlePage::new(&host, &cfg);

        block_on(get_scenario("title").expect("title").run(&page, false)).expect("title passes");

        let scenario = get_scenario("invalid-word").expect("scenario");
        let outcome = block_on(scenario.run(&page, false));
        let result = ScenarioResult::from_outcome(&scenario, "fake", &outcome, Instant::now());
        assert!(!result.passed);
        assert_eq!(result.failure_kind, Some(ErrorKind::Resolution));
        assert!(
            result
                .failure
                .as_deref()
                .is_some_and(|f| f.starts_with("enter word \"aaaaa\""))
        );
    }

    #[test]
    fn scenario_result_serializes_duration_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Page title".to_string(),
            browser: "chrome".to_string(),
            passed: true,
            failure: None,
            failure_kind: None,
            duration: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["duration"], 1500);
        let back: ScenarioResult = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.duration, Duration::from_millis(1500));
    }
}
