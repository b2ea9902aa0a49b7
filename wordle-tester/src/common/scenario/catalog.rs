use super::{Scenario, Step};

const NOT_IN_WORD_LIST: &str = "Not in word list";

pub fn catalog_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "board-visible",
            "Close modals and display game board",
            vec![Step::VerifyBoardVisible],
        ),
        Scenario::new(
            "page-title",
            "Display correct page title",
            vec![Step::VerifyPageTitle],
        ),
        Scenario::new(
            "board-dimensions",
            "Board has 6 rows and 5 columns",
            vec![Step::VerifyBoardVisible, Step::VerifyBoardDimensions],
        ),
        Scenario::new(
            "invalid-word",
            "Reject invalid word with error message",
            vec![
                Step::EnterWord("aaaaa"),
                Step::ExpectErrorMessage(NOT_IN_WORD_LIST),
            ],
        ),
        Scenario::new(
            "valid-word",
            "Accept valid word without error",
            vec![
                Step::EnterWord("trips"),
                Step::ExpectNoErrorMessage(NOT_IN_WORD_LIST),
            ],
        ),
        Scenario::new(
            "another-valid-word",
            "Accept another valid word without error",
            vec![
                Step::EnterWord("stone"),
                Step::ExpectNoErrorMessage(NOT_IN_WORD_LIST),
            ],
        ),
    ]
}

pub fn find_catalog_scenario(key: &str) -> Option<Scenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let scenarios = catalog_scenarios();
        for (i, scenario) in scenarios.iter().enumerate() {
            assert!(
                scenarios[i + 1..].iter().all(|other| other.key != scenario.key),
                "duplicate key {}",
                scenario.key
            );
        }
    }

    #[test]
    fn word_scenarios_enter_five_letter_words() {
        for scenario in catalog_scenarios() {
            for step in &scenario.steps {
                if let Step::EnterWord(word) = step {
                    assert_eq!(word.chars().count(), 5, "{}", scenario.key);
                }
            }
        }
    }
}
