//! Element locator registry for the Wordle page.
//!
//! Locators are plain descriptions of where an element lives. Nothing here
//! touches the page; presence is established later by whichever operation
//! waits on the locator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One way of identifying an element.
///
/// Variants are listed from most to least stable: accessibility role and
/// name, then test identifiers and labels, then raw CSS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Selector {
    /// Accessibility role whose accessible name contains `name`, ignoring case.
    Role { role: String, name: String },
    /// `data-testid` attribute.
    TestId { id: String },
    /// Exact `aria-label`.
    Label { label: String },
    /// Structural fallback.
    Css { css: String },
    /// First alternative that matches anything wins.
    AnyOf { options: Vec<Selector> },
}

impl Selector {
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId { id: id.into() }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label {
            label: label.into(),
        }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::Css { css: css.into() }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role { role, name } => write!(f, "role={role}[name~=\"{name}\"]"),
            Self::TestId { id } => write!(f, "testid={id}"),
            Self::Label { label } => write!(f, "label=\"{label}\""),
            Self::Css { css } => write!(f, "css={css}"),
            Self::AnyOf { options } => {
                let parts: Vec<String> = options.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" | "))
            }
        }
    }
}

/// A chain of selectors, each searched within the matches of the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    chain: Vec<Selector>,
}

impl Locator {
    pub fn new(selector: Selector) -> Self {
        Self {
            chain: vec![selector],
        }
    }

    /// Narrow this locator to `selector` matches inside it.
    #[must_use]
    pub fn locate(&self, selector: Selector) -> Self {
        let mut chain = self.chain.clone();
        chain.push(selector);
        Self { chain }
    }

    pub fn chain(&self) -> &[Selector] {
        &self.chain
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.chain.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(" >> "))
    }
}

/// A selector scoped to an already-resolved parent element.
#[derive(Debug, Clone)]
pub struct Scoped<'a, E> {
    pub parent: &'a E,
    pub selector: Selector,
}

/// Mapping from semantic element names to selectors.
///
/// Every field falls back to the live game's markup, so a JSON override only
/// needs the entries that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    pub terms_modal: Selector,
    pub terms_continue: Selector,
    pub play_button: Selector,
    pub modal_overlay: Selector,
    pub modal_close: Selector,
    pub game_board: Selector,
    pub board_row: Selector,
    pub row_tile: Selector,
    pub enter_key: Selector,
    pub toast_container: Selector,
    /// `{letter}` is replaced with the lowercased letter.
    pub keyboard_letter_label: String,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            terms_modal: Selector::css(".purr-blocker-card__content"),
            terms_continue: Selector::role("button", "continue"),
            play_button: Selector::test_id("Play"),
            modal_overlay: Selector::test_id("modal-overlay"),
            modal_close: Selector::role("button", "close"),
            game_board: Selector::css(".Board-module_board__jeoPS"),
            board_row: Selector::css(".Row-module_row__pwpBq"),
            row_tile: Selector::test_id("tile"),
            enter_key: Selector::role("button", "enter"),
            toast_container: Selector::css("#ToastContainer-module_gameToaster__HPkaC"),
            keyboard_letter_label: "add {letter}".to_string(),
        }
    }
}

/// Named locators for every region the interaction layer touches.
#[derive(Debug, Clone)]
pub struct WordleLocators {
    map: SelectorMap,
    pub terms_modal: Locator,
    pub terms_continue_button: Locator,
    pub play_button: Locator,
    pub modal_overlay: Locator,
    pub modal_close_button: Locator,
    pub game_board: Locator,
    pub board_rows: Locator,
    pub enter_key: Locator,
    pub toast_container: Locator,
}

impl WordleLocators {
    pub fn new(map: SelectorMap) -> Self {
        let terms_modal = Locator::new(map.terms_modal.clone());
        let modal_overlay = Locator::new(map.modal_overlay.clone());
        let game_board = Locator::new(map.game_board.clone());

        Self {
            terms_continue_button: terms_modal.locate(map.terms_continue.clone()),
            play_button: Locator::new(map.play_button.clone()),
            modal_close_button: modal_overlay.locate(map.modal_close.clone()),
            board_rows: game_board.locate(map.board_row.clone()),
            enter_key: Locator::new(map.enter_key.clone()),
            toast_container: Locator::new(map.toast_container.clone()),
            terms_modal,
            modal_overlay,
            game_board,
            map,
        }
    }

    /// On-screen key for `letter`, matched case-insensitively.
    pub fn keyboard_letter(&self, letter: char) -> Locator {
        let lower: String = letter.to_lowercase().collect();
        let label = self.map.keyboard_letter_label.replace("{letter}", &lower);
        Locator::new(Selector::label(label))
    }

    /// Tiles inside an already-resolved row.
    pub fn row_tiles<'a, E>(&self, row: &'a E) -> Scoped<'a, E> {
        Scoped {
            parent: row,
            selector: self.map.row_tile.clone(),
        }
    }
}

impl Default for WordleLocators {
    fn default() -> Self {
        Self::new(SelectorMap::default())
    }
}
