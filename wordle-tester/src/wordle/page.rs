//! Game-level operations built from locator lookups, clicks and bounded waits.

use std::time::Duration;

use super::locators::WordleLocators;
use super::{Result, WordleError};
use crate::browser::{ElementState, PageHost};
use crate::config::WordleConfig;

pub const EXPECTED_ROWS: usize = 6;
pub const EXPECTED_COLUMNS: usize = 5;
pub const WORD_LENGTH: usize = 5;

/// What the toast area showed after waiting for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Shown(String),
    /// Nothing became visible within the wait.
    Absent { waited: Duration },
}

pub struct WordlePage<'a, H: PageHost> {
    host: &'a H,
    config: &'a WordleConfig,
    locators: WordleLocators,
}

impl<'a, H: PageHost> WordlePage<'a, H> {
    pub fn new(host: &'a H, config: &'a WordleConfig) -> Self {
        Self {
            host,
            config,
            locators: WordleLocators::new(config.selectors.clone()),
        }
    }

    pub async fn navigate_to_game(&self) -> Result<()> {
        let Some(base_url) = self.config.base_url.as_deref() else {
            return Err(WordleError::Config(
                "BASE_URL environment variable is not set".to_string(),
            ));
        };
        self.host.navigate(base_url).await?;
        Ok(())
    }

    /// Returning sessions may never see the terms blocker.
    pub async fn close_terms_of_service_modal(&self) -> Result<()> {
        let modal = &self.locators.terms_modal;
        if self.host.count(modal).await? == 0 {
            log::debug!("terms of service modal absent, skipping");
            return Ok(());
        }
        self.host.click(&self.locators.terms_continue_button).await?;
        self.host.wait_for(modal, ElementState::Hidden, None).await?;
        Ok(())
    }

    pub async fn start_game(&self) -> Result<()> {
        self.host.click(&self.locators.play_button).await?;
        self.host.click(&self.locators.modal_close_button).await?;
        self.host
            .wait_for(&self.locators.modal_overlay, ElementState::Hidden, None)
            .await?;
        Ok(())
    }

    /// Navigate and dismiss both dialogs, leaving the board interactable.
    pub async fn setup_game(&self) -> Result<()> {
        self.navigate_to_game().await?;
        self.close_terms_of_service_modal().await?;
        self.start_game().await?;
        log::info!("game ready");
        Ok(())
    }

    pub async fn verify_page_title(&self) -> Result<()> {
        let title = self.host.title().await?;
        if title != self.config.expected_title {
            return Err(WordleError::assertion(
                "page title",
                &self.config.expected_title,
                title,
            ));
        }
        Ok(())
    }

    pub async fn verify_board_visible(&self) -> Result<()> {
        let waited = self.config.expect_timeout;
        match self
            .host
            .wait_for(&self.locators.game_board, ElementState::Visible, Some(waited))
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_timeout() => Err(WordleError::assertion(
                "game board",
                "visible",
                format!("not visible after {waited:?}"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Every failing row is reported, not just the first.
    pub async fn verify_board_dimensions(&self) -> Result<()> {
        let rows_locator = &self.locators.board_rows;
        let row_count = self.host.count(rows_locator).await?;
        if row_count != EXPECTED_ROWS {
            return Err(WordleError::assertion("board rows", EXPECTED_ROWS, row_count));
        }

        let rows = self.host.resolve_all(rows_locator).await?;
        let mut mismatches = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let tiles = self.host.count_in(&self.locators.row_tiles(row)).await?;
            if tiles != EXPECTED_COLUMNS {
                mismatches.push(format!("row {} has {tiles}", index + 1));
            }
        }

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(WordleError::assertion(
                "tiles per row",
                EXPECTED_COLUMNS,
                mismatches.join(", "),
            ))
        }
    }

    pub async fn enter_word(&self, word: &str) -> Result<()> {
        if word.chars().count() != WORD_LENGTH {
            return Err(WordleError::InvalidWord {
                expected: WORD_LENGTH,
                word: word.to_string(),
            });
        }

        log::debug!("entering word {word}");
        // One key per counted character; the locator handles case.
        for letter in word.chars() {
            self.host
                .click(&self.locators.keyboard_letter(letter))
                .await?;
        }
        self.host.click(&self.locators.enter_key).await?;
        Ok(())
    }

    /// Wait briefly for the toast. Only a timeout counts as absence; any
    /// other failure is returned as an error.
    pub async fn notification(&self) -> Result<Notification> {
        let toast = &self.locators.toast_container;
        let waited = self.config.notification_timeout;
        match self
            .host
            .wait_for(toast, ElementState::Visible, Some(waited))
            .await
        {
            Ok(()) => {
                let text = self.host.accessible_text(toast).await?;
                log::debug!("notification shown: {text}");
                Ok(Notification::Shown(text))
            }
            Err(err) if err.is_timeout() => Ok(Notification::Absent { waited }),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn expect_error_message(&self, expected: &str) -> Result<()> {
        match self.notification().await? {
            Notification::Shown(text) if text.contains(expected) => Ok(()),
            Notification::Shown(text) => Err(WordleError::assertion(
                "notification",
                format!("text containing {expected:?}"),
                format!("{text:?}"),
            )),
            Notification::Absent { waited } => Err(WordleError::NotificationMissing { waited }),
        }
    }

    pub async fn expect_no_error_message(&self, unexpected: &str) -> Result<()> {
        match self.notification().await? {
            Notification::Shown(text) if text.contains(unexpected) => {
                Err(WordleError::assertion(
                    "notification",
                    format!("text without {unexpected:?}"),
                    format!("{text:?}"),
                ))
            }
            Notification::Shown(_) => Ok(()),
            Notification::Absent { .. } => {
                log::debug!("no notification appeared; treating as no error");
                Ok(())
            }
        }
    }
}
