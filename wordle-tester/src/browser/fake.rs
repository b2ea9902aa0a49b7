//! Recording stand-in for a browser page, used by unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::host::{DEFAULT_TIMEOUT, ElementState, HostError, PageHost};
use crate::wordle::locators::{Locator, Scoped, Selector};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    Title,
    Count(Locator),
    ResolveAll(Locator),
    CountIn(usize, Selector),
    Click(Locator),
    WaitFor(Locator, ElementState, Option<Duration>),
    Text(Locator),
}

#[derive(Debug, Clone, Default)]
struct FakeElement {
    visible: bool,
    text: String,
    stale: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    elements: HashMap<Locator, FakeElement>,
    rows: Option<(Locator, Vec<usize>)>,
    title: String,
    on_click: Vec<(Locator, Locator, bool)>,
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<FakeState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_element(self, locator: &Locator, visible: bool) -> Self {
        self.state().elements.insert(
            locator.clone(),
            FakeElement {
                visible,
                ..FakeElement::default()
            },
        );
        self
    }

    pub fn with_text(self, locator: &Locator, text: &str) -> Self {
        self.state()
            .elements
            .entry(locator.clone())
            .or_default()
            .text = text.to_string();
        self
    }

    /// Every lookup of `locator` fails as if the element detached.
    pub fn with_stale(self, locator: &Locator) -> Self {
        self.state()
            .elements
            .entry(locator.clone())
            .or_default()
            .stale = true;
        self
    }

    /// `rows` holds the tile count of each row.
    pub fn with_rows(self, locator: &Locator, rows: Vec<usize>) -> Self {
        self.state().rows = Some((locator.clone(), rows));
        self
    }

    pub fn with_title(self, title: &str) -> Self {
        self.state().title = title.to_string();
        self
    }

    /// Clicking `button` makes `target` visible or hidden.
    pub fn on_click(self, button: &Locator, target: &Locator, visible: bool) -> Self {
        self.state()
            .on_click
            .push((button.clone(), target.clone(), visible));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clicks(&self) -> Vec<Locator> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Click(locator) => Some(locator),
                _ => None,
            })
            .collect()
    }

    pub fn is_visible(&self, locator: &Locator) -> bool {
        self.state()
            .elements
            .get(locator)
            .is_some_and(|el| el.visible)
    }
}

fn stale(locator: &Locator) -> HostError {
    HostError::Stale {
        target: locator.to_string(),
    }
}

#[async_trait]
impl PageHost for FakeHost {
    type Element = usize;

    async fn navigate(&self, url: &str) -> Result<(), HostError> {
        self.state().calls.push(Call::Navigate(url.to_string()));
        Ok(())
    }

    async fn title(&self) -> Result<String, HostError> {
        let mut state = self.state();
        state.calls.push(Call::Title);
        Ok(state.title.clone())
    }

    async fn count(&self, locator: &Locator) -> Result<usize, HostError> {
        let mut state = self.state();
        state.calls.push(Call::Count(locator.clone()));
        if let Some((rows_locator, rows)) = &state.rows
            && rows_locator == locator
        {
            return Ok(rows.len());
        }
        Ok(usize::from(state.elements.contains_key(locator)))
    }

    async fn resolve_all(&self, locator: &Locator) -> Result<Vec<usize>, HostError> {
        let mut state = self.state();
        state.calls.push(Call::ResolveAll(locator.clone()));
        match &state.rows {
            Some((rows_locator, rows)) if rows_locator == locator => Ok((0..rows.len()).collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn count_in(&self, scoped: &Scoped<'_, usize>) -> Result<usize, HostError> {
        let mut state = self.state();
        state
            .calls
            .push(Call::CountIn(*scoped.parent, scoped.selector.clone()));
        Ok(state
            .rows
            .as_ref()
            .and_then(|(_, rows)| rows.get(*scoped.parent).copied())
            .unwrap_or(0))
    }

    async fn click(&self, locator: &Locator) -> Result<(), HostError> {
        let mut state = self.state();
        match state.elements.get(locator) {
            Some(el) if el.stale => return Err(stale(locator)),
            Some(el) if el.visible => {}
            _ => {
                return Err(HostError::Timeout {
                    target: locator.to_string(),
                    state: ElementState::Visible,
                    timeout: DEFAULT_TIMEOUT,
                });
            }
        }
        state.calls.push(Call::Click(locator.clone()));

        let effects: Vec<(Locator, bool)> = state
            .on_click
            .iter()
            .filter(|(button, _, _)| button == locator)
            .map(|(_, target, visible)| (target.clone(), *visible))
            .collect();
        for (target, visible) in effects {
            state.elements.entry(target).or_default().visible = visible;
        }
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Option<Duration>,
    ) -> Result<(), HostError> {
        let mut guard = self.state();
        guard
            .calls
            .push(Call::WaitFor(locator.clone(), state, timeout));

        let element = guard.elements.get(locator);
        if element.is_some_and(|el| el.stale) {
            return Err(stale(locator));
        }
        if state.reached(element.is_some_and(|el| el.visible)) {
            Ok(())
        } else {
            Err(HostError::Timeout {
                target: locator.to_string(),
                state,
                timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            })
        }
    }

    async fn accessible_text(&self, locator: &Locator) -> Result<String, HostError> {
        let mut state = self.state();
        state.calls.push(Call::Text(locator.clone()));
        match state.elements.get(locator) {
            Some(el) if !el.stale => Ok(el.text.clone()),
            _ => Err(stale(locator)),
        }
    }
}
