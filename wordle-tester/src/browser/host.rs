use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thirtyfour::error::WebDriverErrorInner;
use thirtyfour::extensions::query::{ElementPollerWithTimeout, ElementQuery};
use thirtyfour::prelude::*;

use crate::wordle::locators::{Locator, Scoped, Selector};

/// Ceiling used when a caller does not pass an explicit timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Visible,
    Hidden,
}

impl ElementState {
    /// Whether an element with the given visibility is in this state.
    pub const fn reached(self, visible: bool) -> bool {
        match self {
            Self::Visible => visible,
            Self::Hidden => !visible,
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Hidden => f.write_str("hidden"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("timed out after {timeout:?} waiting for {target} to be {state}")]
    Timeout {
        target: String,
        state: ElementState,
        timeout: Duration,
    },
    #[error("{target} disappeared before it could be used")]
    Stale { target: String },
    #[error("WebDriver error: {0}")]
    Driver(#[from] WebDriverError),
}

impl HostError {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// The capabilities the interaction layer needs from a live page.
///
/// Every call settles before it returns; callers never issue two calls
/// against the same host concurrently.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// A resolved element, valid for the lifetime of the page.
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), HostError>;

    async fn title(&self) -> Result<String, HostError>;

    /// Number of current matches; never waits.
    async fn count(&self, locator: &Locator) -> Result<usize, HostError>;

    /// Resolve every current match once.
    async fn resolve_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, HostError>;

    async fn count_in(&self, scoped: &Scoped<'_, Self::Element>) -> Result<usize, HostError>;

    /// Wait for the element to be visible, then click it.
    async fn click(&self, locator: &Locator) -> Result<(), HostError>;

    /// `None` waits up to [`DEFAULT_TIMEOUT`].
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Option<Duration>,
    ) -> Result<(), HostError>;

    /// Rendered text of the element, falling back to its accessible label.
    async fn accessible_text(&self, locator: &Locator) -> Result<String, HostError>;
}

/// [`PageHost`] over a WebDriver session.
#[derive(Debug, Clone)]
pub struct WebDriverHost<'a> {
    driver: &'a WebDriver,
    default_timeout: Duration,
}

impl<'a> WebDriverHost<'a> {
    pub const fn new(driver: &'a WebDriver) -> Self {
        Self {
            driver,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Current matches of `selector` under `parent`, or under the document.
    async fn select(
        &self,
        parent: Option<&WebElement>,
        selector: &Selector,
        displayed_only: bool,
    ) -> Result<Vec<WebElement>, HostError> {
        match element_query(self.driver, parent, selector, displayed_only) {
            Some(query) => Ok(query.all_from_selector().await?),
            None => Ok(Vec::new()),
        }
    }

    /// Resolve every link of the chain without waiting. With `displayed_only`
    /// the last link keeps only rendered elements.
    async fn matches(
        &self,
        locator: &Locator,
        displayed_only: bool,
    ) -> Result<Vec<WebElement>, HostError> {
        let Some((last, ancestors)) = locator.chain().split_last() else {
            return Ok(Vec::new());
        };

        let mut scopes: Vec<Option<WebElement>> = vec![None];
        for selector in ancestors {
            let mut next = Vec::new();
            for scope in &scopes {
                next.extend(
                    self.select(scope.as_ref(), selector, false)
                        .await?
                        .into_iter()
                        .map(Some),
                );
            }
            scopes = next;
        }

        let mut found = Vec::new();
        for scope in &scopes {
            found.extend(self.select(scope.as_ref(), last, displayed_only).await?);
        }
        Ok(found)
    }

    async fn first_displayed(&self, locator: &Locator) -> Result<Option<WebElement>, HostError> {
        Ok(self.matches(locator, true).await?.into_iter().next())
    }
}

#[async_trait]
impl PageHost for WebDriverHost<'_> {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), HostError> {
        log::debug!("navigating to {url}");
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn title(&self) -> Result<String, HostError> {
        Ok(self.driver.title().await?)
    }

    async fn count(&self, locator: &Locator) -> Result<usize, HostError> {
        Ok(self.matches(locator, false).await?.len())
    }

    async fn resolve_all(&self, locator: &Locator) -> Result<Vec<WebElement>, HostError> {
        self.matches(locator, false).await
    }

    async fn count_in(&self, scoped: &Scoped<'_, WebElement>) -> Result<usize, HostError> {
        Ok(self
            .select(Some(scoped.parent), &scoped.selector, false)
            .await?
            .len())
    }

    async fn click(&self, locator: &Locator) -> Result<(), HostError> {
        self.wait_for(locator, ElementState::Visible, None).await?;
        let Some(el) = self.first_displayed(locator).await? else {
            return Err(HostError::Stale {
                target: locator.to_string(),
            });
        };
        log::debug!("clicking {locator}");
        el.click().await?;
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Option<Duration>,
    ) -> Result<(), HostError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        poll_until(locator, state, timeout, POLL_INTERVAL, move || async move {
            Ok::<_, HostError>(!self.matches(locator, true).await?.is_empty())
        })
        .await
    }

    async fn accessible_text(&self, locator: &Locator) -> Result<String, HostError> {
        let Some(el) = self.first_displayed(locator).await? else {
            return Err(HostError::Stale {
                target: locator.to_string(),
            });
        };
        let text = el.text().await?;
        if !text.trim().is_empty() {
            return Ok(text);
        }
        Ok(el.attr("aria-label").await?.unwrap_or_default())
    }
}

/// Re-run `probe` (which reports whether the target is visible) until it
/// reaches `state`. Only running out of time is a timeout; a failing probe
/// ends the wait with its own error.
async fn poll_until<F, Fut>(
    locator: &Locator,
    state: ElementState,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<(), HostError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, HostError>>,
{
    let mut poller = ElementPollerWithTimeout::new(timeout, interval);
    loop {
        if state.reached(probe().await?) {
            return Ok(());
        }
        if !poller.tick().await {
            return Err(HostError::Timeout {
                target: locator.to_string(),
                state,
                timeout,
            });
        }
    }
}

/// A non-waiting query trying each strategy of `selector` in order.
fn element_query(
    driver: &WebDriver,
    parent: Option<&WebElement>,
    selector: &Selector,
    displayed_only: bool,
) -> Option<ElementQuery> {
    let mut bys = strategies(selector, parent.is_some()).into_iter();
    let first = bys.next()?;
    let root = match parent {
        Some(el) => el.query(first),
        None => driver.query(first),
    };
    let filtered = |query: ElementQuery| {
        if displayed_only {
            query.with_filter(displayed)
        } else {
            query
        }
    };
    let query = bys.fold(filtered(root), |query, by| filtered(query.or(by)));
    Some(query.nowait().desc(&selector.to_string()))
}

fn displayed(el: WebElement) -> impl Future<Output = WebDriverResult<bool>> + Send {
    async move { displayed_or_detached(el.is_displayed().await) }
}

/// An element that detached between lookup and the check is not displayed.
fn displayed_or_detached(result: WebDriverResult<bool>) -> WebDriverResult<bool> {
    match result {
        Err(err) if matches!(err.as_inner(), WebDriverErrorInner::StaleElementReference(_)) => {
            Ok(false)
        }
        other => other,
    }
}

/// WebDriver strategies for a selector, tried in order.
fn strategies(selector: &Selector, relative: bool) -> Vec<By> {
    match selector {
        Selector::Role { role, name } => vec![By::XPath(role_xpath(role, name, relative))],
        Selector::TestId { id } => vec![By::Css(format!("[data-testid={}]", css_string(id)))],
        Selector::Label { label } => vec![By::Css(format!("[aria-label={}]", css_string(label)))],
        Selector::Css { css } => vec![By::Css(css.clone())],
        Selector::AnyOf { options } => options
            .iter()
            .flat_map(|option| strategies(option, relative))
            .collect(),
    }
}

fn role_xpath(role: &str, name: &str, relative: bool) -> String {
    let prefix = if relative { ".//" } else { "//" };
    let native = match role {
        "button" => "self::button or ",
        "link" => "self::a or ",
        "dialog" => "self::dialog or ",
        _ => "",
    };
    let haystack = "translate(concat(normalize-space(.), ' ', @aria-label), \
                    'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')";
    format!(
        "{prefix}*[{native}@role={}][contains({haystack}, {})]",
        xpath_string(role),
        xpath_string(&name.to_lowercase())
    )
}

fn xpath_string(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn css_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
