#[cfg(test)]
pub mod fake;
pub mod host;
pub mod session;

pub use host::{ElementState, HostError, PageHost, WebDriverHost};
pub use session::{BrowserConfig, BrowserKind, new_session};
