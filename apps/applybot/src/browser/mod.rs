//! Browser automation surface.
//!
//! Components drive pages through `PageDriver` / `ElementDriver` so the
//! scraping, field-discovery and fill logic never touches CDP types directly.
//! `chrome` is the production implementation; tests use in-memory pages.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub mod chrome;

pub use chrome::ChromeLauncher;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// Which neighbouring node of an element to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Parent,
    PreviousSibling,
    NextSibling,
}

/// Tag and visible text of a node related to an element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeSummary {
    pub tag: String,
    pub text: String,
}

impl NodeSummary {
    pub fn is_label(&self) -> bool {
        self.tag.eq_ignore_ascii_case("label")
    }
}

/// Starts browser sessions. The run opens one for searching and one for applying.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, label: &'static str) -> Result<Self::Session, BrowserError>;
}

/// A running browser. Must be closed explicitly; closing logs its own failures.
#[async_trait]
pub trait BrowserSession: Send + Sync + Sized {
    type Page: PageDriver;

    async fn new_page(&self) -> Result<Self::Page, BrowserError>;

    async fn close(self);
}

/// A loaded page. One page per browser session; navigation replaces its content.
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: ElementDriver;

    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// All elements matching a CSS selector, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, BrowserError>;

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError>;

    /// Visible text of the whole document body.
    async fn page_text(&self) -> Result<String, BrowserError>;
}

/// A handle to one element of a loaded page. Handles go stale on navigation.
#[async_trait]
pub trait ElementDriver: Send + Sync + Sized {
    /// Lowercase tag name.
    async fn tag_name(&self) -> Result<String, BrowserError>;

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError>;

    /// Visible text, trimmed by the caller.
    async fn text(&self) -> Result<String, BrowserError>;

    /// Descendants matching a CSS selector.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, BrowserError>;

    async fn related(&self, relation: Relation) -> Result<Option<NodeSummary>, BrowserError>;

    async fn clear(&self) -> Result<(), BrowserError>;

    async fn type_text(&self, text: &str) -> Result<(), BrowserError>;

    async fn click(&self) -> Result<(), BrowserError>;

    /// Current `checked` state of a checkbox or radio control.
    async fn is_checked(&self) -> Result<bool, BrowserError>;

    /// Visible texts of a select control's options, in order.
    async fn option_texts(&self) -> Result<Vec<String>, BrowserError>;

    /// Selects the option whose visible text equals `text` exactly.
    async fn select_option(&self, text: &str) -> Result<(), BrowserError>;

    async fn upload_file(&self, path: &Path) -> Result<(), BrowserError>;
}

/// First element matching `selector` under `parent`, as an error when absent.
pub async fn find_first<E: ElementDriver>(parent: &E, selector: &str) -> Result<E, BrowserError> {
    parent
        .find_all(selector)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| BrowserError::NotFound(selector.to_string()))
}

/// Quotes a value for use inside a CSS attribute selector.
pub fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
