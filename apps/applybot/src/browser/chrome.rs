//! Chrome/Chromium implementation of the browser surface via `chromiumoxide`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    BrowserError, BrowserSession, ElementDriver, NodeSummary, PageDriver, Relation,
    SessionLauncher,
};

/// Launches local Chrome/Chromium processes.
#[derive(Debug, Clone, Copy)]
pub struct ChromeLauncher {
    pub headless: bool,
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self, label: &'static str) -> Result<ChromeSession, BrowserError> {
        ChromeSession::launch(label, self.headless).await
    }
}

/// Per-process profile directory for one session.
fn profile_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("applybot-{label}-{}", std::process::id()))
}

fn remove_profile_dir(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => debug!("Removed browser profile {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove browser profile {}: {e}", dir.display()),
    }
}

/// One live browser process plus the task pumping its CDP event stream.
///
/// Call `close` on every exit path. Dropping an unclosed session aborts the
/// handler task and leaves process cleanup to `chromiumoxide`'s own drop.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    label: &'static str,
    user_data_dir: PathBuf,
}

impl ChromeSession {
    async fn launch(label: &'static str, headless: bool) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }

        // Two sessions run side by side, so each needs its own profile directory.
        let user_data_dir = profile_dir(label);
        remove_profile_dir(&user_data_dir);
        builder = builder.user_data_dir(user_data_dir.clone());

        let config = builder.build().map_err(BrowserError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {e}");
                    break;
                }
            }
        });

        info!("Launched {label} browser session (headless={headless})");
        Ok(Self {
            browser,
            handler,
            label,
            user_data_dir,
        })
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    async fn new_page(&self) -> Result<ChromePage, BrowserError> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromePage { page })
    }

    /// Shuts the browser down, waits for the process to exit and deletes its profile.
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close {} browser cleanly: {e}", self.label);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap {} browser process: {e}", self.label);
        }
        self.handler.abort();
        remove_profile_dir(&self.user_data_dir);
        info!("Closed {} browser session", self.label);
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

pub struct ChromePage {
    page: Page,
}

#[async_trait]
impl PageDriver for ChromePage {
    type Element = ChromeElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>, BrowserError> {
        let elements = self.page.find_elements(selector).await?;
        Ok(elements
            .into_iter()
            .map(|element| ChromeElement {
                element,
                page: self.page.clone(),
            })
            .collect())
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight); true")
            .await?;
        Ok(())
    }

    async fn page_text(&self) -> Result<String, BrowserError> {
        self.page
            .evaluate("document.body ? document.body.innerText : ''")
            .await?
            .into_value::<String>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }
}

pub struct ChromeElement {
    element: Element,
    page: Page,
}

impl ChromeElement {
    /// Runs `declaration` with `this` bound to the element and returns its primitive result.
    async fn call_fn(&self, declaration: &str) -> Result<Value, BrowserError> {
        let returns = self.element.call_js_fn(declaration, false).await?;
        if let Some(exception) = returns.exception_details {
            return Err(BrowserError::Script(exception.text));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ElementDriver for ChromeElement {
    async fn tag_name(&self) -> Result<String, BrowserError> {
        match self
            .call_fn("function() { return this.tagName.toLowerCase(); }")
            .await?
        {
            Value::String(tag) => Ok(tag),
            other => Err(BrowserError::Script(format!("unexpected tag name: {other}"))),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.element.attribute(name).await?)
    }

    async fn text(&self) -> Result<String, BrowserError> {
        Ok(self.element.inner_text().await?.unwrap_or_default())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>, BrowserError> {
        let elements = self.element.find_elements(selector).await?;
        Ok(elements
            .into_iter()
            .map(|element| ChromeElement {
                element,
                page: self.page.clone(),
            })
            .collect())
    }

    async fn related(&self, relation: Relation) -> Result<Option<NodeSummary>, BrowserError> {
        let accessor = match relation {
            Relation::Parent => "parentElement",
            Relation::PreviousSibling => "previousElementSibling",
            Relation::NextSibling => "nextElementSibling",
        };
        let declaration = format!(
            "function() {{ const n = this.{accessor}; \
             return n ? JSON.stringify({{ tag: n.tagName.toLowerCase(), text: (n.innerText || '').trim() }}) : null; }}"
        );
        match self.call_fn(&declaration).await? {
            Value::String(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| BrowserError::Script(e.to_string())),
            _ => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), BrowserError> {
        self.call_fn(
            "function() { this.value = ''; \
             this.dispatchEvent(new Event('input', { bubbles: true })); return true; }",
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.element.focus().await?;
        self.element.type_str(text).await?;
        Ok(())
    }

    async fn click(&self) -> Result<(), BrowserError> {
        self.element.click().await?;
        Ok(())
    }

    async fn is_checked(&self) -> Result<bool, BrowserError> {
        Ok(self
            .call_fn("function() { return !!this.checked; }")
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn option_texts(&self) -> Result<Vec<String>, BrowserError> {
        let raw = self
            .call_fn(
                "function() { return JSON.stringify(Array.from(this.options || []).map(o => o.text)); }",
            )
            .await?;
        match raw {
            Value::String(raw) => {
                serde_json::from_str(&raw).map_err(|e| BrowserError::Script(e.to_string()))
            }
            _ => Ok(vec![]),
        }
    }

    async fn select_option(&self, text: &str) -> Result<(), BrowserError> {
        let wanted = serde_json::to_string(text).map_err(|e| BrowserError::Script(e.to_string()))?;
        let declaration = format!(
            "function() {{ const i = Array.from(this.options || []).findIndex(o => o.text === {wanted}); \
             if (i < 0) return false; this.selectedIndex = i; \
             this.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }}"
        );
        match self.call_fn(&declaration).await? {
            Value::Bool(true) => Ok(()),
            _ => Err(BrowserError::NotFound(format!("option '{text}'"))),
        }
    }

    async fn upload_file(&self, path: &Path) -> Result<(), BrowserError> {
        let params = SetFileInputFilesParams::builder()
            .files(vec![path.display().to_string()])
            .backend_node_id(self.element.backend_node_id.clone())
            .build()
            .map_err(BrowserError::Script)?;
        self.page.execute(params).await?;
        Ok(())
    }
}
