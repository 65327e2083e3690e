//! In-memory stand-ins for the oracle, the document extractor and the browser.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::browser::{
    BrowserError, BrowserSession, ElementDriver, NodeSummary, PageDriver, Relation,
    SessionLauncher,
};
use crate::llm_client::{LlmError, Oracle};
use crate::resume::{ExtractionError, TextExtractor};

// ────────────────────────────────────────────────────────────────────────────
// Oracle
// ────────────────────────────────────────────────────────────────────────────

type Responder = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// Oracle whose answers are computed from the prompt by a closure.
pub struct ScriptedOracle {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(responder: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(unavailable()))
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

pub fn unavailable() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "model overloaded".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text extraction
// ────────────────────────────────────────────────────────────────────────────

pub struct StaticTextExtractor {
    text: Option<String>,
}

impl StaticTextExtractor {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

impl TextExtractor for StaticTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        self.text.clone().ok_or_else(|| ExtractionError::NoText {
            path: path.to_path_buf(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Browser
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeState {
    pub value: String,
    pub checked: bool,
    pub selected: Option<String>,
    pub clicks: usize,
    pub uploaded: Option<PathBuf>,
}

#[derive(Default)]
pub struct FakeNode {
    tag: String,
    attrs: HashMap<String, String>,
    text: String,
    options: Vec<String>,
    relations: HashMap<&'static str, NodeSummary>,
    children: HashMap<String, Vec<FakeElement>>,
    broken: bool,
    state: Mutex<FakeState>,
}

/// Shared handle to a fake DOM node; clones observe the same state.
#[derive(Clone)]
pub struct FakeElement(Arc<FakeNode>);

pub struct FakeElementBuilder(FakeNode);

impl FakeElement {
    pub fn builder(tag: &str) -> FakeElementBuilder {
        FakeElementBuilder(FakeNode {
            tag: tag.to_string(),
            ..Default::default()
        })
    }

    pub fn input(kind: &str, name: &str) -> FakeElementBuilder {
        Self::builder("input").attr("type", kind).attr("name", name)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.0.state.lock().unwrap()
    }

    fn check(&self) -> Result<(), BrowserError> {
        if self.0.broken {
            Err(BrowserError::Script("stale element reference".to_string()))
        } else {
            Ok(())
        }
    }
}

impl FakeElementBuilder {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.0.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.0.text = text.to_string();
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.0.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn checked(self, checked: bool) -> Self {
        self.0.state.lock().unwrap().checked = checked;
        self
    }

    pub fn related(mut self, relation: Relation, tag: &str, text: &str) -> Self {
        let key = relation_key(relation);
        self.0.relations.insert(
            key,
            NodeSummary {
                tag: tag.to_string(),
                text: text.to_string(),
            },
        );
        self
    }

    pub fn child(mut self, selector: &str, element: FakeElement) -> Self {
        self.0
            .children
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    pub fn broken(mut self) -> Self {
        self.0.broken = true;
        self
    }

    pub fn build(self) -> FakeElement {
        FakeElement(Arc::new(self.0))
    }
}

fn relation_key(relation: Relation) -> &'static str {
    match relation {
        Relation::Parent => "parent",
        Relation::PreviousSibling => "previous",
        Relation::NextSibling => "next",
    }
}

#[async_trait]
impl ElementDriver for FakeElement {
    async fn tag_name(&self) -> Result<String, BrowserError> {
        self.check()?;
        Ok(self.0.tag.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.check()?;
        Ok(self.0.attrs.get(name).cloned())
    }

    async fn text(&self) -> Result<String, BrowserError> {
        self.check()?;
        Ok(self.0.text.clone())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, BrowserError> {
        self.check()?;
        Ok(self.0.children.get(selector).cloned().unwrap_or_default())
    }

    async fn related(&self, relation: Relation) -> Result<Option<NodeSummary>, BrowserError> {
        self.check()?;
        Ok(self.0.relations.get(relation_key(relation)).cloned())
    }

    async fn clear(&self) -> Result<(), BrowserError> {
        self.check()?;
        self.state().value.clear();
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.check()?;
        self.state().value.push_str(text);
        Ok(())
    }

    async fn click(&self) -> Result<(), BrowserError> {
        self.check()?;
        let mut state = self.state();
        state.clicks += 1;
        match self.0.attrs.get("type").map(String::as_str) {
            Some("checkbox") => state.checked = !state.checked,
            Some("radio") => state.checked = true,
            _ => {}
        }
        Ok(())
    }

    async fn is_checked(&self) -> Result<bool, BrowserError> {
        self.check()?;
        Ok(self.state().checked)
    }

    async fn option_texts(&self) -> Result<Vec<String>, BrowserError> {
        self.check()?;
        Ok(self.0.options.clone())
    }

    async fn select_option(&self, text: &str) -> Result<(), BrowserError> {
        self.check()?;
        if !self.0.options.iter().any(|o| o == text) {
            return Err(BrowserError::NotFound(format!("option '{text}'")));
        }
        self.state().selected = Some(text.to_string());
        Ok(())
    }

    async fn upload_file(&self, path: &Path) -> Result<(), BrowserError> {
        self.check()?;
        self.state().uploaded = Some(path.to_path_buf());
        Ok(())
    }
}

/// One loaded document: elements per CSS selector plus body text.
#[derive(Clone, Default)]
pub struct FakeDocument {
    selectors: HashMap<String, Vec<FakeElement>>,
    text: String,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.selectors
            .entry(selector.to_string())
            .or_default()
            .extend(elements);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

/// A page that serves pre-registered documents by URL. Unknown URLs fail to load.
#[derive(Default)]
pub struct FakePage {
    documents: HashMap<String, FakeDocument>,
    current: Mutex<Option<String>>,
    visits: Mutex<Vec<String>>,
    scrolls: AtomicUsize,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, document: FakeDocument) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    /// A page already showing `document`, for components that never navigate.
    pub fn showing(document: FakeDocument) -> Self {
        let page = Self::new().serve("about:form", document);
        *page.current.lock().unwrap() = Some("about:form".to_string());
        page
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    fn document(&self) -> Option<FakeDocument> {
        let current = self.current.lock().unwrap().clone()?;
        self.documents.get(&current).cloned()
    }
}

#[async_trait]
impl PageDriver for FakePage {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.visits.lock().unwrap().push(url.to_string());
        if !self.documents.contains_key(url) {
            *self.current.lock().unwrap() = None;
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, BrowserError> {
        Ok(self
            .document()
            .and_then(|doc| doc.selectors.get(selector).cloned())
            .unwrap_or_default())
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn page_text(&self) -> Result<String, BrowserError> {
        Ok(self.document().map(|doc| doc.text).unwrap_or_default())
    }
}

/// Launcher whose sessions hand out empty pages and record their own shutdown.
#[derive(Default)]
pub struct FakeLauncher {
    failing: Vec<&'static str>,
    broken_pages: bool,
    launched: Mutex<Vec<&'static str>>,
    closed: Arc<Mutex<Vec<&'static str>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launching a session with this label fails.
    pub fn failing_on(mut self, label: &'static str) -> Self {
        self.failing.push(label);
        self
    }

    /// Sessions launch but cannot open a page.
    pub fn with_broken_pages(mut self) -> Self {
        self.broken_pages = true;
        self
    }

    /// Every launch attempt, in order.
    pub fn launched(&self) -> Vec<&'static str> {
        self.launched.lock().unwrap().clone()
    }

    /// Labels of closed sessions, in closing order.
    pub fn closed(&self) -> Vec<&'static str> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, label: &'static str) -> Result<FakeSession, BrowserError> {
        self.launched.lock().unwrap().push(label);
        if self.failing.contains(&label) {
            return Err(BrowserError::Launch(format!("{label}: chrome not found")));
        }
        Ok(FakeSession {
            label,
            broken_pages: self.broken_pages,
            closed: Arc::clone(&self.closed),
        })
    }
}

pub struct FakeSession {
    label: &'static str,
    broken_pages: bool,
    closed: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn new_page(&self) -> Result<FakePage, BrowserError> {
        if self.broken_pages {
            return Err(BrowserError::Script("target crashed".to_string()));
        }
        Ok(FakePage::new())
    }

    async fn close(self) {
        self.closed.lock().unwrap().push(self.label);
    }
}
