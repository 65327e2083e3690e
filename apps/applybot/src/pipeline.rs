//! End-to-end run: resume → search → rank → apply, with pacing between attempts.

use std::fmt;
use std::path::Path;

use tracing::{error, info, warn};

use crate::apply::{ApplicationAutomator, MappingStrategy};
use crate::browser::{BrowserSession, ChromeLauncher, PageDriver, SessionLauncher};
use crate::config::{Config, Pacing};
use crate::errors::AppError;
use crate::llm_client::{LlmClient, Oracle};
use crate::models::{JobPosting, ResumeProfile};
use crate::resume::{extract_profile, PdfTextExtractor};
use crate::search::{rank_postings, JobFinder, OracleMatchScorer};

/// Number of ranked postings shown before applying.
const TOP_MATCHES_SHOWN: usize = 5;
/// Characters of the match explanation shown per top posting.
const REASON_PREVIEW_CHARS: usize = 100;

/// Where a run is. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Idle,
    Searching,
    Filtering,
    Applying,
    Done,
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub keywords: Vec<String>,
    pub location: String,
    pub max_applications: usize,
    pub strategy: MappingStrategy,
}

/// Counts reported at the end of every run, including early exits.
///
/// Always `applied + failed == attempted <= min(max_applications, matched)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub matched: usize,
    pub attempted: usize,
    pub applied: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found={} matched={} attempted={} applied={} failed={}",
            self.found, self.matched, self.attempted, self.applied, self.failed
        )
    }
}

/// Drives one run over a search page and an application page.
pub struct Orchestrator<'a, S: PageDriver, A: PageDriver> {
    search_page: &'a S,
    apply_page: &'a A,
    oracle: &'a dyn Oracle,
    pacing: &'a Pacing,
    phase: RunPhase,
}

impl<'a, S: PageDriver, A: PageDriver> Orchestrator<'a, S, A> {
    pub fn new(search_page: &'a S, apply_page: &'a A, oracle: &'a dyn Oracle, pacing: &'a Pacing) -> Self {
        Self {
            search_page,
            apply_page,
            oracle,
            pacing,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn advance(&mut self, next: RunPhase) {
        if next <= self.phase {
            warn!("Ignoring phase change {:?} -> {next:?}", self.phase);
            return;
        }
        info!("Phase {:?} -> {next:?}", self.phase);
        self.phase = next;
    }

    pub async fn run(&mut self, profile: &ResumeProfile, request: &RunRequest) -> RunSummary {
        let mut summary = RunSummary::default();

        println!(
            "\nStarting job search for: {} in {}",
            request.keywords.join(", "),
            request.location
        );

        self.advance(RunPhase::Searching);
        println!("Searching for jobs...");
        let postings = JobFinder::new(self.search_page, self.pacing)
            .search(&request.keywords, &request.location)
            .await;
        summary.found = postings.len();
        println!("Found {} job postings", summary.found);

        if postings.is_empty() {
            println!("No jobs found. Please try different keywords or location.");
            self.advance(RunPhase::Done);
            return summary;
        }

        self.advance(RunPhase::Filtering);
        println!("\nAnalyzing job matches against your resume...");
        let scorer = OracleMatchScorer::new(self.oracle);
        let matches = rank_postings(&scorer, profile, postings).await;
        summary.matched = matches.len();
        println!("Found {} matching jobs", summary.matched);

        if matches.is_empty() {
            println!("No matching jobs found. Please try different keywords or location.");
            self.advance(RunPhase::Done);
            return summary;
        }

        print_top_matches(&matches);

        self.advance(RunPhase::Applying);
        self.apply_all(profile, request, &matches, &mut summary).await;

        println!(
            "\nCompleted {} applications out of {} attempts",
            summary.applied, summary.attempted
        );
        self.advance(RunPhase::Done);
        info!("Run finished: {summary}");
        summary
    }

    async fn apply_all(
        &self,
        profile: &ResumeProfile,
        request: &RunRequest,
        matches: &[JobPosting],
        summary: &mut RunSummary,
    ) {
        let targets = request.max_applications.min(matches.len());
        println!(
            "\nStarting application process for up to {} jobs...",
            request.max_applications
        );

        let automator = ApplicationAutomator::new(
            self.apply_page,
            self.oracle,
            profile,
            self.pacing,
            request.strategy,
        );

        for (i, posting) in matches.iter().take(targets).enumerate() {
            println!(
                "\nApplying to job {}/{targets}: {} at {}",
                i + 1,
                posting.title,
                posting.company
            );
            summary.attempted += 1;

            match automator.fill_application(&posting.url).await {
                Ok(outcome) if outcome.is_success() => {
                    summary.applied += 1;
                    println!("✓ Successfully applied to: {} at {}", posting.title, posting.company);
                }
                Ok(_) => {
                    summary.failed += 1;
                    println!(
                        "✗ Could not complete application for: {} at {}",
                        posting.title, posting.company
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Application to {} failed: {e}", posting.url);
                    println!("✗ Failed to apply to {}: {e}", posting.title);
                }
            }

            if i + 1 < targets {
                println!("Waiting before next application...");
                tokio::time::sleep(self.pacing.application_gap).await;
            }
        }
    }
}

fn print_top_matches(matches: &[JobPosting]) {
    println!("\nTop job matches:");
    for (i, posting) in matches.iter().take(TOP_MATCHES_SHOWN).enumerate() {
        println!(
            "{}. {} at {} - Match Score: {}/10",
            i + 1,
            posting.title,
            posting.company,
            posting.match_score.unwrap_or_default()
        );
        println!(
            "   Reason: {}...",
            preview(posting.match_explanation.as_deref().unwrap_or_default(), REASON_PREVIEW_CHARS)
        );
    }
}

/// First `max` characters of `text`, never splitting a character.
fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Everything needed to start a run from the command line.
pub struct RunSetup<'a> {
    pub config: &'a Config,
    pub resume_path: &'a Path,
    pub api_key: String,
    pub headless: bool,
}

/// Full run against real services: extract the resume, then run in two local
/// Chrome sessions.
pub async fn execute(setup: RunSetup<'_>, request: &RunRequest) -> Result<RunSummary, AppError> {
    let client = LlmClient::from_config(setup.api_key, setup.config)
        .map_err(|e| AppError::FatalSetup(format!("LLM client: {e}")))?;
    info!("LLM client initialized (model: {})", client.model());

    let profile = extract_profile(setup.resume_path, &PdfTextExtractor, &client).await?;

    let launcher = ChromeLauncher {
        headless: setup.headless,
    };
    run_with_browsers(&launcher, &client, &profile, &setup.config.pacing, request).await
}

/// Opens the search and application sessions, runs, and closes every session
/// that was opened, whatever happened.
pub async fn run_with_browsers<L: SessionLauncher>(
    launcher: &L,
    oracle: &dyn Oracle,
    profile: &ResumeProfile,
    pacing: &Pacing,
    request: &RunRequest,
) -> Result<RunSummary, AppError> {
    let search_session = launcher
        .launch("search")
        .await
        .map_err(|e| AppError::FatalSetup(e.to_string()))?;
    let apply_session = match launcher.launch("apply").await {
        Ok(session) => session,
        Err(e) => {
            search_session.close().await;
            return Err(AppError::FatalSetup(e.to_string()));
        }
    };

    let result = run_in_sessions(&search_session, &apply_session, oracle, profile, pacing, request).await;

    if let Err(e) = &result {
        error!("Run aborted: {e}");
    }
    search_session.close().await;
    apply_session.close().await;
    result
}

async fn run_in_sessions<S: BrowserSession, A: BrowserSession>(
    search_session: &S,
    apply_session: &A,
    oracle: &dyn Oracle,
    profile: &ResumeProfile,
    pacing: &Pacing,
    request: &RunRequest,
) -> Result<RunSummary, AppError> {
    let search_page = search_session
        .new_page()
        .await
        .map_err(|e| AppError::FatalSetup(format!("search page: {e}")))?;
    let apply_page = apply_session
        .new_page()
        .await
        .map_err(|e| AppError::FatalSetup(format!("application page: {e}")))?;

    let mut orchestrator = Orchestrator::new(&search_page, &apply_page, oracle, pacing);
    Ok(orchestrator.run(profile, request).await)
}
