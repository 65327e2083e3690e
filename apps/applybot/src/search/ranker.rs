//! Job Ranker: pluggable, trait-based scorer that rates a posting against the resume.
//!
//! `OracleMatchScorer` asks the language model for a 1–10 verdict. The ranking
//! policy (threshold, fail-open fallback, ordering) lives in `rank_postings` and
//! is independent of the backend.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::render_prompt;
use crate::llm_client::{complete_json, LlmError, Oracle};
use crate::models::{JobPosting, ResumeProfile};
use crate::search::prompts::{MATCH_PROMPT, MATCH_SYSTEM};

/// Minimum score a posting needs to be kept.
pub const MATCH_THRESHOLD: u8 = 6;
/// Score given to a posting whose verdict could not be obtained.
pub const FALLBACK_SCORE: u8 = 5;
pub const FALLBACK_EXPLANATION: &str = "Error analyzing match";

// ────────────────────────────────────────────────────────────────────────────
// Verdict
// ────────────────────────────────────────────────────────────────────────────

/// A validated match verdict: score is always within 1..=10.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchVerdict {
    pub score: u8,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    score: Value,
    #[serde(default)]
    explanation: Option<String>,
}

impl MatchVerdict {
    fn from_raw(raw: RawVerdict) -> Result<Self, String> {
        let score = match &raw.score {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| format!("score is not a number: {}", raw.score))?
        .round();

        if !(1.0..=10.0).contains(&score) {
            return Err(format!("score {score} outside 1..=10"));
        }

        Ok(Self {
            score: score as u8,
            explanation: raw.explanation.unwrap_or_default().trim().to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Rates one posting against the resume. Any error sends the posting down the
/// fail-open path in `rank_postings`.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        profile: &ResumeProfile,
        posting: &JobPosting,
    ) -> Result<MatchVerdict, AppError>;
}

/// Language-model scorer: one oracle call per posting.
pub struct OracleMatchScorer<'a> {
    oracle: &'a dyn Oracle,
}

impl<'a> OracleMatchScorer<'a> {
    pub fn new(oracle: &'a dyn Oracle) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl MatchScorer for OracleMatchScorer<'_> {
    async fn score(
        &self,
        profile: &ResumeProfile,
        posting: &JobPosting,
    ) -> Result<MatchVerdict, AppError> {
        let prompt = render_prompt(
            MATCH_PROMPT,
            &[
                ("resume_json", &profile.to_prompt_json()),
                ("job_description", &posting.description),
            ],
        );

        let raw: RawVerdict = complete_json(self.oracle, &prompt, MATCH_SYSTEM).await?;
        MatchVerdict::from_raw(raw).map_err(|reason| {
            AppError::OracleUnavailable(LlmError::Parse(serde::de::Error::custom(reason)))
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking policy
// ────────────────────────────────────────────────────────────────────────────

/// Scores every posting that has a description and returns the ones worth applying to,
/// best first.
///
/// - empty descriptions are dropped without calling the scorer
/// - scores below `MATCH_THRESHOLD` are dropped
/// - a failed verdict keeps the posting with `FALLBACK_SCORE`
/// - ties keep their discovery order
pub async fn rank_postings(
    scorer: &dyn MatchScorer,
    profile: &ResumeProfile,
    postings: Vec<JobPosting>,
) -> Vec<JobPosting> {
    let mut retained = Vec::new();

    for mut posting in postings {
        if posting.description.trim().is_empty() {
            debug!("Skipping '{}' at {}: no description", posting.title, posting.company);
            continue;
        }

        match scorer.score(profile, &posting).await {
            Ok(verdict) => {
                let keep = verdict.score >= MATCH_THRESHOLD;
                posting.match_score = Some(verdict.score);
                posting.match_explanation = Some(verdict.explanation);
                if keep {
                    info!(
                        "Found matching job: {} at {} (Score: {})",
                        posting.title, posting.company, verdict.score
                    );
                    retained.push(posting);
                } else {
                    debug!(
                        "Dropping '{}' at {}: score {}",
                        posting.title, posting.company, verdict.score
                    );
                }
            }
            Err(e) => {
                warn!(
                    "Error analyzing match for '{}' at {}: {e}",
                    posting.title, posting.company
                );
                posting.match_score = Some(FALLBACK_SCORE);
                posting.match_explanation = Some(FALLBACK_EXPLANATION.to_string());
                retained.push(posting);
            }
        }
    }

    // sort_by is stable
    retained.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    retained
}
