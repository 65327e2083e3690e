use std::fmt;

use serde::{Deserialize, Serialize};

/// Job-listing site a posting was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobSource {
    LinkedIn,
    Indeed,
}

impl JobSource {
    /// Every supported board, in the order they are searched.
    pub const ALL: [JobSource; 2] = [JobSource::LinkedIn, JobSource::Indeed];
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSource::LinkedIn => f.write_str("LinkedIn"),
            JobSource::Indeed => f.write_str("Indeed"),
        }
    }
}

/// A job posting as scraped from a listing site.
///
/// `match_score` and `match_explanation` stay `None` until the ranker has
/// looked at the posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub url: String,
    pub source: JobSource,
    /// Free text from the detail page; empty when no description could be found.
    pub description: String,
    pub match_score: Option<u8>,
    pub match_explanation: Option<String>,
}

impl JobPosting {
    pub fn new(title: String, company: String, url: String, source: JobSource) -> Self {
        Self {
            title,
            company,
            url,
            source,
            description: String::new(),
            match_score: None,
            match_explanation: None,
        }
    }
}
