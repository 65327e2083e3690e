//! Per-board search URLs, page pacing and card selectors.

use reqwest::Url;

use crate::errors::AppError;
use crate::models::JobSource;

/// How to query one job board and read its result cards.
#[derive(Debug, Clone, Copy)]
pub struct BoardProfile {
    pub source: JobSource,
    search_base: &'static str,
    query_param: &'static str,
    /// Base URL that relative posting links are resolved against. Card links are
    /// read as raw `href` attributes, so boards emitting relative links need one.
    link_base: Option<&'static str>,
    /// Scroll-to-bottom passes after the initial load; lazy-loading boards need several.
    pub scroll_passes: usize,
    pub card_selector: &'static str,
    pub title_selector: &'static str,
    pub company_selector: &'static str,
    pub link_selector: &'static str,
}

const LINKEDIN: BoardProfile = BoardProfile {
    source: JobSource::LinkedIn,
    search_base: "https://www.linkedin.com/jobs/search/",
    query_param: "keywords",
    link_base: Some("https://www.linkedin.com"),
    scroll_passes: 3,
    card_selector: ".job-card-container",
    title_selector: ".job-card-list__title",
    company_selector: ".job-card-container__company-name",
    link_selector: "a.job-card-list__title",
};

const INDEED: BoardProfile = BoardProfile {
    source: JobSource::Indeed,
    search_base: "https://www.indeed.com/jobs",
    query_param: "q",
    link_base: Some("https://www.indeed.com"),
    scroll_passes: 0,
    card_selector: ".jobsearch-ResultsList > .result",
    title_selector: "h2.jobTitle",
    company_selector: ".companyName",
    link_selector: "h2.jobTitle a",
};

impl BoardProfile {
    pub fn for_source(source: JobSource) -> &'static BoardProfile {
        match source {
            JobSource::LinkedIn => &LINKEDIN,
            JobSource::Indeed => &INDEED,
        }
    }

    /// Search URL for one keyword; the location is folded into the same query term.
    pub fn search_url(&self, keyword: &str, location: &str) -> Result<String, AppError> {
        let query = format!("{} {}", keyword.trim(), location.trim());
        let url = Url::parse_with_params(self.search_base, &[(self.query_param, query.trim())])
            .map_err(|e| AppError::SourceUnavailable(format!("{}: {e}", self.source)))?;
        Ok(url.to_string())
    }

    /// Turns a card's `href` into an absolute posting URL.
    pub fn posting_url(&self, href: &str) -> Result<String, AppError> {
        let href = href.trim();
        let parsed = match self.link_base {
            Some(base) => Url::parse(base).and_then(|base| base.join(href)),
            None => Url::parse(href),
        };
        parsed.map(|url| url.to_string()).map_err(|e| {
            AppError::SourceUnavailable(format!("{}: bad posting link '{href}': {e}", self.source))
        })
    }
}
