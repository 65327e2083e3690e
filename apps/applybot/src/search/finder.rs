use tracing::{debug, info, warn};

use crate::browser::{find_first, BrowserError, ElementDriver, PageDriver};
use crate::config::Pacing;
use crate::errors::AppError;
use crate::models::{JobPosting, JobSource};
use crate::search::boards::BoardProfile;

/// Candidate description containers on a posting's detail page, tried in order.
pub const DESCRIPTION_SELECTORS: [&str; 6] = [
    ".description",
    ".job-description",
    "#job-description",
    ".jobDescriptionText",
    ".job-desc",
    "#jobDescriptionText",
];

/// Title, company and link read off one result card.
#[derive(Debug, Clone, PartialEq)]
struct CardSummary {
    title: String,
    company: String,
    url: String,
}

/// Scrapes postings from every supported board using one browser page.
pub struct JobFinder<'a, P: PageDriver> {
    page: &'a P,
    pacing: &'a Pacing,
}

impl<'a, P: PageDriver> JobFinder<'a, P> {
    pub fn new(page: &'a P, pacing: &'a Pacing) -> Self {
        Self { page, pacing }
    }

    /// Every posting found for every (board, keyword) pair.
    ///
    /// A board, keyword, card or detail page that fails is logged and skipped;
    /// an empty result is not an error.
    pub async fn search(&self, keywords: &[String], location: &str) -> Vec<JobPosting> {
        let mut postings = Vec::new();

        for source in JobSource::ALL {
            let board = BoardProfile::for_source(source);
            for keyword in keywords {
                match self.search_board(board, keyword, location).await {
                    Ok(found) => {
                        info!("{source}: {} postings for '{keyword}'", found.len());
                        postings.extend(found);
                    }
                    Err(e) => warn!("{source}: search for '{keyword}' failed: {e}"),
                }
            }
        }

        postings
    }

    async fn search_board(
        &self,
        board: &BoardProfile,
        keyword: &str,
        location: &str,
    ) -> Result<Vec<JobPosting>, AppError> {
        let url = board.search_url(keyword, location)?;
        debug!("Loading {url}");
        self.page.goto(&url).await?;
        tokio::time::sleep(self.pacing.page_load).await;

        for _ in 0..board.scroll_passes {
            self.page.scroll_to_bottom().await?;
            tokio::time::sleep(self.pacing.scroll_interval).await;
        }

        // Card handles die once the page navigates, so read them all up front.
        let cards = self.page.find_all(board.card_selector).await?;
        let mut summaries = Vec::with_capacity(cards.len());
        for card in &cards {
            match read_card(board, card).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("{}: skipping unreadable card: {e}", board.source),
            }
        }
        drop(cards);

        let mut postings = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let mut posting =
                JobPosting::new(summary.title, summary.company, summary.url, board.source);
            posting.description = self.fetch_description(&posting.url).await;
            postings.push(posting);
        }
        Ok(postings)
    }

    /// First non-empty description on the detail page, or an empty string.
    async fn fetch_description(&self, url: &str) -> String {
        if let Err(e) = self.page.goto(url).await {
            warn!("Could not load posting {url}: {e}");
            return String::new();
        }
        tokio::time::sleep(self.pacing.detail_settle).await;

        for selector in DESCRIPTION_SELECTORS {
            let Ok(elements) = self.page.find_all(selector).await else {
                continue;
            };
            let Some(element) = elements.first() else {
                continue;
            };
            if let Ok(text) = element.text().await {
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }

        debug!("No description found at {url}");
        String::new()
    }
}

async fn read_card<E: ElementDriver>(board: &BoardProfile, card: &E) -> Result<CardSummary, AppError> {
    let title = find_first(card, board.title_selector).await?.text().await?;
    let company = find_first(card, board.company_selector).await?.text().await?;
    let href = find_first(card, board.link_selector)
        .await?
        .attribute("href")
        .await?
        .ok_or_else(|| BrowserError::NotFound(format!("{} href", board.link_selector)))?;

    Ok(CardSummary {
        title: title.trim().to_string(),
        company: company.trim().to_string(),
        url: board.posting_url(&href)?,
    })
}
