//! LinkedIn public job search: a single results page, no pagination.

use super::{absolutize, parse_origin, text_of, CardCollector, SelectorChain};
use crate::adapters::http::FetchClient;
use crate::domain::model::{is_remote_location, RawCard};
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{AggregatorError, ExtractionError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use url::Url;

pub const KEY: &str = "linkedin";
pub const SOURCE_NAME: &str = "LinkedIn";
pub const DEFAULT_SEARCH_URL: &str = "https://www.linkedin.com/jobs/search";

const CARD_PATTERNS: &[&str] = &[
    "li.base-card",
    ".job-search-card",
    "div[data-job-id]",
    "[data-job-id]",
];
const TITLE_PATTERNS: &[&str] = &[
    ".base-search-card__title",
    ".job-search-card__title",
    "h3",
    "h2",
];
const COMPANY_PATTERNS: &[&str] = &[
    ".base-search-card__subtitle",
    ".job-search-card__subtitle",
    "[data-testid='job-search-card__company-name']",
];
const LOCATION_PATTERNS: &[&str] = &[
    ".job-search-card__location",
    ".base-search-card__metadata",
    "[data-testid='job-search-card__location']",
];
const LINK_PATTERNS: &[&str] = &["a[href]"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInConfig {
    pub search_url: String,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

pub struct LinkedInAdapter {
    client: FetchClient,
    search_url: Url,
    origin: Url,
    cards: SelectorChain,
    title: SelectorChain,
    company: SelectorChain,
    location: SelectorChain,
    link: SelectorChain,
}

impl LinkedInAdapter {
    pub fn new(config: &LinkedInConfig, client: FetchClient) -> Result<Self> {
        let field = "sources.linkedin.search_url";
        let origin = parse_origin(field, &config.search_url)?;
        let mut search_url = Url::parse(&config.search_url)
            .map_err(|e| AggregatorError::InvalidConfigValueError {
                field: field.to_string(),
                value: config.search_url.clone(),
                reason: e.to_string(),
            })?;
        search_url.set_query(None);

        Ok(Self {
            client,
            search_url,
            origin,
            cards: SelectorChain::new(CARD_PATTERNS)?,
            title: SelectorChain::new(TITLE_PATTERNS)?,
            company: SelectorChain::new(COMPANY_PATTERNS)?,
            location: SelectorChain::new(LOCATION_PATTERNS)?,
            link: SelectorChain::new(LINK_PATTERNS)?,
        })
    }

    /// Remote-like locations drop the `location` parameter entirely.
    pub fn search_url(&self, query: &str, location: &str) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("keywords", query);
            if !location.trim().is_empty() && !is_remote_location(location) {
                pairs.append_pair("location", location.trim());
            }
            pairs
                .append_pair("f_TPR", "r86400")
                .append_pair("position", "1")
                .append_pair("pageNum", "0");
        }
        url
    }

    pub fn extract_cards(&self, html: &str, limit: usize) -> Vec<RawCard> {
        let document = Html::parse_document(html);
        let mut collector = CardCollector::new(limit);

        for element in self.cards.select_all(&document) {
            if collector.is_full() {
                break;
            }
            match self.extract_card(element) {
                Ok(card) => {
                    collector.offer(card);
                }
                Err(e) => tracing::trace!("{}: skipping listing: {}", SOURCE_NAME, e),
            }
        }

        collector.into_cards()
    }

    fn extract_card(&self, element: ElementRef<'_>) -> std::result::Result<RawCard, ExtractionError> {
        let title_el = self
            .title
            .select_one(element)
            .ok_or(ExtractionError::NoTitleElement)?;
        let title = text_of(Some(title_el));
        if title.is_empty() {
            return Err(ExtractionError::MissingTitle);
        }

        let href = self
            .link
            .select_one(element)
            .and_then(|a| a.value().attr("href"))
            .or_else(|| element.value().attr("href"))
            .unwrap_or_default();
        let mut url = absolutize(&self.origin, href);

        if url.is_empty() {
            if let Some(job_id) = element.value().attr("data-job-id").filter(|id| !id.is_empty()) {
                url = absolutize(&self.origin, &format!("/jobs/view/{}/", job_id));
            }
        }
        if url.is_empty() {
            return Err(ExtractionError::MissingUrl);
        }

        Ok(RawCard {
            title,
            company: text_of(self.company.select_one(element)),
            location: text_of(self.location.select_one(element)),
            url,
        })
    }
}

#[async_trait]
impl SourceAdapter for LinkedInAdapter {
    fn key(&self) -> &'static str {
        KEY
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn scrape(&self, query: &str, location: &str, limit: usize) -> Result<Vec<RawCard>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.search_url(query, location);
        let html = match self.client.get_text(url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("{}: search request failed: {}", SOURCE_NAME, e);
                return Ok(Vec::new());
            }
        };

        let cards = self.extract_cards(&html, limit);
        tracing::debug!("{}: extracted {} cards", SOURCE_NAME, cards.len());
        Ok(cards)
    }
}
