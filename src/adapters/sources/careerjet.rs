//! CareerJet search. The site moves between domains and path schemes, so a
//! search walks a fixed list of candidate URLs and keeps the first one that
//! yields at least one listing.

use super::{absolutize, parse_origin, slugify, text_of, CardCollector, SelectorChain};
use crate::adapters::http::FetchClient;
use crate::domain::model::{is_remote_location, RawCard};
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{AggregatorError, ExtractionError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use url::Url;

pub const KEY: &str = "careerjet";
pub const SOURCE_NAME: &str = "CareerJet";
pub const DEFAULT_ORIGINS: [&str; 2] = ["https://www.careerjet.com", "https://www.careerjet.co.in"];

const CARD_PATTERNS: &[&str] = &[
    "article.job",
    "section.job",
    "div.job",
    "li.job",
    "div[id^='job_']",
    ".job",
    ".jobs .result, .job-list .result",
];
const TITLE_PATTERNS: &[&str] = &["h2 a", "a.title", "a[data-ga-tag='job-title']", "a"];
const COMPANY_PATTERNS: &[&str] = &[".company, .company_name, span.company, div.job header div a"];
const LOCATION_PATTERNS: &[&str] = &[".locations, span.location, .job-location"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerJetConfig {
    /// Tried in order; the first is the canonical origin for relative links.
    pub origins: Vec<String>,
}

impl Default for CareerJetConfig {
    fn default() -> Self {
        Self {
            origins: DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

pub struct CareerJetAdapter {
    client: FetchClient,
    origins: Vec<Url>,
    cards: SelectorChain,
    title: SelectorChain,
    company: SelectorChain,
    location: SelectorChain,
}

impl CareerJetAdapter {
    pub fn new(config: &CareerJetConfig, client: FetchClient) -> Result<Self> {
        let origins = config
            .origins
            .iter()
            .map(|raw| parse_origin("sources.careerjet.origins", raw))
            .collect::<Result<Vec<_>>>()?;
        if origins.is_empty() {
            return Err(AggregatorError::MissingConfigError {
                field: "sources.careerjet.origins".to_string(),
            });
        }

        Ok(Self {
            client,
            origins,
            cards: SelectorChain::new(CARD_PATTERNS)?,
            title: SelectorChain::new(TITLE_PATTERNS)?,
            company: SelectorChain::new(COMPANY_PATTERNS)?,
            location: SelectorChain::new(LOCATION_PATTERNS)?,
        })
    }

    fn canonical_origin(&self) -> &Url {
        &self.origins[0]
    }

    fn base(origin: &Url) -> &str {
        origin.as_str().trim_end_matches('/')
    }

    fn without_location(&self, keyword: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for origin in &self.origins {
            urls.push(format!("{}/search/jobs?s={}", Self::base(origin), keyword));
        }
        for origin in &self.origins {
            urls.push(format!("{}/jobs?s={}", Self::base(origin), keyword));
        }
        urls
    }

    fn with_location(&self, keyword: &str, location: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for origin in &self.origins {
            urls.push(format!(
                "{}/search/jobs?s={}&l={}",
                Self::base(origin),
                keyword,
                location
            ));
        }
        for origin in &self.origins {
            urls.push(format!(
                "{}/jobs?l={}&s={}",
                Self::base(origin),
                location,
                keyword
            ));
        }
        urls
    }

    /// Candidate search URLs in priority order, without duplicates.
    ///
    /// Remote-like input starts with the location-free variants; a concrete
    /// location tries the located variants first. Location-free variants
    /// always close the list.
    pub fn candidate_urls(&self, query: &str, location: &str) -> Vec<String> {
        let keyword = slugify(query);
        let remote = is_remote_location(location);
        let location_slug = if remote {
            String::new()
        } else {
            slugify(location)
        };

        let mut candidates = Vec::new();
        if remote {
            candidates.extend(self.without_location(&keyword));
        }
        if !location_slug.is_empty() {
            candidates.extend(self.with_location(&keyword, &location_slug));
        }
        candidates.extend(self.without_location(&keyword));

        let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
        for url in candidates {
            if !unique.contains(&url) {
                unique.push(url);
            }
        }
        unique
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
        let url = absolutize(
            self.canonical_origin(),
            title_el.value().attr("href").unwrap_or_default(),
        );
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
impl SourceAdapter for CareerJetAdapter {
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

        let mut last_error = None;
        for candidate in self.candidate_urls(query, location) {
            let html = match self.client.get_text(&candidate).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::debug!("{}: {} failed: {}", SOURCE_NAME, candidate, e);
                    last_error = Some(e);
                    continue;
                }
            };

            let cards = self.extract_cards(&html, limit);
            if cards.is_empty() {
                tracing::debug!("{}: no listings at {}", SOURCE_NAME, candidate);
                continue;
            }

            tracing::debug!("{}: extracted {} cards from {}", SOURCE_NAME, cards.len(), candidate);
            return Ok(cards);
        }

        if let Some(e) = last_error {
            tracing::warn!("{}: no results from any search URL; last error: {}", SOURCE_NAME, e);
        }
        Ok(Vec::new())
    }
}
