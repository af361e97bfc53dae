//! TimesJobs search, fetched page by page.
//!
//! The first page is tried under up to three query-parameter schemes because
//! the site has renamed its paging parameter before; later pages reuse
//! whichever scheme answered. Paging stops at the limit, after
//! [`MAX_PAGES`], on a failed fetch, or when a page adds no new listing.

use super::{absolutize, parse_origin, text_of, CardCollector, SelectorChain};
use crate::adapters::http::FetchClient;
use crate::domain::model::RawCard;
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{AggregatorError, ExtractionError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use url::Url;

pub const KEY: &str = "timesjobs";
pub const SOURCE_NAME: &str = "TimesJobs";
pub const DEFAULT_SEARCH_URL: &str = "https://www.timesjobs.com/candidate/job-search.html";
pub const MAX_PAGES: usize = 5;

const COMPANY_ANNOTATION: &str = "(More Jobs)";

const CARD_PATTERNS: &[&str] = &["li.clearfix.job-bx, div.job-bx", ".job-bx", "article"];
const TITLE_PATTERNS: &[&str] = &["h2 a", "header h2 a", ".job-bx h2 a", "a[href*='jobid']"];
const COMPANY_PATTERNS: &[&str] = &[
    "h3 .joblist-comp-name",
    ".joblist-comp-name",
    ".comp-name",
    "span.company",
];
const LOCATION_PATTERNS: &[&str] = &[
    "ul.top-jd-dtl li span.loc",
    "span.location",
    "i.hiring_loc + span",
    ".job-location",
];

/// Query-parameter naming the site has used for its result pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScheme {
    Sequence,
    CurPage,
    SequenceWithoutLocation,
}

const FIRST_PAGE_SCHEMES: [PageScheme; 3] = [
    PageScheme::Sequence,
    PageScheme::CurPage,
    PageScheme::SequenceWithoutLocation,
];

impl PageScheme {
    pub fn params(self, query: &str, location: &str, page: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("searchType", "Home_Search".to_string()),
            ("from", "submit".to_string()),
            ("txtKeywords", query.to_string()),
        ];
        match self {
            Self::Sequence => {
                params.push(("txtLocation", location.to_string()));
                params.push(("sequence", page.to_string()));
            }
            Self::CurPage => {
                params.push(("txtLocation", location.to_string()));
                params.push(("curPg", page.to_string()));
            }
            Self::SequenceWithoutLocation => {
                params.push(("sequence", page.to_string()));
            }
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimesJobsConfig {
    pub search_url: String,
}

impl Default for TimesJobsConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

pub struct TimesJobsAdapter {
    client: FetchClient,
    search_url: String,
    origin: Url,
    cards: SelectorChain,
    title: SelectorChain,
    company: SelectorChain,
    location: SelectorChain,
}

impl TimesJobsAdapter {
    pub fn new(config: &TimesJobsConfig, client: FetchClient) -> Result<Self> {
        let origin = parse_origin("sources.timesjobs.search_url", &config.search_url)?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            origin,
            cards: SelectorChain::new(CARD_PATTERNS)?,
            title: SelectorChain::new(TITLE_PATTERNS)?,
            company: SelectorChain::new(COMPANY_PATTERNS)?,
            location: SelectorChain::new(LOCATION_PATTERNS)?,
        })
    }

    /// The site expects a Referer from its own origin.
    pub fn client_for(config: &TimesJobsConfig, timeout: std::time::Duration) -> Result<FetchClient> {
        let origin = parse_origin("sources.timesjobs.search_url", &config.search_url)?;
        FetchClient::builder()
            .timeout(timeout)
            .header("Referer", origin.as_str())
            .build()
            .map_err(AggregatorError::from)
    }

    async fn fetch_page(
        &self,
        scheme: PageScheme,
        query: &str,
        location: &str,
        page: usize,
    ) -> Option<String> {
        let params = scheme.params(query, location, page);
        match self.client.get_text_with_params(&self.search_url, &params).await {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::debug!("{}: page {} ({:?}) failed: {}", SOURCE_NAME, page, scheme, e);
                None
            }
        }
    }

    async fn fetch_first_page(&self, query: &str, location: &str) -> Option<(PageScheme, String)> {
        for scheme in FIRST_PAGE_SCHEMES {
            if let Some(html) = self.fetch_page(scheme, query, location, 1).await {
                return Some((scheme, html));
            }
        }
        tracing::warn!("{}: first page unavailable under every parameter scheme", SOURCE_NAME);
        None
    }

    /// Feeds one page into `collector`; returns how many new cards it accepted.
    pub fn collect_page(&self, html: &str, collector: &mut CardCollector) -> usize {
        let document = Html::parse_document(html);
        let mut added = 0;

        for element in self.cards.select_all(&document) {
            if collector.is_full() {
                break;
            }
            match self.extract_card(element) {
                Ok(card) => {
                    if collector.offer(card) {
                        added += 1;
                    }
                }
                Err(e) => tracing::trace!("{}: skipping listing: {}", SOURCE_NAME, e),
            }
        }

        added
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
        let url = absolutize(&self.origin, title_el.value().attr("href").unwrap_or_default());
        if url.is_empty() {
            return Err(ExtractionError::MissingUrl);
        }

        Ok(RawCard {
            title,
            company: strip_annotation(&text_of(self.company.select_one(element))),
            location: text_of(self.location.select_one(element)),
            url,
        })
    }
}

fn strip_annotation(company: &str) -> String {
    company
        .replace(COMPANY_ANNOTATION, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SourceAdapter for TimesJobsAdapter {
    fn key(&self) -> &'static str {
        KEY
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn scrape(&self, query: &str, location: &str, limit: usize) -> Result<Vec<RawCard>> {
        let mut collector = CardCollector::new(limit);
        let mut scheme = PageScheme::Sequence;

        for page in 1..=MAX_PAGES {
            if collector.is_full() {
                break;
            }

            let html = if page == 1 {
                match self.fetch_first_page(query, location).await {
                    Some((working, html)) => {
                        scheme = working;
                        html
                    }
                    None => break,
                }
            } else {
                match self.fetch_page(scheme, query, location, page).await {
                    Some(html) => html,
                    None => break,
                }
            };

            let added = self.collect_page(&html, &mut collector);
            tracing::debug!("{}: page {} added {} cards", SOURCE_NAME, page, added);
            if added == 0 {
                break;
            }
        }

        Ok(collector.into_cards())
    }
}
