//! Site adapters and the extraction helpers they share.
//!
//! Every site is scraped through ordered lists of CSS selectors tried in
//! priority order, first match wins. The lists mirror third-party markup at
//! a point in time and need re-checking against the live sites whenever a
//! source starts returning nothing.

pub mod careerjet;
pub mod linkedin;
pub mod timesjobs;

pub use careerjet::{CareerJetAdapter, CareerJetConfig};
pub use linkedin::{LinkedInAdapter, LinkedInConfig};
pub use timesjobs::{TimesJobsAdapter, TimesJobsConfig};

use crate::domain::model::RawCard;
use crate::utils::error::{AggregatorError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Ordered selector patterns for one piece of markup.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn new(patterns: &[&str]) -> Result<Self> {
        let selectors = patterns
            .iter()
            .map(|pattern| {
                Selector::parse(pattern).map_err(|e| AggregatorError::ConfigError {
                    message: format!("invalid selector '{}': {}", pattern, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// All matches of the first pattern that matches anything in the document.
    pub fn select_all<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    /// First descendant of `element` matched by the highest-priority pattern that matches.
    pub fn select_one<'a>(&self, element: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| element.select(selector).next())
    }
}

/// Whitespace-collapsed text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn text_of(element: Option<ElementRef<'_>>) -> String {
    element.map(element_text).unwrap_or_default()
}

/// Makes a scraped href absolute against the site's canonical origin.
/// Empty unless the result is an http(s) link (`javascript:`, `mailto:` and
/// the like are not listings).
pub fn absolutize(origin: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match origin.join(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => String::new(),
    }
}

/// Search-box style slug: lowercase, commas and slashes become spaces,
/// words percent-encoded and joined with `+`.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .replace([',', '/'], " ")
        .split_whitespace()
        .map(|word| url::form_urlencoded::byte_serialize(word.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join("+")
}

pub fn parse_origin(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| AggregatorError::InvalidConfigValueError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    let origin = url.origin().ascii_serialization();
    Url::parse(&format!("{}/", origin)).map_err(|e| AggregatorError::InvalidConfigValueError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Accumulates accepted cards for one adapter run, up to `limit`, unique by url.
#[derive(Debug)]
pub struct CardCollector {
    limit: usize,
    cards: Vec<RawCard>,
    seen: HashSet<String>,
}

impl CardCollector {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            cards: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns true if the card was kept.
    pub fn offer(&mut self, card: RawCard) -> bool {
        if self.is_full() || !card.is_acceptable() || !self.seen.insert(card.url.clone()) {
            return false;
        }
        self.cards.push(card);
        true
    }

    pub fn into_cards(self) -> Vec<RawCard> {
        self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, url: &str) -> RawCard {
        RawCard {
            title: title.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_chain_uses_first_pattern_with_matches() {
        let html = Html::parse_document(
            r#"<ul><li class="b">one</li><li class="b">two</li></ul><div class="c">three</div>"#,
        );
        let chain = SelectorChain::new(&["article.a", "li.b", "div.c"]).unwrap();

        let found: Vec<String> = chain.select_all(&html).into_iter().map(element_text).collect();
        assert_eq!(found, vec!["one", "two"]);
    }

    #[test]
    fn test_chain_rejects_bad_selector() {
        assert!(SelectorChain::new(&["li[["]).is_err());
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<h2>  Senior\n   <b>Rust</b>  Engineer </h2>");
        let chain = SelectorChain::new(&["h2"]).unwrap();
        let h2 = chain.select_all(&html).into_iter().next();
        assert_eq!(text_of(h2), "Senior Rust Engineer");
    }

    #[test]
    fn test_absolutize() {
        let origin = Url::parse("https://www.careerjet.com/").unwrap();
        assert_eq!(
            absolutize(&origin, "/jobad/abc"),
            "https://www.careerjet.com/jobad/abc"
        );
        assert_eq!(
            absolutize(&origin, "https://elsewhere.org/x"),
            "https://elsewhere.org/x"
        );
        assert_eq!(absolutize(&origin, ""), "");
        assert_eq!(absolutize(&origin, "javascript:void(0)"), "");
        assert_eq!(absolutize(&origin, "mailto:jobs@example.com"), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Python Developer"), "python+developer");
        assert_eq!(slugify("Noida, Uttar Pradesh"), "noida+uttar+pradesh");
        assert_eq!(slugify("c++/rust"), "c%2B%2B+rust");
    }

    #[test]
    fn test_parse_origin_strips_path() {
        let origin = parse_origin("x", "https://www.linkedin.com/jobs/search?x=1").unwrap();
        assert_eq!(origin.as_str(), "https://www.linkedin.com/");
    }

    #[test]
    fn test_collector_enforces_limit_acceptance_and_uniqueness() {
        let mut collector = CardCollector::new(2);

        assert!(collector.offer(card("A", "https://x/1")));
        assert!(!collector.offer(card("", "https://x/2")));
        assert!(!collector.offer(card("B", "")));
        assert!(!collector.offer(card("A again", "https://x/1")));
        assert!(collector.offer(card("C", "https://x/3")));
        assert!(collector.is_full());
        assert!(!collector.offer(card("D", "https://x/4")));

        assert_eq!(collector.len(), 2);
    }
}
