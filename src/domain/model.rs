use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const REMOTE_LOCATION: &str = "Remote";

const REMOTE_ALIASES: [&str; 4] = ["remote", "work from home", "wfh", "anywhere"];

/// Whether a location input means "no location constraint".
pub fn is_remote_location(location: &str) -> bool {
    let folded = location.trim().to_lowercase();
    REMOTE_ALIASES.contains(&folded.as_str())
}

/// Canonical job listing shared by every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub applied: bool,
}

/// Best-effort extraction of one listing element, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
}

impl RawCard {
    /// Title and url are the identity of a listing; a card missing either is dropped.
    pub fn is_acceptable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// One aggregation call's inputs. Source names are case-folded and deduplicated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    query: String,
    location: String,
    limit: usize,
    sources: Vec<String>,
}

impl AggregationRequest {
    pub fn new<I, S>(query: &str, location: &str, limit: usize, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut folded: Vec<String> = Vec::new();
        for name in sources {
            let name = name.as_ref().trim().to_lowercase();
            if !name.is_empty() && !folded.contains(&name) {
                folded.push(name);
            }
        }

        Self {
            query: query.trim().to_string(),
            location: location.trim().to_string(),
            limit,
            sources: folded,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// Payload handed back to callers of the scrape service, and what gets cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub total_jobs: usize,
    pub jobs: Vec<JobRecord>,
    pub query: String,
    pub location: String,
    pub sources: Vec<String>,
    pub per_source_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: i64,
    #[serde(flatten)]
    pub job: JobRecord,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub title: Option<String>,
    pub liked: Option<bool>,
    pub applied: Option<bool>,
}

impl StatusUpdate {
    pub fn apply(&self, saved: &mut SavedJob) {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            saved.job.title = title.to_string();
        }
        if let Some(liked) = self.liked {
            saved.job.liked = liked;
        }
        if let Some(applied) = self.applied {
            saved.job.applied = applied;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    pub search: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
    pub liked: Option<bool>,
    pub applied: Option<bool>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            search: None,
            company: None,
            location: None,
            source: None,
            liked: None,
            applied: None,
            limit: 10,
            offset: 0,
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_filter(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|s| !s.is_empty())
}

impl JobFilter {
    pub fn matches(&self, saved: &SavedJob) -> bool {
        let job = &saved.job;

        if let Some(term) = text_filter(&self.search) {
            let hit = contains_ci(&job.title, term)
                || contains_ci(&job.company, term)
                || contains_ci(&job.description, term);
            if !hit {
                return false;
            }
        }
        if let Some(company) = text_filter(&self.company) {
            if !contains_ci(&job.company, company) {
                return false;
            }
        }
        if let Some(location) = text_filter(&self.location) {
            if !contains_ci(&job.location, location) {
                return false;
            }
        }
        if let Some(source) = text_filter(&self.source) {
            if !contains_ci(&job.source, source) {
                return false;
            }
        }
        if self.liked.is_some_and(|liked| job.liked != liked) {
            return false;
        }
        if self.applied.is_some_and(|applied| job.applied != applied) {
            return false;
        }
        true
    }

    /// Filters, orders newest first and slices one page out of `jobs`.
    pub fn paginate(&self, jobs: &[SavedJob]) -> SavedPage {
        let mut matching: Vec<&SavedJob> = jobs.iter().filter(|j| self.matches(j)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();

        SavedPage {
            jobs: page,
            pagination: Pagination {
                total,
                limit: self.limit,
                offset: self.offset,
                has_next: self.offset.saturating_add(self.limit) < total,
                has_prev: self.offset > 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPage {
    pub jobs: Vec<SavedJob>,
    pub pagination: Pagination,
}
