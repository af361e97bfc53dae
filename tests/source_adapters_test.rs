use httpmock::prelude::*;
use job_aggregator::adapters::http::FetchClient;
use job_aggregator::adapters::sources::timesjobs::MAX_PAGES;
use job_aggregator::adapters::sources::{
    CareerJetAdapter, CareerJetConfig, LinkedInAdapter, LinkedInConfig, TimesJobsAdapter,
    TimesJobsConfig,
};
use job_aggregator::domain::ports::SourceAdapter;
use std::time::Duration;

fn linkedin_page(ids: std::ops::Range<usize>) -> String {
    let cards: String = ids
        .map(|i| {
            format!(
                r#"<li class="base-card" data-job-id="{i}">
                     <a class="base-card__full-link" href="/jobs/view/job-{i}"></a>
                     <h3 class="base-search-card__title">LinkedIn Job {i}</h3>
                     <h4 class="base-search-card__subtitle">Company {i}</h4>
                   </li>"#
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", cards)
}

fn careerjet_page(ids: std::ops::Range<usize>) -> String {
    let cards: String = ids
        .map(|i| {
            format!(
                r#"<article class="job"><header><h2><a href="/jobad/{i}">CareerJet Job {i}</a></h2></header>
                     <p class="company">Employer {i}</p></article>"#
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

fn timesjobs_page(ids: std::ops::Range<usize>) -> String {
    let cards: String = ids
        .map(|i| {
            format!(
                r#"<li class="clearfix job-bx"><header><h2><a href="/job-detail/jobid-{i}">TimesJobs Job {i}</a></h2>
                     <h3 class="joblist-comp-name">Firm {i} (More Jobs)</h3></header></li>"#
            )
        })
        .collect();
    format!("<ul class=\"new-joblist\">{}</ul>", cards)
}

fn client() -> FetchClient {
    FetchClient::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_linkedin_scrape_resolves_relative_links() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/jobs/search")
            .query_param_exists("keywords")
            .query_param("location", "Pune")
            .query_param("f_TPR", "r86400");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(linkedin_page(0..4));
    });

    let config = LinkedInConfig {
        search_url: server.url("/jobs/search"),
    };
    let adapter = LinkedInAdapter::new(&config, client()).unwrap();
    let cards = adapter.scrape("python developer", "Pune", 3).await.unwrap();

    search.assert();
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].title, "LinkedIn Job 0");
    assert_eq!(cards[0].url, server.url("/jobs/view/job-0"));
    assert_eq!(cards[2].company, "Company 2");
}

#[tokio::test]
async fn test_linkedin_failed_request_yields_no_cards() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/jobs/search");
        then.status(429);
    });

    let config = LinkedInConfig {
        search_url: server.url("/jobs/search"),
    };
    let adapter = LinkedInAdapter::new(&config, client()).unwrap();

    let cards = adapter.scrape("python developer", "Remote", 5).await.unwrap();
    assert!(cards.is_empty());
}

#[tokio::test]
async fn test_careerjet_moves_past_failing_candidates() {
    let server = MockServer::start();
    let located = server.mock(|when, then| {
        when.method(GET).path("/search/jobs").query_param("l", "pune");
        then.status(404);
    });
    let legacy = server.mock(|when, then| {
        when.method(GET).path("/jobs").query_param("l", "pune");
        then.status(200).body(careerjet_page(0..5));
    });

    let config = CareerJetConfig {
        origins: vec![server.base_url()],
    };
    let adapter = CareerJetAdapter::new(&config, client()).unwrap();
    let cards = adapter.scrape("python developer", "Pune", 4).await.unwrap();

    located.assert();
    legacy.assert();
    assert_eq!(cards.len(), 4);
    assert_eq!(cards[0].title, "CareerJet Job 0");
    assert_eq!(cards[0].url, server.url("/jobad/0"));
}

#[tokio::test]
async fn test_careerjet_empty_page_falls_through_to_next_candidate() {
    let server = MockServer::start();
    let empty = server.mock(|when, then| {
        when.method(GET).path("/search/jobs");
        then.status(200).body("<html><body>No jobs found</body></html>");
    });
    let populated = server.mock(|when, then| {
        when.method(GET).path("/jobs");
        then.status(200).body(careerjet_page(0..2));
    });

    let config = CareerJetConfig {
        origins: vec![server.base_url()],
    };
    let adapter = CareerJetAdapter::new(&config, client()).unwrap();
    let cards = adapter.scrape("rust", "remote", 10).await.unwrap();

    empty.assert_hits(1);
    populated.assert_hits(1);
    assert_eq!(cards.len(), 2);
}

#[tokio::test]
async fn test_timesjobs_stops_when_a_page_repeats() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/candidate/job-search.html")
            .query_param("sequence", "1");
        then.status(200).body(timesjobs_page(0..3));
    });
    let repeated = server.mock(|when, then| {
        when.method(GET)
            .path("/candidate/job-search.html")
            .query_param("sequence", "2");
        then.status(200).body(timesjobs_page(0..3));
    });
    let third = server.mock(|when, then| {
        when.method(GET)
            .path("/candidate/job-search.html")
            .query_param("sequence", "3");
        then.status(200).body(timesjobs_page(50..53));
    });

    let config = TimesJobsConfig {
        search_url: server.url("/candidate/job-search.html"),
    };
    let adapter = TimesJobsAdapter::new(&config, client()).unwrap();
    let cards = adapter.scrape("python", "Pune", 10).await.unwrap();

    first.assert();
    repeated.assert();
    third.assert_hits(0);
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].company, "Firm 0");
}

#[tokio::test]
async fn test_timesjobs_falls_back_to_cur_page_scheme() {
    let server = MockServer::start();
    let sequence = server.mock(|when, then| {
        when.method(GET)
            .path("/candidate/job-search.html")
            .query_param_exists("sequence");
        then.status(500);
    });
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/candidate/job-search.html")
            .query_param("curPg", "1");
        then.status(200).body(timesjobs_page(0..2));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/candidate/job-search.html")
            .query_param("curPg", "2");
        then.status(200).body(timesjobs_page(2..4));
    });

    let config = TimesJobsConfig {
        search_url: server.url("/candidate/job-search.html"),
    };
    let adapter = TimesJobsAdapter::new(&config, client()).unwrap();
    let cards = adapter.scrape("python", "Pune", 3).await.unwrap();

    sequence.assert_hits(1);
    first.assert();
    second.assert();
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[2].title, "TimesJobs Job 2");
    assert_eq!(cards[2].url, server.url("/job-detail/jobid-2"));
}

#[tokio::test]
async fn test_timesjobs_reads_at_most_five_pages() {
    let server = MockServer::start();
    let pages: Vec<_> = (1..=MAX_PAGES + 1)
        .map(|page| {
            let body = timesjobs_page(page * 10..page * 10 + 2);
            server.mock(move |when, then| {
                when.method(GET)
                    .path("/candidate/job-search.html")
                    .query_param("sequence", page.to_string());
                then.status(200).body(body);
            })
        })
        .collect();

    let config = TimesJobsConfig {
        search_url: server.url("/candidate/job-search.html"),
    };
    let adapter = TimesJobsAdapter::new(&config, client()).unwrap();
    let cards = adapter.scrape("python", "Pune", 100).await.unwrap();

    assert_eq!(cards.len(), MAX_PAGES * 2);
    for page in &pages[..MAX_PAGES] {
        page.assert();
    }
    pages[MAX_PAGES].assert_hits(0);
}
