// src/checker/http.rs
// =============================================================================
// This module fetches one URL and decides whether it is broken.
//
// Key functionality:
// - Makes a single HTTP GET per link (no retries: a failure is the answer)
// - 200 and 204 are successes, every other status is a broken link
// - Transport failures (timeout, DNS, refused connection) are broken links
//   with status code 0 and an uppercased error code such as ENOTFOUND
// - Only HTML pages on the base host get parsed for more links
//
// Rust concepts:
// - async/await: For network I/O
// - Enums: FetchOutcome is either Success (with links) or Broken
// =============================================================================

use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use super::html::{extract_links, ExtractOptions};
use super::resolve::Link;
use crate::config::CrawlConfig;

// Sent with every request so site owners can tell us apart from browsers
pub const USER_AGENT: &str = concat!("octoprobe/", env!("CARGO_PKG_VERSION"));

/// What a single fetch turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The link resolved. `links` is empty unless it was an HTML page on the
    /// base host.
    Success { links: Vec<Link> },
    /// The link is broken. `status_code` is None when no response arrived.
    Broken {
        status_code: Option<u16>,
        status_message: String,
    },
}

#[cfg(test)]
impl FetchOutcome {
    pub fn is_broken(&self) -> bool {
        matches!(self, FetchOutcome::Broken { .. })
    }
}

/// The outcome plus how long the request took.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub outcome: FetchOutcome,
    pub elapsed: Duration,
}

/// Issues the HTTP requests for one crawl. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base_host: String,
    options: ExtractOptions,
}

impl Fetcher {
    // Builds the HTTP client once for the whole run
    //
    // The client follows redirects (reqwest's default policy); the response
    // URL is the final one after every hop.
    pub fn new(config: &CrawlConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_host: config.base.host().to_string(),
            options: ExtractOptions {
                include_images: config.include_images,
                ignore_nofollow: config.ignore_nofollow,
            },
        })
    }

    /// Fetches `link` and classifies the response. Never fails: every kind of
    /// failure is folded into `FetchOutcome::Broken`.
    pub async fn fetch(&self, link: &Link) -> FetchReport {
        let started = Instant::now();

        let outcome = match self.client.get(link.url().clone()).send().await {
            Ok(response) => self.classify(link, response).await,
            Err(e) => {
                debug!("Request to {} failed: {}", link, e);
                broken_by_error(&e)
            }
        };

        FetchReport {
            outcome,
            elapsed: started.elapsed(),
        }
    }

    // Whether a page gets parsed depends on the host that was requested, so a
    // base URL redirecting to another host (example.com -> www.example.com)
    // still yields links. Relative hrefs resolve against the final URL.
    async fn classify(&self, link: &Link, response: Response) -> FetchOutcome {
        let status = response.status();

        if !matches!(status, StatusCode::OK | StatusCode::NO_CONTENT) {
            return FetchOutcome::Broken {
                status_code: Some(status.as_u16()),
                status_message: status_message(status),
            };
        }

        let final_url = response.url().clone();
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.to_ascii_lowercase().starts_with("text/html"));

        // Off-host and non-HTML responses are only checked, never parsed
        if link.host() != self.base_host || !is_html {
            return FetchOutcome::Success { links: Vec::new() };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                links: extract_links(&body, &final_url, self.options),
            },
            Err(e) => {
                debug!("Reading body of {} failed: {}", final_url, e);
                broken_by_error(&e)
            }
        }
    }
}

// Reason phrase of the response: upper case for error statuses ("NOT FOUND"
// for 404), as-is for the 1xx-3xx ones that are still not a success ("Created")
fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) if status.is_client_error() || status.is_server_error() => reason.to_uppercase(),
        Some(reason) => reason.to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}

fn broken_by_error(error: &reqwest::Error) -> FetchOutcome {
    FetchOutcome::Broken {
        status_code: None,
        status_message: transport_code(error).to_string(),
    }
}

// Categorizes a reqwest error into a short, uppercased error code
//
// reqwest only exposes a few predicates (is_timeout, is_connect, ...), so
// for DNS and TLS failures we look at the whole chain of source errors:
// hyper wraps the resolver's message as "dns error: ...".
fn transport_code(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        return "ETIMEDOUT";
    }
    if error.is_redirect() {
        return "ERR_TOO_MANY_REDIRECTS";
    }

    if let Some(kind) = io_error_kind(error) {
        match kind {
            io::ErrorKind::ConnectionRefused => return "ECONNREFUSED",
            io::ErrorKind::ConnectionReset => return "ECONNRESET",
            io::ErrorKind::TimedOut => return "ETIMEDOUT",
            _ => {}
        }
    }

    let chain = error_chain(error).to_lowercase();
    if chain.contains("dns error") || chain.contains("failed to lookup address") {
        "ENOTFOUND"
    } else if chain.contains("connection refused") {
        "ECONNREFUSED"
    } else if chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl") {
        "CERT_ERROR"
    } else {
        "EREQUEST"
    }
}

fn io_error_kind(error: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }
    None
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        text.push_str(": ");
        text.push_str(&err.to_string());
        source = err.source();
    }
    text
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does fetch() return FetchReport instead of Result?
//    - A failed request is not an error for a link checker, it is the answer
//    - Every failure becomes FetchOutcome::Broken, so the caller never has
//      to handle Err
//
// 2. What is error.source()?
//    - Errors in Rust can wrap other errors (std::error::Error::source)
//    - Walking the chain lets us find the io::Error or DNS message that
//      reqwest wrapped several layers deep
//
// 3. Why is Fetcher cheap to clone?
//    - reqwest::Client is an Arc around the connection pool
//    - Every clone shares the same connections
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(base: &str) -> Fetcher {
        let config = CrawlConfig::for_base(Link::parse(base).unwrap());
        Fetcher::new(&config).unwrap()
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
    }

    #[tokio::test]
    async fn test_html_page_on_base_host_yields_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(r#"<a href="/one.html">One</a><a href="mailto:x@y.z">Mail</a>"#))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri());
        let link = Link::parse(&format!("{}/", server.uri())).unwrap();
        let report = fetcher.fetch(&link).await;

        let expected = Link::parse(&format!("{}/one.html", server.uri())).unwrap();
        assert_eq!(report.outcome, FetchOutcome::Success { links: vec![expected] });
    }

    #[tokio::test]
    async fn test_not_found_is_broken_with_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri());
        let link = Link::parse(&format!("{}/missing", server.uri())).unwrap();
        let report = fetcher.fetch(&link).await;

        assert_eq!(
            report.outcome,
            FetchOutcome::Broken {
                status_code: Some(404),
                status_message: "NOT FOUND".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_only_200_and_204_are_success() {
        let server = MockServer::start().await;
        Mock::given(path("/created"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri());

        let created = Link::parse(&format!("{}/created", server.uri())).unwrap();
        let report = fetcher.fetch(&created).await;
        assert_eq!(
            report.outcome,
            FetchOutcome::Broken {
                status_code: Some(201),
                status_message: "Created".to_string(),
            }
        );

        let empty = Link::parse(&format!("{}/empty", server.uri())).unwrap();
        let report = fetcher.fetch(&empty).await;
        assert_eq!(report.outcome, FetchOutcome::Success { links: vec![] });
    }

    #[tokio::test]
    async fn test_non_html_is_not_parsed() {
        let server = MockServer::start().await;
        Mock::given(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(br#"{"href": "<a href='/x'>"}"#.to_vec(), "application/json"),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri());
        let link = Link::parse(&format!("{}/data.json", server.uri())).unwrap();
        let report = fetcher.fetch(&link).await;
        assert_eq!(report.outcome, FetchOutcome::Success { links: vec![] });
    }

    #[tokio::test]
    async fn test_html_on_other_host_is_not_parsed() {
        let base = MockServer::start().await;
        let other = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(html(r#"<a href="/deeper">Deeper</a>"#))
            .mount(&other)
            .await;

        let fetcher = fetcher_for(&base.uri());
        let link = Link::parse(&format!("{}/", other.uri())).unwrap();
        let report = fetcher.fetch(&link).await;
        assert_eq!(report.outcome, FetchOutcome::Success { links: vec![] });
    }

    #[tokio::test]
    async fn test_base_page_redirected_to_other_host_is_parsed() {
        let base = MockServer::start().await;
        let www = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/home", www.uri()).as_str()),
            )
            .mount(&base)
            .await;
        Mock::given(path("/home"))
            .respond_with(html(r#"<a href="about.html">About</a>"#))
            .mount(&www)
            .await;

        let fetcher = fetcher_for(&base.uri());
        let link = Link::parse(&format!("{}/", base.uri())).unwrap();
        let report = fetcher.fetch(&link).await;

        // relative links resolve against the page that was actually served
        let expected = Link::parse(&format!("{}/about.html", www.uri())).unwrap();
        assert_eq!(report.outcome, FetchOutcome::Success { links: vec![expected] });
    }

    #[tokio::test]
    async fn test_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri());
        let link = Link::parse(&server.uri()).unwrap();
        assert!(!fetcher.fetch(&link).await.outcome.is_broken());
    }

    #[tokio::test]
    async fn test_timeout_is_broken_without_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut config = CrawlConfig::for_base(Link::parse(&server.uri()).unwrap());
        config.timeout = Duration::from_millis(100);
        let fetcher = Fetcher::new(&config).unwrap();

        let report = fetcher.fetch(&config.base).await;
        assert_eq!(
            report.outcome,
            FetchOutcome::Broken {
                status_code: None,
                status_message: "ETIMEDOUT".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_refused_connection_is_broken() {
        // Grab a free port, then close it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/", port);

        let fetcher = fetcher_for(&url);
        let report = fetcher.fetch(&Link::parse(&url).unwrap()).await;
        assert_eq!(
            report.outcome,
            FetchOutcome::Broken {
                status_code: None,
                status_message: "ECONNREFUSED".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_host_is_broken_without_status() {
        let url = "http://octoprobe-does-not-exist.invalid/";
        let fetcher = fetcher_for(url);
        let report = fetcher.fetch(&Link::parse(url).unwrap()).await;

        match report.outcome {
            FetchOutcome::Broken { status_code, status_message } => {
                assert_eq!(status_code, None);
                assert_eq!(status_message, "ENOTFOUND");
            }
            other => panic!("expected a broken link, got {:?}", other),
        }
    }
}
