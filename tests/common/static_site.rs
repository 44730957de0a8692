//! In-memory website implementing `Fetcher`.
//!
//! Counts every fetch per URL and the peak number of concurrent fetches, so
//! tests can check dedup and the concurrency bound exactly. Unknown URLs
//! answer 404.

use async_trait::async_trait;
use site_mirror::{FetchError, FetchResult, Fetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    content_type: String,
    body: Vec<u8>,
    delay: Option<Duration>,
    panics: bool,
}

#[derive(Debug, Default)]
pub struct StaticSite {
    routes: HashMap<String, Route>,
    delay: Duration,
    hits: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(self, url: &str, body: &str) -> Self {
        self.route(url, 200, "text/html; charset=utf-8", body.as_bytes().to_vec())
    }

    pub fn resource(self, url: &str, content_type: &str, body: &[u8]) -> Self {
        self.route(url, 200, content_type, body.to_vec())
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.route(url, status, "text/html", b"<h1>error</h1>".to_vec())
    }

    pub fn route(mut self, url: &str, status: u16, content_type: &str, body: Vec<u8>) -> Self {
        self.routes.insert(
            normalize(url),
            Route {
                status,
                content_type: content_type.to_string(),
                body,
                delay: None,
                panics: false,
            },
        );
        self
    }

    /// Delay before every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay for one URL only (must already be routed)
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.get_mut(&normalize(url)) {
            route.delay = Some(delay);
        }
        self
    }

    /// The fetch for this URL panics
    pub fn panicking(mut self, url: &str) -> Self {
        let route = self.routes.entry(normalize(url)).or_insert_with(|| Route {
            status: 200,
            content_type: "text/html".to_string(),
            body: Vec::new(),
            delay: None,
            panics: false,
        });
        route.panics = true;
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(&normalize(url)).copied().unwrap_or(0)
    }

    pub fn all_hits(&self) -> HashMap<String, usize> {
        self.hits.lock().unwrap().clone()
    }

    pub fn total_fetches(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).expect("test URL").to_string()
}

#[async_trait]
impl Fetcher for StaticSite {
    async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let route = self.routes.get(url.as_str()).cloned();
        let delay = route.as_ref().and_then(|r| r.delay).unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if route.as_ref().is_some_and(|r| r.panics) {
            panic!("fetcher blew up on {url}");
        }

        Ok(match route {
            Some(route) => FetchResult {
                status: route.status,
                content_type: route.content_type,
                body: route.body,
            },
            None => FetchResult {
                status: 404,
                content_type: "text/html".to_string(),
                body: b"not found".to_vec(),
            },
        })
    }
}
