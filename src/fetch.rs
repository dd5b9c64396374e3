use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::ScrapedReview;
use crate::parser::{self, ReviewSelectors};

pub const DEFAULT_BASE_URL: &str = "https://www.amazon.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/106.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US, en;q=0.5";
const USER_AGENT_ENV: &str = "REVIEWS_USER_AGENT";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request for page {page} failed: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: StatusCode },
    #[error("failed to read body of page {page}: {source}")]
    Body {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP session defaults, built once per run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout: Duration,
    /// Pause between consecutive page requests.
    pub delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, timeout: Duration, delay: Duration) -> Self {
        let user_agent =
            std::env::var(USER_AGENT_ENV).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout,
            delay,
        }
    }
}

/// Anything that can hand back the raw body of one numbered review page.
pub trait PageSource {
    async fn fetch_page(&self, product_id: &str, page: u32) -> Result<String, FetchError>;
}

pub fn review_page_url(base_url: &str, product_id: &str, page: u32) -> String {
    format!(
        "{}/product-reviews/{}/ref=cm_cr_getr_d_paging_btm_next_{}?pageNumber={}",
        base_url.trim_end_matches('/'),
        product_id,
        page,
        page
    )
}

pub struct HttpPageSource {
    client: Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("Invalid Accept-Language header")?,
        );

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, product_id: &str, page: u32) -> Result<String, FetchError> {
        let url = review_page_url(&self.base_url, product_id, page);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { page, status });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Body { page, source })
    }
}

/// Fetch pages 1, 2, 3, ... in order until one harvests zero reviews.
///
/// The empty page is not part of the result and nothing after it is requested.
/// Any fetch failure aborts the whole extraction. Ids are assigned by position
/// across all pages.
pub async fn extract_reviews<S: PageSource>(
    source: &S,
    product_id: &str,
    selectors: &ReviewSelectors,
    delay: Duration,
) -> Result<Vec<ScrapedReview>, FetchError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut collected = Vec::new();
    let mut page = 1u32;

    loop {
        pb.set_message(format!("page {} ({} reviews so far)", page, collected.len()));
        let body = match source.fetch_page(product_id, page).await {
            Ok(body) => body,
            Err(e) => {
                pb.finish_and_clear();
                warn!("Stopping extraction for {}: {}", product_id, e);
                return Err(e);
            }
        };

        let harvested = parser::harvest_page(&body, selectors);
        if harvested.is_empty() {
            info!("Page {} has no reviews, pagination finished", page);
            break;
        }

        info!("Page {}: {} reviews", page, harvested.len());
        collected.extend(harvested);
        page += 1;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pb.finish_and_clear();
    info!(
        "Extracted {} reviews for {} from {} pages",
        collected.len(),
        product_id,
        page - 1
    );

    Ok(collected
        .into_iter()
        .enumerate()
        .map(|(id, raw)| ScrapedReview { id, raw })
        .collect())
}
