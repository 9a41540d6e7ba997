//! HTTP client for fetching retailer pages through a JS-rendering proxy.
//!
//! The retail site builds its listing markup client-side, so a plain GET
//! returns an empty shell. Every request is routed through a rendering proxy
//! that executes the page's JavaScript and returns the final HTML; the target
//! URL travels percent-encoded in the proxy's `url` query parameter.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::ScraperError;

/// Substring that every rendered product-listing page contains. The proxy
/// reports upstream failures as HTTP 200 with an error body, so a status
/// check alone cannot tell a listing from an error page.
const LISTING_MARKER: &str = "container-products-switch";

pub struct ProxyClient {
    client: Client,
    proxy_base_url: String,
    api_key: String,
    country: String,
    source_base_url: String,
}

impl ProxyClient {
    /// Creates a `ProxyClient` with a bounded per-request timeout.
    ///
    /// The pipeline performs at most one attempt per call; retries, if
    /// desired, are the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Fetch`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        proxy_base_url: &str,
        api_key: &str,
        country: &str,
        source_base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            proxy_base_url: proxy_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            country: country.to_string(),
            source_base_url: source_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convenience constructor from the application config.
    ///
    /// # Errors
    ///
    /// Same as [`ProxyClient::new`].
    pub fn from_config(config: &giftlist_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.scraper_proxy_base_url,
            &config.scraper_api_key,
            &config.scraper_country,
            &config.scraper_source_base_url,
            config.scraper_request_timeout_secs,
        )
    }

    /// Fetches one rendered category listing page and returns its HTML.
    ///
    /// Exactly one attempt is made; a timeout counts as a fetch failure.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidPage`] — `page` is zero.
    /// - [`ScraperError::Fetch`] — network error or timeout.
    /// - [`ScraperError::UnexpectedStatus`] — non-2xx from the proxy.
    /// - [`ScraperError::UnexpectedPageShape`] — 2xx body without the
    ///   listing marker.
    pub async fn fetch_category_page(
        &self,
        category_id: &str,
        page: u32,
    ) -> Result<String, ScraperError> {
        if page == 0 {
            return Err(ScraperError::InvalidPage);
        }

        let target = self.category_target_url(category_id, page);
        let body = self.fetch_through_proxy(&target).await?;

        if !body.contains(LISTING_MARKER) {
            tracing::debug!(
                url = %target,
                preview = body_preview(&body),
                "response body lacks listing marker"
            );
            return Err(ScraperError::UnexpectedPageShape { url: target });
        }

        Ok(body)
    }

    /// Fetches a rendered single-product detail page and returns its HTML.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Fetch`] — network error or timeout.
    /// - [`ScraperError::UnexpectedStatus`] — non-2xx from the proxy.
    pub async fn fetch_product_page(&self, product_url: &str) -> Result<String, ScraperError> {
        self.fetch_through_proxy(product_url).await
    }

    async fn fetch_through_proxy(&self, target: &str) -> Result<String, ScraperError> {
        let url = self.proxy_url(target);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    fn category_target_url(&self, category_id: &str, page: u32) -> String {
        format!(
            "{}/categories.html?cat={category_id}&p={page}",
            self.source_base_url
        )
    }

    /// Builds the proxy request URL: credential, JS rendering, render
    /// country, and the percent-encoded target.
    fn proxy_url(&self, target: &str) -> String {
        let encoded = utf8_percent_encode(target, NON_ALPHANUMERIC);
        format!(
            "{}?api_key={}&render_js=true&country={}&url={encoded}",
            self.proxy_base_url, self.api_key, self.country
        )
    }
}

/// First ~200 bytes of a response body for log output, cut back to a char
/// boundary so a multibyte glyph (the site prices in `₵`) near the cut
/// cannot split.
fn body_preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
