use async_trait::async_trait;
use rss::Channel;
use tracing::{error, info};

use crate::error::{NewsPulseError, Result};

/// Maps a ticker symbol to an ordered sequence of headline strings.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_headlines(&self, symbol: &str) -> Result<Vec<String>>;
}

/// Pulls headlines from a Google News RSS search feed.
///
/// Retrieval or parse failures never surface to the caller; the source falls
/// back to three deterministic placeholder headlines for the symbol instead.
pub struct GoogleNewsSource {
    client: reqwest::Client,
    url_template: String,
    max_headlines: usize,
}

impl GoogleNewsSource {
    pub fn new(url_template: impl Into<String>, max_headlines: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            url_template: url_template.into(),
            max_headlines,
        }
    }

    fn feed_url(&self, symbol: &str) -> String {
        self.url_template.replace("{symbol}", symbol)
    }

    async fn fetch_feed(&self, symbol: &str) -> Result<Vec<String>> {
        let url = self.feed_url(symbol);
        info!("Fetching news feed: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NewsPulseError::feed_error(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| NewsPulseError::feed_error(e.to_string()))?;

        let channel = Channel::read_from(&body[..])
            .map_err(|e| NewsPulseError::feed_error(e.to_string()))?;

        let titles = channel
            .items()
            .iter()
            .filter_map(|item| item.title())
            .map(str::to_string)
            .take(self.max_headlines)
            .collect();

        Ok(titles)
    }

    fn fallback_headlines(symbol: &str) -> Vec<String> {
        vec![
            format!("{} reports strong earnings", symbol),
            format!("Market analysts discuss {}", symbol),
            format!("{} announces new product", symbol),
        ]
    }
}

#[async_trait]
impl NewsSource for GoogleNewsSource {
    async fn fetch_headlines(&self, symbol: &str) -> Result<Vec<String>> {
        match self.fetch_feed(symbol).await {
            Ok(titles) => Ok(titles),
            Err(e) => {
                error!("News fetch failed: {}", e);
                Ok(Self::fallback_headlines(symbol))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    fn feed_body(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|t| format!("<item><title>{}</title><link>http://example.com</link></item>", t))
            .collect();
        format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
             <title>search results</title><link>http://example.com</link>\
             <description>feed</description>{}</channel></rss>",
            items
        )
    }

    #[tokio::test]
    async fn returns_feed_titles_in_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rss").query_param("q", "TCS");
            then.status(200).body(feed_body(&[
                "TCS reports record quarterly profits",
                "TCS expands to European market",
                "IT sector faces headwinds",
            ]));
        });

        let source =
            GoogleNewsSource::new(format!("{}/rss?q={{symbol}}", server.base_url()), 3);
        let titles = source.fetch_headlines("TCS").await.unwrap();

        mock.assert();
        assert_eq!(
            titles,
            vec![
                "TCS reports record quarterly profits",
                "TCS expands to European market",
                "IT sector faces headwinds",
            ]
        );
    }

    #[tokio::test]
    async fn truncates_to_max_headlines() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(200)
                .body(feed_body(&["one", "two", "three", "four", "five"]));
        });

        let source =
            GoogleNewsSource::new(format!("{}/rss?q={{symbol}}", server.base_url()), 3);
        let titles = source.fetch_headlines("XYZ").await.unwrap();
        assert_eq!(titles.len(), 3);
    }

    #[tokio::test]
    async fn empty_feed_yields_empty_sequence() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(200).body(feed_body(&[]));
        });

        let source =
            GoogleNewsSource::new(format!("{}/rss?q={{symbol}}", server.base_url()), 3);
        let titles = source.fetch_headlines("OBSCURE").await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_falls_back_to_placeholders() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(500);
        });

        let source =
            GoogleNewsSource::new(format!("{}/rss?q={{symbol}}", server.base_url()), 3);
        let titles = source.fetch_headlines("ABC").await.unwrap();

        assert_eq!(
            titles,
            vec![
                "ABC reports strong earnings",
                "Market analysts discuss ABC",
                "ABC announces new product",
            ]
        );
    }

    #[tokio::test]
    async fn malformed_feed_falls_back_to_placeholders() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rss");
            then.status(200).body("not xml at all");
        });

        let source =
            GoogleNewsSource::new(format!("{}/rss?q={{symbol}}", server.base_url()), 3);
        let titles = source.fetch_headlines("ABC").await.unwrap();
        assert_eq!(titles.len(), 3);
        assert!(titles[0].contains("ABC"));
    }
}
