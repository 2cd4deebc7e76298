use anyhow::{anyhow, Context, Result};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

const DEFAULT_HOST: &str = "https://duckduckgo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Sidekick/1.0)";

/// Search parameters for the image vertical. Field names and accepted values
/// follow the DuckDuckGo query parameters, see <https://duckduckgo.com/params>.
#[derive(Debug, Clone)]
pub struct ImageSearchParams {
    pub region: String,
    pub safesearch: String,
    pub timelimit: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub type_image: Option<String>,
    pub layout: Option<String>,
    pub license_image: Option<String>,
    pub max_results: Option<usize>,
}

impl Default for ImageSearchParams {
    fn default() -> Self {
        Self {
            region: "wt-wt".to_string(),
            safesearch: "moderate".to_string(),
            timelimit: None,
            size: None,
            color: None,
            type_image: None,
            layout: None,
            license_image: None,
            max_results: None,
        }
    }
}

/// Client for the DuckDuckGo search endpoints.
///
/// Text search scrapes the HTML results page; the news and image verticals
/// are JSON endpoints gated by a `vqd` session token scraped off the front
/// page. Results are returned as the provider's own mappings, unmodified.
pub struct DdgClient {
    client: Client,
    host: String,
}

impl DdgClient {
    pub fn new() -> Self {
        Self::with_host(DEFAULT_HOST)
    }

    /// Point the client at a different host, used by tests
    pub fn with_host(host: &str) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build http client");

        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        }
    }

    /// Text search. Returns up to `max_results` mappings with the keys
    /// `title`, `href` and `body`.
    pub async fn text(&self, keywords: &str, max_results: usize) -> Result<Vec<Value>> {
        let html = self
            .client
            .get(format!("{}/html/", self.host))
            .query(&[("q", keywords)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_text_results(&html, max_results))
    }

    /// News search. `timelimit` is one of d, w, m (day, week, month).
    pub async fn news(
        &self,
        keywords: &str,
        timelimit: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<Value>> {
        let vqd = self.vqd(keywords).await?;

        let mut query = vec![
            ("l".to_string(), "wt-wt".to_string()),
            ("o".to_string(), "json".to_string()),
            ("q".to_string(), keywords.to_string()),
            ("vqd".to_string(), vqd),
            ("p".to_string(), "-1".to_string()),
        ];
        if let Some(df) = timelimit {
            query.push(("df".to_string(), df.to_string()));
        }

        let payload: Value = self
            .client
            .get(format!("{}/news.js", self.host))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(take_results(payload, Some(max_results)))
    }

    /// Image search. All filters are forwarded as the provider expects them;
    /// `None` filters are sent as empty slots.
    pub async fn images(&self, keywords: &str, params: &ImageSearchParams) -> Result<Vec<Value>> {
        let vqd = self.vqd(keywords).await?;

        let filters = [
            params.timelimit.as_deref().unwrap_or(""),
            params.size.as_deref().unwrap_or(""),
            params.color.as_deref().unwrap_or(""),
            params.type_image.as_deref().unwrap_or(""),
            params.layout.as_deref().unwrap_or(""),
            params.license_image.as_deref().unwrap_or(""),
        ]
        .join(",");

        let safesearch = match params.safesearch.as_str() {
            "off" => "-1",
            _ => "1",
        };

        let payload: Value = self
            .client
            .get(format!("{}/i.js", self.host))
            .query(&[
                ("l", params.region.as_str()),
                ("o", "json"),
                ("q", keywords),
                ("vqd", &vqd),
                ("f", &filters),
                ("p", safesearch),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(take_results(payload, params.max_results))
    }

    /// The session token the JSON endpoints require, embedded in the front
    /// page for the same query
    async fn vqd(&self, keywords: &str) -> Result<String> {
        let body = self
            .client
            .get(format!("{}/", self.host))
            .query(&[("q", keywords)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let re = Regex::new(r#"vqd=['"]?([\d-]+)"#).unwrap();
        re.captures(&body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| anyhow!("no vqd token in response for '{}'", keywords))
            .context("DuckDuckGo session token lookup failed")
    }
}

impl Default for DdgClient {
    fn default() -> Self {
        Self::new()
    }
}

fn take_results(payload: Value, max_results: Option<usize>) -> Vec<Value> {
    let results = match payload.get("results").and_then(|r| r.as_array()) {
        Some(results) => results.clone(),
        None => return Vec::new(),
    };
    match max_results {
        Some(limit) => results.into_iter().take(limit).collect(),
        None => results,
    }
}

fn parse_text_results(html: &str, max_results: usize) -> Vec<Value> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse("div.result").unwrap();
    let title_selector = Selector::parse("a.result__a").unwrap();
    let snippet_selector = Selector::parse("a.result__snippet").unwrap();

    let mut results = Vec::new();
    for node in document.select(&result_selector) {
        let Some(anchor) = node.select(&title_selector).next() else {
            continue;
        };
        let title = anchor.text().collect::<String>().trim().to_string();
        let href = anchor
            .value()
            .attr("href")
            .map(resolve_redirect)
            .unwrap_or_default();
        let body = node
            .select(&snippet_selector)
            .next()
            .map(|snippet| snippet.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(json!({
            "title": title,
            "href": href,
            "body": body,
        }));
        if results.len() >= max_results {
            break;
        }
    }
    results
}

/// The HTML endpoint wraps result links in a redirect with the target in the
/// `uddg` query parameter; unwrap it when present
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    if let Ok(parsed) = Url::parse(&absolute) {
        if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }
    absolute
}
