use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolCall};
use crate::search::{DdgClient, ImageSearchParams};
use crate::toolkit::Toolkit;

// Timeouts for visit_url: connect, then the whole request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_MAX_RESULTS: usize = 5;

/// Internet search tools backed by DuckDuckGo, plus a plain URL fetch.
///
/// Every tool is a pass-through: parameters are forwarded to the search
/// client and the provider's results come back unmodified. One log line per
/// invocation.
pub struct WebToolkit {
    tools: Vec<Tool>,
    ddg: DdgClient,
    http: Client,
}

impl WebToolkit {
    pub fn new(ddg: DdgClient) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            tools: build_tools(),
            ddg,
            http,
        })
    }

    async fn search(&self, args: &Value) -> ToolResult<Value> {
        let keywords = required_str(args, "keywords")?;
        let max_results = opt_usize(args, "max_results").unwrap_or(DEFAULT_MAX_RESULTS);

        info!("Searching for: {}, max_results: {}", keywords, max_results);
        let results = self
            .ddg
            .text(keywords, max_results)
            .await
            .map_err(execution_error)?;
        Ok(Value::Array(results))
    }

    async fn news(&self, args: &Value) -> ToolResult<Value> {
        let keywords = required_str(args, "keywords")?;
        let timelimit = opt_str(args, "timelimit").unwrap_or("w");
        let max_results = opt_usize(args, "max_results").unwrap_or(DEFAULT_MAX_RESULTS);

        info!(
            "Searching for news: {}, timelimit: {}, max_results: {}",
            keywords, timelimit, max_results
        );
        let results = self
            .ddg
            .news(keywords, Some(timelimit), max_results)
            .await
            .map_err(execution_error)?;
        Ok(Value::Array(results))
    }

    async fn images(&self, args: &Value) -> ToolResult<Value> {
        let keywords = required_str(args, "keywords")?;
        let params = ImageSearchParams {
            region: opt_str(args, "region").unwrap_or("wt-wt").to_string(),
            safesearch: opt_str(args, "safesearch").unwrap_or("moderate").to_string(),
            timelimit: opt_str(args, "timelimit").map(String::from),
            size: opt_str(args, "size").map(String::from),
            color: opt_str(args, "color").map(String::from),
            type_image: opt_str(args, "type_image").map(String::from),
            layout: opt_str(args, "layout").map(String::from),
            license_image: opt_str(args, "license_image").map(String::from),
            max_results: opt_usize(args, "max_results"),
        };

        info!("Searching for images: {}, params: {:?}", keywords, params);
        let results = self
            .ddg
            .images(keywords, &params)
            .await
            .map_err(execution_error)?;
        Ok(Value::Array(results))
    }

    async fn weather(&self, args: &Value) -> ToolResult<Value> {
        let location = required_str(args, "location")?;

        info!("Getting weather for: {}", location);
        let results = self
            .ddg
            .text(&format!("weather {}", location), 1)
            .await
            .map_err(execution_error)?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::ExecutionFailed(format!("no results for weather {}", location)))
    }

    async fn visit_url(&self, args: &Value) -> ToolResult<Value> {
        let url = required_str(args, "url")?;

        info!("Visiting URL: {}", url);
        let body = self
            .http
            .get(url)
            .send()
            .await
            .map_err(execution_error)?
            .text()
            .await
            .map_err(execution_error)?;
        Ok(Value::String(body))
    }
}

#[async_trait]
impl Toolkit for WebToolkit {
    fn name(&self) -> &str {
        "web"
    }

    fn description(&self) -> &str {
        "Internet search and retrieval tools backed by DuckDuckGo"
    }

    fn instructions(&self) -> &str {
        "Use the search, news, images and weather tools to look up current \
         information on the internet, and visit_url to read a specific page. \
         Results come straight from the search provider."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Value> {
        let args = &tool_call.arguments;
        match tool_call.name.as_str() {
            "search" => self.search(args).await,
            "news" => self.news(args).await,
            "images" => self.images(args).await,
            "weather" => self.weather(args).await,
            "visit_url" => self.visit_url(args).await,
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}

fn build_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "search",
            "Search the internet for the given keywords",
            json!({
                "type": "object",
                "required": ["keywords"],
                "properties": {
                    "keywords": {
                        "type": "string",
                        "description": "Keywords for the query"
                    },
                    "max_results": {
                        "type": "integer",
                        "default": 5,
                        "description": "Maximum number of results to return"
                    }
                }
            }),
        ),
        Tool::new(
            "news",
            "Search the internet for news related to the given keywords, within the given time limit",
            json!({
                "type": "object",
                "required": ["keywords"],
                "properties": {
                    "keywords": {
                        "type": "string",
                        "description": "Keywords for the query"
                    },
                    "timelimit": {
                        "type": "string",
                        "enum": ["d", "w", "m"],
                        "default": "w",
                        "description": "How far back to look: day, week or month"
                    },
                    "max_results": {
                        "type": "integer",
                        "default": 5,
                        "description": "Maximum number of results to return"
                    }
                }
            }),
        ),
        Tool::new(
            "images",
            "DuckDuckGo images search. Query params: https://duckduckgo.com/params.",
            json!({
                "type": "object",
                "required": ["keywords"],
                "properties": {
                    "keywords": {
                        "type": "string",
                        "description": "Keywords for the query"
                    },
                    "region": {
                        "type": "string",
                        "default": "wt-wt",
                        "description": "wt-wt, us-en, uk-en, ru-ru, etc. wt-wt means worldwide"
                    },
                    "safesearch": {
                        "type": "string",
                        "enum": ["on", "moderate", "off"],
                        "default": "moderate"
                    },
                    "timelimit": {
                        "type": "string",
                        "description": "Day, Week, Month, Year"
                    },
                    "size": {
                        "type": "string",
                        "description": "Small, Medium, Large, Wallpaper"
                    },
                    "color": {
                        "type": "string",
                        "description": "color, Monochrome, Red, Orange, Yellow, Green, Blue, Purple, Pink, Brown, Black, Gray, Teal, White"
                    },
                    "type_image": {
                        "type": "string",
                        "description": "photo, clipart, gif, transparent, line"
                    },
                    "layout": {
                        "type": "string",
                        "description": "Square, Tall, Wide"
                    },
                    "license_image": {
                        "type": "string",
                        "description": "any, Public, Share, ShareCommercially, Modify, ModifyCommercially"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results. Omit to return the first response page"
                    }
                }
            }),
        ),
        Tool::new(
            "weather",
            "Get the current weather for the given location",
            json!({
                "type": "object",
                "required": ["location"],
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location to look up, e.g. Cape Town"
                    }
                }
            }),
        ),
        Tool::new(
            "visit_url",
            "Fetch the contents of the given URL",
            json!({
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to fetch"
                    }
                }
            }),
        ),
    ]
}

fn required_str<'a>(args: &'a Value, key: &str) -> ToolResult<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("Missing '{}' parameter", key)))
}

fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

fn opt_usize(args: &Value, key: &str) -> Option<usize> {
    args.get(key).and_then(|v| v.as_u64()).map(|v| v as usize)
}

fn execution_error<E: std::fmt::Display>(err: E) -> ToolError {
    ToolError::ExecutionFailed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn toolkit_for(server: &MockServer) -> WebToolkit {
        WebToolkit::new(DdgClient::with_host(&server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_exposes_the_configured_tool_set() {
        let server = MockServer::start().await;
        let toolkit = toolkit_for(&server);

        let mut names: Vec<&str> = toolkit.tools().iter().map(|t| t.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["images", "news", "search", "visit_url", "weather"]);

        // descriptors are stable across calls
        assert_eq!(toolkit.tools(), toolkit.tools());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let server = MockServer::start().await;
        let toolkit = toolkit_for(&server);

        let result = toolkit
            .call(ToolCall::new("calculator", json!({})))
            .await;
        assert_eq!(
            result.unwrap_err(),
            ToolError::NotFound("calculator".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_parameter_is_invalid() {
        let server = MockServer::start().await;
        let toolkit = toolkit_for(&server);

        let result = toolkit.call(ToolCall::new("search", json!({}))).await;
        assert!(matches!(
            result.unwrap_err(),
            ToolError::InvalidParameters(_)
        ));
    }

    #[tokio::test]
    async fn test_search_forwards_keywords_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "rust language"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r##"<div class="result">
                     <a class="result__a" href="https://a.example/">A</a>
                     <a class="result__snippet" href="#">first</a>
                   </div>
                   <div class="result">
                     <a class="result__a" href="https://b.example/">B</a>
                     <a class="result__snippet" href="#">second</a>
                   </div>"##,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let toolkit = toolkit_for(&server);
        let output = toolkit
            .call(ToolCall::new(
                "search",
                json!({"keywords": "rust language", "max_results": 1}),
            ))
            .await
            .unwrap();

        let results = output.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "A");
    }

    #[tokio::test]
    async fn test_visit_url_returns_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
            .mount(&server)
            .await;

        let toolkit = toolkit_for(&server);
        let output = toolkit
            .call(ToolCall::new(
                "visit_url",
                json!({"url": format!("{}/page", server.uri())}),
            ))
            .await
            .unwrap();

        assert_eq!(output, json!("<html>hello</html>"));
    }

    #[tokio::test]
    async fn test_weather_returns_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "weather Cape Town"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r##"<div class="result">
                     <a class="result__a" href="https://weather.example/">Weather for Cape Town</a>
                     <a class="result__snippet" href="#">18C, clear skies</a>
                   </div>"##,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let toolkit = toolkit_for(&server);
        let output = toolkit
            .call(ToolCall::new("weather", json!({"location": "Cape Town"})))
            .await
            .unwrap();

        assert_eq!(output["title"], "Weather for Cape Town");
        assert_eq!(output["body"], "18C, clear skies");
    }
}
