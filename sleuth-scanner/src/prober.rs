use crate::error::{ProbeError, Result};
use crate::result::{DataFormat, ProbeResult};
use crate::shape;
use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const PROBE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Issues exactly one GET per [`Prober::probe`] call and reports what came back.
pub struct Prober {
    client: Client,
    timeout_secs: u64,
}

impl Prober {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(PROBE_USER_AGENT)
            .default_headers(probe_headers())
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Probe `url` once. Never fails: transport and decode problems are
    /// recorded on the returned [`ProbeResult`].
    pub async fn probe(&self, url: &str) -> ProbeResult {
        info!("Probing {} (timeout {}s)", url, self.timeout_secs);

        let start = Instant::now();
        let mut result = match self.fetch(url).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Probe of {} failed: {}", url, e);
                ProbeResult::with_error(url.to_string(), &e)
            }
        };
        result.elapsed_ms = start.elapsed().as_millis() as u64;

        if result.success {
            introspect(&mut result);
        }

        info!(
            "Probe of {} finished in {}ms (success: {})",
            url, result.elapsed_ms, result.success
        );
        result
    }

    async fn fetch(&self, url: &str) -> Result<ProbeResult> {
        let parsed = Url::parse(url).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;

        let response = self.client.get(parsed).send().await?;

        let status_code = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        debug!("{} responded {} ({:?})", url, status_code, content_type);

        let body = response.text().await?;

        let mut result = ProbeResult::new(url.to_string());
        result.status_code = Some(status_code);
        result.headers = Some(headers);
        result.content_type = content_type;
        result.raw_body = Some(body);

        if status_code == 200 {
            result.success = true;
        } else {
            warn!("{} returned HTTP {}", url, status_code);
            result.error = Some(ProbeError::HttpStatus(status_code).to_string());
        }

        Ok(result)
    }
}

fn probe_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}

/// A body is treated as JSON when the server says so or when it opens like
/// a JSON container.
pub fn looks_like_json(content_type: Option<&str>, body: &str) -> bool {
    let declared = content_type
        .map(|ct| ct.to_lowercase().contains("json"))
        .unwrap_or(false);
    let trimmed = body.trim_start();
    declared || trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Decode the body of a successful probe and attach its shape.
pub fn introspect(result: &mut ProbeResult) {
    let Some(body) = result.raw_body.as_deref() else {
        return;
    };

    if !looks_like_json(result.content_type.as_deref(), body) {
        debug!("{} returned a non-JSON body", result.url);
        result.data_format = Some(DataFormat::Text);
        return;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            result.json_shape = Some(shape::summarize(&value));
            result.decoded_json = Some(value);
            result.data_format = Some(DataFormat::Json);
        }
        Err(e) => {
            let err = ProbeError::from(e);
            warn!("JSON decode failed for {}: {}", result.url, err);
            result.json_error = Some(err.to_string());
            result.data_format = Some(DataFormat::Text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header_exists, header_regex, method, path},
    };

    #[tokio::test]
    async fn test_probe_json_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"a": 1, "b": [1,2,3]}"#),
            )
            .mount(&mock_server)
            .await;

        let prober = Prober::new().unwrap();
        let result = prober.probe(&format!("{}/api", mock_server.uri())).await;

        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert!(result.error.is_none());
        assert_eq!(result.data_format, Some(DataFormat::Json));

        let shape = result.json_shape.expect("shape should be computed");
        assert_eq!(shape.value_type, "object");
        assert_eq!(shape.keys, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(shape.sample["a"], "1");
        assert_eq!(shape.sample["b"], "array with 3 items");
    }

    #[tokio::test]
    async fn test_probe_sends_fixed_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header_exists("accept"))
            .and(header_exists("accept-language"))
            .and(header_regex("user-agent", "^Mozilla/5.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let prober = Prober::new().unwrap();
        let result = prober.probe(&mock_server.uri()).await;

        assert!(result.success);
        assert_eq!(result.json_shape.map(|s| s.length), Some(Some(0)));
    }

    #[tokio::test]
    async fn test_probe_non_200_keeps_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&mock_server)
            .await;

        let prober = Prober::new().unwrap();
        let result = prober.probe(&mock_server.uri()).await;

        assert!(!result.success);
        assert_eq!(result.status_code, Some(404));
        assert_eq!(result.error.as_deref(), Some("HTTP 404"));
        assert_eq!(result.raw_body.as_deref(), Some("not here"));
        // Introspection only runs on success
        assert!(result.data_format.is_none());
        assert!(result.json_shape.is_none());
    }

    #[tokio::test]
    async fn test_probe_invalid_json_is_not_fatal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string("{broken"),
            )
            .mount(&mock_server)
            .await;

        let prober = Prober::new().unwrap();
        let result = prober.probe(&mock_server.uri()).await;

        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.json_error.is_some());
        assert!(result.decoded_json.is_none());
        assert_eq!(result.raw_body.as_deref(), Some("{broken"));
        assert_eq!(result.data_format, Some(DataFormat::Text));
    }

    #[tokio::test]
    async fn test_probe_plain_text_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string("hello"),
            )
            .mount(&mock_server)
            .await;

        let prober = Prober::new().unwrap();
        let result = prober.probe(&mock_server.uri()).await;

        assert!(result.success);
        assert_eq!(result.data_format, Some(DataFormat::Text));
        assert!(result.json_error.is_none());
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let prober = Prober::with_timeout(1).unwrap();
        let result = prober.probe(&mock_server.uri()).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert!(result.status_code.is_none());
        assert!(result.raw_body.is_none());
    }

    #[tokio::test]
    async fn test_probe_connection_error() {
        // Grab a free port, then close it so nothing is listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let prober = Prober::with_timeout(5).unwrap();
        let result = prober.probe(&format!("http://127.0.0.1:{}/", port)).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("connection error"));
        assert!(result.status_code.is_none());
    }

    #[tokio::test]
    async fn test_probe_unparseable_url() {
        let prober = Prober::new().unwrap();
        let result = prober.probe("not a url").await;

        assert!(!result.success);
        let error = result.error.expect("error should be set");
        assert!(error.starts_with("Invalid URL"), "unexpected error: {}", error);
    }

    #[test]
    fn test_looks_like_json() {
        assert!(looks_like_json(Some("application/json; charset=utf-8"), "x"));
        assert!(looks_like_json(None, "  [1, 2]"));
        assert!(looks_like_json(Some("text/html"), "{\"a\":1}"));
        assert!(!looks_like_json(Some("text/html"), "<html></html>"));
    }
}
