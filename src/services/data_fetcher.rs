use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Duration;

use crate::error::FetchError;
use crate::models::League;
use crate::services::RateLimiter;

/// Read side of the upstream API. Both calls return the raw row objects of the
/// response; mapping into our schema happens in the aggregator/normalizer.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Events scheduled on `date` for `league`. `Ok(vec![])` when there are none.
    async fn day_events(&self, league: &League, date: NaiveDate) -> Result<Vec<Value>, FetchError>;

    /// Standings table for `league` in `season`. `Ok(vec![])` when upstream has none.
    async fn standings_table(&self, league: &League, season: &str)
        -> Result<Vec<Value>, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

// ── TheSportsDB ──────────────────────────────────────────────────────────────

/// Client for TheSportsDB v1 JSON API.
/// Docs: <https://www.thesportsdb.com/api.php>
///
/// Every request goes through one shared rate limiter, so at most one call is
/// in flight and consecutive calls are separated by `request_delay`.
pub struct SportsDbClient {
    http: Client,
    base_url: String,
    api_key: String,
    limiter: Mutex<RateLimiter>,
}

impl SportsDbClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        request_delay: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("icestats-fetcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            limiter: Mutex::new(RateLimiter::new(request_delay)),
        })
    }

    fn events_url(&self, league: &League, date: NaiveDate) -> String {
        format!(
            "{}/{}/eventsday.php?d={}&l={}",
            self.base_url,
            self.api_key,
            date.format("%Y-%m-%d"),
            league.upstream_id
        )
    }

    fn table_url(&self, league: &League, season: &str) -> String {
        format!(
            "{}/{}/lookuptable.php?l={}&s={}",
            self.base_url, self.api_key, league.upstream_id, season
        )
    }

    /// One paced GET returning the decoded JSON body.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut limiter = self.limiter.lock().await;
        limiter.run(self.request(url)).await
    }

    async fn request(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|e| FetchError::decode(url, e.to_string()))
    }
}

#[async_trait]
impl UpstreamSource for SportsDbClient {
    async fn day_events(&self, league: &League, date: NaiveDate) -> Result<Vec<Value>, FetchError> {
        let url = self.events_url(league, date);
        let payload = self.get_json(&url).await?;
        extract_rows(payload, "events", &url)
    }

    async fn standings_table(
        &self,
        league: &League,
        season: &str,
    ) -> Result<Vec<Value>, FetchError> {
        let url = self.table_url(league, season);
        let payload = self.get_json(&url).await?;
        extract_rows(payload, "table", &url)
    }

    fn name(&self) -> &str {
        "TheSportsDB"
    }
}

/// Pull the list under `key` out of a response object.
///
/// Upstream sends `null` for "nothing on this date/season"; anything else that
/// isn't a list of objects is a shape error.
pub fn extract_rows(payload: Value, key: &str, url: &str) -> Result<Vec<Value>, FetchError> {
    let Value::Object(mut body) = payload else {
        return Err(FetchError::decode(url, "expected a JSON object"));
    };

    match body.remove(key) {
        Some(Value::Array(rows)) => {
            if rows.iter().all(Value::is_object) {
                Ok(rows)
            } else {
                Err(FetchError::decode(url, format!("`{}` contains non-object rows", key)))
            }
        }
        Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(FetchError::decode(url, format!("`{}` is not a list", key))),
        None => Err(FetchError::decode(url, format!("missing `{}`", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::Instant;

    fn league() -> League {
        League {
            key: "nhl".into(),
            upstream_id: "4380".into(),
        }
    }

    fn client() -> SportsDbClient {
        SportsDbClient::new(
            "https://example.test/api/v1/json/",
            "3",
            Duration::from_millis(600),
            Duration::from_secs(15),
        )
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let c = client();
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(
            c.events_url(&league(), date),
            "https://example.test/api/v1/json/3/eventsday.php?d=2026-10-17&l=4380"
        );
        assert_eq!(
            c.table_url(&league(), "2026-2027"),
            "https://example.test/api/v1/json/3/lookuptable.php?l=4380&s=2026-2027"
        );
    }

    #[test]
    fn test_extract_rows_list() {
        let payload = json!({ "events": [{ "idEvent": "1" }, { "idEvent": "2" }] });
        let rows = extract_rows(payload, "events", "u").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_extract_rows_null_means_empty() {
        let rows = extract_rows(json!({ "table": null }), "table", "u").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_extract_rows_shape_errors() {
        for payload in [
            json!([]),
            json!({ "events": "Patreon only" }),
            json!({ "other": [] }),
            json!({ "events": [1, 2] }),
        ] {
            let err = extract_rows(payload, "events", "u").unwrap_err();
            assert!(matches!(err, FetchError::Decode { .. }));
        }
    }

    /// Answer every request on a local port with `status` and `body`.
    async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    /// Accept connections and never answer.
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let _held = socket;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn local_client(base_url: &str, delay_ms: u64, timeout_ms: u64) -> SportsDbClient {
        SportsDbClient::new(
            base_url,
            "3",
            Duration::from_millis(delay_ms),
            Duration::from_millis(timeout_ms),
        )
        .unwrap()
    }

    fn oct(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let base = serve("503 Service Unavailable", "").await;
        let err = local_client(&base, 10, 2_000)
            .day_events(&league(), oct(17))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Http { status: 503, .. }));
        assert_eq!(err.kind(), "upstream-shape");
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let base = serve("200 OK", "<html>rate limited</html>").await;
        let err = local_client(&base, 10, 2_000)
            .standings_table(&league(), "2026-2027")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
        assert_eq!(err.kind(), "upstream-shape");
    }

    #[tokio::test]
    async fn test_hung_call_times_out_as_network_error() {
        let base = serve_silence().await;
        let started = Instant::now();
        let err = local_client(&base, 10, 300)
            .day_events(&league(), oct(17))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(err.kind(), "transient-network");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_null_payload_is_empty_list() {
        let base = serve("200 OK", r#"{"events":null,"table":null}"#).await;
        let client = local_client(&base, 10, 2_000);

        assert!(client.day_events(&league(), oct(17)).await.unwrap().is_empty());
        assert!(client.standings_table(&league(), "2026").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_and_standings_share_one_limiter() {
        let base = serve("200 OK", r#"{"events":null,"table":null}"#).await;
        let client = local_client(&base, 250, 2_000);

        let started = Instant::now();
        client.day_events(&league(), oct(17)).await.unwrap();
        client.standings_table(&league(), "2026-2027").await.unwrap();

        // the second call may only start 250 ms after the first one ended
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
