use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{FeedError, LiveFeed, LiveMatch, ScoreSnapshot};

/// Live-score feed backed by the CricAPI v1 endpoints.
/// Docs: <https://cricketdata.org/>
pub struct CricApiClient {
    http: Client,
    api_key: String,
    /// Base URL for overriding in tests.
    base_url: String,
}

impl CricApiClient {
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(CricApiClient {
            http,
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or("https://api.cricapi.com/v1")
                .trim_end_matches('/')
                .to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FeedError> {
        debug!("Fetching {}", url);
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status()));
        }
        let raw: serde_json::Value = resp.json().await?;
        Ok(raw)
    }
}

#[async_trait]
impl LiveFeed for CricApiClient {
    fn name(&self) -> &str {
        "CricAPI"
    }

    async fn list_live_matches(&self) -> Result<Vec<LiveMatch>, FeedError> {
        let url = format!(
            "{}/currentMatches?apikey={}&offset=0",
            self.base_url, self.api_key
        );
        let raw = self.get_json(&url).await?;
        Ok(parse_current_matches(&raw))
    }

    async fn fetch_score(&self, match_id: &str) -> Result<ScoreSnapshot, FeedError> {
        let url = format!(
            "{}/match_score?apikey={}&id={}",
            self.base_url, self.api_key, match_id
        );
        let raw = self.get_json(&url).await?;
        Ok(parse_score(&raw))
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────────────

/// Surface only entries whose status mentions "live" (case-insensitive).
fn parse_current_matches(raw: &serde_json::Value) -> Vec<LiveMatch> {
    let entries = match raw["data"].as_array() {
        Some(a) => a,
        None => return vec![],
    };
    entries
        .iter()
        .filter_map(|m| {
            let status = m["status"].as_str()?;
            if !status.to_lowercase().contains("live") {
                return None;
            }
            Some(LiveMatch {
                id: m["id"].as_str()?.to_string(),
                title: m["name"].as_str().unwrap_or("Unknown").to_string(),
            })
        })
        .collect()
}

/// Extract the current-innings score. The `score` array is ordered; the last
/// element is the innings in progress. `target` arrives as a numeric string;
/// absent or unparsable means no override.
fn parse_score(raw: &serde_json::Value) -> ScoreSnapshot {
    let data = &raw["data"];
    let mut out = ScoreSnapshot::default();

    if let Some(latest) = data["score"].as_array().and_then(|s| s.last()) {
        out.runs = value_as_i32(&latest["r"]);
        out.wickets = value_as_i32(&latest["w"]);
        out.overs = value_as_f64(&latest["o"]);
        out.inning_team = latest["inning"].as_str().map(str::to_string);
    }
    out.target = value_as_i32(&data["target"]);
    out
}

fn value_as_i32(v: &serde_json::Value) -> Option<i32> {
    v.as_i64()
        .map(|n| n as i32)
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn value_as_f64(v: &serde_json::Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_live_matches_are_surfaced() {
        let raw = json!({
            "data": [
                { "id": "m1", "name": "CSK vs MI", "status": "Live - Innings Break" },
                { "id": "m2", "name": "RR vs DC", "status": "Match not started" },
                { "id": "m3", "name": "KKR vs SRH", "status": "LIVE" },
                { "id": "m4", "name": "No status here" }
            ]
        });
        let matches = parse_current_matches(&raw);
        assert_eq!(
            matches,
            vec![
                LiveMatch { id: "m1".into(), title: "CSK vs MI".into() },
                LiveMatch { id: "m3".into(), title: "KKR vs SRH".into() },
            ]
        );
    }

    #[test]
    fn missing_data_array_yields_empty_list() {
        assert!(parse_current_matches(&json!({ "status": "failure" })).is_empty());
    }

    #[test]
    fn score_uses_last_innings_entry() {
        let raw = json!({
            "data": {
                "score": [
                    { "r": 182, "w": 6, "o": 20.0, "inning": "Mumbai Indians Inning 1" },
                    { "r": 95, "w": 3, "o": 11.4, "inning": "Chennai Super Kings Inning 2" }
                ],
                "target": "183"
            }
        });
        let snap = parse_score(&raw);
        assert_eq!(snap.runs, Some(95));
        assert_eq!(snap.wickets, Some(3));
        assert_eq!(snap.overs, Some(11.4));
        assert_eq!(snap.target, Some(183));
        assert_eq!(
            snap.inning_team.as_deref(),
            Some("Chennai Super Kings Inning 2")
        );
    }

    #[test]
    fn numeric_strings_parse_too() {
        let raw = json!({
            "data": {
                "score": [ { "r": "41", "w": "1", "o": "5.2", "inning": "Delhi Capitals" } ]
            }
        });
        let snap = parse_score(&raw);
        assert_eq!(snap.runs, Some(41));
        assert_eq!(snap.wickets, Some(1));
        assert_eq!(snap.overs, Some(5.2));
        assert_eq!(snap.target, None);
    }

    #[test]
    fn unparsable_target_means_no_override() {
        let raw = json!({
            "data": { "score": [], "target": "TBD" }
        });
        let snap = parse_score(&raw);
        assert_eq!(snap.target, None);
        assert_eq!(snap.runs, None);
    }

    #[test]
    fn empty_score_payload_yields_defaults() {
        let snap = parse_score(&json!({ "data": {} }));
        assert_eq!(snap, ScoreSnapshot::default());
    }

    // ── Failure classification ───────────────────────────────────────────────
    //
    // A one-shot local socket stands in for the feed so each transport
    // failure mode maps onto its FeedError variant.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(response: &'static str, delay: Option<Duration>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                let _ = sock.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    fn client(base: &str, timeout: Duration) -> CricApiClient {
        CricApiClient::new("test-key", Some(base), timeout).unwrap()
    }

    #[tokio::test]
    async fn slow_feed_is_classified_as_timeout() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            Some(Duration::from_millis(500)),
        )
        .await;
        let err = client(&base, Duration::from_millis(100))
            .list_live_matches()
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Timeout), "got {:?}", err);
    }

    #[tokio::test]
    async fn non_json_body_is_classified_as_parse() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 8\r\nconnection: close\r\n\r\nnot json",
            None,
        )
        .await;
        let err = client(&base, Duration::from_secs(2))
            .list_live_matches()
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn http_error_is_classified_as_status() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            None,
        )
        .await;
        let err = client(&base, Duration::from_secs(2))
            .fetch_score("m1")
            .await
            .unwrap_err();
        assert!(
            matches!(err, FeedError::Status(s) if s.as_u16() == 500),
            "got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn refused_connection_is_classified_as_transport() {
        // Bind then drop so the port is known-closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&base, Duration::from_secs(2))
            .list_live_matches()
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Transport(_)), "got {:?}", err);
    }
}
