use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::{build_http_client, get_json, FeedSource, FetchError};
use crate::models::{DataKind, League};

/// Scoreboard and news feeds backed by ESPN's public site API.
/// No API key required.
pub struct EspnFeed {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
    kind: DataKind,
}

impl EspnFeed {
    pub fn scores(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::new(base_url, DataKind::Scores, timeout)
    }

    pub fn news(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::new(base_url, DataKind::News, timeout)
    }

    fn new(base_url: &str, kind: DataKind, timeout: Duration) -> Result<Self> {
        Ok(EspnFeed {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            kind,
        })
    }

    fn endpoint(&self, league: League) -> String {
        let resource = match self.kind {
            DataKind::News => "news",
            _ => "scoreboard",
        };
        format!("{}/{}/{}", self.base_url, league.espn_path(), resource)
    }
}

#[async_trait]
impl FeedSource for EspnFeed {
    async fn fetch(&self, league: League) -> Result<serde_json::Value, FetchError> {
        let raw = get_json(&self.http, &self.endpoint(league)).await?;
        if !raw.is_object() {
            return Err(FetchError::Parse(format!(
                "expected a JSON object from ESPN {}, got {}",
                self.kind,
                json_type(&raw)
            )));
        }
        Ok(raw)
    }

    fn kind(&self) -> DataKind {
        self.kind
    }

    fn name(&self) -> &str {
        match self.kind {
            DataKind::News => "ESPN-news",
            _ => "ESPN-scoreboard",
        }
    }
}

pub(crate) fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_paths() {
        let feed = EspnFeed::scores("https://espn.test/sports/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            feed.endpoint(League::Nba),
            "https://espn.test/sports/basketball/nba/scoreboard"
        );
        let feed = EspnFeed::news("https://espn.test/sports", Duration::from_secs(1)).unwrap();
        assert_eq!(
            feed.endpoint(League::Nfl),
            "https://espn.test/sports/football/nfl/news"
        );
    }

    #[tokio::test]
    async fn test_fetch_scoreboard() {
        let server = MockServer::start().await;
        let body = json!({ "events": [{ "id": "401", "name": "Celtics at Lakers" }] });
        Mock::given(method("GET"))
            .and(path("/basketball/nba/scoreboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let feed = EspnFeed::scores(&server.uri(), Duration::from_secs(2)).unwrap();
        let payload = feed.fetch(League::Nba).await.expect("fetch should succeed");
        assert_eq!(payload, body);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/football/nfl/news"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let feed = EspnFeed::news(&server.uri(), Duration::from_secs(2)).unwrap();
        let err = feed.fetch(League::Nfl).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_fetch_non_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/basketball/nba/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let feed = EspnFeed::news(&server.uri(), Duration::from_secs(2)).unwrap();
        let err = feed.fetch(League::Nba).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_transport_error() {
        // Nothing listens on port 9 on loopback
        let feed = EspnFeed::scores("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = feed.fetch(League::Nba).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
