use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::espn::json_type;
use super::provider::{build_http_client, get_json, FeedSource, FetchError};
use crate::models::{DataKind, League};

/// Head-to-head odds from the odds aggregator's v4 API.
/// Docs: <https://the-odds-api.com/liveapi/guides/v4/>
pub struct OddsApiFeed {
    http: Client,
    base_url: String,
    api_key: String,
    regions: String,
}

impl OddsApiFeed {
    pub fn new(base_url: &str, api_key: &str, regions: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("Invalid odds API URL: {}", base_url))?;
        Ok(OddsApiFeed {
            http: build_http_client(timeout)?,
            base_url,
            api_key: api_key.to_string(),
            regions: regions.to_string(),
        })
    }

    fn endpoint(&self, league: League) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!("{}/sports/{}/odds", self.base_url, league.odds_sport_key()),
            &[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.regions.as_str()),
                ("markets", "h2h"),
                ("oddsFormat", "american"),
            ],
        )
    }
}

#[async_trait]
impl FeedSource for OddsApiFeed {
    async fn fetch(&self, league: League) -> Result<serde_json::Value, FetchError> {
        let url = self
            .endpoint(league)
            .map_err(|e| FetchError::Parse(format!("invalid odds URL: {}", e)))?;
        let raw = get_json(&self.http, url.as_str()).await?;
        if !raw.is_array() {
            return Err(FetchError::Parse(format!(
                "expected a JSON array of events, got {}",
                json_type(&raw)
            )));
        }
        Ok(raw)
    }

    fn kind(&self) -> DataKind {
        DataKind::Odds
    }

    fn name(&self) -> &str {
        "OddsAPI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_sends_key_and_market_params() {
        let server = MockServer::start().await;
        let body = json!([{
            "home_team": "Kansas City Chiefs",
            "away_team": "Buffalo Bills",
            "bookmakers": []
        }]);
        Mock::given(method("GET"))
            .and(path("/sports/americanfootball_nfl/odds"))
            .and(query_param("apiKey", "secret"))
            .and(query_param("regions", "us"))
            .and(query_param("markets", "h2h"))
            .and(query_param("oddsFormat", "american"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let feed = OddsApiFeed::new(&server.uri(), "secret", "us", Duration::from_secs(2)).unwrap();
        let payload = feed.fetch(League::Nfl).await.expect("fetch should succeed");
        assert_eq!(payload, body);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_object() {
        // The aggregator answers quota problems with a JSON object, not an array
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sports/basketball_nba/odds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "quota reached" })),
            )
            .mount(&server)
            .await;

        let feed = OddsApiFeed::new(&server.uri(), "k", "us", Duration::from_secs(2)).unwrap();
        let err = feed.fetch(League::Nba).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let feed = OddsApiFeed::new(&server.uri(), "bad", "us", Duration::from_secs(2)).unwrap();
        let err = feed.fetch(League::Nba).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 401));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(OddsApiFeed::new("not a url", "k", "us", Duration::from_secs(1)).is_err());
    }
}
