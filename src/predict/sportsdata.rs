use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::League;

/// One game as returned by the sports-data provider's `GamesByDate` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameRecord {
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    pub date_time: Option<String>,
    pub home_team_score: Option<f64>,
    pub away_team_score: Option<f64>,
    pub status: Option<String>,
}

impl GameRecord {
    /// `Some(home won)` once both scores are known. Ties count as a home loss.
    pub fn home_won(&self) -> Option<bool> {
        match (self.home_team_score, self.away_team_score) {
            (Some(h), Some(a)) => Some(h > a),
            _ => None,
        }
    }
}

/// Client for the sports-data provider's scores API.
#[derive(Clone)]
pub struct SportsDataClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SportsDataClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SportsDataClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch all games scheduled on `date`.
    pub async fn games_by_date(&self, league: League, date: NaiveDate) -> Result<Vec<GameRecord>> {
        let url = format!(
            "{}/{}/scores/json/GamesByDate/{}",
            self.base_url,
            league.sportsdata_path(),
            date.format("%Y-%m-%d")
        );
        debug!("Fetching {} games for {}", league, date);

        let resp = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("Sports-data request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Sports-data API error {}: {}", status, body);
        }

        let games: Option<Vec<GameRecord>> = resp
            .json()
            .await
            .context("Failed to parse sports-data response")?;
        Ok(games.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_home_won() {
        let mut g: GameRecord = serde_json::from_value(json!({
            "HomeTeam": "LAL", "AwayTeam": "BOS",
            "HomeTeamScore": 101.0, "AwayTeamScore": 99.0
        }))
        .unwrap();
        assert_eq!(g.home_won(), Some(true));
        g.home_team_score = Some(99.0);
        assert_eq!(g.home_won(), Some(false));
        g.away_team_score = None;
        assert_eq!(g.home_won(), None);
    }

    #[tokio::test]
    async fn test_games_by_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nba/scores/json/GamesByDate/2024-01-15"))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "HomeTeam": "LAL", "AwayTeam": "BOS", "DateTime": "2024-01-15T19:30:00",
                  "HomeTeamScore": null, "AwayTeamScore": null, "Status": "Scheduled",
                  "GameID": 1 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SportsDataClient::new(&server.uri(), "k", Duration::from_secs(2)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let games = client.games_by_date(League::Nba, date).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].home_team, "LAL");
        assert_eq!(games[0].status.as_deref(), Some("Scheduled"));
        assert_eq!(games[0].home_won(), None);
    }

    #[tokio::test]
    async fn test_null_body_is_no_games() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = SportsDataClient::new(&server.uri(), "k", Duration::from_secs(2)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        assert!(client.games_by_date(League::Nfl, date).await.unwrap().is_empty());
    }
}
