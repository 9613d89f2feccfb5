//! Toy outcome predictions for today's games.
//!
//! Trains on the last few weeks of finished games and predicts home/away
//! winners. Not a betting model: the features are team win rates and nothing
//! else.

pub mod model;
pub mod sportsdata;

pub use sportsdata::{GameRecord, SportsDataClient};

use anyhow::Result;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::League;
use model::LabeledGame;

/// Seed for the hold-out split, fixed so runs are reproducible.
const SPLIT_SEED: u64 = 42;

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub home_win_prob: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub league: League,
    pub date: NaiveDate,
    pub model: String,
    pub test_accuracy: f64,
    pub training_games: usize,
    pub predictions: Vec<Prediction>,
}

/// Predict winners for `today`'s games from the previous `history_days` days
/// of results. No games today yields an empty report rather than an error.
pub async fn generate_predictions(
    client: &SportsDataClient,
    league: League,
    today: NaiveDate,
    history_days: u32,
) -> Result<PredictionReport> {
    let mut todays_games = client.games_by_date(league, today).await?;
    todays_games.retain(|g| !is_called_off(g));
    if todays_games.is_empty() {
        info!("No {} games available for {}", league, today);
        return Ok(PredictionReport {
            league,
            date: today,
            model: "none".to_string(),
            test_accuracy: 0.0,
            training_games: 0,
            predictions: vec![],
        });
    }

    let history_dates: Vec<NaiveDate> = (1..=u64::from(history_days))
        .filter_map(|d| today.checked_sub_days(Days::new(d)))
        .collect();
    let fetches = history_dates
        .iter()
        .map(|date| client.games_by_date(league, *date));
    let results = futures_util::future::join_all(fetches).await;

    let mut history: Vec<LabeledGame> = Vec::new();
    for (date, result) in history_dates.iter().zip(results) {
        match result {
            Ok(games) => history.extend(games.iter().filter_map(labeled)),
            Err(e) => warn!("Skipping {} games for {}: {:#}", league, date, e),
        }
    }
    info!(
        "Training on {} finished {} games from the last {} days",
        history.len(),
        league,
        history_days
    );

    let Some((model, test_accuracy)) = model::select_model(&history, SPLIT_SEED) else {
        anyhow::bail!(
            "Not enough finished {} games to train ({} found, need {})",
            league,
            history.len(),
            model::MIN_TRAINING_GAMES
        );
    };
    info!(
        "Selected {} model (hold-out accuracy {:.1}%)",
        model.name(),
        test_accuracy * 100.0
    );

    todays_games.sort_by(|a, b| a.date_time.cmp(&b.date_time));
    let predictions = todays_games
        .iter()
        .map(|g| Prediction {
            home_team: g.home_team.clone(),
            away_team: g.away_team.clone(),
            home_win_prob: model.home_win_prob(&g.home_team, &g.away_team),
        })
        .collect();

    Ok(PredictionReport {
        league,
        date: today,
        model: model.name().to_string(),
        test_accuracy,
        training_games: history.len(),
        predictions,
    })
}

fn is_called_off(g: &GameRecord) -> bool {
    matches!(
        g.status.as_deref(),
        Some("Canceled") | Some("Postponed") | Some("Suspended") | Some("Forfeit")
    )
}

fn labeled(g: &GameRecord) -> Option<LabeledGame> {
    if g.home_team.is_empty() || g.away_team.is_empty() || is_called_off(g) {
        return None;
    }
    Some(LabeledGame {
        home_team: g.home_team.clone(),
        away_team: g.away_team.clone(),
        home_won: g.home_won()?,
    })
}
