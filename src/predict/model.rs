//! Toy home-win models trained on recent results.
//!
//! Two candidates are evaluated on a seeded hold-out split and the more
//! accurate one is kept:
//! - `HomeBaseline`: the league-wide home win rate, same for every game.
//! - `RatingLogistic`: `p = sigmoid(a * (r_home - r_away) + b)` where `r` is
//!   a team's Laplace-smoothed win rate.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// Fewer finished games than this and no model is trained.
pub const MIN_TRAINING_GAMES: usize = 10;

const MAX_ITERS: usize = 500;
const LEARNING_RATE: f64 = 0.5;
const L2: f64 = 1e-3;

/// A finished game reduced to what the models use.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGame {
    pub home_team: String,
    pub away_team: String,
    pub home_won: bool,
}

pub trait OutcomeModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Probability that the home team wins, in [0, 1].
    fn home_win_prob(&self, home_team: &str, away_team: &str) -> f64;
}

pub struct HomeBaseline {
    home_rate: f64,
}

impl HomeBaseline {
    pub fn fit(games: &[LabeledGame]) -> Self {
        let wins = games.iter().filter(|g| g.home_won).count() as f64;
        HomeBaseline {
            home_rate: (wins + 1.0) / (games.len() as f64 + 2.0),
        }
    }
}

impl OutcomeModel for HomeBaseline {
    fn name(&self) -> &'static str {
        "home-baseline"
    }

    fn home_win_prob(&self, _home_team: &str, _away_team: &str) -> f64 {
        self.home_rate
    }
}

/// Per-team win/game counts.
#[derive(Debug, Default, Clone)]
pub struct TeamRatings {
    records: HashMap<String, (u32, u32)>,
}

impl TeamRatings {
    pub fn fit(games: &[LabeledGame]) -> Self {
        let mut records: HashMap<String, (u32, u32)> = HashMap::new();
        for g in games {
            let home = records.entry(g.home_team.clone()).or_default();
            home.1 += 1;
            if g.home_won {
                home.0 += 1;
            }
            let away = records.entry(g.away_team.clone()).or_default();
            away.1 += 1;
            if !g.home_won {
                away.0 += 1;
            }
        }
        TeamRatings { records }
    }

    /// Laplace-smoothed win rate; unseen teams rate 0.5.
    pub fn rating(&self, team: &str) -> f64 {
        let (wins, games) = self.records.get(team).copied().unwrap_or((0, 0));
        (wins as f64 + 1.0) / (games as f64 + 2.0)
    }
}

pub struct RatingLogistic {
    ratings: TeamRatings,
    a: f64,
    b: f64,
}

impl RatingLogistic {
    pub fn fit(games: &[LabeledGame]) -> Self {
        let ratings = TeamRatings::fit(games);
        let samples: Vec<(f64, f64)> = games
            .iter()
            .map(|g| {
                let x = ratings.rating(&g.home_team) - ratings.rating(&g.away_team);
                (x, if g.home_won { 1.0 } else { 0.0 })
            })
            .collect();

        let (mut a, mut b) = (1.0f64, 0.0f64);
        if !samples.is_empty() {
            let n = samples.len() as f64;
            for i in 0..MAX_ITERS {
                let lr = LEARNING_RATE / (1.0 + 0.01 * i as f64);
                let (mut grad_a, mut grad_b) = (0.0, 0.0);
                for (x, y) in &samples {
                    let err = sigmoid(a * x + b) - y;
                    grad_a += err * x;
                    grad_b += err;
                }
                a -= lr * (grad_a / n + L2 * a);
                b -= lr * (grad_b / n);
            }
        }

        RatingLogistic { ratings, a, b }
    }
}

impl OutcomeModel for RatingLogistic {
    fn name(&self) -> &'static str {
        "rating-logistic"
    }

    fn home_win_prob(&self, home_team: &str, away_team: &str) -> f64 {
        let x = self.ratings.rating(home_team) - self.ratings.rating(away_team);
        sigmoid(self.a * x + self.b).clamp(0.0, 1.0)
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Shuffle with a fixed seed and split off `test_fraction` (at least one item).
pub fn train_test_split<T: Clone>(items: &[T], test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
    let test_len = ((items.len() as f64 * test_fraction).round() as usize)
        .max(1)
        .min(items.len());
    let test = shuffled.split_off(items.len() - test_len);
    (shuffled, test)
}

/// Fraction of games where the predicted winner (p ≥ 0.5 → home) was right.
pub fn accuracy(model: &dyn OutcomeModel, games: &[LabeledGame]) -> f64 {
    if games.is_empty() {
        return 0.0;
    }
    let correct = games
        .iter()
        .filter(|g| (model.home_win_prob(&g.home_team, &g.away_team) >= 0.5) == g.home_won)
        .count();
    correct as f64 / games.len() as f64
}

/// Train both candidates on the training split and keep the one with the
/// higher hold-out accuracy (the logistic model wins ties).
///
/// Returns `None` when there are fewer than `MIN_TRAINING_GAMES` games.
pub fn select_model(games: &[LabeledGame], seed: u64) -> Option<(Box<dyn OutcomeModel>, f64)> {
    if games.len() < MIN_TRAINING_GAMES {
        return None;
    }
    let (train, test) = train_test_split(games, 0.2, seed);

    let baseline = HomeBaseline::fit(&train);
    let logistic = RatingLogistic::fit(&train);
    let baseline_acc = accuracy(&baseline, &test);
    let logistic_acc = accuracy(&logistic, &test);

    let chosen: (Box<dyn OutcomeModel>, f64) = if baseline_acc > logistic_acc {
        (Box::new(baseline), baseline_acc)
    } else {
        (Box::new(logistic), logistic_acc)
    };
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn game(home: &str, away: &str, home_won: bool) -> LabeledGame {
        LabeledGame {
            home_team: home.into(),
            away_team: away.into(),
            home_won,
        }
    }

    /// "Good" always beats "Bad" regardless of venue.
    fn lopsided_season() -> Vec<LabeledGame> {
        let mut games = Vec::new();
        for _ in 0..15 {
            games.push(game("Good", "Bad", true));
            games.push(game("Bad", "Good", false));
        }
        games
    }

    #[test]
    fn test_ratings_laplace_smoothing() {
        let ratings = TeamRatings::fit(&[game("A", "B", true), game("A", "B", true)]);
        assert_relative_eq!(ratings.rating("A"), 0.75, epsilon = 1e-9);
        assert_relative_eq!(ratings.rating("B"), 0.25, epsilon = 1e-9);
        assert_relative_eq!(ratings.rating("Unseen"), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_baseline_home_rate() {
        let m = HomeBaseline::fit(&[game("A", "B", true), game("C", "D", false)]);
        assert_relative_eq!(m.home_win_prob("X", "Y"), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_logistic_learns_team_strength() {
        let m = RatingLogistic::fit(&lopsided_season());
        assert!(m.home_win_prob("Good", "Bad") > 0.5);
        assert!(m.home_win_prob("Bad", "Good") < 0.5);
    }

    #[test]
    fn test_split_is_seeded_and_partitions() {
        let items: Vec<u32> = (0..20).collect();
        let (train_a, test_a) = train_test_split(&items, 0.2, 42);
        let (train_b, test_b) = train_test_split(&items, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(test_a.len(), 4);
        assert_eq!(train_a.len(), 16);

        let mut all: Vec<u32> = train_a.into_iter().chain(test_a).collect();
        all.sort();
        assert_eq!(all, items);
    }

    #[test]
    fn test_split_keeps_one_test_item() {
        let (train, test) = train_test_split(&[1, 2, 3], 0.1, 7);
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 2);
    }

    #[test]
    fn test_accuracy() {
        let m = HomeBaseline::fit(&vec![game("A", "B", true); 4]);
        let games = [game("A", "B", true), game("A", "B", false)];
        assert_relative_eq!(accuracy(&m, &games), 0.5, epsilon = 1e-9);
        assert_relative_eq!(accuracy(&m, &[]), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_select_model_prefers_team_strength() {
        let (model, acc) = select_model(&lopsided_season(), 42).expect("enough games");
        assert_eq!(model.name(), "rating-logistic");
        assert_relative_eq!(acc, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_select_model_needs_history() {
        let games = vec![game("A", "B", true); MIN_TRAINING_GAMES - 1];
        assert!(select_model(&games, 42).is_none());
    }
}
