//! Payload → `Summary` conversion.
//!
//! Everything here is pure: no I/O, no panics on foreign JSON. Missing fields
//! fall back to placeholder strings instead of failing.

use serde_json::Value;

use crate::models::{DataKind, Entry, FeedKey, Summary, Tone};
use crate::predict::PredictionReport;

/// Maximum entries shown per feed summary.
pub const MAX_ENTRIES: usize = 5;

pub const FALLBACK: &str = "N/A";
pub const NO_DESCRIPTION: &str = "No description available";
const UNKNOWN: &str = "Unknown";

/// Build the display summary for a feed payload.
///
/// The entry count is `min(items, MAX_ENTRIES)`. A payload without items
/// produces an empty summary whose description states that nothing was found.
pub fn summarize(key: FeedKey, payload: &Value) -> Summary {
    let items = items(key.kind, payload);

    let entries: Vec<Entry> = items
        .iter()
        .take(MAX_ENTRIES)
        .map(|item| match key.kind {
            DataKind::Scores => score_entry(item),
            DataKind::Odds => odds_entry(item),
            DataKind::News => news_entry(item),
            DataKind::Injuries => injury_entry(item),
        })
        .collect();

    let description = if entries.is_empty() {
        Some(empty_text(key.kind).to_string())
    } else if items.len() > MAX_ENTRIES {
        Some(format!("Showing {} of {}", MAX_ENTRIES, items.len()))
    } else {
        None
    };

    Summary {
        title: title(key),
        kind: Some(key.kind),
        description,
        entries,
        tone: Tone::Info,
    }
}

/// Red notice published when a fetch fails and error publication is enabled.
pub fn error_notice(key: FeedKey, message: &str) -> Summary {
    Summary {
        title: format!("Error Fetching {} {}", key.league, key.kind),
        kind: Some(key.kind),
        description: Some(message.to_string()),
        entries: vec![],
        tone: Tone::Error,
    }
}

pub fn predictions_summary(report: &PredictionReport) -> Summary {
    let description = if report.predictions.is_empty() {
        "No games available for today.".to_string()
    } else {
        format!(
            "Model: {} (held-out accuracy {:.0}% on {} games). For entertainment only.",
            report.model,
            report.test_accuracy * 100.0,
            report.training_games
        )
    };

    let entries = report
        .predictions
        .iter()
        .map(|p| {
            let (pick, prob) = if p.home_win_prob >= 0.5 {
                (&p.home_team, p.home_win_prob)
            } else {
                (&p.away_team, 1.0 - p.home_win_prob)
            };
            Entry::new(
                format!("{} @ {}", p.away_team, p.home_team),
                format!("{} ({:.0}%)", pick, prob * 100.0),
            )
        })
        .collect();

    Summary {
        title: format!("{} Predictions for {}", report.league, report.date),
        kind: None,
        description: Some(description),
        entries,
        tone: Tone::Info,
    }
}

/// Cut `s` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn title(key: FeedKey) -> String {
    match key.kind {
        DataKind::Scores => format!("{} Scores", key.league),
        DataKind::Odds => format!("{} Odds", key.league),
        DataKind::News => format!("Latest {} News", key.league),
        DataKind::Injuries => format!("New {} injuries reported!", key.league),
    }
}

fn empty_text(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Scores => "No games found",
        DataKind::Odds => "No odds available",
        DataKind::News => "No news found",
        DataKind::Injuries => "No injuries reported",
    }
}

fn items(kind: DataKind, payload: &Value) -> &[Value] {
    let list = match kind {
        DataKind::Scores => payload.get("events"),
        DataKind::News => payload.get("articles"),
        DataKind::Odds | DataKind::Injuries => Some(payload),
    };
    list.and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn str_or<'a>(v: &'a Value, fallback: &'a str) -> &'a str {
    v.as_str().filter(|s| !s.trim().is_empty()).unwrap_or(fallback)
}

/// Scores arrive as strings from ESPN but may be numbers elsewhere.
fn scalar_or(v: &Value, fallback: &str) -> String {
    match v {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => fallback.to_string(),
    }
}

fn score_entry(event: &Value) -> Entry {
    let competition = &event["competitions"][0];
    let competitors = competition["competitors"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let side = |which: &str| competitors.iter().find(|c| c["homeAway"] == which);

    let team_name = |c: Option<&Value>| -> String {
        c.map(|c| {
            let team = &c["team"];
            str_or(&team["displayName"], str_or(&team["abbreviation"], UNKNOWN)).to_string()
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
    };
    let score = |c: Option<&Value>| -> String {
        c.map(|c| scalar_or(&c["score"], FALLBACK))
            .unwrap_or_else(|| FALLBACK.to_string())
    };

    let (home, away) = (side("home"), side("away"));
    let label = if home.is_none() && away.is_none() {
        str_or(&event["name"], UNKNOWN).to_string()
    } else {
        format!("{} @ {}", team_name(away), team_name(home))
    };

    let detail = event["status"]["type"]["shortDetail"]
        .as_str()
        .or_else(|| competition["status"]["type"]["shortDetail"].as_str())
        .unwrap_or(FALLBACK);

    Entry::new(label, format!("{} - {} ({})", score(away), score(home), detail))
}

fn odds_entry(event: &Value) -> Entry {
    let label = format!(
        "{} @ {}",
        str_or(&event["away_team"], UNKNOWN),
        str_or(&event["home_team"], UNKNOWN)
    );

    let bookmaker = &event["bookmakers"][0];
    if bookmaker.is_null() {
        return Entry::new(label, FALLBACK);
    }

    let markets = bookmaker["markets"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    let market = markets
        .iter()
        .find(|m| m["key"] == "h2h")
        .or_else(|| markets.first());

    let prices: Vec<String> = market
        .and_then(|m| m["outcomes"].as_array())
        .map(|outcomes| {
            outcomes
                .iter()
                .map(|o| format!("{} {}", str_or(&o["name"], UNKNOWN), american_price(&o["price"])))
                .collect()
        })
        .unwrap_or_default();

    let value = if prices.is_empty() {
        FALLBACK.to_string()
    } else {
        format!("{}: {}", str_or(&bookmaker["title"], UNKNOWN), prices.join(", "))
    };
    Entry::new(label, value)
}

fn american_price(v: &Value) -> String {
    if let Some(i) = v.as_i64() {
        format!("{:+}", i)
    } else if let Some(f) = v.as_f64() {
        format!("{:+}", f)
    } else {
        FALLBACK.to_string()
    }
}

fn news_entry(article: &Value) -> Entry {
    Entry::new(
        str_or(&article["headline"], "Untitled"),
        str_or(&article["description"], NO_DESCRIPTION),
    )
}

fn injury_entry(row: &Value) -> Entry {
    Entry::new(
        format!(
            "{} ({}, {})",
            str_or(&row["player"], UNKNOWN),
            str_or(&row["team"], UNKNOWN),
            str_or(&row["position"], UNKNOWN)
        ),
        format!(
            "{}, {}. Return: {}",
            str_or(&row["status"], UNKNOWN),
            str_or(&row["injury"], UNKNOWN),
            str_or(&row["est_return"], FALLBACK)
        ),
    )
}
