use serde::{Deserialize, Serialize};
use std::fmt;

/// Leagues the bot follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    Nba,
    Nfl,
}

impl League {
    pub const ALL: [League; 2] = [League::Nba, League::Nfl];

    /// ESPN path segment, e.g. `basketball/nba`
    pub fn espn_path(&self) -> &'static str {
        match self {
            League::Nba => "basketball/nba",
            League::Nfl => "football/nfl",
        }
    }

    /// Sport key used by the odds aggregator
    pub fn odds_sport_key(&self) -> &'static str {
        match self {
            League::Nba => "basketball_nba",
            League::Nfl => "americanfootball_nfl",
        }
    }

    /// Path segment of the public injury-report page
    pub fn injury_report_path(&self) -> &'static str {
        match self {
            League::Nba => "basketball/injury-report.php",
            League::Nfl => "football/injury-report.php",
        }
    }

    /// Path segment used by the sports-data provider
    pub fn sportsdata_path(&self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Nfl => "nfl",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            League::Nba => write!(f, "NBA"),
            League::Nfl => write!(f, "NFL"),
        }
    }
}

/// Kind of data a feed carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    Scores,
    Odds,
    News,
    Injuries,
}

impl DataKind {
    pub const ALL: [DataKind; 4] = [
        DataKind::Scores,
        DataKind::Odds,
        DataKind::News,
        DataKind::Injuries,
    ];
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataKind::Scores => "Scores",
            DataKind::Odds => "Odds",
            DataKind::News => "News",
            DataKind::Injuries => "Injuries",
        };
        f.write_str(s)
    }
}

/// Snapshot slot identifier: one per (league, data kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedKey {
    pub league: League,
    pub kind: DataKind,
}

impl FeedKey {
    pub fn new(league: League, kind: DataKind) -> Self {
        FeedKey { league, kind }
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.league, self.kind)
    }
}

/// Discord channel snowflake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Info,
    Error,
}

/// One labelled line of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub value: String,
}

impl Entry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Entry {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Human-readable view of a payload, derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub kind: Option<DataKind>,
    pub description: Option<String>,
    pub entries: Vec<Entry>,
    pub tone: Tone,
}

impl Summary {
    /// A summary without entries carries no publishable content.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a single scheduler tick for one feed.
///
/// `Unchanged` and `Error` are separate variants so a failed fetch can never
/// be mistaken for a payload that simply did not change.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// New content, delivered to the feed's channel
    Changed(Summary),
    /// Payload identical to the stored snapshot
    Unchanged,
    /// Valid response with nothing in it; never published
    Empty(Summary),
    /// Fetch or publish failure
    Error(String),
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickOutcome::Changed(s) => write!(f, "changed ({} entries)", s.entries.len()),
            TickOutcome::Unchanged => write!(f, "unchanged"),
            TickOutcome::Empty(_) => write!(f, "empty"),
            TickOutcome::Error(e) => write!(f, "error: {}", e),
        }
    }
}
