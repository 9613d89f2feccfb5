use clap::Parser;
use std::time::Duration;

use crate::models::{ChannelId, DataKind, FeedKey, League};

/// Longest accepted polling interval (one week).
pub const MAX_INTERVAL_MINS: u64 = 7 * 24 * 60;

/// NBA/NFL scores, odds, news and injury updates for Discord
#[derive(Parser, Debug, Clone)]
#[command(name = "sportsfeed-bot", version, about)]
pub struct Config {
    /// Log updates instead of posting them to Discord
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Generate today's NBA outcome predictions once and exit
    #[arg(long)]
    pub predict: bool,

    /// Discord bot token (required unless --dry-run)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Discord REST API base URL
    #[arg(long, env = "DISCORD_API_URL", default_value = "https://discord.com/api/v10")]
    pub discord_api_url: String,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NBA_SCORES")]
    pub nba_scores_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NBA_ODDS")]
    pub nba_odds_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NBA_NEWS")]
    pub nba_news_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NBA_INJURIES")]
    pub nba_injuries_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NFL_SCORES")]
    pub nfl_scores_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NFL_ODDS")]
    pub nfl_odds_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NFL_NEWS")]
    pub nfl_news_channel: Option<u64>,

    #[arg(long, env = "DISCORD_CHANNEL_ID_NFL_INJURIES")]
    pub nfl_injuries_channel: Option<u64>,

    /// Channel that receives --predict output
    #[arg(long, env = "DISCORD_CHANNEL_ID_PREDICTIONS")]
    pub predictions_channel: Option<u64>,

    /// ESPN site API base URL
    #[arg(
        long,
        env = "ESPN_API_URL",
        default_value = "https://site.api.espn.com/apis/site/v2/sports"
    )]
    pub espn_api_url: String,

    /// Odds aggregator base URL
    #[arg(long, env = "ODDS_API_URL", default_value = "https://api.the-odds-api.com/v4")]
    pub odds_api_url: String,

    /// Odds aggregator API key (required when an odds channel is set)
    #[arg(long, env = "ODDS_API_KEY", hide_env_values = true)]
    pub odds_api_key: Option<String>,

    /// Bookmaker regions to request odds for
    #[arg(long, env = "ODDS_REGIONS", default_value = "us")]
    pub odds_regions: String,

    /// Base URL of the injury-report pages
    #[arg(long, env = "INJURY_REPORT_URL", default_value = "https://www.rotowire.com")]
    pub injury_report_url: String,

    /// Sports-data provider base URL
    #[arg(long, env = "SPORTSDATA_API_URL", default_value = "https://api.sportsdata.io/v3")]
    pub sportsdata_api_url: String,

    /// Sports-data provider API key (required with --predict)
    #[arg(long, env = "SPORTSDATA_API_KEY", hide_env_values = true)]
    pub sportsdata_api_key: Option<String>,

    /// Days of finished games used to train predictions
    #[arg(long, env = "PREDICT_HISTORY_DAYS", default_value = "30")]
    pub predict_history_days: u32,

    /// Scores polling interval in minutes
    #[arg(long, env = "SCORES_INTERVAL_MINS", default_value = "5")]
    pub scores_interval_mins: u64,

    /// Odds polling interval in minutes
    #[arg(long, env = "ODDS_INTERVAL_MINS", default_value = "10")]
    pub odds_interval_mins: u64,

    /// News polling interval in minutes
    #[arg(long, env = "NEWS_INTERVAL_MINS", default_value = "10")]
    pub news_interval_mins: u64,

    /// Injury-report polling interval in minutes
    #[arg(long, env = "INJURIES_INTERVAL_MINS", default_value = "10")]
    pub injuries_interval_mins: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,

    /// Post a red error notice to the feed's channel when a fetch fails
    #[arg(long, env = "PUBLISH_ERRORS", default_value = "false")]
    pub publish_errors: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.dry_run && self.discord_token.is_none() {
            anyhow::bail!("DISCORD_TOKEN is required. Use --dry-run to log updates instead.");
        }
        for kind in DataKind::ALL {
            let interval = self.interval_for(kind);
            if interval.is_zero() {
                anyhow::bail!("{} polling interval must be at least 1 minute", kind);
            }
            if interval > Duration::from_secs(MAX_INTERVAL_MINS * 60) {
                anyhow::bail!(
                    "{} polling interval must be at most {} minutes",
                    kind,
                    MAX_INTERVAL_MINS
                );
            }
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        let odds_channel = League::ALL
            .iter()
            .any(|l| self.channel_for(FeedKey::new(*l, DataKind::Odds)).is_some());
        if odds_channel && self.odds_api_key.is_none() {
            anyhow::bail!("ODDS_API_KEY is required when an odds channel is configured");
        }
        if self.predict {
            if self.sportsdata_api_key.is_none() {
                anyhow::bail!("SPORTSDATA_API_KEY is required with --predict");
            }
            if self.predict_history_days == 0 {
                anyhow::bail!("predict_history_days must be positive");
            }
        }
        Ok(())
    }

    /// Destination channel for a feed; feeds without one are not polled.
    pub fn channel_for(&self, key: FeedKey) -> Option<ChannelId> {
        let id = match (key.league, key.kind) {
            (League::Nba, DataKind::Scores) => self.nba_scores_channel,
            (League::Nba, DataKind::Odds) => self.nba_odds_channel,
            (League::Nba, DataKind::News) => self.nba_news_channel,
            (League::Nba, DataKind::Injuries) => self.nba_injuries_channel,
            (League::Nfl, DataKind::Scores) => self.nfl_scores_channel,
            (League::Nfl, DataKind::Odds) => self.nfl_odds_channel,
            (League::Nfl, DataKind::News) => self.nfl_news_channel,
            (League::Nfl, DataKind::Injuries) => self.nfl_injuries_channel,
        };
        id.map(ChannelId)
    }

    pub fn interval_for(&self, kind: DataKind) -> Duration {
        let mins = match kind {
            DataKind::Scores => self.scores_interval_mins,
            DataKind::Odds => self.odds_interval_mins,
            DataKind::News => self.news_interval_mins,
            DataKind::Injuries => self.injuries_interval_mins,
        };
        Duration::from_secs(mins.saturating_mul(60))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["sportsfeed-bot"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn test_defaults() {
        let c = parse(&["--dry-run"]);
        assert_eq!(c.interval_for(DataKind::Scores), Duration::from_secs(300));
        assert_eq!(c.interval_for(DataKind::Injuries), Duration::from_secs(600));
        assert_eq!(c.http_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_channel_routing() {
        let c = parse(&["--dry-run", "--nfl-news-channel", "42"]);
        assert_eq!(
            c.channel_for(FeedKey::new(League::Nfl, DataKind::News)),
            Some(ChannelId(42))
        );
        assert_eq!(c.channel_for(FeedKey::new(League::Nba, DataKind::News)), None);
    }

    #[test]
    fn test_huge_interval_does_not_overflow() {
        let c = parse(&["--dry-run", "--odds-interval-mins", "18446744073709551615"]);
        assert_eq!(c.interval_for(DataKind::Odds), Duration::from_secs(u64::MAX));
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate() {
        let mut c = parse(&["--dry-run"]);
        assert!(c.validate().is_ok());

        c.dry_run = false;
        assert!(c.validate().is_err(), "token required outside dry-run");
        c.discord_token = Some("t".into());
        assert!(c.validate().is_ok());

        c.nba_odds_channel = Some(1);
        assert!(c.validate().is_err(), "odds key required with odds channel");
        c.odds_api_key = Some("k".into());
        assert!(c.validate().is_ok());

        c.news_interval_mins = 0;
        assert!(c.validate().is_err());
        c.news_interval_mins = MAX_INTERVAL_MINS + 1;
        assert!(c.validate().is_err());
        c.news_interval_mins = MAX_INTERVAL_MINS;
        assert!(c.validate().is_ok());
        c.news_interval_mins = 10;

        c.predict = true;
        assert!(c.validate().is_err(), "sportsdata key required with --predict");
        c.sportsdata_api_key = Some("k".into());
        assert!(c.validate().is_ok());
    }
}
