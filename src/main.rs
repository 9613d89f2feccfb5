use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod feeds;
mod format;
mod models;
mod predict;
mod publish;

use config::Config;
use feeds::{EspnFeed, Feed, FeedScheduler, FeedSource, InjuryReportFeed, OddsApiFeed};
use models::{DataKind, FeedKey, League};
use predict::SportsDataClient;
use publish::{DiscordPublisher, LogPublisher, Publisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let publisher: Arc<dyn Publisher> = match (&config.discord_token, config.dry_run) {
        (Some(token), false) => {
            info!("🔴 LIVE mode – updates will be posted to Discord");
            Arc::new(DiscordPublisher::new(
                &config.discord_api_url,
                token,
                config.http_timeout(),
            )?)
        }
        _ => {
            info!("🟡 DRY RUN mode – updates are logged, nothing is posted");
            Arc::new(LogPublisher)
        }
    };

    if config.predict {
        return run_predictions(&config, publisher.as_ref()).await;
    }

    let scheduler = build_scheduler(&config, publisher)?;
    if scheduler.feeds().is_empty() {
        warn!("No feed channels configured (see DISCORD_CHANNEL_ID_* variables)");
    }

    scheduler.run(shutdown_signal()).await;
    Ok(())
}

/// Register one feed per configured (league, data kind) channel.
fn build_scheduler(config: &Config, publisher: Arc<dyn Publisher>) -> Result<FeedScheduler> {
    let timeout = config.http_timeout();
    let scores: Arc<dyn FeedSource> = Arc::new(EspnFeed::scores(&config.espn_api_url, timeout)?);
    let news: Arc<dyn FeedSource> = Arc::new(EspnFeed::news(&config.espn_api_url, timeout)?);
    let injuries: Arc<dyn FeedSource> =
        Arc::new(InjuryReportFeed::new(&config.injury_report_url, timeout)?);
    let odds: Option<Arc<dyn FeedSource>> = match &config.odds_api_key {
        Some(key) => Some(Arc::new(OddsApiFeed::new(
            &config.odds_api_url,
            key,
            &config.odds_regions,
            timeout,
        )?)),
        None => None,
    };

    let mut scheduler = FeedScheduler::new(publisher, config.publish_errors);
    for league in League::ALL {
        for kind in DataKind::ALL {
            let key = FeedKey::new(league, kind);
            let Some(channel) = config.channel_for(key) else {
                continue;
            };
            let source = match kind {
                DataKind::Scores => Arc::clone(&scores),
                DataKind::News => Arc::clone(&news),
                DataKind::Injuries => Arc::clone(&injuries),
                DataKind::Odds => match &odds {
                    Some(o) => Arc::clone(o),
                    None => {
                        warn!("Skipping {}: no odds API key", key);
                        continue;
                    }
                },
            };
            scheduler.add_feed(Feed {
                key,
                source,
                channel,
                interval: config.interval_for(kind),
            })?;
        }
    }
    Ok(scheduler)
}

async fn run_predictions(config: &Config, publisher: &dyn Publisher) -> Result<()> {
    let api_key = config.sportsdata_api_key.as_deref().unwrap_or_default();
    let client = SportsDataClient::new(&config.sportsdata_api_url, api_key, config.http_timeout())?;
    let today = chrono::Local::now().date_naive();

    let report = predict::generate_predictions(
        &client,
        League::Nba,
        today,
        config.predict_history_days,
    )
    .await?;
    let summary = format::predictions_summary(&report);

    match config.predictions_channel {
        Some(id) => {
            if let Err(e) = publisher.publish(models::ChannelId(id), &summary).await {
                error!("Failed to publish predictions: {:#}", e);
                return Err(e);
            }
        }
        None => LogPublisher.publish(models::ChannelId(0), &summary).await?,
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
