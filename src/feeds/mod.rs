pub mod espn;
pub mod injuries;
pub mod odds;
pub mod provider;
pub mod snapshot;

pub use espn::EspnFeed;
pub use injuries::InjuryReportFeed;
pub use odds::OddsApiFeed;
pub use provider::FeedSource;
pub use snapshot::SnapshotCache;

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::format;
use crate::models::{ChannelId, FeedKey, TickOutcome};
use crate::publish::Publisher;

/// One polled (league, data kind) feed and where its updates go.
pub struct Feed {
    pub key: FeedKey,
    pub source: Arc<dyn FeedSource>,
    pub channel: ChannelId,
    pub interval: Duration,
}

/// Owns the snapshot cache and drives every registered feed from a single
/// cooperative loop.
///
/// Each tick is awaited to completion before the next one is scheduled, so a
/// feed never overlaps itself. Independent schedulers share nothing.
pub struct FeedScheduler {
    feeds: Vec<Feed>,
    cache: SnapshotCache,
    publisher: Arc<dyn Publisher>,
    publish_errors: bool,
}

impl FeedScheduler {
    pub fn new(publisher: Arc<dyn Publisher>, publish_errors: bool) -> Self {
        FeedScheduler {
            feeds: Vec::new(),
            cache: SnapshotCache::new(),
            publisher,
            publish_errors,
        }
    }

    /// Register a feed. Rejects a source whose data kind does not match the
    /// feed key, and a zero interval.
    pub fn add_feed(&mut self, feed: Feed) -> Result<()> {
        if feed.source.kind() != feed.key.kind {
            anyhow::bail!(
                "Feed {}: source {} produces {}, not {}",
                feed.key,
                feed.source.name(),
                feed.source.kind(),
                feed.key.kind
            );
        }
        if feed.interval.is_zero() {
            anyhow::bail!("Feed {}: polling interval must be positive", feed.key);
        }
        info!(
            "Feed {} via {} → channel {} every {:?}",
            feed.key,
            feed.source.name(),
            feed.channel,
            feed.interval
        );
        self.feeds.push(feed);
        Ok(())
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    #[cfg(test)]
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Run one tick for the feed at `index`: fetch, diff, and publish on change.
    ///
    /// A failed fetch never touches the cache. A change that cannot be
    /// delivered rolls the snapshot back so the next tick retries it.
    pub async fn poll_feed(&mut self, index: usize) -> TickOutcome {
        let Some(feed) = self.feeds.get(index) else {
            return TickOutcome::Error(format!("no feed at index {}", index));
        };
        let (key, channel) = (feed.key, feed.channel);
        let source = Arc::clone(&feed.source);

        let payload = match source.fetch(key.league).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Feed {} ({}) fetch failed: {}", key, source.name(), e);
                let message = e.to_string();
                if self.publish_errors {
                    let notice = format::error_notice(key, &message);
                    if let Err(pe) = self.publisher.publish(channel, &notice).await {
                        error!("Failed to publish error notice for {}: {:#}", key, pe);
                    }
                }
                return TickOutcome::Error(message);
            }
        };

        let summary = format::summarize(key, &payload);
        let previous = self.cache.get(&key).cloned();

        if !self.cache.check_and_update(key, payload) {
            debug!("Feed {} unchanged", key);
            return TickOutcome::Unchanged;
        }

        if summary.is_empty() {
            debug!(
                "Feed {} has no data: {}",
                key,
                summary.description.as_deref().unwrap_or_default()
            );
            return TickOutcome::Empty(summary);
        }

        match self.publisher.publish(channel, &summary).await {
            Ok(()) => {
                info!(
                    "Published {} ({} entries) via {}",
                    key,
                    summary.entries.len(),
                    self.publisher.name()
                );
                TickOutcome::Changed(summary)
            }
            Err(e) => {
                error!("Failed to publish {}: {:#}", key, e);
                self.cache.restore(key, previous);
                TickOutcome::Error(format!("publish failed: {:#}", e))
            }
        }
    }

    /// Tick every feed on its own interval until `shutdown` resolves.
    ///
    /// All feeds fire once immediately. Each feed keeps a fixed-period
    /// schedule anchored at start; ticks missed while another tick was running
    /// are skipped rather than replayed. Shutdown is checked between ticks, so
    /// it waits for an in-flight fetch and publish to finish.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if self.feeds.is_empty() {
            warn!("No feeds configured; scheduler idle until shutdown");
            shutdown.await;
            return;
        }

        info!("Feed scheduler started ({} feeds)", self.feeds.len());
        let mut intervals: Vec<Interval> = self
            .feeds
            .iter()
            .map(|feed| {
                let mut interval = tokio::time::interval(feed.interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                interval
            })
            .collect();
        tokio::pin!(shutdown);

        loop {
            let ticks = intervals.iter_mut().map(|i| Box::pin(i.tick()));
            let index = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Feed scheduler shutting down");
                    break;
                }
                (_, index, _) = futures_util::future::select_all(ticks) => index,
            };

            let outcome = self.poll_feed(index).await;
            debug!("Tick {}: {}", self.feeds[index].key, outcome);
        }
    }
}
