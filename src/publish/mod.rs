pub mod discord;

pub use discord::DiscordPublisher;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::{ChannelId, Summary, Tone};

/// Delivery of a summary to a chat channel.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, channel: ChannelId, summary: &Summary) -> Result<()>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Dry-run sink: writes summaries to the log instead of a channel.
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, channel: ChannelId, summary: &Summary) -> Result<()> {
        let kind = summary.kind.map(|k| k.to_string()).unwrap_or_default();
        match summary.tone {
            Tone::Info => info!("📣 [dry-run #{}] {} {}", channel, kind, summary.title),
            Tone::Error => warn!("📣 [dry-run #{}] {} {}", channel, kind, summary.title),
        }
        if let Some(desc) = &summary.description {
            info!("    {}", desc);
        }
        for entry in &summary.entries {
            info!("    • {}: {}", entry.label, entry.value);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
