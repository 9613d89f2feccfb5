use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::Publisher;
use crate::format::truncate;
use crate::models::{ChannelId, Summary, Tone};

// Discord embed limits
const MAX_TITLE: usize = 256;
const MAX_DESCRIPTION: usize = 4096;
const MAX_FIELD_NAME: usize = 256;
const MAX_FIELD_VALUE: usize = 1024;
const MAX_FIELDS: usize = 25;

const COLOUR_INFO: u32 = 0x3498DB;
const COLOUR_ERROR: u32 = 0xE74C3C;

/// Posts summaries as embeds through the Discord REST API with a bot token.
/// Only the plain `create message` endpoint is used; no gateway connection.
#[derive(Clone)]
pub struct DiscordPublisher {
    http: Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: u32,
    fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<Footer<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct Footer<'a> {
    text: &'a str,
}

impl DiscordPublisher {
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(DiscordPublisher {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

fn embed(summary: &Summary) -> Embed<'static> {
    let fields: Vec<EmbedField> = summary
        .entries
        .iter()
        .take(MAX_FIELDS)
        .map(|e| EmbedField {
            name: truncate(&e.label, MAX_FIELD_NAME),
            value: truncate(&e.value, MAX_FIELD_VALUE),
            inline: false,
        })
        .collect();

    let footer = if summary.entries.len() > MAX_FIELDS {
        Some(Footer {
            text: "More entries omitted",
        })
    } else {
        None
    };

    Embed {
        title: truncate(&summary.title, MAX_TITLE),
        description: summary
            .description
            .as_deref()
            .map(|d| truncate(d, MAX_DESCRIPTION)),
        color: match summary.tone {
            Tone::Info => COLOUR_INFO,
            Tone::Error => COLOUR_ERROR,
        },
        fields,
        footer,
    }
}

#[async_trait]
impl Publisher for DiscordPublisher {
    async fn publish(&self, channel: ChannelId, summary: &Summary) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.api_url, channel);
        let body = CreateMessage {
            embeds: [embed(summary)],
        };
        debug!("Posting '{}' to channel {}", summary.title, channel);

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Discord request failed for channel {}", channel))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Discord API error {} for channel {}: {}", status, channel, text);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataKind, Entry};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary() -> Summary {
        Summary {
            title: "NBA Odds".into(),
            kind: Some(DataKind::Odds),
            description: None,
            entries: vec![Entry::new("Celtics @ Lakers", "DraftKings: Lakers -120, Celtics +100")],
            tone: Tone::Info,
        }
    }

    #[tokio::test]
    async fn test_publish_posts_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(header("Authorization", "Bot tok"))
            .and(body_json(json!({
                "embeds": [{
                    "title": "NBA Odds",
                    "color": COLOUR_INFO,
                    "fields": [{
                        "name": "Celtics @ Lakers",
                        "value": "DraftKings: Lakers -120, Celtics +100",
                        "inline": false
                    }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = DiscordPublisher::new(&server.uri(), "tok", Duration::from_secs(2)).unwrap();
        publisher
            .publish(ChannelId(42), &summary())
            .await
            .expect("publish should succeed");
    }

    #[tokio::test]
    async fn test_publish_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
            .mount(&server)
            .await;

        let publisher = DiscordPublisher::new(&server.uri(), "tok", Duration::from_secs(2)).unwrap();
        let err = publisher.publish(ChannelId(7), &summary()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("403"), "{}", msg);
        assert!(msg.contains("Missing Access"), "{}", msg);
    }

    #[test]
    fn test_embed_enforces_limits() {
        let mut s = summary();
        s.tone = Tone::Error;
        s.title = "t".repeat(300);
        s.entries = (0..30)
            .map(|i| Entry::new(format!("{}", i), "v".repeat(2000)))
            .collect();

        let e = embed(&s);
        assert_eq!(e.color, COLOUR_ERROR);
        assert_eq!(e.title.chars().count(), MAX_TITLE);
        assert_eq!(e.fields.len(), MAX_FIELDS);
        assert!(e.fields.iter().all(|f| f.value.chars().count() <= MAX_FIELD_VALUE));
        assert!(e.footer.is_some());
    }
}
