//! Injury reports scraped from a public HTML injury-report page.
//!
//! The page has no JSON API, so each fetch downloads the HTML and turns the
//! injury table into a JSON array of row objects. The array then flows through
//! the same snapshot diff as every other feed.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::time::Duration;

use super::provider::{build_http_client, get_text, FeedSource, FetchError};
use crate::models::{DataKind, League};

/// Column order of the report table; shorter rows fill a prefix.
const COLUMNS: [&str; 6] = ["player", "team", "position", "injury", "status", "est_return"];

/// Rows with fewer cells than this are headers or spacers.
const MIN_CELLS: usize = 3;

pub struct InjuryReportFeed {
    http: Client,
    base_url: String,
}

impl InjuryReportFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(InjuryReportFeed {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FeedSource for InjuryReportFeed {
    async fn fetch(&self, league: League) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, league.injury_report_path());
        let html = get_text(&self.http, &url).await?;
        let rows = parse_injury_table(&html)?;
        Ok(Value::Array(rows))
    }

    fn kind(&self) -> DataKind {
        DataKind::Injuries
    }

    fn name(&self) -> &str {
        "InjuryReport"
    }
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("bad selector {}: {}", css, e)))
}

/// Extract injury rows from the report page.
///
/// Prefers `table.injury-table`, falls back to the first table on the page.
/// A page without any table yields an empty list.
pub fn parse_injury_table(html: &str) -> Result<Vec<Value>, FetchError> {
    let document = Html::parse_document(html);
    let injury_table = selector("table.injury-table")?;
    let any_table = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let table = match document
        .select(&injury_table)
        .next()
        .or_else(|| document.select(&any_table).next())
    {
        Some(t) => t,
        None => return Ok(vec![]),
    };

    let rows = table
        .select(&row_sel)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.len() < MIN_CELLS {
                return None;
            }
            let mut obj = Map::new();
            for (column, text) in COLUMNS.iter().zip(cells) {
                if !text.is_empty() {
                    obj.insert(column.to_string(), Value::String(text));
                }
            }
            Some(Value::Object(obj))
        })
        .collect();

    Ok(rows)
}

/// Cell text with runs of whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
