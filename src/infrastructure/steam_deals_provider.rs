use async_trait::async_trait;
use serde::Deserialize;

use crate::application::{AppError, AppResult, ContentProvider};
use crate::domain::PURPOSE_DEALS;

pub const STEAM_STORE_BASE: &str = "https://store.steampowered.com";

/// Builds the daily discounted-games post from the store's specials list.
pub struct SteamDealsProvider {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
}

impl SteamDealsProvider {
    pub fn new(limit: usize) -> Self {
        Self::with_base_url(STEAM_STORE_BASE.to_string(), limit)
    }

    pub fn with_base_url(base_url: String, limit: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeaturedResp {
    specials: Specials,
}

#[derive(Debug, Deserialize)]
struct Specials {
    #[serde(default)]
    items: Vec<Deal>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Deal {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub discount_percent: u32,
    /// Minor units (cents).
    pub original_price: Option<u64>,
    pub final_price: Option<u64>,
    pub currency: Option<String>,
}

fn unavailable(e: reqwest::Error) -> AppError {
    AppError::SourceUnavailable(e.without_url().to_string())
}

fn format_price(cents: Option<u64>, currency: &str) -> String {
    match cents {
        Some(c) => format!("{}.{:02} {}", c / 100, c % 100, currency),
        None => "unknown".to_string(),
    }
}

/// One line per discounted deal, numbered, capped at `limit`.
pub fn format_deals(deals: &[Deal], limit: usize) -> Option<String> {
    let lines: Vec<String> = deals
        .iter()
        .filter(|d| d.discount_percent > 0)
        .take(limit)
        .enumerate()
        .map(|(i, d)| {
            let currency = d.currency.as_deref().unwrap_or("USD");
            format!(
                "{}. {} -{}% | {} -> {}\n{}/app/{}",
                i + 1,
                d.name,
                d.discount_percent,
                format_price(d.original_price, currency),
                format_price(d.final_price, currency),
                STEAM_STORE_BASE,
                d.id
            )
        })
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(format!("🔥 Steam deals today\n\n{}", lines.join("\n\n")))
}

#[async_trait]
impl ContentProvider for SteamDealsProvider {
    async fn generate(&self, purpose: &str) -> AppResult<Option<String>> {
        if purpose != PURPOSE_DEALS {
            return Ok(None);
        }

        let url = format!("{}/api/featuredcategories", self.base_url);
        let body: FeaturedResp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        Ok(format_deals(&body.specials.items, self.limit))
    }
}
