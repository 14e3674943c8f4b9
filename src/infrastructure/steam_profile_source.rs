use async_trait::async_trait;
use serde::Deserialize;

use crate::application::{AppError, AppResult, ProfileSource};
use crate::domain::ObservedProfile;

pub const STEAM_API_BASE: &str = "https://api.steampowered.com";

/// Steam Web API lookups. Handles are resolved on every call: a SteamID64 is
/// used as-is, anything else goes through the vanity URL resolver.
pub struct SteamProfileSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SteamProfileSource {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, STEAM_API_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn resolve_steam_id(&self, handle: &str) -> AppResult<String> {
        if is_steam_id64(handle) {
            return Ok(handle.to_string());
        }

        let url = format!("{}/ISteamUser/ResolveVanityURL/v0001/", self.base_url);
        let body: Envelope<VanityResp> = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("vanityurl", handle)])
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        match body.response {
            VanityResp {
                success: 1,
                steamid: Some(id),
            } => Ok(id),
            _ => Err(AppError::SourceUnavailable(format!(
                "handle '{}' could not be resolved",
                handle
            ))),
        }
    }
}

/// Request URLs carry the API key, so they never reach the error text.
fn unavailable(e: reqwest::Error) -> AppError {
    AppError::SourceUnavailable(e.without_url().to_string())
}

pub fn is_steam_id64(handle: &str) -> bool {
    handle.len() == 17 && handle.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct VanityResp {
    success: i64,
    steamid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummariesResp {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummary {
    #[serde(default)]
    personastate: i64,
    gameextrainfo: Option<String>,
}

#[async_trait]
impl ProfileSource for SteamProfileSource {
    async fn fetch_status(&self, target_key: &str) -> AppResult<ObservedProfile> {
        let steam_id = self.resolve_steam_id(target_key).await?;

        let url = format!("{}/ISteamUser/GetPlayerSummaries/v0002/", self.base_url);
        let body: Envelope<SummariesResp> = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("steamids", steam_id.as_str())])
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let player = body.response.players.into_iter().next().ok_or_else(|| {
            AppError::SourceUnavailable(format!("no profile returned for {}", steam_id))
        })?;

        Ok(ObservedProfile {
            observed_activity: player.gameextrainfo.filter(|g| !g.trim().is_empty()),
            online: player.personastate != 0,
        })
    }
}
