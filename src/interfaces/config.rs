use std::time::Duration;

use serde::Deserialize;

use crate::application::scheduler::Schedule;
use crate::domain::PURPOSE_DEALS;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Bound on every profile lookup and every send.
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_seconds: u64,
    #[serde(default)]
    pub broadcast: BroadcastCfg,
    #[serde(default)]
    pub http: HttpCfg,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BroadcastCfg {
    #[serde(default = "default_broadcast_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_broadcast_warmup")]
    pub warmup_seconds: u64,
    #[serde(default = "default_purposes")]
    pub purposes: Vec<String>,
    #[serde(default = "default_deals_limit")]
    pub deals_limit: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HttpCfg {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_poll_interval() -> u64 {
    300
}
fn default_upstream_timeout() -> u64 {
    10
}
fn default_broadcast_interval() -> u64 {
    86_400
}
fn default_broadcast_warmup() -> u64 {
    60
}
fn default_purposes() -> Vec<String> {
    vec![PURPOSE_DEALS.to_string()]
}
fn default_deals_limit() -> usize {
    10
}
fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for BroadcastCfg {
    fn default() -> Self {
        Self {
            interval_seconds: default_broadcast_interval(),
            warmup_seconds: default_broadcast_warmup(),
            purposes: default_purposes(),
            deals_limit: default_deals_limit(),
        }
    }
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            upstream_timeout_seconds: default_upstream_timeout(),
            broadcast: BroadcastCfg::default(),
            http: HttpCfg::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let raw = expand_env(raw);
        // an empty file is a valid all-defaults config
        let cfg: Config = if raw.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&raw)?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_seconds == 0 {
            anyhow::bail!("poll_interval_seconds must be > 0");
        }
        if self.upstream_timeout_seconds == 0 {
            anyhow::bail!("upstream_timeout_seconds must be > 0");
        }
        if self.broadcast.interval_seconds == 0 {
            anyhow::bail!("broadcast.interval_seconds must be > 0");
        }
        if self.broadcast.purposes.iter().any(|p| p.trim().is_empty()) {
            anyhow::bail!("broadcast.purposes must not contain empty names");
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    pub fn poll_schedule(&self) -> Schedule {
        Schedule {
            warmup: Duration::ZERO,
            interval: Duration::from_secs(self.poll_interval_seconds),
        }
    }

    pub fn broadcast_schedule(&self) -> Schedule {
        Schedule {
            warmup: Duration::from_secs(self.broadcast.warmup_seconds),
            interval: Duration::from_secs(self.broadcast.interval_seconds),
        }
    }
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}
