use crate::error::{BattleError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_team_size() -> usize {
    3
}

fn default_turn_limit() -> u32 {
    50
}

fn default_challenge_ttl() -> i64 {
    300
}

fn default_finished_max_age() -> i64 {
    600
}

fn default_stale_max_age() -> i64 {
    900
}

/// Mechanics that can be switched off per battle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mechanics {
    #[serde(default = "default_true")]
    pub stat_stages: bool,
    #[serde(default = "default_true")]
    pub type_effectiveness: bool,
    #[serde(default = "default_true")]
    pub critical_hits: bool,
    #[serde(default = "default_true")]
    pub stab: bool,
    #[serde(default = "default_true")]
    pub status_effects: bool,
    /// When off the damage roll is pinned to 1.00.
    #[serde(default = "default_true")]
    pub random_damage: bool,
}

impl Default for Mechanics {
    fn default() -> Self {
        Self {
            stat_stages: true,
            type_effectiveness: true,
            critical_hits: true,
            stab: true,
            status_effects: true,
            random_damage: true,
        }
    }
}

impl Mechanics {
    /// Every optional mechanic off: plain formula damage only.
    pub fn plain() -> Self {
        Self {
            stat_stages: false,
            type_effectiveness: false,
            critical_hits: false,
            stab: false,
            status_effects: false,
            random_damage: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSettings {
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    /// Zero disables the limit.
    #[serde(default = "default_turn_limit")]
    pub turn_limit: u32,
    #[serde(default)]
    pub allow_duplicates: bool,
    #[serde(default)]
    pub level_cap: Option<u8>,
    #[serde(default)]
    pub mechanics: Mechanics,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            team_size: default_team_size(),
            turn_limit: default_turn_limit(),
            allow_duplicates: false,
            level_cap: None,
            mechanics: Mechanics::default(),
        }
    }
}

impl BattleSettings {
    pub const MAX_TEAM_SIZE: usize = 6;

    pub fn validate(&self) -> Result<()> {
        if self.team_size == 0 || self.team_size > Self::MAX_TEAM_SIZE {
            return Err(BattleError::invalid(format!(
                "team size must be between 1 and {}, got {}",
                Self::MAX_TEAM_SIZE,
                self.team_size
            )));
        }
        if let Some(cap) = self.level_cap {
            if !(1..=100).contains(&cap) {
                return Err(BattleError::invalid(format!(
                    "level cap must be between 1 and 100, got {cap}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default = "default_challenge_ttl")]
    pub challenge_ttl_secs: i64,
    /// Age the eviction sweep is expected to pass to `cleanup_finished_battles`.
    #[serde(default = "default_finished_max_age")]
    pub finished_battle_max_age_secs: i64,
    /// Age the sweep is expected to pass to `cancel_stale_battles`.
    #[serde(default = "default_stale_max_age")]
    pub stale_battle_max_age_secs: i64,
    #[serde(default)]
    pub default_settings: BattleSettings,
    /// Fixes battle RNG seeds; left empty in production.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            challenge_ttl_secs: default_challenge_ttl(),
            finished_battle_max_age_secs: default_finished_max_age(),
            stale_battle_max_age_secs: default_stale_max_age(),
            default_settings: BattleSettings::default(),
            rng_seed: None,
        }
    }
}

impl ManagerConfig {
    pub fn challenge_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.challenge_ttl_secs)
    }

    pub fn finished_battle_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.finished_battle_max_age_secs)
    }

    pub fn stale_battle_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_battle_max_age_secs)
    }
}

pub fn parse_config(raw: &str) -> anyhow::Result<ManagerConfig> {
    let config: ManagerConfig =
        serde_json::from_str(raw).context("Failed to parse manager config JSON")?;
    if config.challenge_ttl_secs <= 0 {
        anyhow::bail!("challenge_ttl_secs must be > 0");
    }
    config
        .default_settings
        .validate()
        .context("Invalid default battle settings")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> anyhow::Result<ManagerConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("Invalid config in {}", path.display()))
}
