//! Run configuration
//!
//! Physics constants are compile-time (`engine::physics_constants`). This
//! covers the per-run knobs: seed, match timing, seeding strategy, scheduler
//! pacing and an optional team list. Loaded from YAML or JSON, then
//! `PITCH_SEED` / `PITCH_MATCH_DURATION_MS` override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::engine::live_match::MatchConfig;
use crate::engine::physics_constants::timing;
use crate::error::ConfigError;
use crate::tournament::bracket::SeedingStrategy;
use crate::tournament::scheduler::Pacing;
use crate::tournament::teams::TeamPool;

pub const SEED_ENV: &str = "PITCH_SEED";
pub const MATCH_DURATION_ENV: &str = "PITCH_MATCH_DURATION_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub tick_ms: u64,
    pub match_duration_ms: u64,
    pub golden_goal_cap_ms: u64,
    pub seeding: SeedingStrategy,
    pub pacing: Pacing,
    /// JSON team list; the generated default pool when absent
    pub teams_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_ms: timing::TICK_MS,
            match_duration_ms: timing::MATCH_DURATION_MS,
            golden_goal_cap_ms: timing::GOLDEN_GOAL_CAP_MS,
            seeding: SeedingStrategy::default(),
            pacing: Pacing::default(),
            teams_path: None,
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json` is JSON, anything else YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SEED_ENV) {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.seed = raw
                    .parse()
                    .map_err(|e| ConfigError::Invalid(format!("{SEED_ENV}='{raw}': {e}")))?;
            }
        }
        if let Some(raw) = lookup(MATCH_DURATION_ENV) {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.match_duration_ms = raw.parse().map_err(|e| {
                    ConfigError::Invalid(format!("{MATCH_DURATION_ENV}='{raw}': {e}"))
                })?;
            }
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be > 0".into()));
        }
        if self.match_duration_ms < self.tick_ms {
            return Err(ConfigError::Invalid(format!(
                "match_duration_ms must be at least one tick ({}ms), got {}",
                self.tick_ms, self.match_duration_ms
            )));
        }
        if self.golden_goal_cap_ms < self.tick_ms {
            return Err(ConfigError::Invalid(format!(
                "golden_goal_cap_ms must be at least one tick ({}ms), got {}",
                self.tick_ms, self.golden_goal_cap_ms
            )));
        }
        if self.pacing.lock_settle_ms > self.pacing.between_matches_ms {
            return Err(ConfigError::Invalid(format!(
                "lock_settle_ms ({}) must not exceed between_matches_ms ({})",
                self.pacing.lock_settle_ms, self.pacing.between_matches_ms
            )));
        }
        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            tick_ms: self.tick_ms,
            match_duration_ms: self.match_duration_ms,
            golden_goal_cap_ms: self.golden_goal_cap_ms,
        }
    }

    /// Team list from `teams_path`, or the default pool
    pub fn team_pool(&self) -> Result<TeamPool, ConfigError> {
        match &self.teams_path {
            Some(path) => TeamPool::from_json_file(path),
            None => Ok(TeamPool::default_pool()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = SimConfig::from_yaml_str("seed: 7\nseeding: strength\npacing:\n  between_rounds_ms: 1000\n")
            .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.seeding, SeedingStrategy::Strength);
        assert_eq!(config.pacing.between_rounds_ms, 1000);
        assert_eq!(config.pacing.between_matches_ms, 200);
        assert_eq!(config.match_duration_ms, timing::MATCH_DURATION_MS);
    }

    #[test]
    fn test_json_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"tick_ms": 20, "match_duration_ms": 4000}}"#).unwrap();
        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.tick_ms, 20);
        assert_eq!(config.match_config().match_duration_ms, 4000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimConfig::from_yaml_str("tick_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = SimConfig::from_yaml_str("seed: [1, 2]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(SEED_ENV, "1234"), (MATCH_DURATION_ENV, " 30000 ")]);
        let mut config = SimConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.seed, 1234);
        assert_eq!(config.match_duration_ms, 30_000);

        let bad: HashMap<&str, &str> = HashMap::from([(SEED_ENV, "abc")]);
        let err = config
            .apply_overrides(|k| bad.get(k).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
