// Configuration module for reading Bot.toml
// All empirical constants of the perception pipeline and the planner live
// here so they can be tuned without recompiling.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub grid: GridConfig,
    pub sampling: SamplingConfig,
    pub reconstruction: ReconstructionConfig,
    pub planner: PlannerConfig,
    pub timing: TimingConfig,
    pub debug: DebugConfig,
}

/// Grid geometry of the observed game surface
#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    /// Cells per side of the square game grid
    pub size: usize,
    /// Rendered pixels per cell side
    pub cell_px: usize,
}

impl GridConfig {
    /// Frame width/height in pixels implied by the grid geometry
    pub fn frame_px(&self) -> usize {
        self.size * self.cell_px
    }
}

/// Pixel sampling thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct SamplingConfig {
    /// Luma above which a sampled cell counts as bright
    pub brightness_threshold: f32,
    /// Alpha above which a sampled cell counts as opaque
    pub alpha_threshold: f32,
    /// Fractional sub-sample offsets within a cell, chosen to stay clear of
    /// grid-line and border pixels
    pub offset_lo: f32,
    pub offset_hi: f32,
}

/// Body reconstruction constants
#[derive(Debug, Deserialize, Clone)]
pub struct ReconstructionConfig {
    /// Minimum brightness cutoff during cluster refinement
    pub brightness_floor: f32,
    /// Cells kept beyond the expected length before the cutoff applies
    pub refine_extra_keep: usize,
    /// Empirical slack added to the cluster size for the walk loop guard
    pub walk_guard_slack: usize,
}

/// Search constants
#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    /// Maximum number of whole-snake states expanded per planning attempt
    pub node_cap: usize,
}

/// Startup timing constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Interval between readiness polls while waiting for the game surface
    pub startup_poll_interval_ms: u64,
    /// Give up on initialization after this long
    pub startup_timeout_ms: u64,
}

/// Tick log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Bot.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Bot.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Bot.toml
    pub fn default_hardcoded() -> Self {
        Config {
            grid: GridConfig {
                size: 28,
                cell_px: 16,
            },
            sampling: SamplingConfig {
                brightness_threshold: 100.0,
                alpha_threshold: 128.0,
                offset_lo: 0.35,
                offset_hi: 0.65,
            },
            reconstruction: ReconstructionConfig {
                brightness_floor: 60.0,
                refine_extra_keep: 6,
                walk_guard_slack: 2,
            },
            planner: PlannerConfig { node_cap: 20_000 },
            timing: TimingConfig {
                startup_poll_interval_ms: 200,
                startup_timeout_ms: 10_000,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "snakesight_ticks.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Bot.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_px_calculation() {
        let config = Config::default_hardcoded();
        assert_eq!(config.grid.frame_px(), 448);
    }

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.grid.size, 28);
        assert_eq!(config.planner.node_cap, 20_000);
    }

    #[test]
    fn test_bot_toml_can_be_parsed() {
        // This test ensures Bot.toml is valid and can be parsed
        let result = Config::from_file("Bot.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Bot.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_bot_toml_contains_sane_values() {
        let config = Config::from_file("Bot.toml").expect("Bot.toml should be parseable");

        assert!(config.grid.size > 0);
        assert!(config.grid.cell_px > 2, "cells too small to sub-sample");
        assert!(config.sampling.brightness_threshold > 0.0);
        assert!(config.sampling.alpha_threshold > 0.0);
        assert!(config.sampling.offset_lo > 0.0 && config.sampling.offset_lo < 1.0);
        assert!(config.sampling.offset_hi > config.sampling.offset_lo);
        assert!(config.sampling.offset_hi < 1.0);
        assert!(config.reconstruction.brightness_floor < config.sampling.brightness_threshold * 2.0);
        assert!(config.planner.node_cap > 0);
        assert!(config.timing.startup_poll_interval_ms > 0);
        assert!(config.timing.startup_timeout_ms >= config.timing.startup_poll_interval_ms);
        assert!(!config.debug.log_file_path.is_empty());
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Bot.toml").expect("Bot.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.grid.size, hardcoded_config.grid.size);
        assert_eq!(file_config.grid.cell_px, hardcoded_config.grid.cell_px);
        assert_eq!(
            file_config.sampling.brightness_threshold,
            hardcoded_config.sampling.brightness_threshold
        );
        assert_eq!(
            file_config.sampling.alpha_threshold,
            hardcoded_config.sampling.alpha_threshold
        );
        assert_eq!(
            file_config.reconstruction.brightness_floor,
            hardcoded_config.reconstruction.brightness_floor
        );
        assert_eq!(
            file_config.reconstruction.refine_extra_keep,
            hardcoded_config.reconstruction.refine_extra_keep
        );
        assert_eq!(
            file_config.reconstruction.walk_guard_slack,
            hardcoded_config.reconstruction.walk_guard_slack
        );
        assert_eq!(file_config.planner.node_cap, hardcoded_config.planner.node_cap);
        assert_eq!(
            file_config.timing.startup_poll_interval_ms,
            hardcoded_config.timing.startup_poll_interval_ms
        );
        assert_eq!(
            file_config.timing.startup_timeout_ms,
            hardcoded_config.timing.startup_timeout_ms
        );
    }

    #[test]
    fn test_load_or_default_works() {
        // This should succeed with the actual file
        let config = Config::load_or_default();
        assert_eq!(config.grid.size, 28);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
