//! Game settings and tuning
//!
//! Loaded from a JSON file; anything missing falls back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay balance knobs the simulation reads every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Horizontal ball speed when hitting the very edge of the paddle
    pub max_deflection: f32,
    /// Fraction of the remaining distance the paddle covers per frame
    pub paddle_smoothing: f32,
    /// Keyboard nudge distance per frame
    pub paddle_speed: f32,
    /// Probability that a layout brick carries a power-up
    pub power_up_chance: f64,
    /// Pause between clearing a level and loading the next
    pub level_complete_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_deflection: MAX_DEFLECTION,
            paddle_smoothing: 0.15,
            paddle_speed: PADDLE_SPEED,
            power_up_chance: POWER_UP_CHANCE,
            level_complete_delay_ms: LEVEL_COMPLETE_DELAY_MS,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed (power-up rolls, brick refills); None picks one from the clock
    pub seed: Option<u64>,

    // === Collaborators ===
    /// Give up on the level provider after this long and use the fallback
    pub layout_timeout_ms: u64,
    /// Give up on remote score submission after this long
    pub submit_timeout_ms: u64,
    /// Directory of `level_<n>.json` layouts; None uses generated levels only
    pub levels_dir: Option<PathBuf>,
    /// Local leaderboard file
    pub leaderboard_path: PathBuf,

    // === Driver ===
    /// Pace frames at the display rate instead of running as fast as possible
    pub realtime: bool,
    /// Stop the headless autopilot after this many frames
    pub max_frames: u64,

    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            layout_timeout_ms: 5_000,
            submit_timeout_ms: 30_000,
            levels_dir: None,
            leaderboard_path: PathBuf::from("leaderboard.json"),
            realtime: false,
            max_frames: 200_000,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, using defaults when it is missing or invalid
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// The configured seed, or one derived from the wall clock
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}
