use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Smallest width that fits a centred head with two segments to its left.
/// Stricter than 3 on purpose: on a 3-wide board the head lands on column 1
/// and the tail would sit on column -1.
pub const MIN_GRID_WIDTH: usize = 4;
/// Smallest height accepted for a board
pub const MIN_GRID_HEIGHT: usize = 3;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Milliseconds between ticks. Advisory: the scheduler driving the engine
    /// reads it, the engine itself never does.
    pub tick_interval_ms: u64,
    /// Seed for food placement; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 20,
            tick_interval_ms: 150,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Same configuration with a fixed food placement seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the board can hold the initial snake
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width >= MIN_GRID_WIDTH,
            "grid width {} is below the minimum of {}",
            self.grid_width,
            MIN_GRID_WIDTH
        );
        ensure!(
            self.grid_height >= MIN_GRID_HEIGHT,
            "grid height {} is below the minimum of {}",
            self.grid_height,
            MIN_GRID_HEIGHT
        );
        ensure!(
            i32::try_from(self.grid_width).is_ok() && i32::try_from(self.grid_height).is_ok(),
            "grid {}x{} is too large",
            self.grid_width,
            self.grid_height
        );
        ensure!(self.tick_interval_ms > 0, "tick interval must be non-zero");
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
