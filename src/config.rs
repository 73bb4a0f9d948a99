use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Largest maze, in cells, a config may ask for.
pub const MAX_CELLS: i32 = 1 << 20;

/// Tunables for one game. Every field has a default, so a config file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Maze width in cells.
    pub width: i32,
    /// Maze height in cells.
    pub height: i32,
    /// Side of one cell on screen, in pixels.
    pub cell_size: i32,
    /// How far (per axis, inclusive) a reported position may be from the target and still
    /// count as arrived.
    pub pixels_on_target_leeway: i32,
    /// Bombs granted to each agent per cheese in the goal, rounded down.
    pub ratio_bombs_to_cheese: f64,
    /// Cheese pickups that end the game.
    pub number_of_cheese: u32,
    /// Pixels a sprite travels per axis per tick.
    pub sprite_speed: i32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            cell_size: 40,
            pixels_on_target_leeway: 2,
            ratio_bombs_to_cheese: 0.5,
            number_of_cheese: 10,
            sprite_speed: 8,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&text).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));
        if self.width < 1 || self.height < 1 {
            return invalid(format!(
                "maze must be at least 1x1, got {}x{}",
                self.width, self.height
            ));
        }
        if self
            .width
            .checked_mul(self.height)
            .map_or(true, |cells| cells > MAX_CELLS)
        {
            return invalid(format!(
                "maze may have at most {MAX_CELLS} cells, got {}x{}",
                self.width, self.height
            ));
        }
        if self.cell_size < 1 {
            return invalid(format!("cell_size must be positive, got {}", self.cell_size));
        }
        if self
            .width
            .max(self.height)
            .checked_mul(self.cell_size)
            .is_none()
        {
            return invalid(format!(
                "a {}x{} maze of {} px cells does not fit on screen",
                self.width, self.height, self.cell_size
            ));
        }
        if self.pixels_on_target_leeway < 0 || 2 * self.pixels_on_target_leeway >= self.cell_size
        {
            return invalid(format!(
                "pixels_on_target_leeway must be in 0..{}, got {}",
                (self.cell_size + 1) / 2,
                self.pixels_on_target_leeway
            ));
        }
        if !self.ratio_bombs_to_cheese.is_finite() || self.ratio_bombs_to_cheese < 0.0 {
            return invalid(format!(
                "ratio_bombs_to_cheese must be a non-negative number, got {}",
                self.ratio_bombs_to_cheese
            ));
        }
        if self.number_of_cheese == 0 {
            return invalid("number_of_cheese must be at least 1".to_string());
        }
        if self.sprite_speed < 1 {
            return invalid(format!(
                "sprite_speed must be positive, got {}",
                self.sprite_speed
            ));
        }
        Ok(())
    }

    /// Bombs each agent may plant over the whole game.
    pub fn bomb_allowance(&self) -> u32 {
        (self.number_of_cheese as f64 * self.ratio_bombs_to_cheese).floor() as u32
    }
}
