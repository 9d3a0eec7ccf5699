use crate::error::GameError;
use crate::game::MAX_TILE;

pub const DEFAULT_SIZE: usize = 4;
pub const DEFAULT_TARGET: u32 = 2048;
pub const MIN_SIZE: usize = 2;

/// Settings fixed for the lifetime of one game.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    /// Side length of the square grid.
    pub size: usize,
    /// Tile value that wins the game, a power of two from 4 to `MAX_TILE`.
    pub target: u32,
    /// Maximum number of undo snapshots kept. `None` keeps every move.
    pub history_limit: Option<usize>,
}

impl GameConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.size < MIN_SIZE {
            return Err(GameError::InvalidSize { size: self.size });
        }
        if self.target < 4 || self.target > MAX_TILE || !self.target.is_power_of_two() {
            return Err(GameError::InvalidTarget {
                target: self.target,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            target: DEFAULT_TARGET,
            history_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_size() {
        for size in [0, 1] {
            assert!(matches!(
                GameConfig::with_size(size).validate(),
                Err(GameError::InvalidSize { .. })
            ));
        }
        assert!(GameConfig::with_size(2).validate().is_ok());
    }

    #[test]
    fn rejects_target_that_cannot_be_built() {
        for target in [0, 2, 3, 100, 2047, 1 << 31] {
            let config = GameConfig {
                target,
                ..GameConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(GameError::InvalidTarget { .. })
            ));
        }
    }
}
