use std::collections::VecDeque;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::error::GameError;

// ============================================================================
// Configuration
// ============================================================================

/// Chance that a spawned tile is a 4 rather than a 2.
pub const FOUR_PROBABILITY: f64 = 0.1;
pub const INITIAL_TILES: usize = 2;
/// Largest tile value. Two tiles of this value do not merge, which keeps
/// every cell inside `u32`.
pub const MAX_TILE: u32 = 1 << 30;

// ============================================================================
// Types
// ============================================================================

/// Row-major square matrix of tile values, 0 meaning empty.
pub type Grid = Vec<Vec<u32>>;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Active,
    Won,
    Over,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Moved { direction: Direction, score_gain: u64 },
    TileSpawned { row: usize, col: usize, value: u32 },
    Won,
    GameOver,
    Undone,
    Restarted,
    NewBestScore(u64),
}

/// Result of collapsing a single row towards its start.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CollapsedRow {
    pub row: Vec<u32>,
    pub score_gain: u64,
    pub changed: bool,
}

/// Result of sliding a whole grid in one direction, before any tile spawns.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Slide {
    pub grid: Grid,
    pub score_gain: u64,
    pub moved: bool,
}

// ============================================================================
// Grid Transformations
// ============================================================================

/// Compacts `row` to the left and merges each adjacent equal pair at most once.
///
/// Merges are resolved left to right over the compacted values, so `[2, 2, 2, 2]`
/// becomes `[4, 4, 0, 0]` and a freshly merged tile never merges again in the
/// same move.
///
/// # Panics
///
/// Panics if `row` does not hold exactly `size` cells.
pub fn collapse_row_left(row: &[u32], size: usize) -> CollapsedRow {
    assert_eq!(
        row.len(),
        size,
        "row has {} cells but the grid is {} wide",
        row.len(),
        size
    );

    let compacted: Vec<u32> = row.iter().copied().filter(|&value| value != 0).collect();
    let mut collapsed = Vec::with_capacity(size);
    let mut score_gain = 0;

    let mut i = 0;
    while i < compacted.len() {
        let value = compacted[i];
        if compacted.get(i + 1).map_or(false, |&next| mergeable(value, next)) {
            collapsed.push(value * 2);
            score_gain += u64::from(value) * 2;
            i += 2;
        } else {
            collapsed.push(value);
            i += 1;
        }
    }
    collapsed.resize(size, 0);

    let changed = collapsed.as_slice() != row;
    CollapsedRow {
        row: collapsed,
        score_gain,
        changed,
    }
}

fn mergeable(a: u32, b: u32) -> bool {
    a == b && a < MAX_TILE
}

/// Swaps rows and columns: `output[i][j] == grid[j][i]`.
pub fn transpose(grid: &Grid) -> Grid {
    let width = grid.first().map_or(0, Vec::len);
    (0..width)
        .map(|col| grid.iter().map(|row| row[col]).collect())
        .collect()
}

fn reverse_rows(grid: &Grid) -> Grid {
    grid.iter()
        .map(|row| row.iter().rev().copied().collect())
        .collect()
}

fn slide_left(grid: &Grid) -> Slide {
    let size = grid.len();
    let mut score_gain = 0;
    let mut moved = false;

    let rows = grid
        .iter()
        .map(|row| {
            let collapsed = collapse_row_left(row, size);
            score_gain += collapsed.score_gain;
            moved |= collapsed.changed;
            collapsed.row
        })
        .collect();

    Slide {
        grid: rows,
        score_gain,
        moved,
    }
}

/// Slides `grid` in `direction`.
///
/// Only the left collapse is implemented directly; the other directions
/// reverse and/or transpose into it and back again.
pub fn slide(grid: &Grid, direction: Direction) -> Slide {
    match direction {
        Direction::Left => slide_left(grid),
        Direction::Right => {
            let mut slid = slide_left(&reverse_rows(grid));
            slid.grid = reverse_rows(&slid.grid);
            slid
        }
        Direction::Up => {
            let mut slid = slide(&transpose(grid), Direction::Left);
            slid.grid = transpose(&slid.grid);
            slid
        }
        Direction::Down => {
            let mut slid = slide(&transpose(grid), Direction::Right);
            slid.grid = transpose(&slid.grid);
            slid
        }
    }
}

pub fn contains_tile(grid: &Grid, value: u32) -> bool {
    grid.iter().flatten().any(|&cell| cell == value)
}

/// True when the grid is full and no two orthogonal neighbours can merge.
pub fn is_game_over(grid: &Grid) -> bool {
    if grid.iter().flatten().any(|&cell| cell == 0) {
        return false;
    }

    for (y, row) in grid.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if row.get(x + 1).map_or(false, |&right| mergeable(value, right)) {
                return false;
            }
            if grid.get(y + 1).map_or(false, |below| mergeable(value, below[x])) {
                return false;
            }
        }
    }
    true
}

pub fn empty_grid(size: usize) -> Grid {
    vec![vec![0; size]; size]
}

fn validate_grid(grid: &Grid, size: usize) -> Result<(), GameError> {
    if grid.len() != size {
        return Err(GameError::InvalidGrid {
            reason: format!("expected {} rows, got {}", size, grid.len()),
        });
    }
    for (y, row) in grid.iter().enumerate() {
        if row.len() != size {
            return Err(GameError::InvalidGrid {
                reason: format!("row {} has {} cells, expected {}", y, row.len(), size),
            });
        }
        if let Some(&bad) = row.iter().find(|&&cell| cell != 0 && !cell.is_power_of_two()) {
            return Err(GameError::InvalidGrid {
                reason: format!("row {} holds {}, which is not a power of two", y, bad),
            });
        }
        if let Some(&big) = row.iter().find(|&&cell| cell > MAX_TILE) {
            return Err(GameError::InvalidGrid {
                reason: format!("row {} holds {}, above the largest tile {}", y, big, MAX_TILE),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Tile Source Trait
// ============================================================================

/// Where a new tile goes and what it is worth.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileChoice {
    /// Position within the empty cells, counted in row-major order.
    pub index: usize,
    pub value: u32,
}

impl TileChoice {
    pub fn new(index: usize, value: u32) -> Self {
        Self { index, value }
    }
}

/// Supplies tile spawns. `empty_cells` is always at least 1 and the returned
/// index must be below it.
pub trait TileSource {
    fn next_tile(&mut self, empty_cells: usize) -> TileChoice;
}

pub struct RandomTileSource {
    rng: StdRng,
}

impl RandomTileSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl TileSource for RandomTileSource {
    fn next_tile(&mut self, empty_cells: usize) -> TileChoice {
        let index = self.rng.gen_range(0..empty_cells);
        let value = if self.rng.gen_bool(FOUR_PROBABILITY) { 4 } else { 2 };
        TileChoice { index, value }
    }
}

/// Replays a fixed list of choices, cycling when exhausted.
pub struct SequenceTileSource {
    choices: Vec<TileChoice>,
    index: usize,
}

impl SequenceTileSource {
    /// # Panics
    ///
    /// Panics if `choices` is empty.
    pub fn new(choices: Vec<TileChoice>) -> Self {
        assert!(!choices.is_empty(), "a tile sequence needs at least one choice");
        Self { choices, index: 0 }
    }

    /// Always places a 2 in the first empty cell.
    pub fn first_empty_two() -> Self {
        Self::new(vec![TileChoice::new(0, 2)])
    }
}

impl TileSource for SequenceTileSource {
    fn next_tile(&mut self, empty_cells: usize) -> TileChoice {
        let choice = self.choices[self.index % self.choices.len()];
        self.index += 1;
        TileChoice {
            index: choice.index % empty_cells,
            value: choice.value,
        }
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    grid: Grid,
    score: u64,
    best_score: u64,
    state: GameState,
    config: GameConfig,
    history: VecDeque<Grid>,
    playing_past_target: bool,
    tile_source: Box<dyn TileSource>,
    events: Vec<GameEvent>,
}

// ============================================================================
// Game Logic
// ============================================================================

impl Game {
    pub fn new() -> Self {
        Self::build(
            GameConfig::default(),
            Box::new(RandomTileSource::from_entropy()),
        )
    }

    pub fn with_config(
        config: GameConfig,
        tile_source: Box<dyn TileSource>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::build(config, tile_source))
    }

    /// Starts from a prepared grid without spawning any tiles.
    pub fn with_grid(
        config: GameConfig,
        grid: Grid,
        tile_source: Box<dyn TileSource>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        validate_grid(&grid, config.size)?;

        let mut game = Self {
            grid,
            score: 0,
            best_score: 0,
            state: GameState::Active,
            config,
            history: VecDeque::new(),
            playing_past_target: false,
            tile_source,
            events: Vec::new(),
        };
        game.state = game.evaluate_state();
        Ok(game)
    }

    fn build(config: GameConfig, tile_source: Box<dyn TileSource>) -> Self {
        let mut game = Self {
            grid: empty_grid(config.size),
            score: 0,
            best_score: 0,
            state: GameState::Active,
            config,
            history: VecDeque::new(),
            playing_past_target: false,
            tile_source,
            events: Vec::new(),
        };
        game.spawn_initial_tiles();
        game
    }

    /// Seeds the best score loaded from storage.
    pub fn with_best_score(mut self, best_score: u64) -> Self {
        self.best_score = best_score;
        self
    }

    /// Starts over on a grid of a different size.
    pub fn initialize(&mut self, size: usize) -> Result<(), GameError> {
        let config = GameConfig {
            size,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        self.restart();
        Ok(())
    }

    pub fn restart(&mut self) {
        self.grid = empty_grid(self.config.size);
        self.score = 0;
        self.history.clear();
        self.playing_past_target = false;
        self.state = GameState::Active;
        self.events.clear();
        self.events.push(GameEvent::Restarted);
        self.spawn_initial_tiles();
        info!("new {0}x{0} game started", self.config.size);
    }

    fn spawn_initial_tiles(&mut self) {
        for _ in 0..INITIAL_TILES {
            self.spawn_random_tile();
        }
    }

    /// Places a new tile on a random empty cell. Returns its position, or
    /// `None` when the grid is full.
    pub fn spawn_random_tile(&mut self) -> Option<(usize, usize)> {
        let empty_cells: Vec<(usize, usize)> = self
            .grid
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| **cell == 0)
                    .map(move |(x, _)| (y, x))
            })
            .collect();

        if empty_cells.is_empty() {
            return None;
        }

        let choice = self.tile_source.next_tile(empty_cells.len());
        let (row, col) = empty_cells[choice.index];
        self.grid[row][col] = choice.value;
        trace!("spawned {} at ({}, {})", choice.value, row, col);
        self.events.push(GameEvent::TileSpawned {
            row,
            col,
            value: choice.value,
        });
        Some((row, col))
    }

    /// Slides the grid. Returns `false`, leaving everything untouched, when
    /// nothing would move or the game is no longer active.
    pub fn shift(&mut self, direction: Direction) -> bool {
        if self.state != GameState::Active {
            return false;
        }

        let slid = slide(&self.grid, direction);
        if !slid.moved {
            return false;
        }

        let previous = std::mem::replace(&mut self.grid, slid.grid);
        self.push_history(previous);
        self.score += slid.score_gain;
        debug!(
            "moved {:?}: +{} (score {})",
            direction, slid.score_gain, self.score
        );
        self.events.push(GameEvent::Moved {
            direction,
            score_gain: slid.score_gain,
        });

        self.spawn_random_tile();
        self.record_best_score();
        self.settle_state();
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(Direction::Right)
    }

    pub fn move_up(&mut self) -> bool {
        self.shift(Direction::Up)
    }

    pub fn move_down(&mut self) -> bool {
        self.shift(Direction::Down)
    }

    fn push_history(&mut self, snapshot: Grid) {
        if self.config.history_limit == Some(0) {
            return;
        }
        self.history.push_back(snapshot);
        if let Some(limit) = self.config.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Restores the grid from before the last move.
    ///
    /// The score is recomputed as the sum of the restored tiles rather than
    /// the score held at that point, so it usually differs from the score the
    /// player had before the move.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop_back() else {
            return false;
        };

        self.grid = snapshot;
        self.score = self.tile_sum();
        self.state = self.evaluate_state();
        debug!("undo: score recomputed as {}", self.score);
        self.events.push(GameEvent::Undone);
        self.record_best_score();
        true
    }

    /// Lets a won game continue. The target no longer ends the game until
    /// the next restart.
    pub fn keep_playing(&mut self) -> bool {
        if self.state != GameState::Won {
            return false;
        }
        self.playing_past_target = true;
        self.state = GameState::Active;
        self.settle_state();
        true
    }

    fn record_best_score(&mut self) {
        if self.score > self.best_score {
            self.best_score = self.score;
            info!("new best score {}", self.score);
            self.events.push(GameEvent::NewBestScore(self.score));
        }
    }

    fn evaluate_state(&self) -> GameState {
        if !self.playing_past_target && self.check_win() {
            GameState::Won
        } else if self.check_game_over() {
            GameState::Over
        } else {
            GameState::Active
        }
    }

    fn settle_state(&mut self) {
        self.state = self.evaluate_state();
        match self.state {
            GameState::Won => {
                info!("reached {} with score {}", self.config.target, self.score);
                self.events.push(GameEvent::Won);
            }
            GameState::Over => {
                info!("no moves left, final score {}", self.score);
                self.events.push(GameEvent::GameOver);
            }
            GameState::Active => {}
        }
    }

    pub fn check_win(&self) -> bool {
        contains_tile(&self.grid, self.config.target)
    }

    pub fn check_game_over(&self) -> bool {
        is_game_over(&self.grid)
    }

    pub fn can_move(&self) -> bool {
        Direction::ALL
            .iter()
            .any(|&direction| slide(&self.grid, direction).moved)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn size(&self) -> usize {
        self.config.size
    }

    pub fn target(&self) -> u32 {
        self.config.target
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn max_tile(&self) -> u32 {
        self.grid.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn tile_sum(&self) -> u64 {
        self.grid.iter().flatten().map(|&cell| u64::from(cell)).sum()
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn grid_from<const N: usize>(rows: [[u32; N]; N]) -> Grid {
        rows.iter().map(|row| row.to_vec()).collect()
    }

    /// Full grid of alternating 2s and 4s: no empty cell and no merge.
    pub fn checkerboard(size: usize) -> Grid {
        (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| if (x + y) % 2 == 0 { 2 } else { 4 })
                    .collect()
            })
            .collect()
    }

    pub fn game_with_grid(grid: Grid) -> Game {
        let config = GameConfig::with_size(grid.len());
        Game::with_grid(config, grid, Box::new(SequenceTileSource::first_empty_two()))
            .expect("test grid should be valid")
    }
}
