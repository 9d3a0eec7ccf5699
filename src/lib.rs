pub mod best_score;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
