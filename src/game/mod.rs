//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Whatever drives it (the terminal front end, a test, a bot) calls `tick()` on its
//! own schedule and feeds direction changes in between.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::GameConfig;
pub use engine::{GameEngine, INITIAL_SNAKE_LENGTH, TickEvent, TickResult};
pub use state::{CollisionType, GamePhase, GameState, Position, Snake};
