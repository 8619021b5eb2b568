//! Grid Snake - the classic single-player snake game
//!
//! This library provides:
//! - A pure, tick-driven game engine (game module)
//! - Keyboard mapping (input module)
//! - Terminal rendering with flat coloured cells (render module)
//! - The interactive loop that schedules ticks (modes module)

pub mod game;
pub mod input;
pub mod modes;
pub mod render;
