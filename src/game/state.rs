use std::collections::VecDeque;

use super::action::Direction;

/// A cell on the game grid, addressed by column and row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The snake's body, head first and tail last
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Create a straight snake of `length` cells trailing behind `head`
    /// opposite to `facing`
    pub fn new(head: Position, facing: Direction, length: usize) -> Self {
        let back = facing.opposite();
        let mut body = VecDeque::with_capacity(length);
        let mut cell = head;

        for _ in 0..length {
            body.push_back(cell);
            cell = cell.moved_in_direction(back);
        }

        Self { body }
    }

    /// Build a snake from explicit cells, head first
    pub fn from_cells(cells: impl IntoIterator<Item = Position>) -> Self {
        Self {
            body: cells.into_iter().collect(),
        }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// True if any segment, tail included, occupies `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Add a new head; the tail is dropped unless the snake grows
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    pub fn cells(&self) -> impl ExactSizeIterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Never true for a snake built by the engine
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// What the new head ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the board
    Wall,
    /// Snake hit one of its own segments
    SelfCollision,
}

/// Coarse lifecycle stage, derived from the running/over flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    Running,
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Absent only once the snake covers the whole board
    pub food: Option<Position>,
    pub direction: Direction,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    pub is_over: bool,
    pub is_running: bool,
}

impl GameState {
    /// A fresh, not yet started state with no food placed
    pub fn new(snake: Snake, direction: Direction, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            food: None,
            direction,
            grid_width,
            grid_height,
            score: 0,
            is_over: false,
            is_running: false,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_over {
            GamePhase::GameOver
        } else if self.is_running {
            GamePhase::Running
        } else {
            GamePhase::NotStarted
        }
    }
}
