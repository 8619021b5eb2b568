use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GamePhase, GameState, Position, Snake},
};
use anyhow::Result;
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IteratorRandom};

/// Number of cells in a freshly reset snake
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Random draws tried before falling back to enumerating free cells
const FOOD_SAMPLE_ATTEMPTS: usize = 64;

/// What happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Nothing happened: the game is not running
    Idle,
    /// The snake moved one cell without eating
    Moved,
    /// The snake ate the food and grew by one cell
    Ate,
    /// The snake collided and the game ended
    GameOver(CollisionType),
}

/// Result of a single tick, for the presentation layer to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    pub event: TickEvent,
    /// Score after the tick
    pub score: u32,
}

impl TickResult {
    pub fn is_game_over(&self) -> bool {
        matches!(self.event, TickEvent::GameOver(_))
    }
}

/// The game engine. Owns the whole game state and advances it one tick at a
/// time; it never schedules itself and performs no I/O.
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
}

impl GameEngine {
    /// Create an engine in the NotStarted phase with a freshly reset board.
    ///
    /// Fails if the configured grid cannot hold the initial snake.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = Self::initial_state(&config);

        let mut engine = Self { config, state, rng };
        engine.reset();
        Ok(engine)
    }

    fn initial_state(config: &GameConfig) -> GameState {
        let head = Position::new(
            (config.grid_width / 2) as i32,
            (config.grid_height / 2) as i32,
        );
        let snake = Snake::new(head, Direction::Right, INITIAL_SNAKE_LENGTH);

        GameState::new(snake, Direction::Right, config.grid_width, config.grid_height)
    }

    /// Return to the NotStarted phase with the canonical starting snake and
    /// fresh food. Callable from any phase.
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.config);
        self.state.food = spawn_food(&self.state, &mut self.rng);
        debug!(
            "Board reset: head at {:?}, food at {:?}",
            self.state.snake.head(),
            self.state.food
        );
    }

    /// Begin ticking. Returns false without changing anything when the game is
    /// already running, or when it is over and has not been reset yet.
    pub fn start(&mut self) -> bool {
        if self.state.is_running || self.state.is_over {
            return false;
        }

        self.state.is_running = true;
        self.state.is_over = false;
        debug!("Game started");
        true
    }

    /// Request a new heading for the next tick.
    ///
    /// Ignored unless the game is running. A reversal onto the current axis is
    /// dropped; otherwise the latest request replaces any earlier one.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.state.is_over || !self.state.is_running {
            return;
        }

        if !self.state.direction.is_opposite(direction) {
            self.state.direction = direction;
        }
    }

    /// Advance the simulation by one step
    pub fn tick(&mut self) -> TickResult {
        if self.state.is_over || !self.state.is_running {
            return self.result(TickEvent::Idle);
        }

        let new_head = self
            .state
            .snake
            .head()
            .moved_in_direction(self.state.direction);

        // Checked against the pre-move body, so the cell the tail is about to
        // leave still counts as occupied.
        if let Some(collision) = self.check_collision(new_head) {
            self.state.is_over = true;
            self.state.is_running = false;
            info!(
                "Game over ({:?}) at {:?} with score {}",
                collision, new_head, self.state.score
            );
            return self.result(TickEvent::GameOver(collision));
        }

        let ate_food = self.state.food == Some(new_head);
        self.state.snake.advance(new_head, ate_food);

        if ate_food {
            self.state.score += 1;
            self.state.food = spawn_food(&self.state, &mut self.rng);
            debug!(
                "Food eaten, score {}, next food at {:?}",
                self.state.score, self.state.food
            );
            return self.result(TickEvent::Ate);
        }

        self.result(TickEvent::Moved)
    }

    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !self.state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if self.state.snake.occupies(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn result(&self, event: TickEvent) -> TickResult {
        TickResult {
            event,
            score: self.state.score,
        }
    }

    /// Read-only view of the whole state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.state.snake
    }

    pub fn food(&self) -> Option<Position> {
        self.state.food
    }

    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }
}

/// Pick a uniformly random cell not covered by the snake, or `None` when the
/// snake fills the board.
fn spawn_food(state: &GameState, rng: &mut StdRng) -> Option<Position> {
    if state.snake.len() >= state.cell_count() {
        return None;
    }

    for _ in 0..FOOD_SAMPLE_ATTEMPTS {
        let pos = Position::new(
            rng.gen_range(0..state.grid_width) as i32,
            rng.gen_range(0..state.grid_height) as i32,
        );
        if !state.snake.occupies(pos) {
            return Some(pos);
        }
    }

    // Crowded board: choose among the free cells directly
    (0..state.grid_height as i32)
        .flat_map(|y| (0..state.grid_width as i32).map(move |x| Position::new(x, y)))
        .filter(|pos| !state.snake.occupies(*pos))
        .choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(width: usize, height: usize) -> GameEngine {
        GameEngine::new(GameConfig::new(width, height).with_seed(42)).unwrap()
    }

    fn cells(engine: &GameEngine) -> Vec<Position> {
        engine.snake().cells().collect()
    }

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    /// Put the engine into a running game with the given body and food
    fn arrange(
        engine: &mut GameEngine,
        body: &[(i32, i32)],
        direction: Direction,
        food: (i32, i32),
    ) {
        engine.state.snake = Snake::from_cells(body.iter().copied().map(Position::from));
        engine.state.direction = direction;
        engine.state.food = Some(food.into());
        engine.start();
    }

    #[test]
    fn test_new_engine_is_reset_and_not_started() {
        let engine = engine(5, 5);

        assert_eq!(engine.phase(), GamePhase::NotStarted);
        assert!(!engine.is_running());
        assert!(!engine.is_over());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.direction(), Direction::Right);
        assert_eq!(cells(&engine), vec![p(2, 2), p(1, 2), p(0, 2)]);

        let food = engine.food().unwrap();
        assert!(!engine.snake().occupies(food));
    }

    #[test]
    fn test_default_board_centre() {
        let engine = GameEngine::new(GameConfig::default()).unwrap();
        assert_eq!(cells(&engine), vec![p(15, 10), p(14, 10), p(13, 10)]);
    }

    #[test]
    fn test_rejects_too_small_grid() {
        assert!(GameEngine::new(GameConfig::new(3, 3)).is_err());
        assert!(GameEngine::new(GameConfig::new(10, 2)).is_err());
    }

    #[test]
    fn test_tick_is_idle_before_start() {
        let mut engine = engine(5, 5);
        let before = engine.state().clone();

        let result = engine.tick();

        assert_eq!(result.event, TickEvent::Idle);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_start_only_from_not_started() {
        let mut engine = engine(5, 5);

        assert!(engine.start());
        assert!(engine.is_running());
        assert!(!engine.start());
        assert!(engine.is_running());
    }

    #[test]
    fn test_moved_scenario() {
        let mut engine = engine(5, 5);
        engine.state.food = Some(p(4, 2));
        engine.start();

        let result = engine.tick();

        assert_eq!(
            result,
            TickResult {
                event: TickEvent::Moved,
                score: 0
            }
        );
        assert_eq!(cells(&engine), vec![p(3, 2), p(2, 2), p(1, 2)]);
        assert_eq!(engine.food(), Some(p(4, 2)));
    }

    #[test]
    fn test_ate_scenario() {
        let mut engine = engine(5, 5);
        engine.state.food = Some(p(3, 2));
        engine.start();

        let result = engine.tick();

        assert_eq!(
            result,
            TickResult {
                event: TickEvent::Ate,
                score: 1
            }
        );
        assert_eq!(engine.score(), 1);
        assert_eq!(cells(&engine), vec![p(3, 2), p(2, 2), p(1, 2), p(0, 2)]);

        let food = engine.food().unwrap();
        assert!(!engine.snake().occupies(food));
        assert!(engine.state().is_in_bounds(food));
    }

    #[test]
    fn test_left_wall_collision_freezes_state() {
        let mut engine = engine(5, 5);
        arrange(&mut engine, &[(0, 2), (1, 2), (2, 2)], Direction::Left, (4, 4));
        let snake_before = engine.snake().clone();

        let result = engine.tick();

        assert_eq!(
            result,
            TickResult {
                event: TickEvent::GameOver(CollisionType::Wall),
                score: 0
            }
        );
        assert!(engine.is_over());
        assert!(!engine.is_running());
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.snake(), &snake_before);
        assert_eq!(engine.food(), Some(p(4, 4)));
    }

    #[test]
    fn test_right_wall_collision() {
        let mut engine = engine(6, 4);
        arrange(&mut engine, &[(5, 1), (4, 1), (3, 1)], Direction::Right, (0, 0));

        assert!(engine.tick().is_game_over());
        assert!(engine.is_over());
    }

    #[test]
    fn test_top_and_bottom_walls() {
        let mut engine = engine(5, 5);
        arrange(&mut engine, &[(2, 0), (2, 1), (2, 2)], Direction::Up, (0, 0));
        assert_eq!(engine.tick().event, TickEvent::GameOver(CollisionType::Wall));

        engine.reset();
        arrange(&mut engine, &[(2, 4), (2, 3), (2, 2)], Direction::Down, (0, 0));
        assert_eq!(engine.tick().event, TickEvent::GameOver(CollisionType::Wall));
    }

    #[test]
    fn test_self_collision_turning_into_body() {
        let mut engine = engine(10, 10);
        arrange(
            &mut engine,
            &[(5, 5), (4, 5), (3, 5), (2, 5), (1, 5)],
            Direction::Right,
            (9, 9),
        );

        engine.set_direction(Direction::Down);
        assert_eq!(engine.tick().event, TickEvent::Moved);
        engine.set_direction(Direction::Left);
        assert_eq!(engine.tick().event, TickEvent::Moved);
        engine.set_direction(Direction::Up);
        let result = engine.tick();

        assert_eq!(result.event, TickEvent::GameOver(CollisionType::SelfCollision));
        assert!(engine.is_over());
        assert_eq!(engine.snake().len(), 5);
    }

    #[test]
    fn test_moving_into_vacating_tail_collides() {
        let mut engine = engine(5, 5);
        // 2x2 loop: head (1,0) came up from (1,1); the tail sits at (0,0)
        arrange(&mut engine, &[(1, 0), (1, 1), (0, 1), (0, 0)], Direction::Up, (4, 4));

        engine.set_direction(Direction::Left);
        let result = engine.tick();

        assert_eq!(result.event, TickEvent::GameOver(CollisionType::SelfCollision));
    }

    #[test]
    fn test_reversal_is_dropped() {
        let mut engine = engine(10, 10);
        engine.start();

        engine.set_direction(Direction::Left);
        assert_eq!(engine.direction(), Direction::Right);

        engine.set_direction(Direction::Right);
        assert_eq!(engine.direction(), Direction::Right);

        engine.set_direction(Direction::Up);
        assert_eq!(engine.direction(), Direction::Up);
    }

    #[test]
    fn test_last_direction_wins_between_ticks() {
        let mut engine = engine(10, 10);
        engine.start();
        let head = engine.snake().head();

        engine.set_direction(Direction::Up);
        engine.set_direction(Direction::Right);
        engine.tick();

        assert_eq!(engine.snake().head(), head.moved_in_direction(Direction::Right));
    }

    #[test]
    fn test_reversal_checked_against_latest_request() {
        let mut engine = engine(10, 10);
        engine.start();
        let head = engine.snake().head();

        // Up then Left is two quarter turns before any tick: the snake heads
        // left into its own neck.
        engine.set_direction(Direction::Up);
        engine.set_direction(Direction::Left);
        assert_eq!(engine.direction(), Direction::Left);

        let result = engine.tick();
        assert_eq!(result.event, TickEvent::GameOver(CollisionType::SelfCollision));
        assert_eq!(engine.snake().head(), head);
    }

    #[test]
    fn test_set_direction_ignored_when_not_running() {
        let mut engine = engine(10, 10);
        engine.set_direction(Direction::Up);
        assert_eq!(engine.direction(), Direction::Right);

        arrange(&mut engine, &[(9, 5), (8, 5), (7, 5)], Direction::Right, (0, 0));
        engine.tick();
        assert!(engine.is_over());

        engine.set_direction(Direction::Up);
        assert_eq!(engine.direction(), Direction::Right);
    }

    #[test]
    fn test_idle_after_game_over() {
        let mut engine = engine(5, 5);
        arrange(&mut engine, &[(4, 2), (3, 2), (2, 2)], Direction::Right, (0, 0));
        engine.tick();
        let frozen = engine.state().clone();

        let result = engine.tick();

        assert_eq!(result.event, TickEvent::Idle);
        assert_eq!(engine.state(), &frozen);
        assert!(!engine.start());
    }

    #[test]
    fn test_reset_rearms_after_game_over() {
        let mut engine = engine(5, 5);
        arrange(&mut engine, &[(4, 2), (3, 2), (2, 2)], Direction::Right, (0, 0));
        engine.state.score = 7;
        engine.tick();

        engine.reset();

        assert_eq!(engine.phase(), GamePhase::NotStarted);
        assert_eq!(engine.score(), 0);
        assert!(engine.start());
        assert_eq!(engine.phase(), GamePhase::Running);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = engine(8, 6);
        engine.start();
        engine.tick();

        engine.reset();
        let first = engine.state().clone();
        engine.reset();
        let second = engine.state().clone();

        assert_eq!(first.snake, second.snake);
        assert_eq!(first.direction, second.direction);
        assert_eq!(first.score, second.score);
        assert_eq!((first.is_over, first.is_running), (false, false));
        assert_eq!((second.is_over, second.is_running), (false, false));
        assert!(second.food.is_some());
    }

    #[test]
    fn test_food_fills_last_free_cell() {
        let mut engine = engine(4, 3);
        // Snake covers everything except (3,2)
        let body = [
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
            (1, 1),
            (2, 1),
            (3, 1),
            (3, 0),
            (2, 0),
            (1, 0),
            (0, 0),
        ];
        engine.state.snake = Snake::from_cells(body.iter().copied().map(Position::from));

        for _ in 0..20 {
            assert_eq!(spawn_food(&engine.state, &mut engine.rng), Some(p(3, 2)));
        }
    }

    #[test]
    fn test_board_full_leaves_no_food() {
        let mut engine = engine(4, 3);
        let body = [
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
            (1, 1),
            (2, 1),
            (3, 1),
            (3, 0),
            (2, 0),
            (1, 0),
            (0, 0),
        ];
        arrange(&mut engine, &body, Direction::Right, (3, 2));

        let result = engine.tick();
        assert_eq!(result.event, TickEvent::Ate);
        assert_eq!(engine.snake().len(), 12);
        assert_eq!(engine.food(), None);

        // Every neighbour of the head is now body or wall
        assert!(engine.tick().is_game_over());
    }

    #[test]
    fn test_same_seed_same_food() {
        let a = GameEngine::new(GameConfig::new(30, 20).with_seed(9)).unwrap();
        let b = GameEngine::new(GameConfig::new(30, 20).with_seed(9)).unwrap();
        assert_eq!(a.food(), b.food());
    }
}
