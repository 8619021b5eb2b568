use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{GamePhase, GameState, Position};

/// Each board cell is drawn two columns wide so it comes out roughly square
const CELL: &str = "  ";

const BACKGROUND: Color = Color::Black;
const SNAKE: Color = Color::Green;
const FOOD: Color = Color::Red;
const TEXT: Color = Color::White;
const GAME_OVER: Color = Color::Rgb(255, 215, 0);

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Score
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Controls
            ])
            .split(frame.area());

        frame.render_widget(self.render_score(state), chunks[0]);

        let (board_width, board_height) = board_size(state);
        let board_area = centered(chunks[1], board_width, board_height);
        frame.render_widget(self.render_grid(state, board_area), board_area);

        match state.phase() {
            GamePhase::NotStarted => {
                let area = centered(board_area, 30, 3);
                frame.render_widget(Clear, area);
                frame.render_widget(self.render_start_prompt(), area);
            }
            GamePhase::GameOver => {
                let area = centered(board_area, 30, 5);
                frame.render_widget(Clear, area);
                frame.render_widget(self.render_game_over(state), area);
            }
            GamePhase::Running => {}
        }

        frame.render_widget(self.render_controls(state.phase()), chunks[2]);
    }

    fn render_grid(&self, state: &GameState, area: Rect) -> Paragraph<'_> {
        // Inside the border
        let columns = usize::from(area.width.saturating_sub(2)) / CELL.len();
        let rows = usize::from(area.height.saturating_sub(2));

        Paragraph::new(grid_lines(state, columns, rows)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Plain)
                .border_style(Style::default().fg(TEXT))
                .title(" Snake "),
        )
    }

    fn render_score(&self, state: &GameState) -> Paragraph<'_> {
        let text = Line::from(vec![
            Span::styled("Score: ", Style::default().fg(TEXT)),
            Span::styled(
                state.score.to_string(),
                Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
            ),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_start_prompt(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Press ", Style::default().fg(TEXT)),
            Span::styled(
                "SPACE",
                Style::default().fg(SNAKE).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to start", Style::default().fg(TEXT)),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'_> {
        let text = vec![
            Line::from(Span::styled(
                "GAME OVER!",
                Style::default().fg(GAME_OVER).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(TEXT)),
                Span::styled(
                    state.score.to_string(),
                    Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(GAME_OVER)),
        )
    }

    /// Only the actions the current phase accepts are offered, like the
    /// start/reset buttons being enabled or disabled
    fn render_controls(&self, phase: GamePhase) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);
        let mut spans = vec![Span::styled("↑↓←→", key), Span::raw(" move | ")];

        match phase {
            GamePhase::NotStarted => {
                spans.push(Span::styled("SPACE", key));
                spans.push(Span::raw(" start | "));
            }
            GamePhase::Running | GamePhase::GameOver => {
                spans.push(Span::styled("R", key));
                spans.push(Span::raw(" reset | "));
            }
        }

        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" quit"));

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Outer size of the bordered board, saturating on boards wider than a terminal
fn board_size(state: &GameState) -> (u16, u16) {
    let width = state.grid_width.saturating_mul(CELL.len()).saturating_add(2);
    let height = state.grid_height.saturating_add(2);
    (
        u16::try_from(width).unwrap_or(u16::MAX),
        u16::try_from(height).unwrap_or(u16::MAX),
    )
}

/// Board rows for the top-left `columns` x `rows` cells that fit on screen
fn grid_lines(state: &GameState, columns: usize, rows: usize) -> Vec<Line<'static>> {
    (0..state.grid_height.min(rows))
        .map(|y| {
            let spans: Vec<Span> = (0..state.grid_width.min(columns))
                .map(|x| {
                    let color = cell_color(state, Position::new(x as i32, y as i32));
                    Span::styled(CELL, Style::default().bg(color))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn cell_color(state: &GameState, pos: Position) -> Color {
    if state.snake.occupies(pos) {
        SNAKE
    } else if state.food == Some(pos) {
        FOOD
    } else {
        BACKGROUND
    }
}

/// A `width` x `height` rect centred in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
