use std::{
    fs::File,
    io::{stdout, Stdout},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use env_logger::Env;
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use twenty48::best_score::{BestScoreStore, DEFAULT_BEST_SCORE_FILE};
use twenty48::config::{GameConfig, DEFAULT_SIZE, DEFAULT_TARGET, MIN_SIZE};
use twenty48::game::{Game, GameEvent, GameState, RandomTileSource, TileSource};
use twenty48::input::{action_for_key_event, Action, DragTracker};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(author, version, about = "Slide and merge tiles until you reach the target")]
struct Cli {
    /// Side length of the grid
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_SIZE as u16,
        value_parser = clap::value_parser!(u16).range(MIN_SIZE as i64..=MAX_BOARD_SIZE as i64)
    )]
    size: u16,

    /// Tile value that wins the game
    #[arg(long, value_name = "VALUE", default_value_t = DEFAULT_TARGET)]
    target: u32,

    /// Seed for tile spawns (random when omitted)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Maximum number of moves that can be undone (unlimited when omitted)
    #[arg(long, value_name = "N")]
    history_limit: Option<usize>,

    /// File holding the best score
    #[arg(long, value_name = "FILE", default_value = DEFAULT_BEST_SCORE_FILE)]
    best_file: PathBuf,

    /// Write logs to this file (RUST_LOG selects the level)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

// ============================================================================
// Visual Constants
// ============================================================================

/// Largest grid that still fits a typical terminal.
const MAX_BOARD_SIZE: u16 = 16;
const TILE_WIDTH: u16 = 7;
const TILE_HEIGHT: u16 = 3;

// ============================================================================
// Color Mapping
// ============================================================================

fn tile_style(value: u32) -> Style {
    let (bg, fg) = match value {
        0 => (Color::Rgb(205, 193, 180), Color::Rgb(205, 193, 180)),
        2 => (Color::Rgb(238, 228, 218), Color::Rgb(119, 110, 101)),
        4 => (Color::Rgb(237, 224, 200), Color::Rgb(119, 110, 101)),
        8 => (Color::Rgb(242, 177, 121), Color::White),
        16 => (Color::Rgb(245, 149, 99), Color::White),
        32 => (Color::Rgb(246, 124, 95), Color::White),
        64 => (Color::Rgb(246, 94, 59), Color::White),
        128 => (Color::Rgb(237, 207, 114), Color::White),
        256 => (Color::Rgb(237, 204, 97), Color::White),
        512 => (Color::Rgb(237, 200, 80), Color::White),
        1024 => (Color::Rgb(237, 197, 63), Color::White),
        2048 => (Color::Rgb(237, 194, 46), Color::White),
        _ => (Color::Rgb(60, 58, 50), Color::White),
    };
    Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    render_game(frame, game, area);
    match game.state() {
        GameState::Active => {}
        GameState::Won => render_won(frame, game, area),
        GameState::Over => render_game_over(frame, game, area),
    }
}

fn board_dimensions(size: usize) -> (u16, u16) {
    let size = u16::try_from(size).unwrap_or(u16::MAX);
    let width = size.saturating_mul(TILE_WIDTH + 1).saturating_add(1 + 2);
    let height = size
        .saturating_mul(TILE_HEIGHT)
        .saturating_add(size.saturating_sub(1))
        .saturating_add(2);
    (width, height)
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let (board_width, board_height) = board_dimensions(game.size());
    let info_width = 14;
    let total_width = board_width.saturating_add(info_width + 2);
    let total_height = board_height.saturating_add(3);

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(board_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Board][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_board(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←↑↓→/WASD/HJKL or drag: Move | U: Undo | N: New game | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_board(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", game.target()))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = TILE_WIDTH as usize;
    let mut lines: Vec<Line> = Vec::new();

    for (y, row) in game.grid().iter().enumerate() {
        if y > 0 {
            lines.push(Line::from(""));
        }
        for line in 0..TILE_HEIGHT {
            let mut spans: Vec<Span> = Vec::new();
            for &value in row {
                spans.push(Span::raw(" "));
                let text = if line == TILE_HEIGHT / 2 && value != 0 {
                    format!("{:^width$}", value, width = width)
                } else {
                    " ".repeat(width)
                };
                spans.push(Span::styled(text, tile_style(value)));
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.best_score())),
        Line::from(""),
        Line::from(Span::styled("Undo", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.history_len())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, text: Vec<Line>) {
    let height = text.len() as u16 + 2;
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(28, height, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_won(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("You made {}!", game.target()),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(""),
        Line::from(Span::styled(
            "C: keep playing",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "N: new game | U: undo",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "You Win", text);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Best tile: {}", game.max_tile())),
        Line::from(""),
        Line::from(Span::styled(
            "N: new game | U: undo",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, area, "Game Over", text);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // The terminal UI owns stdout and stderr, so logs only go to a file.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn save_best_scores(game: &mut Game, store: &BestScoreStore) {
    for event in game.take_events() {
        if let GameEvent::NewBestScore(score) = event {
            if let Err(err) = store.save(score) {
                warn!("could not save best score to {}: {}", store.path().display(), err);
            }
        }
    }
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &mut Game,
    store: &BestScoreStore,
) -> Result<()> {
    let mut drag = DragTracker::default();

    loop {
        terminal.draw(|frame| render(frame, game))?;

        let action = match event::read()? {
            Event::Key(key) => action_for_key_event(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    drag.press(mouse.column, mouse.row);
                    None
                }
                MouseEventKind::Up(MouseButton::Left) => {
                    drag.release(mouse.column, mouse.row).map(Action::Move)
                }
                _ => None,
            },
            _ => None,
        };

        let Some(action) = action else {
            continue;
        };

        match action {
            Action::Quit => break,
            Action::Move(direction) => {
                game.shift(direction);
            }
            Action::Undo => {
                game.undo();
            }
            Action::Restart => game.restart(),
            Action::KeepPlaying => {
                game.keep_playing();
            }
        }

        save_best_scores(game, store);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = GameConfig {
        size: usize::from(cli.size),
        target: cli.target,
        history_limit: cli.history_limit,
    };
    let tile_source: Box<dyn TileSource> = match cli.seed {
        Some(seed) => Box::new(RandomTileSource::seeded(seed)),
        None => Box::new(RandomTileSource::from_entropy()),
    };
    let store = BestScoreStore::new(cli.best_file);
    let mut game = Game::with_config(config, tile_source)?.with_best_score(store.load_or_default());
    game.take_events();
    info!("starting {0}x{0} game, target {1}", config.size, config.target);

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)?
        .execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game, &store);

    // Restore terminal
    disable_raw_mode()?;
    stdout()
        .execute(DisableMouseCapture)?
        .execute(LeaveAlternateScreen)?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn size_is_bounded() {
        assert!(Cli::try_parse_from(["twenty48", "--size", "1"]).is_err());
        assert!(Cli::try_parse_from(["twenty48", "--size", "17"]).is_err());
        assert!(Cli::try_parse_from(["twenty48", "--size", "70000"]).is_err());

        let cli = Cli::try_parse_from(["twenty48", "--size", "16"]).unwrap();
        assert_eq!(cli.size, 16);
        assert_eq!(Cli::try_parse_from(["twenty48"]).unwrap().size, 4);
    }

    #[test]
    fn board_dimensions_saturate() {
        assert_eq!(board_dimensions(4), (4 * 8 + 3, 4 * 3 + 3 + 2));
        assert_eq!(board_dimensions(usize::MAX), (u16::MAX, u16::MAX));
    }
}
