//! TUI rendering and terminal management (impure shell)
//!
//! A terminal rendition of a long list page: several columns of cards, each
//! column a [`DeferredList`](crate::list::DeferredList) with its own
//! multiplexer scope over a headless root sized to the column.

pub mod board;
pub mod card;
pub mod constants;
mod layout;
mod styles;

pub use board::{Board, BoardConfig};
pub use card::Card;
pub use layout::render_board;
pub use styles::{BoardStyles, ColorConfig};

use crate::config::keybindings::KeyBindings;
use crate::model::{AppError, KeyAction};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    board: Board,
    key_bindings: KeyBindings,
    styles: BoardStyles,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(config: &BoardConfig, styles: BoardStyles) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Self::with_terminal(terminal, config, styles)
    }

    /// Run the main event loop
    ///
    /// Returns when user quits (q, Esc or Ctrl+C). Redraws only on input.
    pub fn run(&mut self) -> Result<(), TuiError> {
        const POLL_INTERVAL: Duration = Duration::from_millis(250);

        self.draw()?;

        loop {
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                    self.draw()?;
                }
                Event::Resize(width, height) => {
                    self.handle_resize(width, height);
                    self.draw()?;
                }
                _ => {}
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Build the board for the terminal's current size.
    pub fn with_terminal(
        terminal: Terminal<B>,
        config: &BoardConfig,
        styles: BoardStyles,
    ) -> Result<Self, TuiError> {
        let size = terminal.size()?;
        let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
        let (board_area, _) = layout::split_frame(area);
        let board = Board::new(config, board_area)?;
        info!(
            columns = config.columns,
            items = config.item_count,
            "board ready"
        );
        Ok(Self {
            terminal,
            board,
            key_bindings: KeyBindings::default(),
            styles,
        })
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Ctrl+C always quits, even if not in bindings
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.key_bindings.get(key) {
            Some(action) => {
                debug!(?action, "key action");
                self.board.apply(action)
            }
            None => false,
        }
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        debug!("Handling resize to {}x{}", width, height);
        let area = ratatui::layout::Rect::new(0, 0, width.max(1), height);
        let (board_area, _) = layout::split_frame(area);
        self.board.resize(board_area);
    }

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let board = &self.board;
        let styles = &self.styles;
        self.terminal.draw(|frame| render_board(frame, board, styles))?;
        Ok(())
    }

    /// The board being shown.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Apply an action directly, bypassing key bindings.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        self.board.apply(action)
    }

    /// The terminal (for inspecting a test backend).
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

/// Initialize and run the TUI application.
///
/// Handles terminal setup, runs the event loop, and ensures cleanup on exit.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run(config: &BoardConfig, styles: BoardStyles) -> Result<(), TuiError> {
    let mut app = match TuiApp::new(config, styles) {
        Ok(app) => app,
        Err(err) => {
            restore_terminal()?;
            return Err(err);
        }
    };

    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
