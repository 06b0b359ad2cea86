//! Shelf TUI
//!
//! Terminal user interface for browsing the book catalog.
//!
//! ## Layout
//!
//! - Top: category and year badges
//! - Middle: grid of book cards
//! - Bottom: status bar
//!
//! Opening a book lifts a detail panel out of its card. The panel grows to
//! the center of the screen, and on close it shrinks back onto a card that is
//! visible at that moment.
//!
//! ## Grid
//!
//! - h/j/k/l or arrows: Move selection
//! - Enter or click: Open the selected book
//! - r: Random book
//! - c/C: Next/previous category
//! - y: Cycle year
//! - s: Cycle sort order
//! - q: Quit
//!
//! ## Detail panel
//!
//! - Esc or click outside: Close
//! - ←/→: Previous/next book in the current list
//! - o: Open the book's first link in the browser

mod app;
mod layout;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use shelf_core::modal::{Clock, ModalKey};
use shelf_core::{Catalog, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;

/// Redraw interval; the modal's phases are polled once per frame
const FRAME: Duration = Duration::from_millis(16);

/// Run the TUI application
pub async fn run(catalog: Catalog, config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if SHELF_LOG is set)
    init_tui_logging(config);
    info!("Starting TUI with {} books", catalog.len());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let size = terminal.size()?;
    let mut app = App::new(catalog, config, Rect::new(0, 0, size.width, size.height));

    // Run app
    let result = run_app(&mut terminal, &mut app).await;
    app.modal.teardown();

    // Restore terminal
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend, C: Clock + Clone>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
) -> Result<()> {
    loop {
        app.tick();
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::time::sleep(FRAME).await;

        // Drain terminal events (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
                    MouseEventKind::ScrollDown => app.scroll(1),
                    MouseEventKind::ScrollUp => app.scroll(-1),
                    _ => {}
                },
                Event::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key<C: Clock + Clone>(app: &mut App<C>, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // If error modal is showing, any key dismisses it
    if app.has_error() {
        app.clear_error();
        return;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.modal.is_visible() {
        handle_modal_mode(app, key.code);
    } else {
        handle_grid_mode(app, key.code);
    }
}

/// Keys while the detail panel is up; everything else is swallowed
fn handle_modal_mode<C: Clock + Clone>(app: &mut App<C>, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.handle_modal_key(ModalKey::Escape);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.handle_modal_key(ModalKey::ArrowLeft);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.handle_modal_key(ModalKey::ArrowRight);
        }
        KeyCode::Char('o') => app.open_link(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

fn handle_grid_mode<C: Clock + Clone>(app: &mut App<C>, code: KeyCode) {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('h' | 'j' | 'k' | 'l')
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
    ) {
        app.status_message = None;
    }

    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(0, 1),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('r') => app.open_random(),
        KeyCode::Char('c') => app.cycle_category(true),
        KeyCode::Char('C') => app.cycle_category(false),
        KeyCode::Char('y') => app.cycle_year(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

/// Initialize file-based logging for TUI mode
///
/// Only logs if SHELF_LOG environment variable is set.
/// Logs are written to config.log_file or {data_dir}/debug.log.
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("shelf_core={},shelf={}", log_level, log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shelf_core::modal::ManualClock;
    use shelf_core::{AnimationPhase, Book};

    fn app() -> (App<ManualClock>, ManualClock) {
        let books = (1..=4)
            .map(|i| Book::new(i.to_string(), format!("Book {}", i)).with_year(2000 + i))
            .collect();
        let clock = ManualClock::new();
        let app = App::with_clock(
            Catalog::from_books(books).unwrap(),
            &Config::default(),
            Rect::new(0, 0, 120, 40),
            clock.clone(),
            StdRng::seed_from_u64(3),
        );
        (app, clock)
    }

    fn press(app: &mut App<ManualClock>, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_grid_keys_ignored_while_modal_visible() {
        let (mut app, _) = app();
        press(&mut app, KeyCode::Enter);
        assert!(app.modal.is_visible());

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.filter.sort, shelf_core::SortOrder::Recent);
    }

    #[test]
    fn test_escape_closes_and_q_quits() {
        let (mut app, clock) = app();
        press(&mut app, KeyCode::Enter);
        clock.advance_ms(900);
        app.tick();

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.modal.phase(), AnimationPhase::Closing);
        clock.advance_ms(750);
        app.tick();

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let (mut app, _) = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Enter);
        assert!(!app.show_help);
        assert!(!app.modal.is_visible());
    }
}
