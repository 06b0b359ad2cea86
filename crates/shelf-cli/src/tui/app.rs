//! Application state and logic

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::{Position, Rect};
use shelf_core::modal::geometry::locate_origin;
use shelf_core::modal::{
    Clock, ModalEvent, ModalKey, ModalTimings, PanelSize, RecentSelections, SystemClock,
    Transform,
};
use shelf_core::{AnimationPhase, Book, BookFilter, Catalog, Config, SpatialModal};
use tracing::{debug, info};

use super::layout::{screen_areas, GridLayout};

/// How long a status message stays in the status bar
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Application state
pub struct App<C: Clock + Clone = SystemClock> {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Help overlay visible
    pub show_help: bool,
    /// Status message to display
    pub status_message: Option<String>,
    status_message_time: Option<Instant>,
    /// Error message shown as an overlay
    pub error_message: Option<String>,

    catalog: Catalog,
    /// Active category/year/sort
    pub filter: BookFilter,
    categories: Vec<String>,
    years: Vec<i32>,
    /// Books matching the filter, in display order
    pub books: Vec<Book>,
    /// Index of the highlighted card
    pub selected: usize,

    pub layout: GridLayout,
    pub modal: SpatialModal<C>,
    recent: RecentSelections,
    rng: StdRng,
    clock: C,
    phase_started: Duration,
    screen: Rect,
    cover_root: PathBuf,
}

impl App<SystemClock> {
    pub fn new(catalog: Catalog, config: &Config, screen: Rect) -> Self {
        Self::with_clock(
            catalog,
            config,
            screen,
            SystemClock::new(),
            StdRng::from_entropy(),
        )
    }
}

impl<C: Clock + Clone> App<C> {
    pub fn with_clock(
        catalog: Catalog,
        config: &Config,
        screen: Rect,
        clock: C,
        rng: StdRng,
    ) -> Self {
        let [_, grid, _] = screen_areas(screen);
        let layout = GridLayout::new(grid, config.cell_width, config.cell_height);
        let viewport = layout.viewport_for(screen);

        let cover_root = config
            .books_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.data_dir.clone());

        let mut app = Self {
            should_quit: false,
            show_help: false,
            status_message: None,
            status_message_time: None,
            error_message: None,
            categories: catalog.categories(),
            years: catalog.years(),
            catalog,
            filter: BookFilter {
                sort: config.default_sort,
                ..BookFilter::default()
            },
            books: Vec::new(),
            selected: 0,
            layout,
            modal: SpatialModal::with_clock(clock.clone(), viewport),
            recent: RecentSelections::new(),
            rng,
            phase_started: clock.now(),
            clock,
            screen,
            cover_root,
        };
        app.apply_filter();
        app
    }

    // -- list ------------------------------------------------------------

    /// Re-run the filter and refresh the grid
    pub fn apply_filter(&mut self) {
        let current = self.current_book().map(|b| b.id.clone());
        self.books = self.catalog.filtered(&self.filter);
        self.layout
            .set_books(self.books.iter().map(|b| b.id.clone()).collect());

        self.selected = current
            .and_then(|id| self.books.iter().position(|b| b.id == id))
            .unwrap_or(0);
        self.modal.sync_navigation(&self.books);
        self.scroll_to_selection();
    }

    /// Cycle All → each category → All
    pub fn cycle_category(&mut self, forward: bool) {
        self.filter.category = cycle(&self.categories, self.filter.category.as_ref(), forward);
        self.apply_filter();
        self.set_status(format!(
            "Category: {}",
            self.filter.category.as_deref().unwrap_or("All")
        ));
    }

    /// Cycle All → each year (newest first) → All
    pub fn cycle_year(&mut self) {
        self.filter.year = cycle(&self.years, self.filter.year.as_ref(), true);
        self.apply_filter();
        let label = self
            .filter
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "All".to_string());
        self.set_status(format!("Year: {}", label));
    }

    pub fn cycle_sort(&mut self) {
        self.filter.sort = self.filter.sort.next();
        self.apply_filter();
        self.set_status(format!("Sort: {}", self.filter.sort.label()));
    }

    /// Per-category counts over the whole catalog
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        self.catalog.category_counts()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    /// Move the highlight; blocked while the background is scroll-locked
    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        if self.modal.scroll_lock().is_engaged() || self.books.is_empty() {
            return;
        }
        let columns = self.layout.columns() as isize;
        let target = self.selected as isize + dx + dy * columns;
        self.selected = target.clamp(0, self.books.len() as isize - 1) as usize;
        self.scroll_to_selection();
    }

    /// Mouse wheel over the grid
    pub fn scroll(&mut self, rows: isize) {
        if !self.modal.scroll_lock().is_engaged() {
            self.layout.scroll_by(rows);
        }
    }

    fn scroll_to_selection(&mut self) {
        if !self.modal.scroll_lock().is_engaged() && !self.books.is_empty() {
            self.layout.ensure_visible(self.selected);
        }
    }

    // -- modal -----------------------------------------------------------

    /// Lift the highlighted card into the detail view
    pub fn open_selected(&mut self) {
        let Some(book) = self.current_book().cloned() else {
            return;
        };
        let origin = locate_origin(&self.layout, &book.id);
        if self.modal.open(book, origin) {
            self.modal.sync_navigation(&self.books);
            self.check_cover();
        }
    }

    /// Open a random book, avoiding the last few picks
    pub fn open_random(&mut self) {
        if self.books.is_empty() {
            self.set_status("No books to pick from");
            return;
        }
        let picked = self.modal.open_random(
            &self.books,
            &mut self.recent,
            &mut self.rng,
            &mut self.layout,
        );
        if let Some(id) = picked {
            info!("Random pick: {}", id);
            if let Some(index) = self.books.iter().position(|b| b.id == id) {
                self.selected = index;
            }
            self.check_cover();
        }
    }

    /// Forward a key to the modal; returns whether it was consumed
    pub fn handle_modal_key(&mut self, key: ModalKey) -> bool {
        self.modal.handle_key(key, &self.books, &mut self.layout)
    }

    /// Mouse click: cards open, clicks outside the panel close
    pub fn click(&mut self, column: u16, row: u16) {
        if self.modal.is_visible() {
            if !self.panel_area().contains(Position::new(column, row)) {
                self.modal.backdrop_click(&mut self.layout);
            }
            return;
        }
        if let Some(index) = self.layout.card_at(column, row) {
            self.selected = index;
            self.open_selected();
        }
    }

    /// Open the displayed book's first external link
    pub fn open_link(&mut self) {
        let Some(book) = self.modal.displayed_book() else {
            return;
        };
        let link = book
            .external_links()
            .into_iter()
            .next()
            .map(|(label, url)| (label, url.to_string()));
        let Some((label, url)) = link else {
            self.set_status("No links for this book");
            return;
        };

        match open::that(&url) {
            Ok(()) => self.set_status(format!("{}: {}", label, url)),
            Err(e) => self.set_error(format!("Failed to open browser: {}", e)),
        }
    }

    /// Close the modal instantly and exit
    pub fn quit(&mut self) {
        self.modal.teardown();
        self.should_quit = true;
    }

    /// Run due modal steps and react to what changed
    pub fn tick(&mut self) {
        self.modal.poll();
        for event in self.modal.drain_events() {
            match event {
                ModalEvent::PhaseChanged { from, to } => {
                    debug!("Modal {} -> {}", from, to);
                    self.phase_started = self.clock.now();
                }
                ModalEvent::DisplayedBookChanged(id) => {
                    if let Some(index) = self.books.iter().position(|b| b.id == id) {
                        self.selected = index;
                    }
                    self.check_cover();
                }
                ModalEvent::Closed => {
                    self.scroll_to_selection();
                }
            }
        }
    }

    /// Local cover files that don't exist fall back to the placeholder
    fn check_cover(&mut self) {
        let Some(cover) = self.modal.displayed_book().and_then(|b| b.cover.as_deref()) else {
            return;
        };
        if cover.starts_with("http://") || cover.starts_with("https://") {
            return;
        }
        let path = self.cover_root.join(cover);
        if !path.exists() {
            debug!("Cover not found: {}", path.display());
            self.modal.mark_cover_failed();
        }
    }

    /// Fraction of the current phase that has elapsed, 0.0..=1.0
    pub fn phase_progress(&self) -> f64 {
        let timings = ModalTimings::for_viewport(self.modal.viewport());
        let duration = match self.modal.phase() {
            AnimationPhase::Lifting => timings.lift,
            AnimationPhase::Opening => timings.open.saturating_sub(timings.lift),
            AnimationPhase::Closing => timings.close,
            AnimationPhase::ClosingFast => timings.close_fast,
            AnimationPhase::Idle | AnimationPhase::Open => return 1.0,
        };
        if duration.is_zero() {
            return 1.0;
        }
        let elapsed = self.clock.now().saturating_sub(self.phase_started);
        (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Panel transform for this frame
    ///
    /// The panel sits on the card while lifting, grows to full size while
    /// opening and shrinks back towards the card while closing.
    pub fn panel_transform(&self) -> Transform {
        let at_card = self.modal.transform();
        let t = self.phase_progress();
        match self.modal.phase() {
            AnimationPhase::Lifting => at_card,
            AnimationPhase::Opening => at_card.lerp(&Transform::IDENTITY, t),
            AnimationPhase::Closing | AnimationPhase::ClosingFast => {
                Transform::IDENTITY.lerp(&at_card, t)
            }
            AnimationPhase::Idle | AnimationPhase::Open => Transform::IDENTITY,
        }
    }

    /// Panel rectangle in terminal cells for this frame
    pub fn panel_area(&self) -> Rect {
        let viewport = self.modal.viewport();
        let panel = PanelSize::for_viewport(viewport).centered_in(viewport);
        self.layout
            .to_cells(self.panel_transform().apply(panel), self.screen)
    }

    /// Terminal resized
    pub fn resize(&mut self, screen: Rect) {
        self.screen = screen;
        let [_, grid, _] = screen_areas(screen);
        self.layout.set_area(grid);
        self.modal.set_viewport(self.layout.viewport_for(screen));
        self.scroll_to_selection();
    }

    // -- status ----------------------------------------------------------

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Step through `None → items[0] → … → items[n-1] → None`
fn cycle<T: Clone + PartialEq>(items: &[T], current: Option<&T>, forward: bool) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let position = current.and_then(|c| items.iter().position(|i| i == c));
    let next = match (position, forward) {
        (None, true) => Some(0),
        (None, false) => Some(items.len() - 1),
        (Some(i), true) => (i + 1 < items.len()).then_some(i + 1),
        (Some(i), false) => i.checked_sub(1),
    };
    next.map(|i| items[i].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::modal::{ManualClock, Viewport};

    fn catalog(count: usize) -> Catalog {
        let books = (1..=count)
            .map(|i| {
                Book::new(i.to_string(), format!("Book {}", i))
                    .with_category(if i % 2 == 0 { "Even" } else { "Odd" })
                    .with_year(2000 + i as i32)
            })
            .collect();
        Catalog::from_books(books).unwrap()
    }

    fn app(count: usize) -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let config = Config::default();
        // 120x40 cells at 8x16 px: desktop viewport, 5 columns x 3 rows of cards
        let app = App::with_clock(
            catalog(count),
            &config,
            Rect::new(0, 0, 120, 40),
            clock.clone(),
            StdRng::seed_from_u64(7),
        );
        (app, clock)
    }

    #[test]
    fn test_cycle() {
        let items = vec!["a", "b"];
        assert_eq!(cycle(&items, None, true), Some("a"));
        assert_eq!(cycle(&items, Some(&"a"), true), Some("b"));
        assert_eq!(cycle(&items, Some(&"b"), true), None);
        assert_eq!(cycle(&items, None, false), Some("b"));
        assert_eq!(cycle(&items, Some(&"a"), false), None);
        assert_eq!(cycle::<&str>(&[], None, true), None);
    }

    #[test]
    fn test_viewport_from_cells() {
        let (app, _) = app(3);
        assert_eq!(app.modal.viewport(), Viewport::new(960.0, 640.0));
    }

    #[test]
    fn test_default_sort_is_recent() {
        let (app, _) = app(3);
        let ids: Vec<_> = app.books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["3", "2", "1"]);
    }

    #[test]
    fn test_category_filter_keeps_selection() {
        let (mut app, _) = app(6);
        app.selected = app.books.iter().position(|b| b.id.as_str() == "4").unwrap();

        app.cycle_category(true);
        assert_eq!(app.filter.category.as_deref(), Some("Even"));
        assert_eq!(app.books.len(), 3);
        assert_eq!(app.current_book().unwrap().id.as_str(), "4");
    }

    #[test]
    fn test_open_lifts_from_card() {
        let (mut app, clock) = app(6);
        app.open_selected();

        assert_eq!(app.modal.phase(), AnimationPhase::Lifting);
        assert!(app.modal.origin().is_some());
        assert_ne!(app.panel_transform(), Transform::IDENTITY);

        clock.advance_ms(900);
        app.tick();
        assert_eq!(app.modal.phase(), AnimationPhase::Open);
        assert_eq!(app.panel_transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_selection_locked_while_open() {
        let (mut app, _) = app(6);
        app.open_selected();
        app.move_selection(1, 0);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_navigation_moves_grid_selection() {
        let (mut app, clock) = app(6);
        app.open_selected();
        clock.advance_ms(900);
        app.tick();

        assert!(app.handle_modal_key(ModalKey::ArrowRight));
        clock.advance_ms(100);
        app.tick();
        assert_eq!(app.selected, 1);
        assert_eq!(app.modal.displayed_book().unwrap().id, app.books[1].id);
    }

    #[test]
    fn test_close_releases_lock_and_goes_idle() {
        let (mut app, clock) = app(6);
        app.open_selected();
        clock.advance_ms(900);
        app.tick();

        assert!(app.handle_modal_key(ModalKey::Escape));
        clock.advance_ms(750);
        app.tick();
        assert_eq!(app.modal.phase(), AnimationPhase::Idle);
        assert!(!app.modal.scroll_lock().is_engaged());
    }

    #[test]
    fn test_progress_through_opening() {
        let (mut app, clock) = app(6);
        app.open_selected();
        clock.advance_ms(350);
        app.tick();
        assert_eq!(app.modal.phase(), AnimationPhase::Opening);
        assert_eq!(app.phase_progress(), 0.0);

        clock.advance_ms(275);
        assert!((app.phase_progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_random_selects_picked_card() {
        let (mut app, _) = app(6);
        app.open_random();
        let shown = app.modal.displayed_book().unwrap().id.clone();
        assert_eq!(app.books[app.selected].id, shown);
        assert!(app.modal.origin().is_some());
    }

    #[test]
    fn test_random_on_empty_list() {
        let (mut app, _) = app(0);
        app.open_random();
        assert_eq!(app.modal.phase(), AnimationPhase::Idle);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_missing_local_cover_uses_placeholder() {
        let mut book = Book::new("1", "One");
        book.cover = Some("no/such/cover.jpg".to_string());
        let clock = ManualClock::new();
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut app = App::with_clock(
            Catalog::from_books(vec![book]).unwrap(),
            &config,
            Rect::new(0, 0, 120, 40),
            clock,
            StdRng::seed_from_u64(1),
        );

        app.open_selected();
        assert!(app.modal.cover_failed());
    }

    #[test]
    fn test_backdrop_click_closes_open_modal() {
        let (mut app, clock) = app(6);
        app.open_selected();
        clock.advance_ms(900);
        app.tick();

        let panel = app.panel_area();
        app.click(panel.x + 1, panel.y + 1);
        assert_eq!(app.modal.phase(), AnimationPhase::Open);

        app.click(0, 0);
        assert_eq!(app.modal.phase(), AnimationPhase::Closing);
    }

    #[test]
    fn test_quit_tears_down() {
        let (mut app, _) = app(6);
        app.open_selected();
        app.quit();
        assert!(app.should_quit);
        assert_eq!(app.modal.phase(), AnimationPhase::Idle);
        assert!(!app.modal.scroll_lock().is_engaged());
    }
}
