//! Detail modal lifecycle
//!
//! The modal moves through these phases:
//!
//! ```text
//! idle ──open──▶ lifting ──lift delay──▶ opening ──open delay──▶ open
//!                   │                       │                      │
//!                   └────────close──────────┴─▶ closing-fast       └─close─▶ closing
//!                                                   │                          │
//!                                                   └──────close delay─────────┴──▶ idle
//! ```
//!
//! All timed steps are scheduler entries. Entering a closing phase cancels
//! the pending lift/open entries in the same call, so a stale entry can
//! never move a closing modal back towards `open`. The phase enum is the
//! only "is closing" flag.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::crossfade::Crossfade;
use super::geometry::{locate_origin_scrolled, ElementLocator, OriginPosition, Viewport};
use super::navigation::{Direction, NavigationContext};
use super::recent::RecentSelections;
use super::scheduler::{Clock, Scheduler, SystemClock, TimerToken};
use super::scroll_lock::ScrollLock;
use super::transform::{self, Transform};
use crate::models::{Book, BookId};

/// Lifecycle phase of the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationPhase {
    #[default]
    Idle,
    Lifting,
    Opening,
    Open,
    Closing,
    ClosingFast,
}

impl AnimationPhase {
    /// Still rising towards `open`
    pub fn is_rising(self) -> bool {
        matches!(self, AnimationPhase::Lifting | AnimationPhase::Opening)
    }

    pub fn is_closing(self) -> bool {
        matches!(self, AnimationPhase::Closing | AnimationPhase::ClosingFast)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationPhase::Idle => "idle",
            AnimationPhase::Lifting => "lifting",
            AnimationPhase::Opening => "opening",
            AnimationPhase::Open => "open",
            AnimationPhase::Closing => "closing",
            AnimationPhase::ClosingFast => "closing-fast",
        }
    }
}

impl fmt::Display for AnimationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delays for every timed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalTimings {
    /// `lifting` → `opening`
    pub lift: Duration,
    /// `lifting` → `open`, measured from the start of the lift
    pub open: Duration,
    /// `closing` → `idle`
    pub close: Duration,
    /// `closing-fast` → `idle`
    pub close_fast: Duration,
    /// Crossfade: old content fading out
    pub fade_out: Duration,
    /// Crossfade: pause between swap and fade-in
    pub settle: Duration,
}

impl ModalTimings {
    pub const DESKTOP: ModalTimings = ModalTimings {
        lift: Duration::from_millis(350),
        open: Duration::from_millis(900),
        close: Duration::from_millis(750),
        close_fast: Duration::from_millis(350),
        fade_out: Duration::from_millis(100),
        settle: Duration::from_millis(30),
    };

    /// Narrow viewports skip the 3D book animation
    pub const MOBILE: ModalTimings = ModalTimings {
        lift: Duration::from_millis(50),
        open: Duration::from_millis(200),
        close: Duration::from_millis(200),
        close_fast: Duration::from_millis(200),
        fade_out: Duration::from_millis(100),
        settle: Duration::from_millis(30),
    };

    pub fn for_viewport(viewport: Viewport) -> Self {
        if viewport.is_mobile() {
            Self::MOBILE
        } else {
            Self::DESKTOP
        }
    }

    fn close_delay(&self, interrupting: bool) -> Duration {
        if interrupting {
            self.close_fast
        } else {
            self.close
        }
    }
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq)]
pub enum ModalEvent {
    PhaseChanged {
        from: AnimationPhase,
        to: AnimationPhase,
    },
    /// Crossfade swapped in a new book
    DisplayedBookChanged(BookId),
    /// Close animation finished; fired exactly once per close
    Closed,
}

/// Keys the modal listens to while visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Lift,
    Open,
    Close,
    FadeSwap,
    FadeSettle,
}

#[derive(Debug, Default)]
struct Timers {
    lift: Option<TimerToken>,
    open: Option<TimerToken>,
    close: Option<TimerToken>,
    fade: Option<TimerToken>,
}

/// The shared-element detail modal
///
/// Headless: it owns the phase, the transform and the displayed book, and
/// the caller renders them every frame. Call [`SpatialModal::poll`] from
/// the event loop to run due transitions.
#[derive(Debug)]
pub struct SpatialModal<C: Clock = SystemClock> {
    clock: C,
    scheduler: Scheduler<Task>,
    timers: Timers,
    phase: AnimationPhase,
    viewport: Viewport,
    selected: Option<Book>,
    origin: Option<OriginPosition>,
    transform: Transform,
    content: Crossfade,
    navigation: NavigationContext,
    scroll_lock: ScrollLock,
    events: Vec<ModalEvent>,
}

impl SpatialModal<SystemClock> {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_clock(SystemClock::new(), viewport)
    }
}

impl<C: Clock> SpatialModal<C> {
    pub fn with_clock(clock: C, viewport: Viewport) -> Self {
        Self {
            clock,
            scheduler: Scheduler::new(),
            timers: Timers::default(),
            phase: AnimationPhase::Idle,
            viewport,
            selected: None,
            origin: None,
            transform: Transform::CENTERED,
            content: Crossfade::new(),
            navigation: NavigationContext::default(),
            scroll_lock: ScrollLock::new(),
            events: Vec::new(),
        }
    }

    /// Share an existing scroll lock (e.g. the one the grid checks)
    pub fn with_scroll_lock(mut self, lock: ScrollLock) -> Self {
        self.scroll_lock = lock;
        self
    }

    // -- queries ---------------------------------------------------------

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Anything to draw at all
    pub fn is_visible(&self) -> bool {
        self.phase != AnimationPhase::Idle
    }

    /// Transform for the current origin (or the close-time fallback)
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn origin(&self) -> Option<&OriginPosition> {
        self.origin.as_ref()
    }

    /// Book the modal is about (may still be fading in)
    pub fn selected_book(&self) -> Option<&Book> {
        self.selected.as_ref()
    }

    /// Book whose content is on screen, post-crossfade
    pub fn displayed_book(&self) -> Option<&Book> {
        self.content.displayed()
    }

    pub fn is_transitioning(&self) -> bool {
        self.content.is_transitioning()
    }

    pub fn cover_failed(&self) -> bool {
        self.content.cover_failed()
    }

    /// Presentation layer reports that the cover image didn't load
    pub fn mark_cover_failed(&mut self) {
        self.content.mark_cover_failed();
    }

    pub fn has_prev(&self) -> bool {
        self.navigation.has_prev()
    }

    pub fn has_next(&self) -> bool {
        self.navigation.has_next()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    /// When the next scheduled step is due, for event loops that sleep
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<ModalEvent> {
        std::mem::take(&mut self.events)
    }

    // -- operations ------------------------------------------------------

    /// Recompute prev/next availability against the current list
    pub fn sync_navigation(&mut self, books: &[Book]) {
        self.navigation = NavigationContext::resolve(books, self.selected.as_ref().map(|b| &b.id));
    }

    /// Viewport resized
    ///
    /// Re-derives the transform of a known origin. Phases already scheduled
    /// keep their timings.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.origin.is_some() {
            self.transform = transform::compute(self.origin.as_ref(), viewport);
        }
    }

    /// Start the lift from `origin` (`None` = centered default)
    ///
    /// No-op unless the modal is idle; returns whether it opened.
    pub fn open(&mut self, book: Book, origin: Option<OriginPosition>) -> bool {
        if self.phase != AnimationPhase::Idle {
            debug!("Ignoring open of {} while {}", book.id, self.phase);
            return false;
        }

        let timings = ModalTimings::for_viewport(self.viewport);
        let now = self.clock.now();

        self.transform = transform::compute(origin.as_ref(), self.viewport);
        self.origin = origin;
        self.content.show(book.clone());
        self.selected = Some(book);
        self.scroll_lock.engage();
        self.set_phase(AnimationPhase::Lifting);

        self.timers.lift = Some(self.scheduler.schedule(now, timings.lift, Task::Lift));
        self.timers.open = Some(self.scheduler.schedule(now, timings.open, Task::Open));
        true
    }

    /// Start closing
    ///
    /// No-op while idle or already closing. Interrupting a rising modal
    /// uses the short close. Without a known origin the close aims at the
    /// current book's card, located through `locator`.
    pub fn close(&mut self, locator: &mut dyn ElementLocator) -> bool {
        if self.phase == AnimationPhase::Idle || self.phase.is_closing() {
            return false;
        }

        self.cancel_opening_timers();

        let interrupting = self.phase.is_rising();
        let timings = ModalTimings::for_viewport(self.viewport);

        if self.origin.is_none() {
            let fallback = self
                .selected
                .as_ref()
                .and_then(|book| locate_origin_scrolled(locator, &book.id, self.viewport));
            if fallback.is_none() {
                debug!("No card to close towards, using centered default");
            }
            self.transform = transform::compute(fallback.as_ref(), self.viewport);
        }

        self.set_phase(if interrupting {
            AnimationPhase::ClosingFast
        } else {
            AnimationPhase::Closing
        });

        let now = self.clock.now();
        let delay = timings.close_delay(interrupting);
        self.timers.close = Some(self.scheduler.schedule(now, delay, Task::Close));
        true
    }

    /// Step to the previous/next book of `books`
    ///
    /// Only while fully open. Crossfades the content instead of lifting
    /// again and forgets the click origin.
    pub fn navigate(&mut self, direction: Direction, books: &[Book]) -> bool {
        if self.phase != AnimationPhase::Open {
            return false;
        }

        self.sync_navigation(books);
        let Some(target) = self.navigation.target(direction) else {
            return false;
        };

        let book = books[target].clone();
        debug!("Navigating to {}", book.id);

        self.origin = None;
        self.selected = Some(book.clone());
        self.sync_navigation(books);

        if self.content.begin(book) {
            if let Some(token) = self.timers.fade.take() {
                self.scheduler.cancel(token);
            }
            let now = self.clock.now();
            let fade_out = ModalTimings::for_viewport(self.viewport).fade_out;
            self.timers.fade = Some(self.scheduler.schedule(now, fade_out, Task::FadeSwap));
        }
        true
    }

    /// Pick a random book and lift it from its card
    ///
    /// The card is scrolled into view first; if it still can't be found
    /// the modal opens from the centered default. Does nothing unless idle.
    pub fn open_random<R: Rng + ?Sized>(
        &mut self,
        books: &[Book],
        recent: &mut RecentSelections,
        rng: &mut R,
        locator: &mut dyn ElementLocator,
    ) -> Option<BookId> {
        if self.phase != AnimationPhase::Idle {
            return None;
        }

        let book = recent.pick_random(books, rng)?.clone();
        let origin = locate_origin_scrolled(locator, &book.id, self.viewport);
        let id = book.id.clone();

        self.open(book, origin);
        self.sync_navigation(books);
        Some(id)
    }

    /// Keyboard input; returns whether the key was consumed
    pub fn handle_key(
        &mut self,
        key: ModalKey,
        books: &[Book],
        locator: &mut dyn ElementLocator,
    ) -> bool {
        if !self.is_visible() || self.phase.is_closing() {
            return false;
        }

        match key {
            ModalKey::Escape => self.close(locator),
            ModalKey::ArrowLeft if self.has_prev() => self.navigate(Direction::Prev, books),
            ModalKey::ArrowRight if self.has_next() => self.navigate(Direction::Next, books),
            _ => false,
        }
    }

    /// Click outside the panel; only closes a fully open modal
    pub fn backdrop_click(&mut self, locator: &mut dyn ElementLocator) -> bool {
        self.phase == AnimationPhase::Open && self.close(locator)
    }

    /// Run every step that is due
    pub fn poll(&mut self) {
        let now = self.clock.now();
        while let Some((token, task)) = self.scheduler.pop_due(now) {
            self.run(token, task);
        }
    }

    /// Unmount: drop all pending steps and release the scroll lock
    ///
    /// Does not emit [`ModalEvent::Closed`].
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.timers = Timers::default();
        self.scroll_lock.release();
        self.phase = AnimationPhase::Idle;
        self.reset_content();
    }

    // -- internals -------------------------------------------------------

    fn run(&mut self, token: TimerToken, task: Task) {
        match task {
            Task::Lift => {
                self.clear_timer(token);
                if self.phase == AnimationPhase::Lifting {
                    self.set_phase(AnimationPhase::Opening);
                }
            }
            Task::Open => {
                self.clear_timer(token);
                if self.phase.is_rising() {
                    self.set_phase(AnimationPhase::Open);
                }
            }
            Task::Close => {
                self.timers.close = None;
                self.finish_close();
            }
            Task::FadeSwap => {
                self.timers.fade = None;
                if let Some(id) = self.content.swap().cloned() {
                    self.events.push(ModalEvent::DisplayedBookChanged(id));
                    let now = self.clock.now();
                    let settle = ModalTimings::for_viewport(self.viewport).settle;
                    self.timers.fade = Some(self.scheduler.schedule(now, settle, Task::FadeSettle));
                }
            }
            Task::FadeSettle => {
                self.timers.fade = None;
                self.content.finish();
            }
        }
    }

    fn clear_timer(&mut self, token: TimerToken) {
        if self.timers.lift == Some(token) {
            self.timers.lift = None;
        }
        if self.timers.open == Some(token) {
            self.timers.open = None;
        }
    }

    fn cancel_opening_timers(&mut self) {
        for token in [self.timers.lift.take(), self.timers.open.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(token);
        }
    }

    fn finish_close(&mut self) {
        if let Some(token) = self.timers.fade.take() {
            self.scheduler.cancel(token);
        }
        self.set_phase(AnimationPhase::Idle);
        self.scroll_lock.release();
        self.reset_content();
        self.events.push(ModalEvent::Closed);
    }

    fn reset_content(&mut self) {
        self.selected = None;
        self.origin = None;
        self.transform = Transform::CENTERED;
        self.content.clear();
        self.navigation = NavigationContext::default();
    }

    fn set_phase(&mut self, to: AnimationPhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!("Modal phase {} -> {}", from, to);
        self.phase = to;
        self.events.push(ModalEvent::PhaseChanged { from, to });
    }
}

impl<C: Clock> Drop for SpatialModal<C> {
    fn drop(&mut self) {
        self.scroll_lock.release();
    }
}
