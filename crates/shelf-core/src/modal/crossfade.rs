//! Content crossfade
//!
//! Holds the book the panel actually shows. While the modal is open a new
//! selection fades the old content out, swaps the record, then fades back
//! in. Timing lives in the state machine's scheduler; this type only
//! tracks the stage.

use crate::models::{Book, BookId};

/// Stage of an in-flight crossfade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeStage {
    /// Content fully visible
    #[default]
    Idle,
    /// Old content fading out, swap pending
    FadingOut,
    /// New content swapped in, waiting to fade in
    Settling,
}

/// Displayed book plus per-book transient flags
#[derive(Debug, Clone, Default)]
pub struct Crossfade {
    displayed: Option<Book>,
    pending: Option<Book>,
    stage: FadeStage,
    cover_failed: bool,
}

impl Crossfade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `book` right away, without fading
    pub fn show(&mut self, book: Book) {
        self.displayed = Some(book);
        self.pending = None;
        self.stage = FadeStage::Idle;
        self.cover_failed = false;
    }

    /// Start fading towards `book`
    ///
    /// Restarts an in-flight fade with the new target. Returns `false` when
    /// `book` is already on screen and nothing is pending.
    pub fn begin(&mut self, book: Book) -> bool {
        let already_shown = self.displayed.as_ref().map(|b| &b.id) == Some(&book.id);
        if already_shown && self.pending.is_none() {
            return false;
        }
        self.pending = Some(book);
        self.stage = FadeStage::FadingOut;
        true
    }

    /// Fade-out finished: swap in the pending book
    pub fn swap(&mut self) -> Option<&BookId> {
        let next = self.pending.take()?;
        self.displayed = Some(next);
        self.cover_failed = false;
        self.stage = FadeStage::Settling;
        self.displayed.as_ref().map(|b| &b.id)
    }

    /// Settle finished: content fades back in
    pub fn finish(&mut self) {
        if self.stage == FadeStage::Settling {
            self.stage = FadeStage::Idle;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn displayed(&self) -> Option<&Book> {
        self.displayed.as_ref()
    }

    pub fn stage(&self) -> FadeStage {
        self.stage
    }

    /// Whether content is currently faded out or about to fade in
    pub fn is_transitioning(&self) -> bool {
        self.stage != FadeStage::Idle
    }

    /// Cover image failed to load; render the placeholder instead
    pub fn mark_cover_failed(&mut self) {
        self.cover_failed = true;
    }

    pub fn cover_failed(&self) -> bool {
        self.cover_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut fade = Crossfade::new();
        fade.show(Book::new("1", "One"));
        fade.mark_cover_failed();

        assert!(fade.begin(Book::new("2", "Two")));
        assert_eq!(fade.stage(), FadeStage::FadingOut);
        assert_eq!(fade.displayed().unwrap().id.as_str(), "1");
        assert!(fade.cover_failed());

        assert_eq!(fade.swap().map(BookId::as_str), Some("2"));
        assert_eq!(fade.stage(), FadeStage::Settling);
        assert!(!fade.cover_failed());

        fade.finish();
        assert!(!fade.is_transitioning());
    }

    #[test]
    fn test_begin_with_displayed_book_is_noop() {
        let mut fade = Crossfade::new();
        fade.show(Book::new("1", "One"));
        assert!(!fade.begin(Book::new("1", "One")));
        assert!(!fade.is_transitioning());
    }

    #[test]
    fn test_restart_keeps_latest_target() {
        let mut fade = Crossfade::new();
        fade.show(Book::new("1", "One"));
        fade.begin(Book::new("2", "Two"));
        fade.begin(Book::new("3", "Three"));

        assert_eq!(fade.swap().map(BookId::as_str), Some("3"));
        assert!(fade.swap().is_none());
    }
}
