//! Geometry capture
//!
//! Turns the on-screen rectangle of a rendered book card into the
//! [`OriginPosition`] a lift animation starts from. Layout lookups go
//! through the [`ElementLocator`] seam so the modal logic stays independent
//! of whatever renders the cards.

use tracing::debug;

use crate::models::BookId;

/// Viewports at or below this width use mobile timings
pub const MOBILE_BREAKPOINT: f64 = 550.0;

/// Axis-aligned rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Visible area in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Narrow viewports switch to the short timing table
    pub fn is_mobile(&self) -> bool {
        self.width <= MOBILE_BREAKPOINT
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Whether `rect` lies fully inside the viewport vertically
    pub fn contains_vertically(&self, rect: &Rect) -> bool {
        rect.y >= 0.0 && rect.bottom() <= self.height
    }
}

/// Bounding boxes of a rendered card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    /// Whole card
    pub bounds: Rect,
    /// Nested cover region, when the card draws one
    pub cover: Option<Rect>,
}

impl ElementRect {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            cover: None,
        }
    }

    pub fn with_cover(mut self, cover: Rect) -> Self {
        self.cover = Some(cover);
        self
    }
}

/// Captured source geometry of a lift animation
///
/// `(x, y)` is the center of the cover region, not of the whole card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub cover_width: f64,
    pub cover_height: f64,
    pub has_cover: bool,
}

/// Layout collaborator that knows where cards are drawn
pub trait ElementLocator {
    /// Current rectangles of the card for `id`, or `None` if it isn't rendered
    fn locate(&self, id: &BookId) -> Option<ElementRect>;

    /// Instantly scroll so the card for `id` is vertically centered
    fn scroll_into_view(&mut self, id: &BookId);
}

/// Build an origin from located rectangles
///
/// Falls back to the whole card when there is no distinct cover region.
/// Degenerate (zero-width) cards yield `None`.
pub fn capture(element: &ElementRect) -> Option<OriginPosition> {
    let bounds = element.bounds;
    if bounds.width <= 0.0 {
        return None;
    }
    let cover = element.cover.unwrap_or(bounds);
    Some(OriginPosition {
        x: cover.center_x(),
        y: cover.center_y(),
        width: bounds.width,
        height: bounds.height,
        cover_width: cover.width,
        cover_height: cover.height,
        has_cover: element.cover.is_some(),
    })
}

/// Read the origin of a card without side effects
pub fn locate_origin(locator: &dyn ElementLocator, id: &BookId) -> Option<OriginPosition> {
    let origin = locator.locate(id).and_then(|el| capture(&el));
    if origin.is_none() {
        debug!("No rendered card for book {}", id);
    }
    origin
}

/// Locate a card, scrolling it into view first if needed
///
/// Off-screen cards may not be rendered at all, so a failed lookup also
/// triggers the scroll before the second read.
pub fn locate_origin_scrolled(
    locator: &mut dyn ElementLocator,
    id: &BookId,
    viewport: Viewport,
) -> Option<OriginPosition> {
    let in_view = locator
        .locate(id)
        .map_or(false, |el| viewport.contains_vertically(&el.bounds));

    if !in_view {
        debug!("Scrolling book {} into view", id);
        locator.scroll_into_view(id);
    }

    locate_origin(locator, id)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fixed-layout locator with a vertical scroll offset
    #[derive(Debug, Default)]
    pub(crate) struct FakeLocator {
        pub cards: HashMap<BookId, ElementRect>,
        pub scroll_y: f64,
        pub viewport_height: f64,
        pub scroll_calls: usize,
        /// Cards that only render once inside the viewport
        pub virtualized: bool,
    }

    impl FakeLocator {
        pub fn new(viewport_height: f64) -> Self {
            Self {
                viewport_height,
                ..Default::default()
            }
        }

        pub fn place(&mut self, id: &str, bounds: Rect) {
            let cover = Rect::new(bounds.x, bounds.y, bounds.width, bounds.height * 0.75);
            self.cards
                .insert(BookId::new(id), ElementRect::new(bounds).with_cover(cover));
        }
    }

    impl ElementLocator for FakeLocator {
        fn locate(&self, id: &BookId) -> Option<ElementRect> {
            let el = self.cards.get(id)?;
            let mut shifted = *el;
            shifted.bounds.y -= self.scroll_y;
            if let Some(cover) = shifted.cover.as_mut() {
                cover.y -= self.scroll_y;
            }
            if self.virtualized
                && (shifted.bounds.bottom() < 0.0 || shifted.bounds.y > self.viewport_height)
            {
                return None;
            }
            Some(shifted)
        }

        fn scroll_into_view(&mut self, id: &BookId) {
            self.scroll_calls += 1;
            if let Some(el) = self.cards.get(id) {
                self.scroll_y = el.bounds.center_y() - self.viewport_height / 2.0;
            }
        }
    }

    #[test]
    fn test_capture_uses_cover_center() {
        let element = ElementRect::new(Rect::new(100.0, 200.0, 160.0, 300.0))
            .with_cover(Rect::new(100.0, 200.0, 160.0, 240.0));
        let origin = capture(&element).unwrap();

        assert_eq!(origin.x, 180.0);
        assert_eq!(origin.y, 320.0);
        assert_eq!(origin.width, 160.0);
        assert_eq!(origin.cover_height, 240.0);
        assert!(origin.has_cover);
    }

    #[test]
    fn test_capture_falls_back_to_bounds() {
        let origin = capture(&ElementRect::new(Rect::new(0.0, 0.0, 100.0, 50.0))).unwrap();
        assert_eq!((origin.x, origin.y), (50.0, 25.0));
        assert_eq!(origin.cover_height, 50.0);
        assert!(!origin.has_cover);
    }

    #[test]
    fn test_capture_rejects_zero_width() {
        assert!(capture(&ElementRect::new(Rect::new(0.0, 0.0, 0.0, 50.0))).is_none());
    }

    #[test]
    fn test_locate_missing_card() {
        let locator = FakeLocator::new(800.0);
        assert!(locate_origin(&locator, &BookId::new("404")).is_none());
    }

    #[test]
    fn test_scrolled_lookup_skips_scroll_when_visible() {
        let mut locator = FakeLocator::new(800.0);
        locator.place("1", Rect::new(0.0, 100.0, 160.0, 240.0));

        let origin = locate_origin_scrolled(&mut locator, &BookId::new("1"), Viewport::new(1200.0, 800.0));
        assert!(origin.is_some());
        assert_eq!(locator.scroll_calls, 0);
    }

    #[test]
    fn test_scrolled_lookup_brings_offscreen_card_into_view() {
        let mut locator = FakeLocator::new(800.0);
        locator.virtualized = true;
        locator.place("9", Rect::new(0.0, 3000.0, 160.0, 240.0));
        let id = BookId::new("9");

        assert!(locate_origin(&locator, &id).is_none());

        let origin = locate_origin_scrolled(&mut locator, &id, Viewport::new(1200.0, 800.0)).unwrap();
        assert_eq!(locator.scroll_calls, 1);
        assert!(origin.y > 0.0 && origin.y < 800.0);
    }
}
