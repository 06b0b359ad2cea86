//! Grid layout
//!
//! Places book cards on a fixed-size grid of terminal cells and answers
//! "where is this card on screen" for the modal. Only cards in the visible
//! rows are rendered, so cards scrolled out of view can't be located until
//! they are scrolled back in.

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use shelf_core::modal::{self, ElementLocator, ElementRect, Viewport};
use shelf_core::BookId;

/// Card width in cells
pub const CARD_WIDTH: u16 = 24;
/// Card height in cells
pub const CARD_HEIGHT: u16 = 10;
/// Rows of the cover region inside a card (below the top border)
pub const COVER_HEIGHT: u16 = 6;

/// Header (title + badges), grid, status bar
pub fn screen_areas(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Card positions for the current list and terminal size
#[derive(Debug, Clone)]
pub struct GridLayout {
    area: Rect,
    cell_width: f64,
    cell_height: f64,
    ids: Vec<BookId>,
    scroll_row: usize,
}

impl GridLayout {
    pub fn new(area: Rect, cell_width: u16, cell_height: u16) -> Self {
        Self {
            area,
            cell_width: f64::from(cell_width.max(1)),
            cell_height: f64::from(cell_height.max(1)),
            ids: Vec::new(),
            scroll_row: 0,
        }
    }

    /// Replace the card list, keeping the scroll position in range
    pub fn set_books(&mut self, ids: Vec<BookId>) {
        self.ids = ids;
        self.scroll_row = self.scroll_row.min(self.max_scroll());
    }

    /// Terminal resized
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        self.scroll_row = self.scroll_row.min(self.max_scroll());
    }

    pub fn columns(&self) -> usize {
        usize::from((self.area.width / CARD_WIDTH).max(1))
    }

    pub fn visible_rows(&self) -> usize {
        usize::from((self.area.height / CARD_HEIGHT).max(1))
    }

    pub fn total_rows(&self) -> usize {
        self.ids.len().div_ceil(self.columns())
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    fn max_scroll(&self) -> usize {
        self.total_rows().saturating_sub(self.visible_rows())
    }

    pub fn index_of(&self, id: &BookId) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Cell rectangle of a rendered card; `None` when scrolled out of view
    pub fn card_cells(&self, index: usize) -> Option<Rect> {
        if index >= self.ids.len() {
            return None;
        }
        let columns = self.columns();
        let row = index / columns;
        let col = index % columns;
        if row < self.scroll_row || row >= self.scroll_row + self.visible_rows() {
            return None;
        }

        let x = self.area.x + col as u16 * CARD_WIDTH;
        let y = self.area.y + (row - self.scroll_row) as u16 * CARD_HEIGHT;
        Some(Rect::new(x, y, CARD_WIDTH, CARD_HEIGHT).intersection(self.area))
    }

    /// Cover region inside a card
    pub fn cover_cells(card: Rect) -> Rect {
        Rect::new(
            card.x + 1,
            card.y + 1,
            card.width.saturating_sub(2),
            COVER_HEIGHT.min(card.height.saturating_sub(2)),
        )
    }

    /// Scroll just enough to show the card at `index`
    pub fn ensure_visible(&mut self, index: usize) {
        let row = index / self.columns();
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + self.visible_rows() {
            self.scroll_row = row + 1 - self.visible_rows();
        }
        self.scroll_row = self.scroll_row.min(self.max_scroll());
    }

    /// Index of the rendered card under a terminal cell
    pub fn card_at(&self, column: u16, row: u16) -> Option<usize> {
        let position = Position::new(column, row);
        if !self.area.contains(position) {
            return None;
        }
        let col = usize::from((column - self.area.x) / CARD_WIDTH);
        if col >= self.columns() {
            return None;
        }
        let row = usize::from((row - self.area.y) / CARD_HEIGHT) + self.scroll_row;
        let index = row * self.columns() + col;
        self.card_cells(index).map(|_| index)
    }

    /// Scroll by whole card rows
    pub fn scroll_by(&mut self, rows: isize) {
        self.scroll_row = self
            .scroll_row
            .saturating_add_signed(rows)
            .min(self.max_scroll());
    }

    /// Convert a cell rectangle to viewport pixels
    pub fn to_pixels(&self, cells: Rect) -> modal::Rect {
        modal::Rect::new(
            f64::from(cells.x) * self.cell_width,
            f64::from(cells.y) * self.cell_height,
            f64::from(cells.width) * self.cell_width,
            f64::from(cells.height) * self.cell_height,
        )
    }

    /// Convert a pixel rectangle back to cells, clamped to `bounds`
    pub fn to_cells(&self, px: modal::Rect, bounds: Rect) -> Rect {
        let x = (px.x / self.cell_width).round().max(0.0) as u16;
        let y = (px.y / self.cell_height).round().max(0.0) as u16;
        let width = (px.width / self.cell_width).round().max(1.0) as u16;
        let height = (px.height / self.cell_height).round().max(1.0) as u16;
        Rect::new(x, y, width, height).intersection(bounds)
    }

    /// Pixel viewport for a terminal of `size` cells
    pub fn viewport_for(&self, size: Rect) -> Viewport {
        Viewport::new(
            f64::from(size.width) * self.cell_width,
            f64::from(size.height) * self.cell_height,
        )
    }
}

impl ElementLocator for GridLayout {
    fn locate(&self, id: &BookId) -> Option<ElementRect> {
        let card = self.card_cells(self.index_of(id)?)?;
        let cover = Self::cover_cells(card);
        Some(ElementRect::new(self.to_pixels(card)).with_cover(self.to_pixels(cover)))
    }

    fn scroll_into_view(&mut self, id: &BookId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let row = index / self.columns();
        self.scroll_row = row
            .saturating_sub(self.visible_rows() / 2)
            .min(self.max_scroll());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(books: usize) -> GridLayout {
        // 3 columns, 2 visible rows
        let mut grid = GridLayout::new(Rect::new(0, 4, 72, 20), 8, 16);
        grid.set_books((1..=books).map(|i| BookId::new(i.to_string())).collect());
        grid
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = layout(10);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.visible_rows(), 2);
        assert_eq!(grid.total_rows(), 4);
    }

    #[test]
    fn test_card_positions() {
        let grid = layout(10);
        assert_eq!(grid.card_cells(0), Some(Rect::new(0, 4, 24, 10)));
        assert_eq!(grid.card_cells(4), Some(Rect::new(24, 14, 24, 10)));
        assert_eq!(grid.card_cells(6), None);
        assert_eq!(grid.card_cells(99), None);
    }

    #[test]
    fn test_locate_in_pixels_with_cover() {
        let grid = layout(10);
        let el = grid.locate(&BookId::new("2")).unwrap();
        assert_eq!(el.bounds, modal::Rect::new(192.0, 64.0, 192.0, 160.0));
        assert_eq!(el.cover, Some(modal::Rect::new(200.0, 80.0, 176.0, 96.0)));
    }

    #[test]
    fn test_offscreen_card_not_located_until_scrolled() {
        let mut grid = layout(12);
        let id = BookId::new("12");
        assert!(grid.locate(&id).is_none());

        grid.scroll_into_view(&id);
        assert_eq!(grid.scroll_row(), 2);
        assert!(grid.locate(&id).is_some());
    }

    #[test]
    fn test_ensure_visible() {
        let mut grid = layout(12);
        grid.ensure_visible(7);
        assert_eq!(grid.scroll_row(), 1);
        grid.ensure_visible(0);
        assert_eq!(grid.scroll_row(), 0);
    }

    #[test]
    fn test_set_books_clamps_scroll() {
        let mut grid = layout(12);
        grid.ensure_visible(11);
        grid.set_books(vec![BookId::new("1")]);
        assert_eq!(grid.scroll_row(), 0);
    }

    #[test]
    fn test_card_at() {
        let mut grid = layout(12);
        assert_eq!(grid.card_at(30, 15), Some(4));
        assert_eq!(grid.card_at(30, 2), None);
        assert_eq!(grid.card_at(80, 5), None);

        grid.scroll_by(1);
        assert_eq!(grid.card_at(0, 4), Some(3));
    }

    #[test]
    fn test_scroll_by_clamps() {
        let mut grid = layout(12);
        grid.scroll_by(10);
        assert_eq!(grid.scroll_row(), 2);
        grid.scroll_by(-5);
        assert_eq!(grid.scroll_row(), 0);
    }

    #[test]
    fn test_pixel_round_trip() {
        let grid = layout(1);
        let bounds = Rect::new(0, 0, 100, 40);
        let cells = Rect::new(3, 5, 10, 4);
        assert_eq!(grid.to_cells(grid.to_pixels(cells), bounds), cells);
    }
}
