//! Prev/next navigation over the filtered list

use crate::models::{Book, BookId};

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    /// Signed index offset (-1 or +1)
    pub fn offset(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// Position of the displayed book within the current list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationContext {
    /// Index of the current book, if it is in the list at all
    pub index: Option<usize>,
    pub len: usize,
}

impl NavigationContext {
    /// Locate `current` in `books`
    pub fn resolve(books: &[Book], current: Option<&BookId>) -> Self {
        let index = current.and_then(|id| books.iter().position(|b| &b.id == id));
        Self {
            index,
            len: books.len(),
        }
    }

    pub fn has_prev(&self) -> bool {
        self.target(Direction::Prev).is_some()
    }

    pub fn has_next(&self) -> bool {
        self.target(Direction::Next).is_some()
    }

    /// Index one step in `direction`, or `None` when it falls outside the list
    pub fn target(&self, direction: Direction) -> Option<usize> {
        let index = self.index? as isize + direction.offset();
        (0..self.len as isize)
            .contains(&index)
            .then_some(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Vec<Book> {
        ["a", "b", "c"].iter().map(|id| Book::new(*id, *id)).collect()
    }

    #[test]
    fn test_middle_has_both_neighbours() {
        let ctx = NavigationContext::resolve(&list(), Some(&BookId::new("b")));
        assert_eq!(ctx.index, Some(1));
        assert_eq!(ctx.target(Direction::Prev), Some(0));
        assert_eq!(ctx.target(Direction::Next), Some(2));
    }

    #[test]
    fn test_edges_clamp() {
        let books = list();
        let first = NavigationContext::resolve(&books, Some(&BookId::new("a")));
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = NavigationContext::resolve(&books, Some(&BookId::new("c")));
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert_eq!(last.target(Direction::Next), None);
    }

    #[test]
    fn test_book_filtered_out() {
        let ctx = NavigationContext::resolve(&list(), Some(&BookId::new("z")));
        assert_eq!(ctx.index, None);
        assert!(!ctx.has_prev());
        assert!(!ctx.has_next());
    }
}
