//! Random pick without immediate repeats
//!
//! Remembers the last few random picks and excludes them from the next
//! draw. When every book is excluded the history is reset.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::{Book, BookId};

/// Number of recent picks excluded from the next draw
pub const RECENT_CAPACITY: usize = 3;

/// Bounded, duplicate-free history of random picks, most recent first
#[derive(Debug, Clone)]
pub struct RecentSelections {
    order: VecDeque<BookId>,
    members: HashSet<BookId>,
    capacity: usize,
}

impl Default for RecentSelections {
    fn default() -> Self {
        Self::with_capacity(RECENT_CAPACITY)
    }
}

impl RecentSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity + 1),
            members: HashSet::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.members.contains(id)
    }

    /// Record a pick at the front, evicting the oldest beyond capacity
    pub fn record(&mut self, id: BookId) {
        if self.members.contains(&id) {
            self.order.retain(|existing| existing != &id);
        } else {
            self.members.insert(id.clone());
        }
        self.order.push_front(id);

        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_back() {
                self.members.remove(&evicted);
            }
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Ids most recent first
    pub fn iter(&self) -> impl Iterator<Item = &BookId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pick a book uniformly among those not picked recently
    ///
    /// Returns `None` only for an empty list.
    pub fn pick_random<'a, R: Rng + ?Sized>(
        &mut self,
        books: &'a [Book],
        rng: &mut R,
    ) -> Option<&'a Book> {
        if books.is_empty() {
            return None;
        }

        let candidates: Vec<&Book> = books.iter().filter(|b| !self.contains(&b.id)).collect();
        let chosen = match candidates.choose(rng) {
            Some(book) => *book,
            None => {
                debug!("All books picked recently, resetting history");
                self.clear();
                books.choose(rng)?
            }
        };

        self.record(chosen.id.clone());
        Some(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn books(n: usize) -> Vec<Book> {
        (1..=n)
            .map(|i| Book::new(i.to_string(), format!("Book {i}")))
            .collect()
    }

    fn ids(recent: &RecentSelections) -> Vec<&str> {
        recent.iter().map(BookId::as_str).collect()
    }

    #[test]
    fn test_record_truncates_and_dedupes() {
        let mut recent = RecentSelections::new();
        for id in ["1", "2", "3", "4"] {
            recent.record(BookId::new(id));
        }
        assert_eq!(ids(&recent), vec!["4", "3", "2"]);
        assert!(!recent.contains(&BookId::new("1")));

        recent.record(BookId::new("3"));
        assert_eq!(ids(&recent), vec!["3", "4", "2"]);
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn test_empty_list() {
        let mut recent = RecentSelections::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(recent.pick_random(&[], &mut rng).is_none());
        assert!(recent.is_empty());
    }

    #[test]
    fn test_no_repeat_within_last_three_of_five() {
        let list = books(5);
        let mut recent = RecentSelections::new();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut history: Vec<BookId> = Vec::new();
            for _ in 0..10 {
                let pick = recent.pick_random(&list, &mut rng).unwrap().id.clone();
                let window = history.iter().rev().take(3);
                assert!(window.into_iter().all(|prev| prev != &pick));
                history.push(pick);
            }
        }
    }

    #[test]
    fn test_four_books_cycle_through_distinct_picks() {
        let list = books(4);
        let mut recent = RecentSelections::new();
        let mut rng = StdRng::seed_from_u64(42);

        let first: Vec<BookId> = (0..4)
            .map(|_| recent.pick_random(&list, &mut rng).unwrap().id.clone())
            .collect();
        let distinct: HashSet<_> = first.iter().collect();
        assert_eq!(distinct.len(), 4);
        assert_eq!(recent.len(), 3);

        // The one candidate left is the book picked four draws ago
        let fifth = recent.pick_random(&list, &mut rng).unwrap().id.clone();
        assert_eq!(fifth, first[0]);
    }

    #[test]
    fn test_resets_when_every_book_is_recent() {
        let list = books(2);
        let mut recent = RecentSelections::new();
        let mut rng = StdRng::seed_from_u64(7);

        recent.pick_random(&list, &mut rng).unwrap();
        recent.pick_random(&list, &mut rng).unwrap();
        assert_eq!(recent.len(), 2);

        // Both excluded: history resets and the pick is the only entry
        let third = recent.pick_random(&list, &mut rng).unwrap().id.clone();
        assert_eq!(ids(&recent), vec![third.as_str()]);
    }
}
