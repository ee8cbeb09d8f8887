//! Filter and pagination over the static catalog.
//!
//! Everything here is a pure function of its inputs. Page counters live with
//! the caller and are passed in on every call.

use std::ops::Range;

use catalog_core::{BookRecord, FilterCriteria};

/// Books matching one set of criteria, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    books: Vec<BookRecord>,
}

impl ResultSet {
    pub fn new(books: Vec<BookRecord>) -> Self {
        Self { books }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    /// Clamped slice; out-of-range bounds yield an empty or shortened slice.
    pub fn slice(&self, range: Range<usize>) -> &[BookRecord] {
        let end = range.end.min(self.books.len());
        let start = range.start.min(end);
        &self.books[start..end]
    }
}

pub fn filter_catalog(catalog: &[BookRecord], criteria: &FilterCriteria) -> ResultSet {
    let query = criteria.title.trim().to_lowercase();
    let books = catalog
        .iter()
        .filter(|book| matches_title(&book.title, &query))
        .filter(|book| criteria.author.matches(&book.author))
        .filter(|book| criteria.genre.matches_any(&book.genres))
        .cloned()
        .collect();
    ResultSet::new(books)
}

/// `query` must already be trimmed and lowercased.
fn matches_title(title: &str, query: &str) -> bool {
    query.is_empty() || title.to_lowercase().contains(query)
}

/// Entries left to reveal after `page_index` pages of `page_size`.
pub fn compute_remaining(result_len: usize, page_index: usize, page_size: usize) -> usize {
    result_len.saturating_sub(page_index.saturating_mul(page_size))
}

/// Everything revealed after `page_index` pages: `[0, page_index * page_size)`.
pub fn revealed_range(result_len: usize, page_index: usize, page_size: usize) -> Range<usize> {
    0..page_index.saturating_mul(page_size).min(result_len)
}

/// Only the entries page `page_index` adds on top of the previous pages.
pub fn page_range(result_len: usize, page_index: usize, page_size: usize) -> Range<usize> {
    if page_index == 0 {
        return 0..0;
    }
    let end = page_index.saturating_mul(page_size).min(result_len);
    let start = (page_index - 1).saturating_mul(page_size).min(end);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{AuthorId, BookId, GenreId, Selection};
    use proptest::prelude::*;

    fn book(id: &str, title: &str, author: &str, genres: &[&str]) -> BookRecord {
        BookRecord {
            id: BookId::new(id),
            title: title.to_string(),
            author: AuthorId::new(author),
            genres: genres.iter().map(|g| GenreId::new(*g)).collect(),
            image: format!("{id}.jpg"),
        }
    }

    fn catalog() -> Vec<BookRecord> {
        vec![
            book("b1", "Moby Dick", "a1", &["g1"]),
            book("b2", "War and Peace", "a2", &["g2"]),
            book("b3", "The War of the Worlds", "a3", &["g1", "g3"]),
            book("b4", "Anna Karenina", "a2", &["g2", "g4"]),
        ]
    }

    fn ids(result: &ResultSet) -> Vec<&str> {
        result.books().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn match_all_returns_catalog_in_order() {
        let result = filter_catalog(&catalog(), &FilterCriteria::default());
        assert_eq!(ids(&result), vec!["b1", "b2", "b3", "b4"]);
    }

    #[test]
    fn title_match_is_case_insensitive_substring() {
        let criteria = FilterCriteria {
            title: "  WAR ".to_string(),
            ..FilterCriteria::default()
        };
        let result = filter_catalog(&catalog(), &criteria);
        assert_eq!(ids(&result), vec!["b2", "b3"]);
    }

    #[test]
    fn author_match_is_exact() {
        let criteria = FilterCriteria {
            author: Selection::Only(AuthorId::new("a2")),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_catalog(&catalog(), &criteria)), vec!["b2", "b4"]);

        let criteria = FilterCriteria {
            author: Selection::Only(AuthorId::new("a")),
            ..FilterCriteria::default()
        };
        assert!(filter_catalog(&catalog(), &criteria).is_empty());
    }

    #[test]
    fn genre_match_checks_membership() {
        let criteria = FilterCriteria {
            genre: Selection::Only(GenreId::new("g1")),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_catalog(&catalog(), &criteria)), vec!["b1", "b3"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let criteria = FilterCriteria {
            title: "war".to_string(),
            author: Selection::Only(AuthorId::new("a2")),
            genre: Selection::Only(GenreId::new("g2")),
        };
        assert_eq!(ids(&filter_catalog(&catalog(), &criteria)), vec!["b2"]);
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        assert_eq!(compute_remaining(5, 1, 2), 3);
        assert_eq!(compute_remaining(5, 2, 2), 1);
        assert_eq!(compute_remaining(5, 3, 2), 0);
        assert_eq!(compute_remaining(5, 0, 2), 5);
        assert_eq!(compute_remaining(0, 1, 36), 0);
        assert_eq!(compute_remaining(5, usize::MAX, 2), 0);
    }

    #[test]
    fn ranges_are_clamped() {
        assert_eq!(revealed_range(5, 1, 2), 0..2);
        assert_eq!(revealed_range(5, 3, 2), 0..5);
        assert_eq!(page_range(5, 2, 2), 2..4);
        assert_eq!(page_range(5, 3, 2), 4..5);
        assert_eq!(page_range(5, 4, 2), 5..5);
        assert_eq!(page_range(5, 0, 2), 0..0);
    }

    #[test]
    fn result_set_slice_clamps() {
        let result = ResultSet::new(catalog());
        assert_eq!(result.slice(2..10).len(), 2);
        assert!(result.slice(7..9).is_empty());
    }

    proptest! {
        #[test]
        fn remaining_is_monotonic(len in 0usize..500, size in 1usize..50, page in 0usize..40) {
            let now = compute_remaining(len, page, size);
            let next = compute_remaining(len, page + 1, size);
            prop_assert!(next <= now);
            if page * size >= len {
                prop_assert_eq!(now, 0);
            } else {
                prop_assert_eq!(now, len - page * size);
            }
        }

        #[test]
        fn match_all_keeps_everything(titles in proptest::collection::vec("[a-zA-Z ]{0,12}", 0..20)) {
            let books: Vec<BookRecord> = titles
                .iter()
                .enumerate()
                .map(|(idx, title)| book(&format!("b{idx}"), title, "a1", &[]))
                .collect();
            let result = filter_catalog(&books, &FilterCriteria::default());
            prop_assert_eq!(result.books(), books.as_slice());
        }

        #[test]
        fn pages_tile_the_revealed_range(len in 0usize..200, size in 1usize..20, page in 1usize..30) {
            let before = revealed_range(len, page - 1, size);
            let added = page_range(len, page, size);
            prop_assert_eq!(before.end, added.start);
            prop_assert_eq!(added.end, revealed_range(len, page, size).end);
        }
    }
}
