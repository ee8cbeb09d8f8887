//! Test helpers and fixtures.

use catalog_core::{
    AuthorId, BookId, BookRecord, Catalog, GenreId, LookupTable, Settings, Theme,
};

pub fn book(id: &str, title: &str, author: &str, genres: &[&str]) -> BookRecord {
    BookRecord {
        id: BookId::new(id),
        title: title.to_string(),
        author: AuthorId::new(author),
        genres: genres.iter().map(|genre| GenreId::new(*genre)).collect(),
        image: format!("covers/{id}.jpg"),
    }
}

/// Two books, two authors, two genres.
pub fn scenario_catalog() -> Catalog {
    Catalog {
        books: vec![
            book("b1", "Moby Dick", "a1", &["g1"]),
            book("b2", "War and Peace", "a2", &["g2"]),
        ],
        authors: LookupTable::new(vec![
            (AuthorId::new("a1"), "Herman Melville".to_string()),
            (AuthorId::new("a2"), "Leo Tolstoy".to_string()),
        ]),
        genres: LookupTable::new(vec![
            (GenreId::new("g1"), "Adventure".to_string()),
            (GenreId::new("g2"), "Historical".to_string()),
        ]),
    }
}

/// `count` books `n0..`, all by `a1` in `g1`.
pub fn numbered_catalog(count: usize) -> Catalog {
    Catalog {
        books: (0..count)
            .map(|i| book(&format!("n{i}"), &format!("Volume {i}"), "a1", &["g1"]))
            .collect(),
        authors: LookupTable::new(vec![(AuthorId::new("a1"), "Anonymous".to_string())]),
        genres: LookupTable::new(vec![(GenreId::new("g1"), "Reference".to_string())]),
    }
}

pub fn make_settings(page_size: usize) -> Settings {
    Settings {
        theme: Theme::Night,
        page_size,
        catalog_path: None,
        log_level: "info".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use catalog_application::{Browser, DialogControl, DialogId, MountPoints, Preview};
    use catalog_core::{ANY, FORM_AUTHOR, FORM_GENRE, FORM_TITLE, FilterCriteria, Selection};
    use catalog_engine::filter_catalog;

    fn ids(previews: &[Preview]) -> Vec<String> {
        previews.iter().map(|p| p.id.to_string()).collect()
    }

    fn rendered(surface: &MountPoints) -> Vec<String> {
        surface
            .previews
            .as_ref()
            .map(|list| ids(list.items()))
            .unwrap_or_default()
    }

    #[test]
    fn title_query_is_case_insensitive_substring() {
        let catalog = scenario_catalog();
        let criteria = FilterCriteria::from_form([
            (FORM_TITLE, "war"),
            (FORM_AUTHOR, ANY),
            (FORM_GENRE, ANY),
        ]);
        let results = filter_catalog(&catalog.books, &criteria);
        let found: Vec<&str> = results.books().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(found, vec!["b2"]);
    }

    #[test]
    fn load_more_reveals_next_page() {
        let mut browser = Browser::new(Arc::new(numbered_catalog(5)), make_settings(2));
        let mut surface = MountPoints::attached();
        browser.load_initial(&mut surface);

        assert_eq!(browser.remaining(), 3);
        let button = surface.load_more.clone().unwrap();
        assert!(!button.disabled);
        assert!(button.label.contains("(3)"));

        let before = rendered(&surface);
        browser.on_load_more_click(&mut surface).unwrap();
        assert_eq!(browser.pagination().page(), 2);
        assert_eq!(browser.remaining(), 1);

        let after = rendered(&surface);
        assert_eq!(after[..before.len()], before[..]);
        assert_eq!(after[before.len()..], ["n2", "n3"]);
    }

    #[test]
    fn unknown_author_yields_empty_state() {
        let mut browser = Browser::new(Arc::new(scenario_catalog()), make_settings(36));
        let mut surface = MountPoints::attached();
        browser.load_initial(&mut surface);

        browser.submit_search_form(
            [(FORM_TITLE, ""), (FORM_AUTHOR, "a9999"), (FORM_GENRE, ANY)],
            &mut surface,
        );
        assert!(browser.results().is_empty());
        assert!(rendered(&surface).is_empty());
        assert!(surface.empty_message.as_ref().unwrap().visible);
        assert!(surface.load_more.as_ref().unwrap().hidden);
    }

    #[test]
    fn dialog_reopens_after_cancel() {
        let mut browser = Browser::new(Arc::new(scenario_catalog()), make_settings(36));
        let mut surface = MountPoints::attached();
        browser.load_initial(&mut surface);

        browser.open_dialog(DialogId::Search);
        browser.on_dialog_toggle(DialogId::Search);
        assert!(browser.overlays().is_open(DialogId::Search));
        assert!(
            browser
                .overlays()
                .dialog(DialogId::Search)
                .is_interactive(DialogControl::Cancel)
        );

        browser.close_dialog(DialogId::Search);
        assert!(!browser.overlays().is_open(DialogId::Search));

        browser.open_dialog(DialogId::Search);
        let criteria = FilterCriteria {
            author: Selection::Only(AuthorId::new("a1")),
            ..FilterCriteria::default()
        };
        browser.on_search_submit(criteria, &mut surface);
        assert_eq!(rendered(&surface), vec!["b1"]);
        assert!(!browser.overlays().is_open(DialogId::Search));
    }

    #[test]
    fn resubmitting_same_criteria_is_idempotent() {
        let mut browser = Browser::new(Arc::new(numbered_catalog(7)), make_settings(3));
        let mut surface = MountPoints::attached();
        let fields = [(FORM_TITLE, "volume"), (FORM_AUTHOR, ANY), (FORM_GENRE, "g1")];

        browser.submit_search_form(fields, &mut surface);
        let first = surface.clone();
        browser.on_load_more_click(&mut surface);
        browser.submit_search_form(fields, &mut surface);

        assert_eq!(surface, first);
        assert_eq!(browser.pagination().page(), 1);
    }

    #[test]
    fn empty_catalog_renders_nothing() {
        let mut browser = Browser::new(Arc::new(Catalog::default()), make_settings(2));
        let mut surface = MountPoints::attached();
        let report = browser.load_initial(&mut surface);

        assert_eq!(report.rendered, 0);
        assert!(surface.empty_message.as_ref().unwrap().visible);
        assert!(browser.on_load_more_click(&mut surface).is_none());
    }

    #[test]
    fn bundled_catalog_resolves_every_reference() -> anyhow::Result<()> {
        let catalog = catalog_storage::parse_catalog(catalog_storage::BUNDLED_CATALOG)?;
        assert!(catalog.books.len() > 36);
        assert!(catalog.dangling_references().is_empty());

        let mut browser = Browser::new(Arc::new(catalog), Settings::default());
        let mut surface = MountPoints::attached();
        let report = browser.load_initial(&mut surface);
        assert_eq!(report.rendered, 36);
        assert!(report.integrity_errors.is_empty());
        Ok(())
    }
}
