//! Core domain types for the book catalog.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Form value standing for "no restriction" in the author and genre selects.
pub const ANY: &str = "any";

pub const FORM_TITLE: &str = "title";
pub const FORM_AUTHOR: &str = "author";
pub const FORM_GENRE: &str = "genre";

pub const DEFAULT_PAGE_SIZE: usize = 36;
pub const MAX_PAGE_SIZE: usize = 500;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(BookId);
string_id!(AuthorId);
string_id!(GenreId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: AuthorId,
    #[serde(default)]
    pub genres: Vec<GenreId>,
    #[serde(default)]
    pub image: String,
}

/// Id to display-name table that keeps its entries in source order.
///
/// Select lists are populated in this order, so the table is a `Vec` rather
/// than a hash map. Lookups are linear; tables hold at most a few hundred rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable<K> {
    entries: Vec<(K, String)>,
}

impl<K> Default for LookupTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq> LookupTable<K> {
    pub fn new(entries: Vec<(K, String)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &K) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, name)| name.as_str())
    }

    pub fn contains(&self, id: &K) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.entries.iter().map(|(key, name)| (key, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Serialize> Serialize for LookupTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, name) in &self.entries {
            map.serialize_entry(key, name)?;
        }
        map.end()
    }
}

impl<'de, K: Deserialize<'de>> Deserialize<'de> for LookupTable<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor<K>(std::marker::PhantomData<K>);

        impl<'de, K: Deserialize<'de>> Visitor<'de> for TableVisitor<K> {
            type Value = LookupTable<K>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of id to display name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, name)) = access.next_entry::<K, String>()? {
                    entries.push((key, name));
                }
                Ok(LookupTable { entries })
            }
        }

        deserializer.deserialize_map(TableVisitor(std::marker::PhantomData))
    }
}

/// The static catalog: every book plus the author and genre tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub books: Vec<BookRecord>,
    #[serde(default)]
    pub authors: LookupTable<AuthorId>,
    #[serde(default)]
    pub genres: LookupTable<GenreId>,
}

impl Catalog {
    pub fn author_name(&self, book: &BookRecord) -> Result<&str, DataIntegrityError> {
        self.authors
            .get(&book.author)
            .ok_or_else(|| DataIntegrityError::UnknownAuthor {
                book: book.id.clone(),
                author: book.author.clone(),
            })
    }

    /// Every author or genre reference that does not resolve against the tables.
    pub fn dangling_references(&self) -> Vec<DataIntegrityError> {
        let mut out = Vec::new();
        for book in &self.books {
            if !self.authors.contains(&book.author) {
                out.push(DataIntegrityError::UnknownAuthor {
                    book: book.id.clone(),
                    author: book.author.clone(),
                });
            }
            for genre in &book.genres {
                if !self.genres.contains(genre) {
                    out.push(DataIntegrityError::UnknownGenre {
                        book: book.id.clone(),
                        genre: genre.clone(),
                    });
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("book {book} references unknown author {author}")]
    UnknownAuthor { book: BookId, author: AuthorId },
    #[error("book {book} references unknown genre {genre}")]
    UnknownGenre { book: BookId, genre: GenreId },
}

/// A select value: either unrestricted or pinned to one id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    Any,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::Any => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    /// Membership test for multi-valued fields such as a book's genres.
    pub fn matches_any(&self, values: &[T]) -> bool {
        match self {
            Selection::Any => true,
            Selection::Only(wanted) => values.contains(wanted),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Selection::Any)
    }
}

impl<T: From<String>> Selection<T> {
    /// Missing, blank and `any` values all collapse to [`Selection::Any`].
    pub fn from_form_value(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Selection::Any,
            Some(value) if value.eq_ignore_ascii_case(ANY) => Selection::Any,
            Some(value) => Selection::Only(T::from(value.to_string())),
        }
    }
}

impl<T: AsRef<str>> Selection<T> {
    pub fn form_value(&self) -> &str {
        match self {
            Selection::Any => ANY,
            Selection::Only(id) => id.as_ref(),
        }
    }
}

/// Criteria built from one search-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub title: String,
    pub author: Selection<AuthorId>,
    pub genre: Selection<GenreId>,
}

impl FilterCriteria {
    /// Builds criteria from submitted form fields. Unknown fields are ignored
    /// and absent ones fall back to match-all.
    pub fn from_form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut title = None;
        let mut author = None;
        let mut genre = None;
        for (name, value) in fields {
            let value = value.as_ref().to_string();
            match name.as_ref() {
                FORM_TITLE => title = Some(value),
                FORM_AUTHOR => author = Some(value),
                FORM_GENRE => genre = Some(value),
                _ => {}
            }
        }

        Self {
            title: title.map(|t| t.trim().to_string()).unwrap_or_default(),
            author: Selection::from_form_value(author.as_deref()),
            genre: Selection::from_form_value(genre.as_deref()),
        }
    }

    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            (FORM_TITLE, self.title.clone()),
            (FORM_AUTHOR, self.author.form_value().to_string()),
            (FORM_GENRE, self.genre.form_value().to_string()),
        ]
    }

    pub fn is_match_all(&self) -> bool {
        self.title.trim().is_empty() && self.author.is_any() && self.genre.is_any()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Day,
    Night,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Theme::Day),
            "night" => Ok(Theme::Night),
            _ => Err("unknown theme"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub page_size: usize,
    pub catalog_path: Option<String>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Night,
            page_size: DEFAULT_PAGE_SIZE,
            catalog_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.catalog_path = self
            .catalog_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string);
        self.log_level = self.log_level.trim().to_ascii_lowercase();
        if self.log_level.is_empty() {
            self.log_level = "info".to_string();
        }
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.cycle();
    }
}
