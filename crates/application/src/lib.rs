//! View synchronization for the catalog browser.
//!
//! [`Browser`] owns the page counter and dialog state, runs the engine on
//! user actions and reconciles a [`RenderSurface`] with the result.

use std::sync::Arc;

use catalog_core::{
    ANY, BookId, BookRecord, Catalog, DataIntegrityError, FilterCriteria, LookupTable, Settings,
    Theme,
};
use catalog_engine::ResultSet;

mod overlay;

pub use overlay::{Dialog, DialogControl, DialogId, FocusTarget, OverlayState};

pub const UNKNOWN_AUTHOR: &str = "Unknown author";
pub const ALL_AUTHORS: &str = "All Authors";
pub const ALL_GENRES: &str = "All Genres";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Replace,
    Append,
}

/// One rendered entry of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub id: BookId,
    pub image: String,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    page: usize,
    page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn advance(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn remaining(&self, result_len: usize) -> usize {
        catalog_engine::compute_remaining(result_len, self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewList {
    items: Vec<Preview>,
}

impl PreviewList {
    pub fn replace(&mut self, items: Vec<Preview>) {
        self.items = items;
    }

    pub fn append(&mut self, items: Vec<Preview>) {
        self.items.extend(items);
    }

    pub fn items(&self) -> &[Preview] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMoreButton {
    pub hidden: bool,
    pub disabled: bool,
    pub remaining: usize,
    pub label: String,
}

impl Default for LoadMoreButton {
    fn default() -> Self {
        Self {
            hidden: true,
            disabled: true,
            remaining: 0,
            label: load_more_label(0),
        }
    }
}

pub fn load_more_label(remaining: usize) -> String {
    format!("Show more ({remaining})")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyMessage {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("mount point `{0}` is not attached")]
    Missing(&'static str),
}

/// Mounting points the synchronizer writes into.
///
/// A surface may be partially laid out; any accessor may return `None`, in
/// which case the operation that needs it is skipped.
pub trait RenderSurface {
    fn preview_list(&mut self) -> Option<&mut PreviewList>;
    fn load_more_button(&mut self) -> Option<&mut LoadMoreButton>;
    fn empty_message(&mut self) -> Option<&mut EmptyMessage>;

    /// Best effort.
    fn scroll_to_top(&mut self) {}
}

/// Plain in-memory surface. The terminal UI embeds one; tests use it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountPoints {
    pub previews: Option<PreviewList>,
    pub load_more: Option<LoadMoreButton>,
    pub empty_message: Option<EmptyMessage>,
    pub scroll_offset: usize,
}

impl MountPoints {
    pub fn attached() -> Self {
        Self {
            previews: Some(PreviewList::default()),
            load_more: Some(LoadMoreButton::default()),
            empty_message: Some(EmptyMessage::default()),
            scroll_offset: 0,
        }
    }
}

impl RenderSurface for MountPoints {
    fn preview_list(&mut self) -> Option<&mut PreviewList> {
        self.previews.as_mut()
    }

    fn load_more_button(&mut self) -> Option<&mut LoadMoreButton> {
        self.load_more.as_mut()
    }

    fn empty_message(&mut self) -> Option<&mut EmptyMessage> {
        self.empty_message.as_mut()
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: usize,
    pub integrity_errors: Vec<DataIntegrityError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Browser {
    catalog: Arc<Catalog>,
    settings: Settings,
    criteria: FilterCriteria,
    results: ResultSet,
    pagination: PaginationState,
    overlays: OverlayState,
}

impl Browser {
    pub fn new(catalog: Arc<Catalog>, mut settings: Settings) -> Self {
        settings.normalize();
        let pagination = PaginationState::new(settings.page_size);
        Self {
            catalog,
            settings,
            criteria: FilterCriteria::default(),
            results: ResultSet::default(),
            pagination,
            overlays: OverlayState::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn overlays(&self) -> &OverlayState {
        &self.overlays
    }

    pub fn remaining(&self) -> usize {
        self.pagination.remaining(self.results.len())
    }

    /// Shows the whole catalog, first page only.
    pub fn load_initial(&mut self, surface: &mut dyn RenderSurface) -> RenderReport {
        self.establish(FilterCriteria::default());
        tracing::info!(books = self.results.len(), "initial catalog load");
        self.sync_replace(surface)
    }

    pub fn on_search_submit(
        &mut self,
        criteria: FilterCriteria,
        surface: &mut dyn RenderSurface,
    ) -> RenderReport {
        tracing::info!(
            title = %criteria.title,
            author = criteria.author.form_value(),
            genre = criteria.genre.form_value(),
            "search submitted"
        );
        self.establish(criteria);
        let report = self.sync_replace(surface);
        surface.scroll_to_top();

        self.close_dialog(DialogId::Search);
        self.overlays
            .dialog_mut(DialogId::Search)
            .set_controls_enabled(true);
        report
    }

    /// Form-data entry point: field name/value pairs for `title`, `author`, `genre`.
    pub fn submit_search_form<I, K, V>(
        &mut self,
        fields: I,
        surface: &mut dyn RenderSurface,
    ) -> RenderReport
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.on_search_submit(FilterCriteria::from_form(fields), surface)
    }

    /// Reveals the next page. Does nothing once every result is shown.
    pub fn on_load_more_click(&mut self, surface: &mut dyn RenderSurface) -> Option<RenderReport> {
        if self.remaining() == 0 {
            tracing::debug!("load more ignored, nothing remaining");
            return None;
        }

        self.pagination.advance();
        let report = self
            .render_result_set(surface, RenderMode::Append)
            .unwrap_or_else(|err| {
                tracing::debug!(%err, "skipping append");
                RenderReport::default()
            });
        if let Err(err) = self.update_load_more_affordance(surface) {
            tracing::debug!(%err, "skipping load more update");
        }
        Some(report)
    }

    pub fn render_result_set(
        &self,
        surface: &mut dyn RenderSurface,
        mode: RenderMode,
    ) -> Result<RenderReport, MountError> {
        let list = surface
            .preview_list()
            .ok_or(MountError::Missing("preview list"))?;

        let (page, size) = (self.pagination.page(), self.pagination.page_size());
        let range = match mode {
            RenderMode::Replace => catalog_engine::revealed_range(self.results.len(), page, size),
            RenderMode::Append => catalog_engine::page_range(self.results.len(), page, size),
        };

        let mut report = RenderReport::default();
        let previews: Vec<Preview> = self
            .results
            .slice(range)
            .iter()
            .map(|book| self.preview(book, &mut report))
            .collect();
        report.rendered = previews.len();

        match mode {
            RenderMode::Replace => list.replace(previews),
            RenderMode::Append => list.append(previews),
        }
        tracing::debug!(?mode, page, rendered = report.rendered, "rendered previews");
        Ok(report)
    }

    pub fn update_load_more_affordance(
        &self,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), MountError> {
        let button = surface
            .load_more_button()
            .ok_or(MountError::Missing("load more button"))?;
        let remaining = self.remaining();
        button.hidden = self.results.is_empty();
        button.disabled = remaining == 0;
        button.remaining = remaining;
        button.label = load_more_label(remaining);
        Ok(())
    }

    pub fn update_empty_state_message(
        &self,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), MountError> {
        let message = surface
            .empty_message()
            .ok_or(MountError::Missing("empty message"))?;
        message.visible = self.results.is_empty();
        Ok(())
    }

    pub fn open_dialog(&mut self, id: DialogId) -> FocusTarget {
        tracing::debug!(dialog = id.as_str(), "open dialog");
        self.overlays.open(id)
    }

    pub fn close_dialog(&mut self, id: DialogId) {
        tracing::debug!(dialog = id.as_str(), "close dialog");
        self.overlays.close(id);
    }

    /// Toggle notification from the surface once a dialog has actually been shown.
    pub fn on_dialog_toggle(&mut self, id: DialogId) {
        self.overlays.dialog_mut(id).on_toggle();
    }

    /// Closes the dialog if its cancel control is interactive.
    pub fn cancel_dialog(&mut self, id: DialogId) -> bool {
        if !self.overlays.dialog(id).is_interactive(DialogControl::Cancel) {
            return false;
        }
        self.close_dialog(id);
        true
    }

    pub fn on_settings_submit(&mut self, theme: Theme) {
        if self.settings.theme != theme {
            tracing::info!(%theme, "theme changed");
        }
        self.settings.theme = theme;
        self.close_dialog(DialogId::Settings);
        self.overlays
            .dialog_mut(DialogId::Settings)
            .set_controls_enabled(true);
    }

    pub fn author_options(&self) -> Vec<SelectOption> {
        select_options(ALL_AUTHORS, &self.catalog.authors)
    }

    pub fn genre_options(&self) -> Vec<SelectOption> {
        select_options(ALL_GENRES, &self.catalog.genres)
    }

    fn establish(&mut self, criteria: FilterCriteria) {
        self.pagination.reset();
        self.results = catalog_engine::filter_catalog(&self.catalog.books, &criteria);
        self.criteria = criteria;
    }

    fn sync_replace(&self, surface: &mut dyn RenderSurface) -> RenderReport {
        let report = self
            .render_result_set(surface, RenderMode::Replace)
            .unwrap_or_else(|err| {
                tracing::debug!(%err, "skipping replace");
                RenderReport::default()
            });
        if let Err(err) = self.update_load_more_affordance(surface) {
            tracing::debug!(%err, "skipping load more update");
        }
        if let Err(err) = self.update_empty_state_message(surface) {
            tracing::debug!(%err, "skipping empty message update");
        }
        report
    }

    fn preview(&self, book: &BookRecord, report: &mut RenderReport) -> Preview {
        let author = match self.catalog.author_name(book) {
            Ok(name) => name.to_string(),
            Err(err) => {
                tracing::warn!(%err, "rendering placeholder author");
                report.integrity_errors.push(err);
                UNKNOWN_AUTHOR.to_string()
            }
        };
        Preview {
            id: book.id.clone(),
            image: book.image.clone(),
            title: book.title.clone(),
            author,
        }
    }
}

fn select_options<K: PartialEq + AsRef<str>>(
    all_label: &str,
    table: &LookupTable<K>,
) -> Vec<SelectOption> {
    let mut out = vec![SelectOption {
        value: ANY.to_string(),
        label: all_label.to_string(),
    }];
    out.extend(table.iter().map(|(id, name)| SelectOption {
        value: id.as_ref().to_string(),
        label: name.to_string(),
    }));
    out
}
