//! The terminal's mounting points for the result list.

use catalog_application::{
    EmptyMessage, LoadMoreButton, MountPoints, Preview, PreviewList, RenderSurface,
};

#[derive(Debug, Clone)]
pub struct LibraryView {
    mounts: MountPoints,
    selected: usize,
}

impl Default for LibraryView {
    fn default() -> Self {
        Self::with_mounts(MountPoints::attached())
    }
}

impl LibraryView {
    pub fn with_mounts(mounts: MountPoints) -> Self {
        Self {
            mounts,
            selected: 0,
        }
    }

    pub fn previews(&self) -> &[Preview] {
        self.mounts
            .previews
            .as_ref()
            .map(PreviewList::items)
            .unwrap_or_default()
    }

    pub fn load_more(&self) -> Option<&LoadMoreButton> {
        self.mounts.load_more.as_ref()
    }

    pub fn empty_message_visible(&self) -> bool {
        self.mounts
            .empty_message
            .as_ref()
            .is_some_and(|message| message.visible)
    }

    pub fn selected(&self) -> usize {
        self.selected.min(self.previews().len().saturating_sub(1))
    }

    pub fn selected_preview(&self) -> Option<&Preview> {
        self.previews().get(self.selected())
    }

    pub fn select_next(&mut self) {
        let len = self.previews().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected().saturating_sub(1);
    }
}

impl RenderSurface for LibraryView {
    fn preview_list(&mut self) -> Option<&mut PreviewList> {
        self.mounts.preview_list()
    }

    fn load_more_button(&mut self) -> Option<&mut LoadMoreButton> {
        self.mounts.load_more_button()
    }

    fn empty_message(&mut self) -> Option<&mut EmptyMessage> {
        self.mounts.empty_message()
    }

    fn scroll_to_top(&mut self) {
        self.selected = 0;
        self.mounts.scroll_to_top();
    }
}
