//! Open/closed state for the search and settings dialogs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogId {
    Search,
    Settings,
}

impl DialogId {
    pub fn focus_target(self) -> FocusTarget {
        match self {
            DialogId::Search => FocusTarget::TitleInput,
            DialogId::Settings => FocusTarget::ThemePicker,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogId::Search => "search",
            DialogId::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    TitleInput,
    ThemePicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogControl {
    Cancel,
    Submit,
}

/// One modal dialog.
///
/// The cancel control starts disabled and is only enabled by the toggle
/// notification the surface sends once the dialog is actually showing, not by
/// the `open` call itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    open: bool,
    cancel_enabled: bool,
    submit_enabled: bool,
}

impl Default for Dialog {
    fn default() -> Self {
        Self {
            open: false,
            cancel_enabled: false,
            submit_enabled: true,
        }
    }
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_enabled(&self, control: DialogControl) -> bool {
        match control {
            DialogControl::Cancel => self.cancel_enabled,
            DialogControl::Submit => self.submit_enabled,
        }
    }

    /// Controls only respond while the dialog is open.
    pub fn is_interactive(&self, control: DialogControl) -> bool {
        self.open && self.is_enabled(control)
    }

    pub(crate) fn open(&mut self) {
        self.open = true;
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
    }

    pub(crate) fn on_toggle(&mut self) {
        if self.open {
            self.cancel_enabled = true;
        }
    }

    pub(crate) fn set_controls_enabled(&mut self, enabled: bool) {
        self.cancel_enabled = enabled;
        self.submit_enabled = enabled;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    search: Dialog,
    settings: Dialog,
    focus: Option<FocusTarget>,
}

impl OverlayState {
    pub fn dialog(&self, id: DialogId) -> &Dialog {
        match id {
            DialogId::Search => &self.search,
            DialogId::Settings => &self.settings,
        }
    }

    pub(crate) fn dialog_mut(&mut self, id: DialogId) -> &mut Dialog {
        match id {
            DialogId::Search => &mut self.search,
            DialogId::Settings => &mut self.settings,
        }
    }

    pub fn is_open(&self, id: DialogId) -> bool {
        self.dialog(id).is_open()
    }

    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    pub(crate) fn open(&mut self, id: DialogId) -> FocusTarget {
        self.dialog_mut(id).open();
        let target = id.focus_target();
        self.focus = Some(target);
        target
    }

    pub(crate) fn close(&mut self, id: DialogId) {
        self.dialog_mut(id).close();
        if self.focus == Some(id.focus_target()) {
            self.focus = None;
        }
    }
}
