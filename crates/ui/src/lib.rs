//! ratatui-based UI.

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context as _;
use catalog_application::{
    ALL_AUTHORS, ALL_GENRES, Browser, DialogControl, DialogId, FocusTarget, SelectOption,
};
use catalog_core::{FORM_AUTHOR, FORM_GENRE, FORM_TITLE, FilterCriteria, Theme};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use unicode_width::UnicodeWidthStr;

mod palette;
mod surface;

use palette::{Palette, palette};
pub use surface::LibraryView;

pub const NO_RESULTS: &str = "No results found. Your filters might be too narrow.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Quit,
}

pub struct Ui {
    browser: Browser,
    view: LibraryView,
    search_panel: SearchPanel,
    settings_panel: SettingsPanel,
    author_options: Vec<SelectOption>,
    genre_options: Vec<SelectOption>,
    pending_toggles: VecDeque<DialogId>,
}

impl Ui {
    pub fn new(browser: Browser) -> Self {
        Self::with_view(browser, LibraryView::default())
    }

    pub fn with_view(mut browser: Browser, mut view: LibraryView) -> Self {
        let author_options = browser.author_options();
        let genre_options = browser.genre_options();
        let report = browser.load_initial(&mut view);
        if !report.integrity_errors.is_empty() {
            tracing::warn!(
                count = report.integrity_errors.len(),
                "initial page rendered with placeholders"
            );
        }
        Self {
            browser,
            view,
            search_panel: SearchPanel::default(),
            settings_panel: SettingsPanel::default(),
            author_options,
            genre_options,
            pending_toggles: VecDeque::new(),
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn view(&self) -> &LibraryView {
        &self.view
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(())), Ok(())) => Ok(()),
            (Ok(Ok(())), Err(err)) => Err(err),
            (Ok(Err(err)), _) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.deliver_toggles();
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    needs_redraw = true;
                    if let Some(UiExit::Quit) = self.handle_key(key) {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Dialogs shown by the last draw report their open transition.
    pub fn deliver_toggles(&mut self) {
        while let Some(id) = self.pending_toggles.pop_front() {
            self.browser.on_dialog_toggle(id);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        if self.browser.overlays().is_open(DialogId::Settings) {
            self.handle_settings_panel_key(key);
            None
        } else if self.browser.overlays().is_open(DialogId::Search) {
            self.handle_search_panel_key(key);
            None
        } else {
            self.handle_main_key(key)
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(UiExit::Quit),
            KeyCode::Char('/') => {
                self.open_search_panel();
                None
            }
            KeyCode::Char('s') => {
                self.open_settings_panel();
                None
            }
            KeyCode::Char('m') => {
                let report = self.browser.on_load_more_click(&mut self.view);
                if let Some(report) = report.filter(|r| !r.integrity_errors.is_empty()) {
                    tracing::warn!(
                        count = report.integrity_errors.len(),
                        "page rendered with placeholders"
                    );
                }
                None
            }
            KeyCode::Down => {
                self.view.select_next();
                None
            }
            KeyCode::Up => {
                self.view.select_prev();
                None
            }
            _ => None,
        }
    }

    fn open_dialog(&mut self, id: DialogId) -> FocusTarget {
        let target = self.browser.open_dialog(id);
        self.pending_toggles.push_back(id);
        target
    }

    fn open_search_panel(&mut self) {
        let target = self.open_dialog(DialogId::Search);
        debug_assert_eq!(target, FocusTarget::TitleInput);
        let criteria = self.browser.criteria().clone();
        self.search_panel = SearchPanel {
            title: criteria.title.clone(),
            author_cursor: option_index(&self.author_options, criteria.author.form_value()),
            genre_cursor: option_index(&self.genre_options, criteria.genre.form_value()),
            focus: SearchFocus::Title,
        };
    }

    fn open_settings_panel(&mut self) {
        self.open_dialog(DialogId::Settings);
        self.settings_panel.theme = self.browser.theme();
    }

    fn handle_search_panel_key(&mut self, key: KeyEvent) {
        let submit_ready = self
            .browser
            .overlays()
            .dialog(DialogId::Search)
            .is_interactive(DialogControl::Submit);
        match key.code {
            KeyCode::Esc => {
                if !self.browser.cancel_dialog(DialogId::Search) {
                    tracing::debug!("search cancel not yet enabled");
                }
            }
            KeyCode::Enter => {
                if submit_ready {
                    self.submit_search_panel();
                }
            }
            KeyCode::Tab => {
                self.search_panel.focus = self.search_panel.focus.next();
            }
            KeyCode::BackTab => {
                self.search_panel.focus = self.search_panel.focus.prev();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_panel.title.clear();
            }
            _ => match self.search_panel.focus {
                SearchFocus::Title => match key.code {
                    KeyCode::Backspace => {
                        self.search_panel.title.pop();
                    }
                    KeyCode::Char(ch) if !ch.is_control() => {
                        self.search_panel.title.push(ch);
                    }
                    _ => {}
                },
                SearchFocus::Genre => {
                    step_cursor(
                        &mut self.search_panel.genre_cursor,
                        self.genre_options.len(),
                        key.code,
                    );
                }
                SearchFocus::Author => {
                    step_cursor(
                        &mut self.search_panel.author_cursor,
                        self.author_options.len(),
                        key.code,
                    );
                }
            },
        }
    }

    fn search_form_fields(&self) -> Vec<(&'static str, String)> {
        let value = |options: &[SelectOption], cursor: usize| {
            options
                .get(cursor)
                .map(|option| option.value.clone())
                .unwrap_or_default()
        };
        vec![
            (FORM_TITLE, self.search_panel.title.clone()),
            (
                FORM_GENRE,
                value(&self.genre_options, self.search_panel.genre_cursor),
            ),
            (
                FORM_AUTHOR,
                value(&self.author_options, self.search_panel.author_cursor),
            ),
        ]
    }

    fn submit_search_panel(&mut self) {
        let fields = self.search_form_fields();
        let report = self.browser.submit_search_form(fields, &mut self.view);
        if !report.integrity_errors.is_empty() {
            tracing::warn!(
                count = report.integrity_errors.len(),
                "results rendered with placeholders"
            );
        }
    }

    fn handle_settings_panel_key(&mut self, key: KeyEvent) {
        let submit_ready = self
            .browser
            .overlays()
            .dialog(DialogId::Settings)
            .is_interactive(DialogControl::Submit);
        match key.code {
            KeyCode::Esc => {
                if !self.browser.cancel_dialog(DialogId::Settings) {
                    tracing::debug!("settings cancel not yet enabled");
                }
            }
            KeyCode::Enter => {
                if submit_ready {
                    self.browser.on_settings_submit(self.settings_panel.theme);
                }
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') => {
                self.settings_panel.theme = self.settings_panel.theme.cycle();
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let colors = palette(self.browser.theme());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)),
            area,
        );

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Text::from(self.header_lines(colors)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[1]);
        self.draw_results(frame, body[0], colors);
        frame.render_widget(self.draw_details(colors), body[1]);

        let footer = Paragraph::new(Text::from(self.footer_lines(colors)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[2]);

        if self.browser.overlays().is_open(DialogId::Search) {
            self.draw_search_panel(area, frame, colors);
        }
        if self.browser.overlays().is_open(DialogId::Settings) {
            self.draw_settings_panel(area, frame, colors);
        }
    }

    fn header_lines(&self, colors: Palette) -> Vec<Line<'static>> {
        let total = self.browser.catalog().books.len();
        let matches = self.browser.results().len();
        let mut lines = vec![Line::from(vec![
            Span::styled("Book Catalog", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  showing {matches} of {total} books")),
        ])];

        let criteria = self.browser.criteria();
        if !criteria.is_match_all() {
            lines.push(Line::styled(
                self.criteria_summary(criteria),
                Style::default().fg(colors.dim),
            ));
        }
        lines
    }

    fn criteria_summary(&self, criteria: &FilterCriteria) -> String {
        let label = |options: &[SelectOption], value: &str| {
            options
                .iter()
                .find(|option| option.value == value)
                .map(|option| option.label.clone())
                .unwrap_or_else(|| value.to_string())
        };
        let mut parts = Vec::new();
        if !criteria.title.trim().is_empty() {
            parts.push(format!("title: \"{}\"", criteria.title.trim()));
        }
        if !criteria.genre.is_any() {
            parts.push(format!(
                "genre: {}",
                label(&self.genre_options, criteria.genre.form_value())
            ));
        }
        if !criteria.author.is_any() {
            parts.push(format!(
                "author: {}",
                label(&self.author_options, criteria.author.form_value())
            ));
        }
        parts.join("  ·  ")
    }

    fn draw_results(&self, frame: &mut ratatui::Frame, area: Rect, colors: Palette) {
        let block = Block::default().borders(Borders::ALL).title("Books");

        if self.view.empty_message_visible() {
            let lines = vec![
                Line::raw(NO_RESULTS),
                Line::raw(""),
                Line::styled(
                    "Press / to change the search.",
                    Style::default().fg(colors.dim),
                ),
            ];
            let paragraph = Paragraph::new(Text::from(lines))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let max_width = area.width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = self
            .view
            .previews()
            .iter()
            .map(|preview| {
                let mut lines: Vec<Line> = wrap_text(&preview.title, max_width.max(8))
                    .into_iter()
                    .map(|line| {
                        Line::styled(line, Style::default().add_modifier(Modifier::BOLD))
                    })
                    .collect();
                lines.push(Line::styled(
                    preview.author.clone(),
                    Style::default().fg(colors.dim),
                ));
                ListItem::new(Text::from(lines))
            })
            .collect();

        let highlight_style = Style::default()
            .fg(colors.bg)
            .bg(colors.accent)
            .add_modifier(Modifier::BOLD);
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        if !self.view.previews().is_empty() {
            state.select(Some(self.view.selected()));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_details(&self, colors: Palette) -> Paragraph<'static> {
        let block = Block::default().borders(Borders::ALL).title("Preview");
        let Some(preview) = self.view.selected_preview() else {
            return Paragraph::new(Line::styled(
                "Nothing selected.",
                Style::default().fg(colors.dim),
            ))
            .block(block);
        };

        let field = |name: &str, value: String| {
            Line::from(vec![
                Span::styled(
                    format!("{name}: "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(value),
            ])
        };
        let lines = vec![
            field("Title", preview.title.clone()),
            field("Author", preview.author.clone()),
            field("Cover", preview.image.clone()),
            field("Id", preview.id.to_string()),
        ];
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true })
    }

    fn footer_lines(&self, colors: Palette) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(button) = self.view.load_more().filter(|button| !button.hidden) {
            let style = if button.disabled {
                Style::default()
                    .fg(colors.dim)
                    .add_modifier(Modifier::DIM)
            } else {
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("[ {} ]", button.label), style),
                Span::raw("  "),
                Span::styled("m", Style::default().add_modifier(Modifier::BOLD)),
            ]));
        }

        lines.push(Line::from(vec![
            Span::styled("/", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" search  "),
            Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" settings  "),
            Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" move  "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]));
        lines
    }

    fn draw_search_panel(&self, area: Rect, frame: &mut ratatui::Frame, colors: Palette) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(colors.bg).fg(colors.fg))
            .title(Span::styled(
                "Search",
                Style::default().add_modifier(Modifier::BOLD),
            ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        let focus_style = |focus: SearchFocus| {
            if self.search_panel.focus == focus {
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            }
        };
        let selected_label = |options: &[SelectOption], cursor: usize, fallback: &str| {
            options
                .get(cursor)
                .map(|option| option.label.clone())
                .unwrap_or_else(|| fallback.to_string())
        };

        let cursor = if self.search_panel.focus == SearchFocus::Title {
            "_"
        } else {
            ""
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("Title:  ", focus_style(SearchFocus::Title)),
                Span::raw(format!("{}{cursor}", self.search_panel.title)),
            ]),
            Line::raw(""),
            Line::from(vec![
                Span::styled("Genre:  ", focus_style(SearchFocus::Genre)),
                Span::raw(format!(
                    "‹ {} ›",
                    selected_label(&self.genre_options, self.search_panel.genre_cursor, ALL_GENRES)
                )),
            ]),
            Line::raw(""),
            Line::from(vec![
                Span::styled("Author: ", focus_style(SearchFocus::Author)),
                Span::raw(format!(
                    "‹ {} ›",
                    selected_label(
                        &self.author_options,
                        self.search_panel.author_cursor,
                        ALL_AUTHORS
                    )
                )),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
            sections[0],
        );

        let dialog = self.browser.overlays().dialog(DialogId::Search);
        frame.render_widget(
            Paragraph::new(dialog_help(dialog, colors)).alignment(Alignment::Left),
            sections[1],
        );
    }

    fn draw_settings_panel(&self, area: Rect, frame: &mut ratatui::Frame, colors: Palette) {
        let popup_area = centered_rect(45, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(colors.bg).fg(colors.fg))
            .title(Span::styled(
                "Settings",
                Style::default().add_modifier(Modifier::BOLD),
            ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        let chosen = self.settings_panel.theme;
        let line = Line::from(vec![
            Span::styled("Theme: ", Style::default().add_modifier(Modifier::BOLD)),
            option_chip(Theme::Day.as_str(), chosen == Theme::Day, colors),
            Span::raw(" "),
            option_chip(Theme::Night.as_str(), chosen == Theme::Night, colors),
        ]);
        frame.render_widget(Paragraph::new(line), sections[0]);

        let dialog = self.browser.overlays().dialog(DialogId::Settings);
        frame.render_widget(
            Paragraph::new(dialog_help(dialog, colors)).alignment(Alignment::Left),
            sections[1],
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchFocus {
    Title,
    Genre,
    Author,
}

impl SearchFocus {
    fn next(self) -> Self {
        match self {
            SearchFocus::Title => SearchFocus::Genre,
            SearchFocus::Genre => SearchFocus::Author,
            SearchFocus::Author => SearchFocus::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            SearchFocus::Title => SearchFocus::Author,
            SearchFocus::Genre => SearchFocus::Title,
            SearchFocus::Author => SearchFocus::Genre,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchPanel {
    title: String,
    author_cursor: usize,
    genre_cursor: usize,
    focus: SearchFocus,
}

impl Default for SearchPanel {
    fn default() -> Self {
        Self {
            title: String::new(),
            author_cursor: 0,
            genre_cursor: 0,
            focus: SearchFocus::Title,
        }
    }
}

#[derive(Debug, Clone)]
struct SettingsPanel {
    theme: Theme,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self { theme: Theme::Night }
    }
}

fn option_index(options: &[SelectOption], value: &str) -> usize {
    options
        .iter()
        .position(|option| option.value == value)
        .unwrap_or(0)
}

fn step_cursor(cursor: &mut usize, len: usize, code: KeyCode) {
    if len == 0 {
        *cursor = 0;
        return;
    }
    match code {
        KeyCode::Left | KeyCode::Up => {
            *cursor = (*cursor + len - 1) % len;
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
            *cursor = (*cursor + 1) % len;
        }
        _ => {}
    }
}

fn dialog_help(dialog: &catalog_application::Dialog, colors: Palette) -> Line<'static> {
    let control = |key: &'static str, action: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.dim).add_modifier(Modifier::DIM)
        };
        vec![Span::styled(key, style), Span::raw(format!(" {action}  "))]
    };
    let mut spans = control("Enter", "submit", dialog.is_interactive(DialogControl::Submit));
    spans.extend(control(
        "Esc",
        "cancel",
        dialog.is_interactive(DialogControl::Cancel),
    ));
    spans.push(Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)));
    spans.push(Span::raw(" next field"));
    Line::from(spans)
}

fn option_chip(label: &str, selected: bool, colors: Palette) -> Span<'static> {
    let style = if selected {
        Style::default()
            .fg(colors.bg)
            .bg(colors.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.dim)
    };
    Span::styled(label.to_string(), style)
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        let sep_width = usize::from(!current.is_empty());

        if current_width + sep_width + word_width <= max_width {
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        // Overlong words are kept whole; the list widget clips them.
        current.push_str(word);
        current_width = word_width;
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use catalog_application::MountPoints;
    use catalog_core::{
        AuthorId, BookId, BookRecord, Catalog, GenreId, LookupTable, Selection, Settings,
    };
    use ratatui::backend::TestBackend;

    fn catalog() -> Catalog {
        let book = |id: &str, title: &str, author: &str, genre: &str| BookRecord {
            id: BookId::new(id),
            title: title.to_string(),
            author: AuthorId::new(author),
            genres: vec![GenreId::new(genre)],
            image: format!("covers/{id}.jpg"),
        };
        Catalog {
            books: vec![
                book("b1", "Moby Dick", "a1", "g1"),
                book("b2", "War and Peace", "a2", "g2"),
                book("b3", "Anna Karenina", "a2", "g2"),
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

    fn ui(page_size: usize) -> Ui {
        let settings = Settings {
            page_size,
            ..Settings::default()
        };
        Ui::new(Browser::new(Arc::new(catalog()), settings))
    }

    fn press(ui: &mut Ui, code: KeyCode) -> Option<UiExit> {
        ui.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(ui: &mut Ui, text: &str) {
        for ch in text.chars() {
            press(ui, KeyCode::Char(ch));
        }
    }

    fn screen(ui: &Ui) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| ui.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn starts_with_first_page() {
        let ui = ui(2);
        assert_eq!(ui.view().previews().len(), 2);
        assert_eq!(ui.view().load_more().unwrap().label, "Show more (1)");
        let text = screen(&ui);
        assert!(text.contains("Moby Dick"));
        assert!(text.contains("Show more (1)"));
    }

    #[test]
    fn load_more_key_appends() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('m'));
        assert_eq!(ui.view().previews().len(), 3);
        assert!(ui.view().load_more().unwrap().disabled);
    }

    #[test]
    fn search_dialog_submits_form() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('/'));
        assert!(ui.browser().overlays().is_open(DialogId::Search));
        assert_eq!(ui.browser().overlays().focus(), Some(FocusTarget::TitleInput));

        type_text(&mut ui, "PEACE");
        press(&mut ui, KeyCode::Tab);
        press(&mut ui, KeyCode::Tab);
        press(&mut ui, KeyCode::Right);
        press(&mut ui, KeyCode::Right);
        press(&mut ui, KeyCode::Enter);

        assert!(!ui.browser().overlays().is_open(DialogId::Search));
        assert_eq!(
            ui.browser().criteria().author,
            Selection::Only(AuthorId::new("a2"))
        );
        let ids: Vec<String> = ui
            .view()
            .previews()
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["b2"]);
        assert!(screen(&ui).contains("Leo Tolstoy"));
    }

    #[test]
    fn escape_needs_toggle_before_cancelling() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('/'));
        press(&mut ui, KeyCode::Esc);
        assert!(ui.browser().overlays().is_open(DialogId::Search));

        ui.deliver_toggles();
        press(&mut ui, KeyCode::Esc);
        assert!(!ui.browser().overlays().is_open(DialogId::Search));
        assert_eq!(press(&mut ui, KeyCode::Esc), Some(UiExit::Quit));
    }

    #[test]
    fn no_results_shows_message() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('/'));
        type_text(&mut ui, "zzz");
        press(&mut ui, KeyCode::Enter);
        assert!(ui.view().empty_message_visible());
        assert!(ui.view().load_more().unwrap().hidden);
        let text = screen(&ui);
        assert!(text.contains("No results found."));
        assert!(!text.contains("Show more"));
    }

    #[test]
    fn settings_dialog_switches_theme() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('s'));
        assert!(ui.browser().overlays().is_open(DialogId::Settings));
        assert_eq!(
            ui.browser().overlays().focus(),
            Some(FocusTarget::ThemePicker)
        );
        press(&mut ui, KeyCode::Right);
        press(&mut ui, KeyCode::Enter);
        assert_eq!(ui.browser().theme(), Theme::Day);
        assert!(!ui.browser().overlays().is_open(DialogId::Settings));
    }

    #[test]
    fn cancelled_settings_keep_theme() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('s'));
        ui.deliver_toggles();
        press(&mut ui, KeyCode::Right);
        press(&mut ui, KeyCode::Esc);
        assert!(!ui.browser().overlays().is_open(DialogId::Settings));
        assert_eq!(ui.browser().theme(), Theme::Night);

        press(&mut ui, KeyCode::Char('s'));
        assert_eq!(ui.settings_panel.theme, Theme::Night);
    }

    #[test]
    fn reopened_search_is_prefilled() {
        let mut ui = ui(2);
        press(&mut ui, KeyCode::Char('/'));
        type_text(&mut ui, "war");
        press(&mut ui, KeyCode::Enter);
        press(&mut ui, KeyCode::Char('/'));
        assert_eq!(ui.search_panel.title, "war");
        assert_eq!(ui.search_panel.author_cursor, 0);
    }

    #[test]
    fn detached_view_does_not_crash() {
        let mut ui = Ui::with_view(
            Browser::new(Arc::new(catalog()), Settings::default()),
            LibraryView::with_mounts(MountPoints::default()),
        );
        press(&mut ui, KeyCode::Char('m'));
        assert!(ui.view().previews().is_empty());
        assert!(screen(&ui).contains("Book Catalog"));
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("The War of the Worlds", 10),
            vec!["The War of", "the Worlds"]
        );
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
