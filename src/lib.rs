use color_eyre::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

pub mod config;
pub mod error_display;
pub mod logging;
pub mod scores;
pub mod widgets;

pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use scorebar_cli::{Args, ScoreFormat};
pub use scores::ScoreSet;

use error_display::user_message_from_report;
use widgets::bar_selector::{BarColors, BarSelector};
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::result_panel::ResultPanelView;

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "scorebar";

const PANEL_WIDTH: u16 = 40;

const HELP_TEXT: &str = "\
←/h  →/l     Select previous / next result
Home/g End/G First / last result
Mouse        Hover to highlight, click to select, wheel to step
v            Cycle image layout
o            Open the selected image
i            Show / hide the result panel
q/Esc        Quit";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub format: Option<ScoreFormat>,
    /// Directory image paths are resolved against; defaults to `image.data_dir`,
    /// then the score file's directory
    pub root: Option<PathBuf>,
    /// Keep only the first N results (0 keeps all)
    pub top: Option<usize>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: ScoreFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }
}

impl From<&Args> for OpenOptions {
    fn from(args: &Args) -> Self {
        Self {
            format: args.format,
            root: args.root.clone(),
            top: args.top,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Open(PathBuf, OpenOptions),
    /// Switch the image layout tag
    Layout(String),
    /// Open the selected image with the system viewer
    OpenImage,
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

pub struct App {
    pub bar_selector: BarSelector,
    pub error_modal: ErrorModal,
    pub show_help: bool,
    pub panel_visible: bool,
    path: Option<PathBuf>,
    root: Option<PathBuf>,
    events: Sender<AppEvent>,
    debug: DebugState,
    layouts: Vec<String>,
    data_dir: Option<PathBuf>,
    theme: Theme,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let theme = Theme::from_config(&AppConfig::default().theme).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to create default theme: {}. Using fallback.",
                e
            );
            Theme::default()
        });

        Self::new_with_config(events, theme, AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, app_config: AppConfig) -> App {
        let colors = BarColors {
            normal: theme.get("bar"),
            hovered: theme.get("bar_hovered"),
            selected: theme.get("bar_selected"),
            marker: theme.get("bar_selected"),
        };
        let bar_selector = BarSelector::new()
            .with_bar_width(app_config.display.bar_width)
            .with_bar_gap(app_config.display.bar_gap)
            .with_colors(colors)
            .with_image_layout(app_config.image.default_layout.clone());

        let debug = DebugState {
            enabled: app_config.debug.enabled,
            ..DebugState::default()
        };

        App {
            bar_selector,
            error_modal: ErrorModal::new(),
            show_help: false,
            panel_visible: app_config.display.show_panel,
            path: None,
            root: None,
            events,
            debug,
            layouts: app_config.image.layouts,
            data_dir: app_config.image.data_dir,
            theme,
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Load a score file and show its bars, selecting the best result.
    pub fn load(&mut self, path: &Path, options: &OpenOptions) -> Result<()> {
        let mut set = ScoreSet::load(path, options.format)?;
        if let Some(top) = options.top {
            set.truncate(top);
        }
        self.bar_selector.render_bars(&set.magnitudes, &set.scores)?;
        self.path = Some(path.to_path_buf());
        self.root = options
            .root
            .clone()
            .or_else(|| self.data_dir.clone())
            .or_else(|| path.parent().map(Path::to_path_buf));
        Ok(())
    }

    /// File on disk for the selected result's image, if scores are loaded.
    pub fn current_image_file(&self) -> Option<PathBuf> {
        let root = self.root.as_deref()?;
        self.bar_selector.panel().resolve_image(root)
    }

    /// Layout tag following the current one in the configured cycle.
    pub fn next_layout(&self) -> String {
        let current = self.bar_selector.image_layout();
        match self.layouts.iter().position(|tag| tag == current) {
            Some(i) => self.layouts[(i + 1) % self.layouts.len()].clone(),
            None => self.layouts.first().cloned().unwrap_or_default(),
        }
    }

    fn show_error(&mut self, report: &color_eyre::Report) {
        tracing::warn!(error = %report, "showing error");
        self.error_modal.show(user_message_from_report(report));
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Mouse(mouse) => self.mouse(mouse),
            AppEvent::Open(path, options) => {
                if let Err(e) = self.load(path, options) {
                    self.show_error(&e);
                }
                None
            }
            AppEvent::Layout(tag) => {
                match config::validate_layout_tag(tag) {
                    Ok(()) => {
                        self.debug.action("set_image_layout");
                        self.bar_selector.set_image_layout(tag.clone());
                    }
                    Err(e) => self.show_error(&e),
                }
                None
            }
            AppEvent::OpenImage => {
                self.open_image();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn open_image(&mut self) {
        let Some(file) = self.current_image_file() else {
            return;
        };
        self.debug.action("open_image");
        if !file.exists() {
            self.error_modal
                .show(format!("Image not found: {}", file.display()));
            return;
        }
        if let Err(e) = open::that(&file) {
            self.error_modal.show(format!(
                "Failed to open {}: {}",
                file.display(),
                error_display::user_message_from_io(&e, None)
            ));
        }
    }

    fn select(&mut self, step: fn(&mut BarSelector) -> Result<()>, action: &str) {
        self.debug.action(action);
        if self.bar_selector.is_empty() {
            return;
        }
        if let Err(e) = step(&mut self.bar_selector) {
            self.show_error(&e);
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);
        if event.kind != KeyEventKind::Press {
            return None;
        }

        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.show_help {
            if matches!(event.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return None;
        }

        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppEvent::Exit)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Left | KeyCode::Char('h') => {
                self.select(BarSelector::select_previous, "select_previous");
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.select(BarSelector::select_next, "select_next");
                None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.select(BarSelector::select_first, "select_first");
                None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.select(BarSelector::select_last, "select_last");
                None
            }
            KeyCode::Char('v') => Some(AppEvent::Layout(self.next_layout())),
            KeyCode::Char('o') => Some(AppEvent::OpenImage),
            KeyCode::Char('i') => {
                self.panel_visible = !self.panel_visible;
                None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            _ => None,
        }
    }

    fn mouse(&mut self, event: &MouseEvent) -> Option<AppEvent> {
        self.debug.on_mouse();
        if self.error_modal.active || self.show_help {
            return None;
        }

        match event.kind {
            MouseEventKind::Moved => self.bar_selector.pointer_moved(event.column, event.row),
            MouseEventKind::Down(MouseButton::Left) => {
                match self.bar_selector.pointer_clicked(event.column, event.row) {
                    Ok(Some(rank)) => self.debug.action(&format!("click_bar_{}", rank)),
                    Ok(None) => {}
                    Err(e) => self.show_error(&e),
                }
            }
            MouseEventKind::ScrollDown => {
                self.select(BarSelector::select_next, "scroll_next");
            }
            MouseEventKind::ScrollUp => {
                self.select(BarSelector::select_previous, "scroll_previous");
            }
            _ => {}
        }
        None
    }

    fn chart_title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| APP_NAME.to_string());
        match self.bar_selector.selected_rank() {
            Some(rank) => format!(" {} ({} of {}) ", name, rank + 1, self.bar_selector.len()),
            None => format!(" {} ", name),
        }
    }

    fn render_error_modal(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 70, 40);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Error")
            .border_style(Style::default().fg(self.color("modal_border_error")));
        let inner_area = block.inner(popup_area);
        block.render(popup_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner_area);

        Paragraph::new(self.error_modal.message.as_str())
            .style(Style::default().fg(self.color("error")))
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        Paragraph::new("[ OK ]")
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.color("modal_border_active"))),
            )
            .render(chunks[1], buf);
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 60, 50);
        Clear.render(popup_area, buf);
        Paragraph::new(HELP_TEXT)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help")
                    .border_style(Style::default().fg(self.color("modal_border"))),
            )
            .wrap(Wrap { trim: false })
            .render(popup_area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let main_area = layout[0];
        let (chart_area, panel_area) = if self.panel_visible {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(PANEL_WIDTH)])
                .split(main_area);
            (chunks[0], Some(chunks[1]))
        } else {
            (main_area, None)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.chart_title())
            .border_style(Style::default().fg(self.color("primary")));
        let bars_area = block.inner(chart_area);
        block.render(chart_area, buf);

        if self.bar_selector.is_empty() {
            Paragraph::new("No scores loaded")
                .centered()
                .style(Style::default().fg(self.color("dimmed")))
                .render(bars_area, buf);
        } else {
            self.bar_selector.render(bars_area, buf);
        }

        if let Some(panel_area) = panel_area {
            ResultPanelView::new(self.bar_selector.panel())
                .root(self.root.as_deref())
                .layout(self.bar_selector.image_layout())
                .colors(
                    self.color("modal_border"),
                    self.color("dimmed"),
                    self.color("error"),
                )
                .render(panel_area, buf);
        }

        Controls::with_bar_count(self.bar_selector.len())
            .with_dimmed(self.error_modal.active || self.show_help)
            .with_background(self.color("controls_bg"))
            .render(layout[1], buf);

        if self.debug.enabled {
            self.debug.render(layout[2], buf);
        }

        if self.error_modal.active {
            self.render_error_modal(area, buf);
        } else if self.show_help {
            self.render_help(area, buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
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
