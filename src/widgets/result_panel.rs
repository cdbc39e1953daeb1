use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use std::path::{Path, PathBuf};

/// Image viewer plus rank and score labels for the selected bar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    image_source: Option<String>,
    rank_text: String,
    score_text: String,
}

impl ResultPanel {
    pub fn set_image_source(&mut self, source: String) {
        self.image_source = Some(source);
    }

    pub fn set_rank_text(&mut self, text: String) {
        self.rank_text = text;
    }

    pub fn set_score_text(&mut self, text: String) {
        self.score_text = text;
    }

    pub fn image_source(&self) -> Option<&str> {
        self.image_source.as_deref()
    }

    pub fn rank_text(&self) -> &str {
        &self.rank_text
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    /// Image source resolved against the results directory.
    pub fn resolve_image(&self, root: &Path) -> Option<PathBuf> {
        self.image_source.as_ref().map(|source| root.join(source))
    }
}

/// Draws a [`ResultPanel`] inside a bordered block.
pub struct ResultPanelView<'a> {
    panel: &'a ResultPanel,
    root: Option<&'a Path>,
    layout: &'a str,
    border_color: Color,
    label_color: Color,
    missing_color: Color,
}

impl<'a> ResultPanelView<'a> {
    pub fn new(panel: &'a ResultPanel) -> Self {
        Self {
            panel,
            root: None,
            layout: "",
            border_color: Color::Cyan,
            label_color: Color::DarkGray,
            missing_color: Color::Red,
        }
    }

    pub fn root(mut self, root: Option<&'a Path>) -> Self {
        self.root = root;
        self
    }

    pub fn layout(mut self, layout: &'a str) -> Self {
        self.layout = layout;
        self
    }

    pub fn colors(mut self, border: Color, label: Color, missing: Color) -> Self {
        self.border_color = border;
        self.label_color = label;
        self.missing_color = missing;
        self
    }

    fn field(&self, label: &'static str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{label:<8}"),
                Style::default().fg(self.label_color),
            ),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
        ])
    }
}

impl Widget for ResultPanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Selected")
            .border_style(Style::default().fg(self.border_color));

        let layout = if self.layout.is_empty() {
            "default".to_string()
        } else {
            self.layout.to_string()
        };
        let image = self.panel.image_source().unwrap_or("-").to_string();

        let mut lines = vec![
            self.field("Rank", self.panel.rank_text().to_string()),
            self.field("Score", self.panel.score_text().to_string()),
            self.field("Layout", layout),
            self.field("Image", image),
        ];

        if let Some(file) = self.root.and_then(|root| self.panel.resolve_image(root)) {
            let line = if file.exists() {
                Line::from(Span::styled(
                    file.display().to_string(),
                    Style::default().fg(self.label_color),
                ))
            } else {
                Line::from(Span::styled(
                    format!("{} (missing)", file.display()),
                    Style::default().fg(self.missing_color),
                ))
            };
            lines.push(Line::default());
            lines.push(line);
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_image() {
        let mut panel = ResultPanel::default();
        assert_eq!(panel.resolve_image(Path::new("/results")), None);
        panel.set_image_source("data/4_bin.png".to_string());
        assert_eq!(
            panel.resolve_image(Path::new("/results")),
            Some(PathBuf::from("/results/data/4_bin.png"))
        );
    }

    #[test]
    fn test_render_shows_fields() {
        let mut panel = ResultPanel::default();
        panel.set_image_source("data/1.png".to_string());
        panel.set_rank_text("1".to_string());
        panel.set_score_text("42".to_string());

        let area = Rect::new(0, 0, 30, 8);
        let mut buf = Buffer::empty(area);
        ResultPanelView::new(&panel).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Rank    1"));
        assert!(text.contains("Score   42"));
        assert!(text.contains("Layout  default"));
        assert!(text.contains("data/1.png"));
    }
}
