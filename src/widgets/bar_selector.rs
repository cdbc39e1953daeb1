//! Row of score bars with exclusive selection.
//!
//! Each [`Bar`] is a retained element holding its own rank, score and
//! visual markers. The [`BarSelector`] owns the bars, the current selection
//! and the image layout tag, and pushes every selection change into its
//! [`ResultPanel`].

use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::Widget,
};

use super::result_panel::ResultPanel;

/// Height every bar gets regardless of magnitude, so empty bars stay clickable.
pub const MIN_BAR_HEIGHT: f64 = 5.0;
/// Height added per unit of magnitude.
pub const PLOT_HEIGHT: f64 = 50.0;

const BAR_SYMBOL: &str = "█";
const SELECTED_MARKER: &str = "▲";

/// Largest value in `values`, or `None` when empty.
pub fn compute_max(values: &[f64]) -> Option<f64> {
    let (first, rest) = values.split_first()?;
    Some(rest.iter().fold(*first, |max, v| max.max(*v)))
}

/// Display height for a bar of the given magnitude.
pub fn bar_height(magnitude: f64) -> f64 {
    MIN_BAR_HEIGHT + magnitude * PLOT_HEIGHT
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub rank: usize,
    pub score: f64,
    pub height: f64,
    hovered: bool,
    selected: bool,
}

impl Bar {
    fn new(rank: usize, magnitude: f64, score: f64) -> Self {
        Self {
            rank,
            score,
            height: bar_height(magnitude),
            hovered: false,
            selected: false,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Colors used when drawing bars
#[derive(Debug, Clone, Copy)]
pub struct BarColors {
    pub normal: Color,
    pub hovered: Color,
    pub selected: Color,
    pub marker: Color,
}

impl Default for BarColors {
    fn default() -> Self {
        Self {
            normal: Color::Cyan,
            hovered: Color::White,
            selected: Color::Yellow,
            marker: Color::Yellow,
        }
    }
}

pub struct BarSelector {
    bars: Vec<Bar>,
    selected: Option<usize>,
    hovered: Option<usize>,
    image_type: String,
    panel: ResultPanel,
    bar_width: u16,
    bar_gap: u16,
    /// Index of the first bar drawn when not all bars fit
    offset: usize,
    /// Clickable columns from the last draw, as (rank, area)
    hit_boxes: Vec<(usize, Rect)>,
    colors: BarColors,
}

impl Default for BarSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSelector {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            selected: None,
            hovered: None,
            image_type: String::new(),
            panel: ResultPanel::default(),
            bar_width: 2,
            bar_gap: 1,
            offset: 0,
            hit_boxes: Vec::new(),
            colors: BarColors::default(),
        }
    }

    pub fn with_bar_width(mut self, width: u16) -> Self {
        self.bar_width = width.max(1);
        self
    }

    pub fn with_bar_gap(mut self, gap: u16) -> Self {
        self.bar_gap = gap;
        self
    }

    pub fn with_colors(mut self, colors: BarColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_image_layout(mut self, mode: impl Into<String>) -> Self {
        self.image_type = mode.into();
        self
    }

    /// Replace all bars and select the first one.
    ///
    /// `magnitudes` sets each bar's height and `scores` is shown in the result
    /// panel. Both must be non-empty and of equal length; on error the widget
    /// keeps its previous bars and selection.
    pub fn render_bars(&mut self, magnitudes: &[f64], scores: &[f64]) -> Result<()> {
        if magnitudes.len() != scores.len() {
            return Err(eyre!(
                "Got {} magnitudes for {} scores; each bar needs one of each",
                magnitudes.len(),
                scores.len()
            ));
        }
        if scores.is_empty() {
            return Err(eyre!("No scores to display"));
        }

        self.bars = magnitudes
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(rank, (magnitude, score))| Bar::new(rank, *magnitude, *score))
            .collect();
        self.selected = None;
        self.hovered = None;
        self.offset = 0;
        self.hit_boxes.clear();
        tracing::debug!(bars = self.bars.len(), "rendered bars");

        self.handle_bar_click(0)
    }

    /// Select the bar at `rank`, deselecting the previous one, and refresh the panel.
    pub fn handle_bar_click(&mut self, rank: usize) -> Result<()> {
        if rank >= self.bars.len() {
            return Err(eyre!(
                "No bar at rank {} ({} bars)",
                rank,
                self.bars.len()
            ));
        }

        if let Some(previous) = self.selected.and_then(|i| self.bars.get_mut(i)) {
            previous.selected = false;
        }
        let bar = &mut self.bars[rank];
        bar.selected = true;
        self.selected = Some(rank);

        let (rank, score) = (bar.rank, bar.score);
        self.panel.set_image_source(self.derive_image_path(rank));
        self.panel.set_rank_text(rank.to_string());
        self.panel.set_score_text(score.to_string());
        tracing::debug!(rank, score, "bar selected");
        Ok(())
    }

    /// Switch the image variant and refresh the image for the selected bar.
    pub fn set_image_layout(&mut self, mode: impl Into<String>) {
        self.image_type = mode.into();
        tracing::debug!(layout = %self.image_type, "image layout changed");
        if let Some(rank) = self.selected {
            self.panel.set_image_source(self.derive_image_path(rank));
        }
    }

    /// Image path for `rank` under the current layout, e.g. `data/3_bin.png`.
    pub fn derive_image_path(&self, rank: usize) -> String {
        format!("data/{}{}.png", rank, self.image_type)
    }

    pub fn image_layout(&self) -> &str {
        &self.image_type
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn selected(&self) -> Option<&Bar> {
        self.selected.and_then(|i| self.bars.get(i))
    }

    pub fn selected_rank(&self) -> Option<usize> {
        self.selected
    }

    pub fn hovered_rank(&self) -> Option<usize> {
        self.hovered
    }

    pub fn panel(&self) -> &ResultPanel {
        &self.panel
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn hover_in(&mut self, rank: usize) {
        if self.hovered == Some(rank) {
            return;
        }
        self.hover_out();
        if let Some(bar) = self.bars.get_mut(rank) {
            bar.hovered = true;
            self.hovered = Some(rank);
        }
    }

    pub fn hover_out(&mut self) {
        if let Some(bar) = self.hovered.take().and_then(|i| self.bars.get_mut(i)) {
            bar.hovered = false;
        }
    }

    pub fn select_next(&mut self) -> Result<()> {
        match self.selected {
            Some(i) if i + 1 < self.bars.len() => self.handle_bar_click(i + 1),
            Some(_) => Ok(()),
            None => self.select_first(),
        }
    }

    pub fn select_previous(&mut self) -> Result<()> {
        match self.selected {
            Some(i) if i > 0 => self.handle_bar_click(i - 1),
            Some(_) => Ok(()),
            None => self.select_first(),
        }
    }

    pub fn select_first(&mut self) -> Result<()> {
        self.handle_bar_click(0)
    }

    pub fn select_last(&mut self) -> Result<()> {
        self.handle_bar_click(self.bars.len().saturating_sub(1))
    }

    /// Rank of the bar drawn at the given terminal cell during the last draw.
    pub fn bar_at(&self, column: u16, row: u16) -> Option<usize> {
        let pos = Position::new(column, row);
        self.hit_boxes
            .iter()
            .find(|(_, area)| area.contains(pos))
            .map(|(rank, _)| *rank)
    }

    /// Update hover markers for a pointer at the given cell.
    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        match self.bar_at(column, row) {
            Some(rank) => self.hover_in(rank),
            None => self.hover_out(),
        }
    }

    /// Click at the given cell. Returns the selected rank when a bar was hit.
    pub fn pointer_clicked(&mut self, column: u16, row: u16) -> Result<Option<usize>> {
        match self.bar_at(column, row) {
            Some(rank) => {
                self.handle_bar_click(rank)?;
                Ok(Some(rank))
            }
            None => Ok(None),
        }
    }

    fn scroll_to_selection(&mut self, visible: usize) {
        let Some(selected) = self.selected else {
            return;
        };
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + visible {
            self.offset = selected + 1 - visible;
        }
        let max_offset = self.bars.len().saturating_sub(visible);
        self.offset = self.offset.min(max_offset);
    }

    fn bar_style(&self, bar: &Bar) -> Style {
        let color = if bar.selected {
            self.colors.selected
        } else if bar.hovered {
            self.colors.hovered
        } else {
            self.colors.normal
        };
        Style::default().fg(color)
    }
}

/// Number of terminal rows for a bar, at least one.
fn bar_rows(height: f64, tallest: f64, rows: u16) -> u16 {
    if tallest <= 0.0 || rows == 0 {
        return rows.min(1);
    }
    let scaled = (height / tallest * rows as f64).round();
    (scaled.max(1.0) as u16).min(rows)
}

impl Widget for &mut BarSelector {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.hit_boxes.clear();
        if self.bars.is_empty() || area.width == 0 || area.height < 2 {
            return;
        }

        // Last row holds the selection marker
        let plot = Rect {
            height: area.height - 1,
            ..area
        };
        let marker_y = plot.bottom();

        let stride = self.bar_width.saturating_add(self.bar_gap);
        let visible =
            ((area.width.saturating_add(self.bar_gap) / stride.max(1)) as usize).max(1);
        self.scroll_to_selection(visible);

        let heights: Vec<f64> = self.bars.iter().map(|b| b.height).collect();
        let tallest = compute_max(&heights)
            .unwrap_or(0.0)
            .max(bar_height(1.0));

        for (slot, bar) in self.bars.iter().skip(self.offset).take(visible).enumerate() {
            let x = area.x + slot as u16 * stride;
            if x >= area.right() {
                break;
            }
            let width = self.bar_width.min(area.right() - x);
            let rows = bar_rows(bar.height, tallest, plot.height);
            let style = self.bar_style(bar);

            for y in (plot.bottom() - rows)..plot.bottom() {
                for cx in x..x + width {
                    if let Some(cell) = buf.cell_mut((cx, y)) {
                        cell.set_symbol(BAR_SYMBOL).set_style(style);
                    }
                }
            }
            if bar.selected {
                buf.set_string(
                    x,
                    marker_y,
                    SELECTED_MARKER,
                    Style::default().fg(self.colors.marker),
                );
            }

            self.hit_boxes
                .push((bar.rank, Rect::new(x, plot.y, width, plot.height)));
        }
    }
}
