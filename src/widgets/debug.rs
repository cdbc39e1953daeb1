use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub num_mouse_events: usize,
    pub last_key_event_name: String,
    /// Last action taken (e.g. "select_next") for debugging key handling.
    pub last_action: String,
    pub enabled: bool,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
    }

    pub fn on_mouse(&mut self) {
        self.num_mouse_events += 1;
    }

    pub fn action(&mut self, action: &str) {
        self.last_action = action.to_string();
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!(
            "events={} keys={} mouse={} last_key={} last_action={} frames={}",
            self.num_events,
            self.num_key_events,
            self.num_mouse_events,
            self.last_key_event_name,
            self.last_action,
            self.num_frames,
        ))
        .render(area, buf);
    }
}
