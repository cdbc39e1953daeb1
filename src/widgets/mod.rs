pub mod bar_selector;
pub mod controls;
pub mod debug;
pub mod result_panel;
