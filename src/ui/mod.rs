//! Terminal rendering: chart panel, scrollback panel, chrome, and theme.

pub mod chart;
pub mod common;
pub mod scrollback;
pub mod theme;

pub use theme::{series_color, Theme};
