//! Pitch-accent graphs / 声调图

pub mod layout;

pub use layout::{layout, layout_with, AccentLayout, AccentPoint, LayoutMetrics, Pitch};
