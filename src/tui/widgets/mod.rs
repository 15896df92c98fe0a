//! TUI widgets

pub mod comparison;
pub mod help;
pub mod overview;
pub mod spinner;
pub mod tabs;
