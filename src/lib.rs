//! Session analytics for fitness studio class exports

pub mod cli;
pub mod services;
pub mod tui;
pub mod types;
