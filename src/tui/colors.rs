//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Border of the focused field
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Error alerts and inline location errors
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Success alerts
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Status bar and buttons
pub const BRAND_BLUE: Color = Color::Rgb(37, 99, 235);
/// Secondary hints
pub const SLATE: Color = Color::Rgb(100, 116, 139);
