//! Board styling configuration.
//!
//! Placeholders render dim, content cards bordered, the focused column highlighted.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== BoardStyles =====

/// Styles for the deferred list board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardStyles {
    /// Placeholder block and its size label.
    pub placeholder: Style,
    /// Border of a content card.
    pub card_border: Style,
    /// Card title.
    pub card_title: Style,
    /// Border of the focused column.
    pub focused_column: Style,
    /// Border of unfocused columns.
    pub column: Style,
    /// Status bar.
    pub status: Style,
}

impl BoardStyles {
    /// Styles for the given color configuration.
    ///
    /// Without colors, only modifiers distinguish the parts.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                placeholder: Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
                card_border: Style::default().fg(Color::Cyan),
                card_title: Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                focused_column: Style::default().fg(Color::Green),
                column: Style::default().fg(Color::Gray),
                status: Style::default().fg(Color::Black).bg(Color::Gray),
            }
        } else {
            Self {
                placeholder: Style::default().add_modifier(Modifier::DIM),
                card_border: Style::default(),
                card_title: Style::default().add_modifier(Modifier::BOLD),
                focused_column: Style::default().add_modifier(Modifier::BOLD),
                column: Style::default(),
                status: Style::default().add_modifier(Modifier::REVERSED),
            }
        }
    }
}

impl Default for BoardStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}
