//! Domain-level keyboard actions independent of key bindings.

/// Actions the demo understands.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll the focused column down by one step. Default: j/↓
    ScrollDown,
    /// Scroll the focused column up by one step. Default: k/↑
    ScrollUp,
    /// Scroll down by one viewport height. Default: Ctrl+d/Page Down
    PageDown,
    /// Scroll up by one viewport height. Default: Ctrl+u/Page Up
    PageUp,
    /// Jump to the top of the column. Default: g/Home
    ScrollToTop,
    /// Jump to the bottom of the column. Default: G/End
    ScrollToBottom,

    // Focus
    /// Move focus to the next column. Default: Tab/l/→
    NextColumn,
    /// Move focus to the previous column. Default: Shift+Tab/h/←
    PrevColumn,

    // Application
    /// Quit. Default: q/Esc
    Quit,
}
