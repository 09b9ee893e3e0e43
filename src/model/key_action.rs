//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// crossterm::event::KeyEvent to KeyAction is handled by KeyBindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application. Default: q/Esc
    Quit,

    // Ordering
    /// Sort by the configured sort field at this 0-based slot. Pressing the same
    /// slot again reverses the order. Default: 1-9
    SortBy(usize),
    /// Reverse the current order. Default: r
    Reverse,

    // Filtering
    /// Advance the filter to the next distinct value of the filter field. Default: f
    NextFilter,
    /// Remove the active filter. Default: F
    ClearFilter,

    // Collection mutation
    /// Remove the last item of the dataset. Default: p
    Pop,
    /// Remove the first item of the dataset. Default: x
    Shift,
    /// Append the most recently removed item. Default: a
    PushBack,
    /// Prepend the most recently removed item. Default: u
    UnshiftBack,
    /// Remove every item. Default: c
    Clear,
    /// Restore the full dataset as it was loaded. Default: R
    Reset,
}
