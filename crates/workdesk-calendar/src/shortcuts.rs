//! Keyboard shortcuts for switching calendar views.

use crate::view::CalendarView;

/// What currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    None,
    TextInput,
    TextArea,
    ContentEditable,
    Other,
}

impl FocusTarget {
    pub fn accepts_text(self) -> bool {
        matches!(
            self,
            FocusTarget::TextInput | FocusTarget::TextArea | FocusTarget::ContentEditable
        )
    }
}

/// Surrounding UI state when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyContext {
    pub dialog_open: bool,
    pub focus: FocusTarget,
    /// Ctrl, Alt or Meta held.
    pub modifier_held: bool,
}

impl KeyContext {
    /// Shortcuts would swallow typed characters or browser/OS chords.
    pub fn shortcuts_enabled(&self) -> bool {
        !self.dialog_open && !self.focus.accepts_text() && !self.modifier_held
    }
}

/// View selected by `key`: m, w, d, a, y (case-insensitive).
pub fn view_for_key(key: &str, ctx: KeyContext) -> Option<CalendarView> {
    if !ctx.shortcuts_enabled() {
        return None;
    }

    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };

    match c.to_ascii_lowercase() {
        'm' => Some(CalendarView::Month),
        'w' => Some(CalendarView::Week),
        'd' => Some(CalendarView::Day),
        'a' => Some(CalendarView::Agenda),
        'y' => Some(CalendarView::Year),
        _ => None,
    }
}
