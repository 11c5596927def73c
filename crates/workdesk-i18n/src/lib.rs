//! Localization for Workdesk.
//!
//! Resolves a language code to a translation table and calendar formatting rules.

pub mod format;
pub mod language;
pub mod locale;
pub mod names;

pub use language::{DatePattern, Language, WeekStart};
pub use locale::{interpolate, Locale, SharedLocale};
pub use names::{month_name, month_names, weekday_full, weekday_headers, weekday_short};
