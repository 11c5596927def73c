//! Calendar for Workdesk.
//!
//! Event model and storage conversion, the date/view engine behind the month,
//! week, day, agenda and year views, and the CRUD synchronizer.

pub mod client;
pub mod error;
pub mod grid;
pub mod record;
pub mod shortcuts;
pub mod store;
pub mod sync;
pub mod timing;
pub mod types;
pub mod view;

pub use client::RemoteEventStore;
pub use error::CalendarError;
pub use grid::{agenda, events_for_day, month_grid, week_days, year_grid, AgendaDay, MonthGrid};
pub use record::EventRecord;
pub use shortcuts::{view_for_key, FocusTarget, KeyContext};
pub use store::{DateRange, EventStore, LocalEventStore, Principal};
pub use sync::{EventSynchronizer, Notification};
pub use timing::{day_click_start, default_end, default_start, snap_to_quarter_hour, to_instant};
pub use types::{CalendarEvent, EventColor};
pub use view::{CalendarView, ViewState, AGENDA_DAYS_TO_SHOW};
