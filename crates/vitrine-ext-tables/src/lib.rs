//! Reference synthetic tables built on the Vitrine virtual table framework.
//!
//! Three table families validate the planning and cursor protocol:
//!
//! 1. **series**: `series(START, STOP [, STEP])` — an integer sequence with
//!    optional step and planner-consumed descending order.
//! 2. **calendar**: a date sequence between two bounds, stepped by a
//!    frequency (daily through yearly), with `year =` range inference.
//! 3. **dictionary / environment**: a static key-value mapping exposed as a
//!    two-column table; full scan only.

pub mod calendar;
pub mod dictionary;
pub mod series;

pub use calendar::{CalendarCursor, CalendarTable, Frequency};
pub use dictionary::{DictionaryCursor, DictionaryTable, EnvironmentTable};
pub use series::{SeriesCursor, SeriesTable};

#[must_use]
pub const fn extension_name() -> &'static str {
    "tables"
}
