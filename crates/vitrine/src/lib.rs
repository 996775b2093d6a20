//! Vitrine: synthetic, code-backed SQL tables.
//!
//! The workspace models the virtual table contract of an embedded SQL
//! engine: application code implements [`VirtualTable`] +
//! [`VirtualTableCursor`] for a table "kind", registers it in a
//! [`ModuleRegistry`], and the engine drives planning and row production
//! through the bestIndex/filter protocol.
//!
//! This facade crate re-exports the public surface and owns the
//! name-to-module registry plus the integer-handle arena the engine host
//! uses to track live table instances.

pub mod registry;

pub use registry::{ModuleRegistry, TableArena, TableHandle, register_builtin_modules};
pub use vitrine_error::{Result, VitrineError};
pub use vitrine_ext_tables::{
    CalendarTable, DictionaryTable, EnvironmentTable, Frequency, SeriesTable,
};
pub use vitrine_types::SqlValue;
pub use vitrine_vtab::{
    BestIndexResult, ColumnContext, ConstraintOp, CreateArgs, FilterArgument, FilterPlan,
    IndexConstraint, IndexConstraintUsage, IndexInfo, IndexOrderBy, MAX_SCAN_ROWS, PlanBuilder,
    PlanRegistry, ScanBounds, TableInstance, TableOptions, VirtualTable, VirtualTableCursor,
};
