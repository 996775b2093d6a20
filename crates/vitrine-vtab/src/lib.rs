//! Virtual table and cursor traits plus the query-planning protocol.
//!
//! Virtual tables expose code-backed data sources as SQL tables. The engine
//! drives them through the xCreate/xConnect/xBestIndex/xFilter/xNext call
//! sequence; this crate models that contract as plain Rust traits:
//!
//! 1. The engine compiles a query and calls [`VirtualTable::best_index`]
//!    with the candidate WHERE constraints and ORDER BY terms.
//! 2. The table scores the constraints, registers a [`FilterPlan`] in its
//!    [`PlanRegistry`], and hands back the plan id as the query's index
//!    number.
//! 3. At execution the engine opens a [`VirtualTableCursor`], calls
//!    [`filter`](VirtualTableCursor::filter) with the concrete argument
//!    values and the plan id, then iterates `next`/`eof`/`column`/`rowid`
//!    until exhaustion.
//!
//! All calls are synchronous and single-threaded per active scan; the only
//! state shared between concurrently open scans is the plan registry, which
//! isolates plans by id.

pub mod bounds;
pub mod plan;
pub mod planning;
pub mod table;

pub use bounds::ScanBounds;
pub use plan::{FilterArgument, FilterPlan, PlanBuilder, PlanRegistry};
pub use planning::{
    BestIndexResult, ConstraintOp, IndexConstraint, IndexConstraintUsage, IndexInfo, IndexOrderBy,
};
pub use table::{
    ColumnContext, CreateArgs, TableInstance, TableOptions, VirtualTable, VirtualTableCursor,
};

/// Hard ceiling on rows produced by a single scan.
///
/// Synthetic tables with default bounds can span practically unbounded
/// ranges; every cursor treats exceeding this count as end-of-scan.
pub const MAX_SCAN_ROWS: i64 = 1 << 20;
