//! Integer series table: `series(START, STOP [, STEP])`.
//!
//! Produces the integers `start, start+step, ..., <= stop`. The value
//! column accepts any range comparison; the three hidden parameter columns
//! take equality bindings only. A single-column ORDER BY on the value
//! column is consumed when both bounds are pinned, so `ORDER BY value DESC`
//! walks the range backward without an external sort.

use std::sync::Arc;

use tracing::debug;
use vitrine_error::Result;
use vitrine_types::SqlValue;
use vitrine_vtab::{
    BestIndexResult, ColumnContext, ConstraintOp, CreateArgs, FilterPlan, IndexInfo,
    MAX_SCAN_ROWS, PlanBuilder, PlanRegistry, ScanBounds, TableOptions, VirtualTable,
    VirtualTableCursor,
};

const SCHEMA: &str =
    "CREATE TABLE x(value INTEGER, start INTEGER HIDDEN, stop INTEGER HIDDEN, step INTEGER HIDDEN)";

const DEFAULT_START: i64 = 0;
const DEFAULT_STOP: i64 = 100;
const DEFAULT_STEP: i64 = 1;

/// Estimated rows for a scan with both bounds pinned.
const BOUNDED_ESTIMATE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Value,
    Start,
    Stop,
    Step,
}

impl Column {
    const fn from_index(i: i32) -> Option<Self> {
        match i {
            0 => Some(Self::Value),
            1 => Some(Self::Start),
            2 => Some(Self::Stop),
            3 => Some(Self::Step),
            _ => None,
        }
    }

    const fn is_hidden(self) -> bool {
        !matches!(self, Self::Value)
    }
}

/// The series module instance: default bounds parsed from the creation
/// arguments, plus the plan registry shared with its cursors.
pub struct SeriesTable {
    start: i64,
    stop: i64,
    step: i64,
    plans: Arc<PlanRegistry>,
}

impl SeriesTable {
    /// Build a series with explicit default bounds. `step` is clamped to a
    /// minimum of 1; direction comes from the plan, not the step sign.
    #[must_use]
    pub fn with_range(start: i64, stop: i64, step: i64) -> Self {
        Self {
            start,
            stop,
            step: step.max(1),
            plans: Arc::new(PlanRegistry::new()),
        }
    }
}

impl VirtualTable for SeriesTable {
    type Cursor = SeriesCursor;

    fn connect(args: &CreateArgs) -> Result<Self> {
        // Unparseable or missing parameters fall back to the documented
        // defaults, never an error.
        let start = args.parameter_or(0, DEFAULT_START);
        let stop = args.parameter_or(1, DEFAULT_STOP);
        let step = args.parameter_or(2, DEFAULT_STEP);
        Ok(Self::with_range(start, stop, step))
    }

    fn schema(&self) -> &str {
        SCHEMA
    }

    fn options(&self) -> TableOptions {
        TableOptions {
            innocuous: true,
            ..TableOptions::default()
        }
    }

    fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult> {
        let mut builder = PlanBuilder::new();
        let mut has_min = false;
        let mut has_max = false;
        let mut has_step = false;
        let mut unique = false;

        for (i, constraint) in info.constraints.iter().enumerate() {
            let Some(column) = Column::from_index(constraint.column) else {
                continue;
            };
            if column.is_hidden() {
                // Parameter columns take equality bindings only; anything
                // else means this constraint set has no usable plan.
                if !constraint.usable || constraint.op != ConstraintOp::Eq {
                    return Ok(BestIndexResult::Constraint);
                }
                let argv = builder.accept(constraint.column, constraint.op);
                info.constraint_usage[i].argv_index = i32::try_from(argv).unwrap_or(0) + 1;
                info.constraint_usage[i].omit = true;
                match column {
                    Column::Start => has_min = true,
                    Column::Stop => has_max = true,
                    Column::Step => has_step = true,
                    Column::Value => unreachable!("value column is not hidden"),
                }
            } else {
                if !constraint.usable || !constraint.op.is_range_op() {
                    continue;
                }
                let argv = builder.accept(constraint.column, constraint.op);
                info.constraint_usage[i].argv_index = i32::try_from(argv).unwrap_or(0) + 1;
                info.constraint_usage[i].omit = true;
                match constraint.op {
                    ConstraintOp::Eq | ConstraintOp::Is => {
                        unique = true;
                        has_min = true;
                        has_max = true;
                    }
                    ConstraintOp::Gt | ConstraintOp::Ge => has_min = true,
                    ConstraintOp::Lt | ConstraintOp::Le => has_max = true,
                    _ => {}
                }
            }
        }

        if unique {
            info.estimated_rows = 1;
            info.estimated_cost = 1.0;
            info.scan_unique = true;
        } else if has_min && has_max {
            info.estimated_rows = if has_step {
                BOUNDED_ESTIMATE / 2
            } else {
                BOUNDED_ESTIMATE
            };
            #[allow(clippy::cast_precision_loss)]
            {
                info.estimated_cost = info.estimated_rows as f64;
            }
        }

        if let Some(term) = info.single_order_by() {
            let (column, desc) = (term.column, term.desc);
            if column == 0 && has_min && has_max {
                info.order_by_consumed = true;
                builder.set_descending(desc);
            }
        }

        info.idx_num = builder.register(&self.plans, info.columns_used);
        Ok(BestIndexResult::Ok)
    }

    fn open(&self) -> Result<SeriesCursor> {
        Ok(SeriesCursor {
            default_start: self.start,
            default_stop: self.stop,
            default_step: self.step,
            plans: Arc::clone(&self.plans),
            plan: None,
            bounds: ScanBounds::new(1, 0),
            step: self.step,
            descending: false,
            pos: 0,
            row: 1,
        })
    }
}

/// Cursor over one series scan.
pub struct SeriesCursor {
    default_start: i64,
    default_stop: i64,
    default_step: i64,
    plans: Arc<PlanRegistry>,
    plan: Option<Arc<FilterPlan>>,
    bounds: ScanBounds,
    step: i64,
    descending: bool,
    pos: i64,
    row: i64,
}

impl VirtualTableCursor for SeriesCursor {
    fn filter(&mut self, plan_id: i32, _plan_str: Option<&str>, args: &[SqlValue]) -> Result<()> {
        self.row = 1;

        // Re-filter of an already-resolved plan (cursor rewind) short-cuts
        // the registry; otherwise consume the one-shot registry entry.
        let plan = match self.plan.take().filter(|p| p.id == plan_id) {
            Some(p) => Some(p),
            None => self.plans.take(plan_id),
        };
        let Some(plan) = plan else {
            debug!(plan_id, "unknown or stale plan id; producing empty scan");
            self.bounds.mark_empty();
            return Ok(());
        };

        self.bounds = ScanBounds::new(self.default_start, self.default_stop);
        self.step = self.default_step;
        self.descending = plan.descending;

        // Parameter bindings first: they redefine the series. Value-column
        // constraints then narrow it. A NULL (or missing) bound argument
        // poisons the whole scan — comparisons against NULL can never be
        // satisfied, and a later parameter must not resurrect the range.
        let mut poisoned = false;
        for arg in &plan.arguments {
            let Some(value) = args.get(arg.argv_index as usize) else {
                poisoned = true;
                break;
            };
            if value.is_null() {
                poisoned = true;
                break;
            }
            match Column::from_index(arg.column) {
                Some(Column::Start) => self.bounds.min = value.to_integer(),
                Some(Column::Stop) => self.bounds.max = value.to_integer(),
                Some(Column::Step) => self.step = value.to_integer().max(1),
                _ => {}
            }
        }
        if poisoned {
            self.bounds.mark_empty();
        } else {
            for arg in &plan.arguments {
                if Column::from_index(arg.column) == Some(Column::Value) {
                    if let Some(value) = args.get(arg.argv_index as usize) {
                        self.bounds.narrow_value(arg.op, value);
                    }
                }
            }
        }

        self.pos = self.bounds.first_position(self.descending, self.step);
        debug!(
            min = self.bounds.min,
            max = self.bounds.max,
            step = self.step,
            descending = self.descending,
            "series scan initialized"
        );
        self.plan = Some(plan);
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        self.pos = if self.descending {
            self.pos.saturating_sub(self.step)
        } else {
            self.pos.saturating_add(self.step)
        };
        self.row += 1;
        Ok(())
    }

    fn eof(&self) -> bool {
        if self.bounds.is_empty() || self.row > MAX_SCAN_ROWS {
            return true;
        }
        if self.descending {
            self.pos < self.bounds.min
        } else {
            self.pos > self.bounds.max
        }
    }

    fn column(&self, ctx: &mut ColumnContext, col: i32) -> Result<()> {
        let value = match Column::from_index(col) {
            Some(Column::Value) => SqlValue::Integer(self.pos),
            // Hidden parameter columns report their resolved bounds, not
            // per-row data.
            Some(Column::Start) => SqlValue::Integer(self.bounds.min),
            Some(Column::Stop) => SqlValue::Integer(self.bounds.max),
            Some(Column::Step) => SqlValue::Integer(self.step),
            None => SqlValue::Null,
        };
        ctx.set_value(value);
        Ok(())
    }

    fn rowid(&self) -> Result<i64> {
        Ok(self.row)
    }
}
