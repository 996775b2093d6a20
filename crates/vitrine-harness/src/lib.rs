//! Engine-side driver for exercising virtual tables the way the query
//! planner does.
//!
//! The real engine compiles a query, negotiates a plan through
//! `best_index`, then executes it through the cursor lifecycle. Tests
//! reproduce that control flow with two calls:
//!
//! ```text
//! compile(table, constraints, order_by)  -> best_index negotiation
//! scan(table, &compiled, &[columns...])  -> filter/next/eof/column loop
//! ```
//!
//! [`compile`] also enforces the wire invariants the engine relies on:
//! argument positions assigned by the table must be contiguous from 1,
//! and each position must be assigned at most once.

use tracing::debug;
use vitrine_error::{Result, VitrineError};
use vitrine_types::SqlValue;
use vitrine_vtab::{
    BestIndexResult, ColumnContext, ConstraintOp, IndexConstraint, IndexInfo, IndexOrderBy,
    TableInstance,
};

/// One WHERE-clause constraint as the planner would offer it, together
/// with the concrete value the engine would bind at execution time.
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub column: i32,
    pub op: ConstraintOp,
    pub usable: bool,
    pub value: SqlValue,
}

impl ConstraintSpec {
    /// A usable constraint binding `value`.
    #[must_use]
    pub fn usable(column: i32, op: ConstraintOp, value: impl Into<SqlValue>) -> Self {
        Self {
            column,
            op,
            usable: true,
            value: value.into(),
        }
    }

    /// A constraint the planner marks unusable (no value will be bound).
    #[must_use]
    pub fn unusable(column: i32, op: ConstraintOp) -> Self {
        Self {
            column,
            op,
            usable: false,
            value: SqlValue::Null,
        }
    }
}

/// A negotiated query plan, ready to execute.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// The planner exchange as the table left it.
    pub info: IndexInfo,
    /// Concrete argument values in argument-position order.
    pub args: Vec<SqlValue>,
}

/// Outcome of compiling one query against a table.
#[derive(Debug, Clone)]
pub enum Compiled {
    /// A plan was negotiated.
    Query(CompiledQuery),
    /// The table reported the constraint set unusable.
    Constraint,
}

impl Compiled {
    /// Unwrap the compiled query, panicking on a `Constraint` outcome.
    /// Test convenience only.
    #[must_use]
    pub fn expect_query(self) -> CompiledQuery {
        match self {
            Self::Query(q) => q,
            Self::Constraint => panic!("expected a usable plan, got a constraint outcome"),
        }
    }

    /// Whether compilation ended in a `Constraint` outcome.
    #[must_use]
    pub const fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint)
    }
}

/// Run the `best_index` negotiation for one query.
///
/// # Errors
///
/// Returns an error if the table violates the argument-assignment wire
/// invariant (gaps or duplicates in the assigned positions).
pub fn compile(
    table: &dyn TableInstance,
    constraints: &[ConstraintSpec],
    order_by: &[IndexOrderBy],
) -> Result<Compiled> {
    let offered: Vec<IndexConstraint> = constraints
        .iter()
        .map(|spec| IndexConstraint {
            column: spec.column,
            op: spec.op,
            usable: spec.usable,
        })
        .collect();
    let mut info = IndexInfo::new(offered, order_by.to_vec());

    if table.best_index(&mut info)? == BestIndexResult::Constraint {
        debug!("best_index reported no usable plan");
        return Ok(Compiled::Constraint);
    }

    // Collect bound values in argument-position order, checking that the
    // assignment is contiguous from 1 with no duplicates.
    let mut slots: Vec<Option<SqlValue>> = vec![None; constraints.len()];
    let mut assigned = 0usize;
    for (i, usage) in info.constraint_usage.iter().enumerate() {
        if usage.argv_index == 0 {
            continue;
        }
        let position = usize::try_from(usage.argv_index - 1)
            .map_err(|_| VitrineError::internal("negative argument position"))?;
        let slot = slots
            .get_mut(position)
            .ok_or_else(|| VitrineError::internal("argument position out of range"))?;
        if slot.is_some() {
            return Err(VitrineError::internal(format!(
                "argument position {} assigned twice",
                usage.argv_index
            )));
        }
        if !constraints[i].usable {
            return Err(VitrineError::internal(
                "table consumed a constraint marked unusable",
            ));
        }
        *slot = Some(constraints[i].value.clone());
        assigned += 1;
    }
    let mut args = Vec::with_capacity(assigned);
    let mut seen_gap = false;
    for slot in slots {
        match slot {
            Some(value) if !seen_gap => args.push(value),
            Some(_) => {
                return Err(VitrineError::internal(
                    "argument positions are not contiguous from 1",
                ));
            }
            None => seen_gap = true,
        }
    }

    Ok(Compiled::Query(CompiledQuery { info, args }))
}

/// Execute a compiled query, collecting the requested columns of every
/// produced row, up to `limit` rows.
///
/// # Errors
///
/// Propagates any cursor error as an abort-scan signal.
pub fn scan_limited(
    table: &dyn TableInstance,
    query: &CompiledQuery,
    columns: &[i32],
    limit: usize,
) -> Result<Vec<Vec<SqlValue>>> {
    let mut cursor = table.open_cursor()?;
    cursor.filter(query.info.idx_num, query.info.idx_str.as_deref(), &query.args)?;

    let mut rows = Vec::new();
    while !cursor.eof() && rows.len() < limit {
        let mut row = Vec::with_capacity(columns.len());
        for &col in columns {
            let mut ctx = ColumnContext::new();
            cursor.column(&mut ctx, col)?;
            row.push(ctx.take_value().unwrap_or(SqlValue::Null));
        }
        rows.push(row);
        cursor.next()?;
    }
    Ok(rows)
}

/// Execute a compiled query to exhaustion.
///
/// # Errors
///
/// Propagates any cursor error as an abort-scan signal.
pub fn scan(
    table: &dyn TableInstance,
    query: &CompiledQuery,
    columns: &[i32],
) -> Result<Vec<Vec<SqlValue>>> {
    scan_limited(table, query, columns, usize::MAX)
}

/// Single-column convenience: the integer values of column 0.
///
/// # Errors
///
/// Propagates any cursor error; non-integer values become an error.
pub fn scan_integers(table: &dyn TableInstance, query: &CompiledQuery) -> Result<Vec<i64>> {
    scan(table, query, &[0])?
        .into_iter()
        .map(|row| {
            row[0]
                .as_integer()
                .ok_or_else(|| VitrineError::internal("expected an integer value column"))
        })
        .collect()
}
