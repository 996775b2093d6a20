//! Types exchanged with the query planner during index selection.

// ---------------------------------------------------------------------------
// Constraint operators
// ---------------------------------------------------------------------------

/// Comparison operator for an index constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    Match,
    Like,
    Glob,
    Regexp,
    Ne,
    Is,
    IsNot,
    IsNull,
    IsNotNull,
    /// Table-specific function overload constraint.
    Function,
}

impl ConstraintOp {
    /// Human-readable operator name for plan diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Match => "MATCH",
            Self::Like => "LIKE",
            Self::Glob => "GLOB",
            Self::Regexp => "REGEXP",
            Self::Ne => "!=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::IsNull => "ISNULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::Function => "function",
        }
    }

    /// Whether this operator narrows a contiguous range of values.
    ///
    /// These are the operators the general-purpose bound-narrowing helper
    /// understands; everything else is left for the engine to re-check.
    #[must_use]
    pub const fn is_range_op(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::Is
        )
    }
}

// ---------------------------------------------------------------------------
// Planner inputs
// ---------------------------------------------------------------------------

/// A single WHERE-clause constraint the planner is considering.
#[derive(Debug, Clone)]
pub struct IndexConstraint {
    /// Column index (0-based; `-1` for rowid).
    pub column: i32,
    /// The comparison operator.
    pub op: ConstraintOp,
    /// Whether the planner considers this constraint usable.
    pub usable: bool,
}

/// A single ORDER BY term from the query.
#[derive(Debug, Clone)]
pub struct IndexOrderBy {
    /// Column index (0-based).
    pub column: i32,
    /// `true` if descending, `false` if ascending.
    pub desc: bool,
}

// ---------------------------------------------------------------------------
// Planner outputs
// ---------------------------------------------------------------------------

/// Per-constraint usage information filled in by `best_index`.
#[derive(Debug, Clone, Default)]
pub struct IndexConstraintUsage {
    /// 1-based position in the argument array later passed to `filter`.
    /// 0 means this constraint is not consumed by the table.
    pub argv_index: i32,
    /// If `true`, the table guarantees the constraint is satisfied and the
    /// engine need not double-check it.
    pub omit: bool,
}

/// Outcome of an index-selection negotiation.
///
/// `Constraint` is a normal, expected result — the offered constraints
/// cannot produce a usable plan (for example, a non-equality operator on a
/// hidden parameter column) and the planner should try another approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestIndexResult {
    /// A plan was selected; the `IndexInfo` output fields are valid.
    Ok,
    /// No usable plan exists for the offered constraint set.
    Constraint,
}

/// Information exchanged between the query planner and a virtual table
/// during index selection.
///
/// The planner fills `constraints`, `order_by`, and `columns_used`; the
/// table fills everything else.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    /// WHERE clause constraints the planner is considering.
    pub constraints: Vec<IndexConstraint>,
    /// ORDER BY terms from the query.
    pub order_by: Vec<IndexOrderBy>,
    /// Bitmask of columns the query actually references (bit N = column N,
    /// bit 63 = column 63 and beyond).
    pub columns_used: u64,
    /// How each constraint maps to filter arguments (table fills this).
    pub constraint_usage: Vec<IndexConstraintUsage>,
    /// Plan id correlating this decision with the later `filter` call.
    pub idx_num: i32,
    /// Optional string identifier for the chosen plan.
    pub idx_str: Option<String>,
    /// Whether the table guarantees output in the requested order.
    pub order_by_consumed: bool,
    /// Whether the plan visits at most one row.
    pub scan_unique: bool,
    /// Estimated cost of the scan (lower is better).
    pub estimated_cost: f64,
    /// Estimated number of rows returned.
    pub estimated_rows: i64,
}

impl IndexInfo {
    /// Planner defaults before a table has scored anything: an unbounded
    /// full-scan estimate.
    pub const UNBOUNDED_ESTIMATE: i64 = 1_000_000;

    /// Create a new `IndexInfo` for the given constraints and order-by terms.
    #[must_use]
    pub fn new(constraints: Vec<IndexConstraint>, order_by: Vec<IndexOrderBy>) -> Self {
        let usage_len = constraints.len();
        Self {
            constraints,
            order_by,
            columns_used: u64::MAX,
            constraint_usage: vec![IndexConstraintUsage::default(); usage_len],
            idx_num: 0,
            idx_str: None,
            order_by_consumed: false,
            scan_unique: false,
            estimated_cost: Self::UNBOUNDED_ESTIMATE as f64,
            estimated_rows: Self::UNBOUNDED_ESTIMATE,
        }
    }

    /// The single order-by term, if the query requested exactly one.
    ///
    /// Multi-key orderings are never consumed by the in-tree tables, so the
    /// common probe is "one term on my value column, which direction".
    #[must_use]
    pub fn single_order_by(&self) -> Option<&IndexOrderBy> {
        match self.order_by.as_slice() {
            [term] => Some(term),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_covers_every_operator() {
        let ops = [
            ConstraintOp::Eq,
            ConstraintOp::Gt,
            ConstraintOp::Ge,
            ConstraintOp::Lt,
            ConstraintOp::Le,
            ConstraintOp::Match,
            ConstraintOp::Like,
            ConstraintOp::Glob,
            ConstraintOp::Regexp,
            ConstraintOp::Ne,
            ConstraintOp::Is,
            ConstraintOp::IsNot,
            ConstraintOp::IsNull,
            ConstraintOp::IsNotNull,
            ConstraintOp::Function,
        ];
        for op in ops {
            assert!(!op.describe().is_empty());
        }
        assert_eq!(ConstraintOp::Eq.describe(), "=");
        assert_eq!(ConstraintOp::IsNot.describe(), "IS NOT");
    }

    #[test]
    fn range_ops() {
        assert!(ConstraintOp::Eq.is_range_op());
        assert!(ConstraintOp::Le.is_range_op());
        assert!(!ConstraintOp::Like.is_range_op());
        assert!(!ConstraintOp::IsNull.is_range_op());
    }

    #[test]
    fn index_info_defaults() {
        let info = IndexInfo::new(
            vec![IndexConstraint {
                column: 0,
                op: ConstraintOp::Gt,
                usable: true,
            }],
            vec![],
        );
        assert_eq!(info.constraint_usage.len(), 1);
        assert_eq!(info.constraint_usage[0].argv_index, 0);
        assert_eq!(info.idx_num, 0);
        assert!(!info.order_by_consumed);
        assert!(!info.scan_unique);
        assert_eq!(info.estimated_rows, IndexInfo::UNBOUNDED_ESTIMATE);
        assert_eq!(info.columns_used, u64::MAX);
    }

    #[test]
    fn single_order_by_requires_exactly_one_term() {
        let none = IndexInfo::new(vec![], vec![]);
        assert!(none.single_order_by().is_none());

        let one = IndexInfo::new(
            vec![],
            vec![IndexOrderBy {
                column: 0,
                desc: true,
            }],
        );
        assert!(one.single_order_by().is_some_and(|t| t.desc));

        let two = IndexInfo::new(
            vec![],
            vec![
                IndexOrderBy {
                    column: 0,
                    desc: false,
                },
                IndexOrderBy {
                    column: 1,
                    desc: false,
                },
            ],
        );
        assert!(two.single_order_by().is_none());
    }
}
