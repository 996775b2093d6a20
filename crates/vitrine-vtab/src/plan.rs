//! Filter plans and the per-module plan registry.
//!
//! `best_index` encodes its decision as a [`FilterPlan`] stored in the
//! module's [`PlanRegistry`]; the plan id travels to the engine as the
//! query's index number and comes back in the matching `filter` call.
//! Plans are one-shot: `filter` removes exactly the entry it consumes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::planning::ConstraintOp;

/// One resolved constraint binding: which filter argument carries the value
/// for which column under which operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArgument {
    /// 0-based position in the argument array passed to `filter`.
    pub argv_index: u32,
    /// Target column index (0-based; `-1` for rowid).
    pub column: i32,
    /// Operator the engine promised for this binding.
    pub op: ConstraintOp,
}

/// The full planning decision for one compiled query.
///
/// Created exactly once during `best_index`, read exactly once by the
/// cursor executing that query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    /// Opaque identifier handed to the engine as the index number.
    pub id: i32,
    /// Accepted constraints in argument order: `arguments[i].argv_index == i`.
    pub arguments: Vec<FilterArgument>,
    /// Bitmask of columns the query references.
    pub columns_used: u64,
    /// Whether the cursor should produce rows in descending order.
    pub descending: bool,
}

/// Accumulates accepted constraints during `best_index`, assigning
/// contiguous argument positions in acceptance order.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    arguments: Vec<FilterArgument>,
    descending: bool,
}

impl PlanBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a constraint, returning its assigned 0-based argument position.
    ///
    /// The corresponding `IndexConstraintUsage.argv_index` is this value
    /// plus one (the wire boundary is 1-based).
    pub fn accept(&mut self, column: i32, op: ConstraintOp) -> u32 {
        let argv_index = u32::try_from(self.arguments.len()).unwrap_or(u32::MAX);
        self.arguments.push(FilterArgument {
            argv_index,
            column,
            op,
        });
        argv_index
    }

    /// Record the production direction chosen for this plan.
    pub fn set_descending(&mut self, descending: bool) {
        self.descending = descending;
    }

    /// Number of constraints accepted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Whether no constraint has been accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Finalize into the registry, returning the allocated plan id.
    pub fn register(self, registry: &PlanRegistry, columns_used: u64) -> i32 {
        registry.register(self.arguments, columns_used, self.descending)
    }
}

/// Per-module-instance storage correlating plan ids with filter plans.
///
/// Plan ids are allocated from a monotone counter and removal is selective:
/// consuming one plan never disturbs plans registered for other compiled
/// queries, so concurrent compilation against the same module is safe.
#[derive(Debug, Default)]
pub struct PlanRegistry {
    plans: Mutex<HashMap<i32, Arc<FilterPlan>>>,
    next_id: AtomicI32,
}

impl PlanRegistry {
    /// Create an empty registry. The first allocated plan id is 1; 0 is
    /// reserved to mean "no plan".
    #[must_use]
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    /// Store a new plan, returning its id.
    pub fn register(&self, arguments: Vec<FilterArgument>, columns_used: u64, descending: bool) -> i32 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let plan = Arc::new(FilterPlan {
            id,
            arguments,
            columns_used,
            descending,
        });
        debug!(
            plan_id = id,
            arguments = plan.arguments.len(),
            descending,
            "registered filter plan"
        );
        self.plans.lock().insert(id, plan);
        id
    }

    /// Remove and return the plan for `id`, if still present.
    ///
    /// Returns `None` for unknown or already-consumed ids; callers must
    /// fail closed (empty scan) in that case.
    #[must_use]
    pub fn take(&self, id: i32) -> Option<Arc<FilterPlan>> {
        self.plans.lock().remove(&id)
    }

    /// Number of plans currently pending consumption.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.lock().len()
    }

    /// Whether no plan is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.lock().is_empty()
    }
}
