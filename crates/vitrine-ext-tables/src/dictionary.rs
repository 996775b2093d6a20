//! Key-value tables: a static dictionary and a process-environment view.
//!
//! Both expose a two-column `(key, value)` schema and do no constraint
//! optimization — every query is a full scan, and the engine re-checks
//! whatever WHERE clauses it has. They exist to validate the framework's
//! degenerate path: a module whose `best_index` accepts nothing still
//! registers a (trivial) plan so the one-shot filter semantics hold
//! uniformly.

use std::sync::Arc;

use tracing::debug;
use vitrine_error::Result;
use vitrine_types::SqlValue;
use vitrine_vtab::{
    BestIndexResult, ColumnContext, CreateArgs, FilterPlan, IndexInfo, MAX_SCAN_ROWS,
    PlanRegistry, TableOptions, VirtualTable, VirtualTableCursor,
};

const SCHEMA: &str = "CREATE TABLE x(key TEXT, value TEXT)";

/// A static key-value mapping exposed as a two-column table.
pub struct DictionaryTable {
    entries: Arc<Vec<(String, String)>>,
    options: TableOptions,
    plans: Arc<PlanRegistry>,
}

impl DictionaryTable {
    /// Build a dictionary from key-value pairs, preserving order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Arc::new(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            options: TableOptions {
                innocuous: true,
                ..TableOptions::default()
            },
            plans: Arc::new(PlanRegistry::new()),
        }
    }

    /// Snapshot the process environment, sorted by variable name for
    /// deterministic scans.
    #[must_use]
    pub fn from_env() -> Self {
        let mut entries: Vec<(String, String)> = std::env::vars().collect();
        entries.sort();
        let mut table = Self::from_pairs(entries);
        // Environment access leaks process state: keep it out of triggers
        // and views, and never treat it as innocuous.
        table.options = TableOptions {
            direct_only: true,
            ..TableOptions::default()
        };
        table
    }

    fn scan_plan(&self, info: &mut IndexInfo) -> i32 {
        let len = i64::try_from(self.entries.len()).unwrap_or(i64::MAX);
        info.estimated_rows = len;
        #[allow(clippy::cast_precision_loss)]
        {
            info.estimated_cost = (len as f64).max(1.0);
        }
        self.plans.register(Vec::new(), info.columns_used, false)
    }
}

impl VirtualTable for DictionaryTable {
    type Cursor = DictionaryCursor;

    fn connect(args: &CreateArgs) -> Result<Self> {
        // Parameters of the form key=value seed the mapping; anything else
        // is ignored.
        let pairs = args.parameters.iter().filter_map(|p| {
            p.split_once('=')
                .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
        });
        debug!(table = %args.table_name, "connecting dictionary table");
        Ok(Self::from_pairs(pairs))
    }

    fn schema(&self) -> &str {
        SCHEMA
    }

    fn options(&self) -> TableOptions {
        self.options
    }

    fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult> {
        // Full scan only: no constraint is consumed, no order is promised.
        info.idx_num = self.scan_plan(info);
        Ok(BestIndexResult::Ok)
    }

    fn open(&self) -> Result<DictionaryCursor> {
        Ok(DictionaryCursor {
            entries: Arc::clone(&self.entries),
            plans: Arc::clone(&self.plans),
            plan: None,
            pos: usize::MAX,
            row: 1,
        })
    }
}

/// A process-environment view: `(key, value)` over `std::env::vars()`.
///
/// Declared direct-only because environment contents are process state a
/// trigger or view should not silently read.
pub struct EnvironmentTable {
    inner: DictionaryTable,
}

impl VirtualTable for EnvironmentTable {
    type Cursor = DictionaryCursor;

    fn connect(_args: &CreateArgs) -> Result<Self> {
        Ok(Self {
            inner: DictionaryTable::from_env(),
        })
    }

    fn schema(&self) -> &str {
        self.inner.schema()
    }

    fn options(&self) -> TableOptions {
        self.inner.options()
    }

    fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult> {
        self.inner.best_index(info)
    }

    fn open(&self) -> Result<DictionaryCursor> {
        self.inner.open()
    }
}

/// Cursor over a dictionary snapshot.
pub struct DictionaryCursor {
    entries: Arc<Vec<(String, String)>>,
    plans: Arc<PlanRegistry>,
    plan: Option<Arc<FilterPlan>>,
    pos: usize,
    row: i64,
}

impl VirtualTableCursor for DictionaryCursor {
    fn filter(&mut self, plan_id: i32, _plan_str: Option<&str>, _args: &[SqlValue]) -> Result<()> {
        self.row = 1;
        let plan = match self.plan.take().filter(|p| p.id == plan_id) {
            Some(p) => Some(p),
            None => self.plans.take(plan_id),
        };
        let Some(plan) = plan else {
            debug!(plan_id, "unknown or stale plan id; producing empty scan");
            self.pos = self.entries.len();
            return Ok(());
        };
        self.pos = 0;
        self.plan = Some(plan);
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        self.pos = self.pos.saturating_add(1);
        self.row += 1;
        Ok(())
    }

    fn eof(&self) -> bool {
        self.pos >= self.entries.len() || self.row > MAX_SCAN_ROWS
    }

    fn column(&self, ctx: &mut ColumnContext, col: i32) -> Result<()> {
        let value = match (self.entries.get(self.pos), col) {
            (Some((key, _)), 0) => SqlValue::Text(key.clone()),
            (Some((_, val)), 1) => SqlValue::Text(val.clone()),
            _ => SqlValue::Null,
        };
        ctx.set_value(value);
        Ok(())
    }

    fn rowid(&self) -> Result<i64> {
        Ok(self.row)
    }
}
