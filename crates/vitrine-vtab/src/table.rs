//! Virtual table and cursor traits.
//!
//! These traits are **open** (user-implementable). A synthetic table kind
//! implements [`VirtualTable`] plus one [`VirtualTableCursor`] type; the
//! engine-facing host drives them through [`TableInstance`], the
//! object-safe erasure used by the module registry.

use vitrine_error::{Result, VitrineError};
use vitrine_types::SqlValue;

// ---------------------------------------------------------------------------
// Column context
// ---------------------------------------------------------------------------

/// Output slot passed to [`VirtualTableCursor::column`] for the value of
/// one column of the current row.
#[derive(Debug, Default)]
pub struct ColumnContext {
    value: Option<SqlValue>,
}

impl ColumnContext {
    /// Create a new empty column context.
    #[must_use]
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Set the value for this column.
    pub fn set_value(&mut self, val: SqlValue) {
        self.value = Some(val);
    }

    /// Take the value out of this context, leaving `None`.
    pub fn take_value(&mut self) -> Option<SqlValue> {
        self.value.take()
    }
}

// ---------------------------------------------------------------------------
// Capabilities and construction arguments
// ---------------------------------------------------------------------------

/// Capability flags a module declares when it connects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// The table enforces constraints itself during mutation conflicts.
    pub constraint_support: bool,
    /// Safe to use inside triggers/views even under restricted schemas.
    pub innocuous: bool,
    /// Usable only from top-level SQL, never inside triggers or views.
    pub direct_only: bool,
}

/// Parsed `CREATE VIRTUAL TABLE` argument vector.
///
/// By convention the first three strings name the module, the database
/// (schema), and the table; anything further is a table-specific positional
/// parameter. The three names are required; parameters that fail to parse
/// fall back to the table's documented defaults, never an error.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub module_name: String,
    pub database_name: String,
    pub table_name: String,
    pub parameters: Vec<String>,
}

impl CreateArgs {
    /// Parse the flat argument array supplied by the engine.
    pub fn parse(args: &[&str]) -> Result<Self> {
        let [module_name, database_name, table_name, parameters @ ..] = args else {
            return Err(VitrineError::BadCreateArgs {
                detail: format!("expected at least 3 arguments, got {}", args.len()),
            });
        };
        Ok(Self {
            module_name: (*module_name).to_owned(),
            database_name: (*database_name).to_owned(),
            table_name: (*table_name).to_owned(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
        })
    }

    /// Convenience constructor for tables created programmatically.
    #[must_use]
    pub fn for_table(module_name: &str, table_name: &str, parameters: &[&str]) -> Self {
        Self {
            module_name: module_name.to_owned(),
            database_name: "main".to_owned(),
            table_name: table_name.to_owned(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    /// The `i`-th table-specific parameter, if present.
    #[must_use]
    pub fn parameter(&self, i: usize) -> Option<&str> {
        self.parameters.get(i).map(String::as_str)
    }

    /// Parse the `i`-th parameter, falling back to `default` when the
    /// parameter is missing or unparseable.
    #[must_use]
    pub fn parameter_or<T: std::str::FromStr>(&self, i: usize, default: T) -> T {
        self.parameter(i)
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(default)
    }
}

// ---------------------------------------------------------------------------
// VirtualTable trait
// ---------------------------------------------------------------------------

use crate::planning::{BestIndexResult, IndexInfo};

/// A virtual table module: one synthetic table "kind".
///
/// Covers the full lifecycle: creation, connection, index selection,
/// scanning, and destruction. At minimum implement `connect`, `schema`,
/// `best_index`, and `open`.
///
/// `create`/`connect` differ only in whether persistent backing state must
/// be initialized; the in-tree synthetic tables have none, so the defaults
/// delegate `create` to `connect` and `destroy` to `disconnect`.
#[allow(clippy::missing_errors_doc)]
pub trait VirtualTable: Send + Sync {
    /// The cursor type for scanning this virtual table.
    type Cursor: VirtualTableCursor;

    /// Called for `CREATE VIRTUAL TABLE`. May create backing storage.
    fn create(args: &CreateArgs) -> Result<Self>
    where
        Self: Sized,
    {
        Self::connect(args)
    }

    /// Called for subsequent opens of an existing virtual table.
    fn connect(args: &CreateArgs) -> Result<Self>
    where
        Self: Sized;

    /// The declared schema: a table definition string naming the columns,
    /// with parameter columns marked `HIDDEN`.
    fn schema(&self) -> &str;

    /// Capability flags for this table.
    fn options(&self) -> TableOptions {
        TableOptions::default()
    }

    /// Inform the query planner which constraints this table can use, at
    /// what estimated cost, and under which plan id.
    fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult>;

    /// Open a new scan cursor.
    fn open(&self) -> Result<Self::Cursor>;

    /// Drop a table instance (opposite of `connect`).
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called for `DROP VIRTUAL TABLE` — destroy backing storage.
    fn destroy(&mut self) -> Result<()> {
        self.disconnect()
    }

    /// INSERT/UPDATE/DELETE. Default: read-only.
    fn update(&mut self, _args: &[SqlValue]) -> Result<Option<i64>> {
        Err(VitrineError::ReadOnly)
    }

    /// Rename the virtual table.
    fn rename(&mut self, _new_name: &str) -> Result<()> {
        Err(VitrineError::Unsupported)
    }
}

// ---------------------------------------------------------------------------
// VirtualTableCursor trait
// ---------------------------------------------------------------------------

/// A cursor for one scan of a virtual table.
///
/// Cursors are `Send` but not `Sync`: each is a single-threaded scan object
/// bound to one filter invocation.
///
/// # Lifecycle
///
/// 1. [`filter`](Self::filter) begins the scan with the planner-chosen
///    plan id and concrete argument values.
/// 2. Iterate: check [`eof`](Self::eof), read
///    [`column`](Self::column)/[`rowid`](Self::rowid), advance with
///    [`next`](Self::next).
/// 3. Drop the cursor when the scan completes or is abandoned; cursors
///    hold no external resources.
#[allow(clippy::missing_errors_doc)]
pub trait VirtualTableCursor: Send {
    /// Begin a scan under the plan selected by `best_index`.
    ///
    /// `args` arrives in argument-position order. An unknown or stale
    /// `plan_id` must fail closed: an immediately-exhausted scan, not an
    /// error and never uninitialized state.
    fn filter(&mut self, plan_id: i32, plan_str: Option<&str>, args: &[SqlValue]) -> Result<()>;

    /// Advance to the next row.
    fn next(&mut self) -> Result<()>;

    /// Whether the cursor has moved past the last row.
    fn eof(&self) -> bool;

    /// Write the value of column `col` into `ctx`.
    ///
    /// Indexes outside the declared schema yield `Null` rather than an
    /// error; misuse of a synthetic table degrades gracefully.
    fn column(&self, ctx: &mut ColumnContext, col: i32) -> Result<()>;

    /// The rowid of the current row (engine bookkeeping, distinct from the
    /// table's semantic values).
    fn rowid(&self) -> Result<i64>;
}

// ---------------------------------------------------------------------------
// Object-safe erasure
// ---------------------------------------------------------------------------

/// Object-safe view of a connected virtual table, as held by the module
/// registry. Blanket-implemented for every [`VirtualTable`] whose cursor
/// type is `'static`.
#[allow(clippy::missing_errors_doc)]
pub trait TableInstance: Send + Sync {
    /// See [`VirtualTable::schema`].
    fn schema(&self) -> &str;
    /// See [`VirtualTable::options`].
    fn options(&self) -> TableOptions;
    /// See [`VirtualTable::best_index`].
    fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult>;
    /// Open a scan cursor, boxed.
    fn open_cursor(&self) -> Result<Box<dyn VirtualTableCursor>>;
    /// See [`VirtualTable::disconnect`].
    fn disconnect(&mut self) -> Result<()>;
    /// See [`VirtualTable::destroy`].
    fn destroy(&mut self) -> Result<()>;
}

impl<T> TableInstance for T
where
    T: VirtualTable,
    T::Cursor: 'static,
{
    fn schema(&self) -> &str {
        VirtualTable::schema(self)
    }

    fn options(&self) -> TableOptions {
        VirtualTable::options(self)
    }

    fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult> {
        VirtualTable::best_index(self, info)
    }

    fn open_cursor(&self) -> Result<Box<dyn VirtualTableCursor>> {
        Ok(Box::new(self.open()?))
    }

    fn disconnect(&mut self) -> Result<()> {
        VirtualTable::disconnect(self)
    }

    fn destroy(&mut self) -> Result<()> {
        VirtualTable::destroy(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_context_lifecycle() {
        let mut ctx = ColumnContext::new();
        assert!(ctx.take_value().is_none());
        ctx.set_value(SqlValue::Integer(42));
        assert_eq!(ctx.take_value(), Some(SqlValue::Integer(42)));
        assert!(ctx.take_value().is_none());
    }

    #[test]
    fn create_args_parse() {
        let args =
            CreateArgs::parse(&["series", "main", "t", "1", "10"]).expect("well-formed args");
        assert_eq!(args.module_name, "series");
        assert_eq!(args.database_name, "main");
        assert_eq!(args.table_name, "t");
        assert_eq!(args.parameter(0), Some("1"));
        assert_eq!(args.parameter(1), Some("10"));
        assert_eq!(args.parameter(2), None);
    }

    #[test]
    fn create_args_require_three_names() {
        assert!(CreateArgs::parse(&["series", "main"]).is_err());
        assert!(CreateArgs::parse(&[]).is_err());
    }

    #[test]
    fn parameter_or_falls_back_on_garbage() {
        let args = CreateArgs::for_table("series", "t", &["5", "banana"]);
        assert_eq!(args.parameter_or(0, 0i64), 5);
        assert_eq!(args.parameter_or(1, 100i64), 100);
        assert_eq!(args.parameter_or(9, 1i64), 1);
    }

    // -- Minimal table to exercise trait defaults and erasure --

    struct StaticTable;

    struct StaticCursor {
        pos: usize,
    }

    impl VirtualTable for StaticTable {
        type Cursor = StaticCursor;

        fn connect(_args: &CreateArgs) -> Result<Self> {
            Ok(Self)
        }

        fn schema(&self) -> &str {
            "CREATE TABLE x(value INTEGER)"
        }

        fn best_index(&self, info: &mut IndexInfo) -> Result<BestIndexResult> {
            info.estimated_cost = 1.0;
            info.estimated_rows = 2;
            Ok(BestIndexResult::Ok)
        }

        fn open(&self) -> Result<StaticCursor> {
            Ok(StaticCursor { pos: 0 })
        }
    }

    impl VirtualTableCursor for StaticCursor {
        fn filter(&mut self, _plan_id: i32, _plan_str: Option<&str>, _args: &[SqlValue]) -> Result<()> {
            self.pos = 0;
            Ok(())
        }

        fn next(&mut self) -> Result<()> {
            self.pos += 1;
            Ok(())
        }

        fn eof(&self) -> bool {
            self.pos >= 2
        }

        fn column(&self, ctx: &mut ColumnContext, _col: i32) -> Result<()> {
            ctx.set_value(SqlValue::Integer(i64::try_from(self.pos).unwrap_or(0)));
            Ok(())
        }

        fn rowid(&self) -> Result<i64> {
            Ok(i64::try_from(self.pos).unwrap_or(0) + 1)
        }
    }

    #[test]
    fn defaults_read_only_and_create_delegates() {
        let args = CreateArgs::for_table("static", "t", &[]);
        let mut table = StaticTable::create(&args).expect("create delegates to connect");
        assert!(matches!(
            table.update(&[SqlValue::Null]),
            Err(VitrineError::ReadOnly)
        ));
        assert!(matches!(
            table.rename("other"),
            Err(VitrineError::Unsupported)
        ));
        assert!(VirtualTable::destroy(&mut table).is_ok());
    }

    #[test]
    fn erased_instance_scans() {
        let args = CreateArgs::for_table("static", "t", &[]);
        let table: Box<dyn TableInstance> = Box::new(StaticTable::connect(&args).unwrap());
        assert_eq!(table.options(), TableOptions::default());

        let mut cursor = table.open_cursor().expect("cursor");
        cursor.filter(0, None, &[]).expect("filter");
        let mut rows = 0;
        while !cursor.eof() {
            rows += 1;
            cursor.next().expect("next");
        }
        assert_eq!(rows, 2);
    }
}
