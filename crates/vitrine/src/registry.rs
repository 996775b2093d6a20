//! Module registry and table-instance arena.
//!
//! The engine host refers to virtual table modules by name and to live
//! table instances by opaque integer handles. [`ModuleRegistry`] resolves
//! names to constructors; [`TableArena`] owns the instantiated tables and
//! maps handles back to them, so nothing outside the arena ever round-trips
//! a raw pointer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use vitrine_error::{Result, VitrineError};
use vitrine_ext_tables::{CalendarTable, DictionaryTable, EnvironmentTable, SeriesTable};
use vitrine_vtab::{CreateArgs, TableInstance, VirtualTable};

type ModuleFactory = Arc<dyn Fn(&CreateArgs, bool) -> Result<Box<dyn TableInstance>> + Send + Sync>;

/// Maps module names to table constructors.
///
/// Lookup is case-insensitive, matching the engine's treatment of module
/// names in `CREATE VIRTUAL TABLE ... USING name(...)`.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under `name`, overwriting any previous module
    /// with the same name.
    pub fn register<T>(&mut self, name: &str)
    where
        T: VirtualTable + 'static,
        T::Cursor: 'static,
    {
        debug!(module = name, "registering virtual table module");
        self.factories.insert(
            name.to_ascii_lowercase(),
            Arc::new(|args: &CreateArgs, create: bool| {
                let table = if create {
                    T::create(args)?
                } else {
                    T::connect(args)?
                };
                Ok(Box::new(table) as Box<dyn TableInstance>)
            }),
        );
    }

    /// Instantiate a table for `CREATE VIRTUAL TABLE`.
    pub fn create_table(&self, args: &CreateArgs) -> Result<Box<dyn TableInstance>> {
        self.instantiate(args, true)
    }

    /// Attach to an existing virtual table declaration.
    pub fn connect_table(&self, args: &CreateArgs) -> Result<Box<dyn TableInstance>> {
        self.instantiate(args, false)
    }

    /// Registered module names, in no particular order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn instantiate(&self, args: &CreateArgs, create: bool) -> Result<Box<dyn TableInstance>> {
        let factory = self
            .factories
            .get(&args.module_name.to_ascii_lowercase())
            .ok_or_else(|| VitrineError::NoSuchModule {
                name: args.module_name.clone(),
            })?;
        factory(args, create)
    }
}

/// Opaque handle to a live table instance inside a [`TableArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableHandle(usize);

/// Owns live table instances and hands out integer handles.
///
/// Slots are never reused within an arena's lifetime, so a detached
/// handle stays stale instead of silently aliasing a newer table.
#[derive(Default)]
pub struct TableArena {
    tables: Vec<Option<Box<dyn TableInstance>>>,
}

impl TableArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a table, returning its handle.
    pub fn attach(&mut self, table: Box<dyn TableInstance>) -> TableHandle {
        self.tables.push(Some(table));
        TableHandle(self.tables.len() - 1)
    }

    /// Borrow the table behind `handle`.
    #[must_use]
    pub fn get(&self, handle: TableHandle) -> Option<&dyn TableInstance> {
        self.tables.get(handle.0).and_then(|slot| slot.as_deref())
    }

    /// Number of live tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the arena holds no live tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the table behind `handle`, running its `destroy` hook when
    /// the table is being dropped (vs merely disconnected).
    pub fn detach(&mut self, handle: TableHandle, drop_table: bool) -> Result<()> {
        let slot = self
            .tables
            .get_mut(handle.0)
            .ok_or(VitrineError::StaleHandle { handle: handle.0 })?;
        let mut table = slot.take().ok_or(VitrineError::StaleHandle { handle: handle.0 })?;
        if drop_table {
            table.destroy()
        } else {
            table.disconnect()
        }
    }
}

/// Register the in-tree synthetic table modules.
pub fn register_builtin_modules(registry: &mut ModuleRegistry) {
    info!("registering builtin virtual table modules");
    registry.register::<SeriesTable>("series");
    registry.register::<CalendarTable>("calendar");
    registry.register::<DictionaryTable>("dictionary");
    registry.register::<EnvironmentTable>("environment");
}
