//! Typed values crossing the virtual table boundary.
//!
//! [`SqlValue`] is the universal data currency between the engine and a
//! virtual table implementation: every bound filter argument and every
//! produced column value is one of its five storage classes.

pub mod value;

pub use value::{SqlValue, format_sql_float};
