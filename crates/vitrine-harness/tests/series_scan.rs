//! Series table scans driven through the engine-side harness.

use vitrine_harness::{ConstraintSpec, compile, scan_integers, scan_limited};
use vitrine_types::SqlValue;
use vitrine_vtab::{ConstraintOp, CreateArgs, IndexOrderBy, VirtualTable};

use vitrine_ext_tables::SeriesTable;

const COL_VALUE: i32 = 0;
const COL_START: i32 = 1;
const COL_STOP: i32 = 2;
const COL_STEP: i32 = 3;

fn series_args(start: i64, stop: i64, step: i64) -> Vec<ConstraintSpec> {
    vec![
        ConstraintSpec::usable(COL_START, ConstraintOp::Eq, start),
        ConstraintSpec::usable(COL_STOP, ConstraintOp::Eq, stop),
        ConstraintSpec::usable(COL_STEP, ConstraintOp::Eq, step),
    ]
}

#[test]
fn bounded_scan_with_limit() {
    // SELECT value FROM generate_series(10,20,2) LIMIT 5
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(&table, &series_args(10, 20, 2), &[])
        .expect("compile")
        .expect_query();
    let rows = scan_limited(&table, &compiled, &[COL_VALUE], 5).expect("scan");
    let values: Vec<i64> = rows.iter().filter_map(|r| r[0].as_integer()).collect();
    assert_eq!(values, vec![10, 12, 14, 16, 18]);
}

#[test]
fn descending_scan_with_limit() {
    // SELECT value FROM generate_series(10,20,1) ORDER BY value DESC LIMIT 5
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(
        &table,
        &series_args(10, 20, 1),
        &[IndexOrderBy {
            column: COL_VALUE,
            desc: true,
        }],
    )
    .expect("compile")
    .expect_query();
    assert!(compiled.info.order_by_consumed);
    let rows = scan_limited(&table, &compiled, &[COL_VALUE], 5).expect("scan");
    let values: Vec<i64> = rows.iter().filter_map(|r| r[0].as_integer()).collect();
    assert_eq!(values, vec![20, 19, 18, 17, 16]);
}

#[test]
fn ascending_sequence_is_exact() {
    // start=a, stop=b, step=c produces a, a+c, ..., <= b.
    let table = SeriesTable::with_range(0, 1000, 1);
    let compiled = compile(&table, &series_args(7, 40, 9), &[])
        .expect("compile")
        .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert_eq!(values, vec![7, 16, 25, 34]);
}

#[test]
fn descending_first_value_lands_on_grid() {
    // First descending value is b - ((b - a) mod c).
    let table = SeriesTable::with_range(0, 1000, 1);
    let compiled = compile(
        &table,
        &series_args(7, 40, 9),
        &[IndexOrderBy {
            column: COL_VALUE,
            desc: true,
        }],
    )
    .expect("compile")
    .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert_eq!(values[0], 40 - ((40 - 7) % 9));
    assert_eq!(values, vec![34, 25, 16, 7]);
}

#[test]
fn default_bounds_without_constraints() {
    let args = CreateArgs::for_table("series", "t", &[]);
    let table = SeriesTable::connect(&args).expect("connect");
    let compiled = compile(&table, &[], &[]).expect("compile").expect_query();

    let all = scan_integers(&table, &compiled).expect("scan");
    let expected: Vec<i64> = (0..=100).collect();
    assert_eq!(all, expected);
}

#[test]
fn default_bounds_with_limit() {
    let args = CreateArgs::for_table("series", "t", &[]);
    let table = SeriesTable::connect(&args).expect("connect");
    let compiled = compile(&table, &[], &[]).expect("compile").expect_query();
    let rows = scan_limited(&table, &compiled, &[COL_VALUE], 3).expect("scan");
    let values: Vec<i64> = rows.iter().filter_map(|r| r[0].as_integer()).collect();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn null_start_bound_yields_zero_rows() {
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(
        &table,
        &[
            ConstraintSpec::usable(COL_START, ConstraintOp::Eq, SqlValue::Null),
            ConstraintSpec::usable(COL_STOP, ConstraintOp::Eq, 20i64),
        ],
        &[],
    )
    .expect("compile")
    .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert!(values.is_empty(), "null bound must produce an empty scan");
}

#[test]
fn null_stop_bound_yields_zero_rows() {
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(
        &table,
        &[
            ConstraintSpec::usable(COL_START, ConstraintOp::Eq, 10i64),
            ConstraintSpec::usable(COL_STOP, ConstraintOp::Eq, SqlValue::Null),
        ],
        &[],
    )
    .expect("compile")
    .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert!(values.is_empty());
}

#[test]
fn value_equality_produces_one_row() {
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(
        &table,
        &[ConstraintSpec::usable(COL_VALUE, ConstraintOp::Eq, 42i64)],
        &[],
    )
    .expect("compile")
    .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert_eq!(values, vec![42]);
}

#[test]
fn range_constraints_on_value_column() {
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(
        &table,
        &[
            ConstraintSpec::usable(COL_VALUE, ConstraintOp::Gt, 95i64),
            ConstraintSpec::usable(COL_VALUE, ConstraintOp::Le, 98i64),
        ],
        &[],
    )
    .expect("compile")
    .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert_eq!(values, vec![96, 97, 98]);
}

#[test]
fn empty_range_when_start_exceeds_stop() {
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(&table, &series_args(30, 20, 1), &[])
        .expect("compile")
        .expect_query();
    let values = scan_integers(&table, &compiled).expect("scan");
    assert!(values.is_empty());
}

#[test]
fn rowid_is_bookkeeping_not_value() {
    let table = SeriesTable::with_range(0, 100, 1);
    let compiled = compile(&table, &series_args(50, 52, 1), &[])
        .expect("compile")
        .expect_query();

    let mut cursor = table.open().expect("open");
    use vitrine_vtab::VirtualTableCursor;
    cursor
        .filter(compiled.info.idx_num, None, &compiled.args)
        .expect("filter");
    let mut pairs = Vec::new();
    while !cursor.eof() {
        let mut ctx = vitrine_vtab::ColumnContext::new();
        cursor.column(&mut ctx, COL_VALUE).expect("column");
        pairs.push((cursor.rowid().expect("rowid"), ctx.take_value()));
        cursor.next().expect("next");
    }
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0].0, 1);
    assert_eq!(pairs[2].0, 3);
    assert_eq!(pairs[2].1, Some(SqlValue::Integer(52)));
}
