//! Calendar table: a date sequence between two bounds, stepped by a
//! frequency.
//!
//! Dates are ISO-8601 `YYYY-MM-DD` text values; the scan position space is
//! a proleptic-Gregorian day number, so the general-purpose bound
//! narrowing works unchanged. Month-based frequencies step by calendar
//! months anchored at the first produced date, clamping the day-of-month
//! (Jan 31 → Feb 28 → Mar 31).
//!
//! A `year = Y` constraint narrows the effective range to
//! [Jan 1 Y, Dec 31 Y] intersected with any explicit start/stop bound.

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
    "CREATE TABLE x(date TEXT, year INTEGER HIDDEN, start TEXT HIDDEN, stop TEXT HIDDEN)";

const MIN_YEAR: i64 = 1;
const MAX_YEAR: i64 = 9999;

/// Estimated rows for a scan with both date bounds pinned.
const BOUNDED_ESTIMATE: i64 = 366;

// ── Civil date arithmetic ────────────────────────────────────────────────
//
// Day numbers count days since 1970-01-01 in the proleptic Gregorian
// calendar (negative before the epoch).

fn is_leap_year(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn days_in_month(y: i64, m: i64) -> i64 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(y) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// (year, month, day) → day number.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Day number → (year, month, day).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Step a date by `delta` calendar months, clamping the day-of-month.
fn add_months(y: i64, m: i64, d: i64, delta: i64) -> (i64, i64, i64) {
    let months = y * 12 + (m - 1) + delta;
    let y2 = months.div_euclid(12);
    let m2 = months.rem_euclid(12) + 1;
    (y2, m2, d.min(days_in_month(y2, m2)))
}

/// Parse `YYYY-MM-DD` into a day number. Returns `None` for anything that
/// is not a valid date in years 1..=9999.
fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    let mut parts = s.splitn(3, '-');
    let y: i64 = parts.next()?.parse().ok()?;
    let m: i64 = parts.next()?.parse().ok()?;
    let d: i64 = parts.next()?.parse().ok()?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&y) || !(1..=12).contains(&m) {
        return None;
    }
    if d < 1 || d > days_in_month(y, m) {
        return None;
    }
    Some(days_from_civil(y, m, d))
}

fn format_date(days: i64) -> String {
    let (y, m, d) = civil_from_days(days);
    format!("{y:04}-{m:02}-{d:02}")
}

// ── Frequency ────────────────────────────────────────────────────────────

/// Production cadence for calendar rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Bimonthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Parse a frequency name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            "bimonthly" => Some(Self::Bimonthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Fixed step in days, for day-based frequencies.
    #[must_use]
    pub const fn day_step(self) -> Option<i64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            _ => None,
        }
    }

    /// Step in calendar months, for month-based frequencies.
    #[must_use]
    pub const fn month_step(self) -> Option<i64> {
        match self {
            Self::Monthly => Some(1),
            Self::Bimonthly => Some(2),
            Self::Quarterly => Some(3),
            Self::Yearly => Some(12),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Bimonthly => "bimonthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

// ── Module ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Year,
    Start,
    Stop,
}

impl Column {
    const fn from_index(i: i32) -> Option<Self> {
        match i {
            0 => Some(Self::Date),
            1 => Some(Self::Year),
            2 => Some(Self::Start),
            3 => Some(Self::Stop),
            _ => None,
        }
    }

    const fn is_hidden(self) -> bool {
        !matches!(self, Self::Date)
    }
}

/// The calendar module instance: default date bounds and frequency parsed
/// from the creation arguments.
pub struct CalendarTable {
    start: i64,
    stop: i64,
    frequency: Frequency,
    plans: Arc<PlanRegistry>,
}

impl CalendarTable {
    /// Build a calendar over an explicit day-number range.
    #[must_use]
    pub fn with_range(start: i64, stop: i64, frequency: Frequency) -> Self {
        Self {
            start,
            stop,
            frequency,
            plans: Arc::new(PlanRegistry::new()),
        }
    }

    fn min_days() -> i64 {
        days_from_civil(MIN_YEAR, 1, 1)
    }

    fn max_days() -> i64 {
        days_from_civil(MAX_YEAR, 12, 31)
    }
}

impl VirtualTable for CalendarTable {
    type Cursor = CalendarCursor;

    fn connect(args: &CreateArgs) -> Result<Self> {
        // Unparseable dates and unknown frequency names fall back to the
        // documented defaults.
        let start = args
            .parameter(0)
            .and_then(parse_date)
            .unwrap_or_else(Self::min_days);
        let stop = args
            .parameter(1)
            .and_then(parse_date)
            .unwrap_or_else(Self::max_days);
        let frequency = args
            .parameter(2)
            .and_then(Frequency::parse)
            .unwrap_or(Frequency::Daily);
        Ok(Self::with_range(start, stop, frequency))
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
        let mut unique = false;

        for (i, constraint) in info.constraints.iter().enumerate() {
            let Some(column) = Column::from_index(constraint.column) else {
                continue;
            };
            if column.is_hidden() {
                if !constraint.usable || constraint.op != ConstraintOp::Eq {
                    return Ok(BestIndexResult::Constraint);
                }
                let argv = builder.accept(constraint.column, constraint.op);
                info.constraint_usage[i].argv_index = i32::try_from(argv).unwrap_or(0) + 1;
                info.constraint_usage[i].omit = true;
                match column {
                    // A year constraint pins both ends of the range.
                    Column::Year => {
                        has_min = true;
                        has_max = true;
                    }
                    Column::Start => has_min = true,
                    Column::Stop => has_max = true,
                    Column::Date => unreachable!("date column is not hidden"),
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
            info.estimated_rows = BOUNDED_ESTIMATE;
            #[allow(clippy::cast_precision_loss)]
            {
                info.estimated_cost = info.estimated_rows as f64;
            }
        }

        // The default bounds are finite, so ascending order is always the
        // natural production order. Descending needs a fixed-width step to
        // land on the grid; month-based frequencies leave the sort to the
        // engine.
        if let Some(term) = info.single_order_by() {
            let (column, desc) = (term.column, term.desc);
            if column == 0 && (!desc || self.frequency.day_step().is_some()) {
                info.order_by_consumed = true;
                builder.set_descending(desc);
            }
        }

        info.idx_num = builder.register(&self.plans, info.columns_used);
        Ok(BestIndexResult::Ok)
    }

    fn open(&self) -> Result<CalendarCursor> {
        Ok(CalendarCursor {
            default_start: self.start,
            default_stop: self.stop,
            frequency: self.frequency,
            plans: Arc::clone(&self.plans),
            plan: None,
            bounds: ScanBounds::new(1, 0),
            descending: false,
            cur: 0,
            anchor: 0,
            periods: 0,
            row: 1,
        })
    }
}

/// Cursor over one calendar scan.
pub struct CalendarCursor {
    default_start: i64,
    default_stop: i64,
    frequency: Frequency,
    plans: Arc<PlanRegistry>,
    plan: Option<Arc<FilterPlan>>,
    bounds: ScanBounds,
    descending: bool,
    /// Current position as a day number.
    cur: i64,
    /// First produced day; month stepping is anchored here so the
    /// day-of-month clamp never drifts.
    anchor: i64,
    /// Months elapsed from the anchor (month-based frequencies only).
    periods: i64,
    row: i64,
}

/// Resolve one bound argument to a day number. NULL and unparseable text
/// both yield `None`: neither can ever satisfy a date comparison.
fn bound_days(value: &SqlValue) -> Option<i64> {
    if value.is_null() {
        return None;
    }
    parse_date(&value.to_text())
}

impl VirtualTableCursor for CalendarCursor {
    fn filter(&mut self, plan_id: i32, _plan_str: Option<&str>, args: &[SqlValue]) -> Result<()> {
        self.row = 1;

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
        self.descending = plan.descending;

        // Start/stop parameters redefine the range; year and date-column
        // constraints then intersect it. A NULL, missing, or unparseable
        // bound poisons the whole scan — a later parameter must not
        // resurrect the range.
        let mut poisoned = false;
        for arg in &plan.arguments {
            let Some(value) = args.get(arg.argv_index as usize) else {
                poisoned = true;
                break;
            };
            match Column::from_index(arg.column) {
                Some(Column::Start) => match bound_days(value) {
                    Some(days) => self.bounds.min = days,
                    None => poisoned = true,
                },
                Some(Column::Stop) => match bound_days(value) {
                    Some(days) => self.bounds.max = days,
                    None => poisoned = true,
                },
                Some(Column::Year) if value.is_null() => poisoned = true,
                _ => {}
            }
            if poisoned {
                break;
            }
        }
        if poisoned {
            self.bounds.mark_empty();
        } else {
            for arg in &plan.arguments {
                let Some(value) = args.get(arg.argv_index as usize) else {
                    continue;
                };
                match Column::from_index(arg.column) {
                    Some(Column::Year) => {
                        let y = value.to_integer();
                        if (MIN_YEAR..=MAX_YEAR).contains(&y) {
                            self.bounds
                                .narrow(ConstraintOp::Ge, days_from_civil(y, 1, 1));
                            self.bounds
                                .narrow(ConstraintOp::Le, days_from_civil(y, 12, 31));
                        } else {
                            self.bounds.mark_empty();
                        }
                    }
                    Some(Column::Date) => match bound_days(value) {
                        Some(days) => self.bounds.narrow(arg.op, days),
                        None => self.bounds.mark_empty(),
                    },
                    _ => {}
                }
            }
        }

        self.anchor = self.bounds.min;
        self.periods = 0;
        self.cur = match self.frequency.day_step() {
            Some(step) => self.bounds.first_position(self.descending, step),
            None => self.bounds.min,
        };
        debug!(
            min = self.bounds.min,
            max = self.bounds.max,
            frequency = self.frequency.name(),
            descending = self.descending,
            "calendar scan initialized"
        );
        self.plan = Some(plan);
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        if let Some(step) = self.frequency.day_step() {
            self.cur = if self.descending {
                self.cur.saturating_sub(step)
            } else {
                self.cur.saturating_add(step)
            };
        } else {
            let months = self
                .frequency
                .month_step()
                .unwrap_or(1);
            self.periods += months;
            let (y, m, d) = civil_from_days(self.anchor);
            let (y2, m2, d2) = add_months(y, m, d, self.periods);
            self.cur = days_from_civil(y2, m2, d2);
        }
        self.row += 1;
        Ok(())
    }

    fn eof(&self) -> bool {
        if self.bounds.is_empty() || self.row > MAX_SCAN_ROWS {
            return true;
        }
        if self.descending {
            self.cur < self.bounds.min
        } else {
            self.cur > self.bounds.max
        }
    }

    fn column(&self, ctx: &mut ColumnContext, col: i32) -> Result<()> {
        let value = match Column::from_index(col) {
            Some(Column::Date) => SqlValue::Text(format_date(self.cur)),
            Some(Column::Year) => SqlValue::Integer(civil_from_days(self.cur).0),
            Some(Column::Start) => SqlValue::Text(format_date(self.bounds.min)),
            Some(Column::Stop) => SqlValue::Text(format_date(self.bounds.max)),
            None => SqlValue::Null,
        };
        ctx.set_value(value);
        Ok(())
    }

    fn rowid(&self) -> Result<i64> {
        Ok(self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_vtab::{IndexConstraint, IndexOrderBy};

    fn constraint(column: i32, op: ConstraintOp) -> IndexConstraint {
        IndexConstraint {
            column,
            op,
            usable: true,
        }
    }

    fn plan_and_scan(
        table: &CalendarTable,
        constraints: Vec<IndexConstraint>,
        order_by: Vec<IndexOrderBy>,
        values: &[SqlValue],
        limit: usize,
    ) -> Vec<String> {
        let mut info = IndexInfo::new(constraints, order_by);
        let outcome = table.best_index(&mut info).expect("best_index");
        assert_eq!(outcome, BestIndexResult::Ok);

        let mut args = vec![SqlValue::Null; values.len()];
        for (i, usage) in info.constraint_usage.iter().enumerate() {
            if usage.argv_index > 0 {
                args[usage.argv_index as usize - 1] = values[i].clone();
            }
        }

        let mut cursor = table.open().expect("open");
        cursor.filter(info.idx_num, None, &args).expect("filter");

        let mut out = Vec::new();
        while !cursor.eof() && out.len() < limit {
            let mut ctx = ColumnContext::new();
            cursor.column(&mut ctx, 0).expect("column");
            match ctx.take_value() {
                Some(SqlValue::Text(s)) => out.push(s),
                other => panic!("expected text date, got {other:?}"),
            }
            cursor.next().expect("next");
        }
        out
    }

    #[test]
    fn day_number_round_trip() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(1970, 1, 2), 1);
        assert_eq!(days_from_civil(1969, 12, 31), -1);
        for &(y, m, d) in &[
            (1, 1, 1),
            (1600, 2, 29),
            (1999, 12, 31),
            (2000, 2, 29),
            (2024, 7, 15),
            (9999, 12, 31),
        ] {
            let days = days_from_civil(y, m, d);
            assert_eq!(civil_from_days(days), (y, m, d));
        }
    }

    #[test]
    fn parse_and_format() {
        assert_eq!(parse_date("2024-02-29"), Some(days_from_civil(2024, 2, 29)));
        assert_eq!(parse_date(" 2024-01-01 "), Some(days_from_civil(2024, 1, 1)));
        assert_eq!(parse_date("2023-02-29"), None, "2023 is not a leap year");
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2024-00-10"), None);
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("20240101"), None);
        assert_eq!(format_date(days_from_civil(7, 3, 9)), "0007-03-09");
    }

    #[test]
    fn frequency_parsing() {
        assert_eq!(Frequency::parse("daily"), Some(Frequency::Daily));
        assert_eq!(Frequency::parse("QUARTERLY"), Some(Frequency::Quarterly));
        assert_eq!(Frequency::parse("fortnightly"), None);
        assert_eq!(Frequency::Biweekly.day_step(), Some(14));
        assert_eq!(Frequency::Yearly.month_step(), Some(12));
        assert_eq!(Frequency::Monthly.day_step(), None);
    }

    #[test]
    fn daily_range_scan() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-01-30", "2024-02-02", "daily"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(&table, vec![], vec![], &[], usize::MAX);
        assert_eq!(
            dates,
            vec!["2024-01-30", "2024-01-31", "2024-02-01", "2024-02-02"]
        );
    }

    #[test]
    fn monthly_stepping_clamps_day_of_month() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-01-31", "2024-05-01", "monthly"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(&table, vec![], vec![], &[], usize::MAX);
        // Anchored at Jan 31: February clamps to 29 (leap year), later
        // months return to the 31st where it exists.
        assert_eq!(
            dates,
            vec!["2024-01-31", "2024-02-29", "2024-03-31", "2024-04-30"]
        );
    }

    #[test]
    fn quarterly_stepping() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-01-15", "2025-01-15", "quarterly"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(&table, vec![], vec![], &[], usize::MAX);
        assert_eq!(
            dates,
            vec![
                "2024-01-15",
                "2024-04-15",
                "2024-07-15",
                "2024-10-15",
                "2025-01-15"
            ]
        );
    }

    #[test]
    fn biweekly_descending() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-01-01", "2024-02-01", "biweekly"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(
            &table,
            vec![],
            vec![IndexOrderBy {
                column: 0,
                desc: true,
            }],
            &[],
            usize::MAX,
        );
        // Grid from Jan 1: 01-01, 01-15, 01-29; descending starts at the
        // last in-bounds grid point.
        assert_eq!(dates, vec!["2024-01-29", "2024-01-15", "2024-01-01"]);
    }

    #[test]
    fn descending_monthly_is_not_consumed() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-01-01", "2024-06-01", "monthly"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let mut info = IndexInfo::new(
            vec![],
            vec![IndexOrderBy {
                column: 0,
                desc: true,
            }],
        );
        assert_eq!(table.best_index(&mut info).unwrap(), BestIndexResult::Ok);
        assert!(!info.order_by_consumed);
    }

    #[test]
    fn year_constraint_infers_date_range() {
        let args = CreateArgs::for_table("calendar", "t", &[]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(
            &table,
            vec![constraint(1, ConstraintOp::Eq)],
            vec![],
            &[SqlValue::Integer(2023)],
            usize::MAX,
        );
        assert_eq!(dates.len(), 365);
        assert_eq!(dates.first().map(String::as_str), Some("2023-01-01"));
        assert_eq!(dates.last().map(String::as_str), Some("2023-12-31"));
    }

    #[test]
    fn year_intersects_explicit_bounds() {
        let args = CreateArgs::for_table("calendar", "t", &["2023-11-28", "2024-03-01", "daily"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(
            &table,
            vec![constraint(1, ConstraintOp::Eq)],
            vec![],
            &[SqlValue::Integer(2023)],
            usize::MAX,
        );
        // [2023-11-28, 2024-03-01] ∩ [2023-01-01, 2023-12-31]
        assert_eq!(dates.first().map(String::as_str), Some("2023-11-28"));
        assert_eq!(dates.last().map(String::as_str), Some("2023-12-31"));
        assert_eq!(dates.len(), 34);
    }

    #[test]
    fn date_equality_is_unique() {
        let args = CreateArgs::for_table("calendar", "t", &[]);
        let table = CalendarTable::connect(&args).expect("connect");
        let mut info = IndexInfo::new(vec![constraint(0, ConstraintOp::Eq)], vec![]);
        assert_eq!(table.best_index(&mut info).unwrap(), BestIndexResult::Ok);
        assert!(info.scan_unique);
        assert_eq!(info.estimated_rows, 1);
    }

    #[test]
    fn like_on_hidden_start_has_no_plan() {
        let args = CreateArgs::for_table("calendar", "t", &[]);
        let table = CalendarTable::connect(&args).expect("connect");
        let mut info = IndexInfo::new(vec![constraint(2, ConstraintOp::Like)], vec![]);
        assert_eq!(
            table.best_index(&mut info).unwrap(),
            BestIndexResult::Constraint
        );
    }

    #[test]
    fn null_year_yields_empty_scan() {
        let args = CreateArgs::for_table("calendar", "t", &[]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(
            &table,
            vec![constraint(1, ConstraintOp::Eq)],
            vec![],
            &[SqlValue::Null],
            usize::MAX,
        );
        assert!(dates.is_empty());
    }

    #[test]
    fn unparseable_date_bound_yields_empty_scan() {
        let args = CreateArgs::for_table("calendar", "t", &[]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(
            &table,
            vec![constraint(2, ConstraintOp::Eq)],
            vec![],
            &[SqlValue::Text("yesterday".into())],
            usize::MAX,
        );
        assert!(dates.is_empty());
    }

    #[test]
    fn unknown_frequency_falls_back_to_daily() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-01-01", "2024-01-03", "hourly"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let dates = plan_and_scan(&table, vec![], vec![], &[], usize::MAX);
        assert_eq!(dates.len(), 3);
    }

    #[test]
    fn stale_plan_id_fails_closed() {
        let args = CreateArgs::for_table("calendar", "t", &[]);
        let table = CalendarTable::connect(&args).expect("connect");
        let mut cursor = table.open().expect("open");
        cursor.filter(555, None, &[]).expect("filter");
        assert!(cursor.eof());
    }

    #[test]
    fn hidden_columns_report_resolved_bounds() {
        let args = CreateArgs::for_table("calendar", "t", &["2024-03-01", "2024-03-05", "daily"]);
        let table = CalendarTable::connect(&args).expect("connect");
        let mut info = IndexInfo::new(vec![], vec![]);
        table.best_index(&mut info).unwrap();
        let mut cursor = table.open().expect("open");
        cursor.filter(info.idx_num, None, &[]).expect("filter");

        let mut ctx = ColumnContext::new();
        cursor.column(&mut ctx, 2).unwrap();
        assert_eq!(ctx.take_value(), Some(SqlValue::Text("2024-03-01".into())));
        cursor.column(&mut ctx, 3).unwrap();
        assert_eq!(ctx.take_value(), Some(SqlValue::Text("2024-03-05".into())));
        cursor.column(&mut ctx, 1).unwrap();
        assert_eq!(ctx.take_value(), Some(SqlValue::Integer(2024)));
        cursor.column(&mut ctx, 42).unwrap();
        assert!(ctx.take_value().is_some_and(|v| v.is_null()));
    }
}
