use crate::assignment::{self, WeekKey};
use crate::calendar::{self, CalendarWeek};
use crate::state::ScheduleState;
use chrono::NaiveDate;
use polars::prelude::*;

/// One resolved week of the rota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotaCell {
    pub week: CalendarWeek,
    pub key: WeekKey,
    pub assignee: String,
    pub is_override: bool,
    pub is_current: bool,
}

/// Weeks sharing a dominant month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRow {
    pub month: u32,
    pub cells: Vec<RotaCell>,
}

impl MonthRow {
    pub fn label(&self) -> &'static str {
        calendar::month_name(self.month)
    }
}

/// The resolved schedule of `state.year`, grouped by month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rota {
    pub year: i32,
    pub months: Vec<MonthRow>,
}

impl Rota {
    pub fn build(state: &ScheduleState, today: NaiveDate) -> Self {
        let year = state.year;
        let weeks = calendar::compute_weeks(year);
        let months = calendar::group_by_month(&weeks)
            .into_iter()
            .map(|(month, weeks)| MonthRow {
                month,
                cells: weeks
                    .into_iter()
                    .map(|week| {
                        let key = WeekKey::for_week(year, &week);
                        let assignee = assignment::resolve(state, key);
                        RotaCell {
                            week,
                            key,
                            assignee: assignee.name.to_string(),
                            is_override: assignee.is_override(),
                            is_current: assignment::is_current_week(&week, today),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { year, months }
    }

    pub fn cells(&self) -> impl Iterator<Item = &RotaCell> {
        self.months.iter().flat_map(|row| row.cells.iter())
    }

    pub fn week_count(&self) -> usize {
        self.months.iter().map(|row| row.cells.len()).sum()
    }

    pub fn cell(&self, week_number: u32) -> Option<&RotaCell> {
        self.cells().find(|cell| cell.week.week_number == week_number)
    }

    /// The week containing `today`, if it belongs to this year.
    pub fn current(&self) -> Option<&RotaCell> {
        self.cells().find(|cell| cell.is_current)
    }

    /// Current-week banner text, e.g. `Tento týden uklízí: Novákovi (5.2. - 11.2.)`.
    pub fn banner(&self) -> Option<String> {
        self.current().map(|cell| {
            format!(
                "Tento týden uklízí: {} ({})",
                cell.assignee,
                cell.week.date_range_label()
            )
        })
    }

    /// Flatten to one row per week.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let cells: Vec<&RotaCell> = self.cells().collect();

        let months = Series::new(
            PlSmallStr::from_static("month"),
            cells.iter().map(|c| c.week.month_name()).collect::<Vec<_>>(),
        );
        let weeks = Series::new(
            PlSmallStr::from_static("week"),
            cells
                .iter()
                .map(|c| c.week.week_number as i32)
                .collect::<Vec<_>>(),
        );
        let starts = Series::new(
            PlSmallStr::from_static("start"),
            cells
                .iter()
                .map(|c| date_to_i32(c.week.start))
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Date)?;
        let ends = Series::new(
            PlSmallStr::from_static("end"),
            cells
                .iter()
                .map(|c| date_to_i32(c.week.end))
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Date)?;
        let assignees = Series::new(
            PlSmallStr::from_static("assignee"),
            cells
                .iter()
                .map(|c| c.assignee.as_str())
                .collect::<Vec<_>>(),
        );
        let overrides = Series::new(
            PlSmallStr::from_static("override"),
            cells.iter().map(|c| c.is_override).collect::<Vec<_>>(),
        );
        let current = Series::new(
            PlSmallStr::from_static("current"),
            cells.iter().map(|c| c.is_current).collect::<Vec<_>>(),
        );

        DataFrame::new(vec![
            months.into(),
            weeks.into(),
            starts.into(),
            ends.into(),
            assignees.into(),
            overrides.into(),
            current.into(),
        ])
    }
}

/// Days since the Unix epoch, the physical representation of polars dates.
fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}
