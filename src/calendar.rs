use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

/// Hard cap on included weeks; a year never has more than 53.
pub const MAX_WEEKS_PER_YEAR: usize = 53;

const MONTH_NAMES: [&str; 12] = [
    "Leden", "Únor", "Březen", "Duben", "Květen", "Červen", "Červenec", "Srpen", "Září", "Říjen",
    "Listopad", "Prosinec",
];

/// One Monday-to-Sunday week of a year, tagged with the month holding its Thursday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWeek {
    pub week_number: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Dominant month, 1-12.
    pub month: u32,
}

impl CalendarWeek {
    fn from_start(week_number: u32, start: NaiveDate) -> Option<Self> {
        let end = start.checked_add_signed(Duration::days(6))?;
        let thursday = start.checked_add_signed(Duration::days(3))?;
        Some(Self {
            week_number,
            start,
            end,
            month: thursday.month(),
        })
    }

    pub fn thursday(&self) -> NaiveDate {
        self.start + Duration::days(3)
    }

    /// Whether `date` falls within `start..=end`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Short range label such as `1.1. - 7.1.`
    pub fn date_range_label(&self) -> String {
        format!(
            "{} - {}",
            format_day_month(self.start),
            format_day_month(self.end)
        )
    }
}

/// Compute the ordered weeks of `year`.
///
/// Week 1 is the Monday-started week containing January 4th, so it may begin
/// in late December of the previous year. A week belongs to `year` when its
/// Thursday does, which also yields the 52/53-week split of ISO 8601. Years
/// outside the range of `NaiveDate` produce an empty list.
pub fn compute_weeks(year: i32) -> Vec<CalendarWeek> {
    let Some(mut start) = first_week_start(year) else {
        return Vec::new();
    };
    let Some(end_of_year) = NaiveDate::from_ymd_opt(year, 12, 31) else {
        return Vec::new();
    };

    let mut weeks = Vec::with_capacity(MAX_WEEKS_PER_YEAR);
    let mut week_number: u32 = 1;

    while start <= end_of_year || week_number <= 52 {
        let Some(week) = CalendarWeek::from_start(week_number, start) else {
            break;
        };
        if week.thursday().year() == year {
            weeks.push(week);
        } else if week.thursday().year() > year {
            break;
        }

        if weeks.len() >= MAX_WEEKS_PER_YEAR {
            break;
        }
        match start.checked_add_signed(Duration::days(7)) {
            Some(next) => start = next,
            None => break,
        }
        week_number += 1;
    }
    weeks
}

/// Monday opening week 1 of `year`.
fn first_week_start(year: i32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let days_to_monday = (7 - jan1.weekday().num_days_from_monday()) % 7;
    let first_monday = jan1.checked_add_signed(Duration::days(days_to_monday as i64))?;
    debug_assert_eq!(first_monday.weekday(), Weekday::Mon);

    if first_monday.day() > 4 {
        first_monday.checked_sub_signed(Duration::days(7))
    } else {
        Some(first_monday)
    }
}

/// Group weeks by dominant month, months ascending.
pub fn group_by_month(weeks: &[CalendarWeek]) -> BTreeMap<u32, Vec<CalendarWeek>> {
    let mut groups: BTreeMap<u32, Vec<CalendarWeek>> = BTreeMap::new();
    for week in weeks {
        groups.entry(week.month).or_default().push(*week);
    }
    groups
}

/// Month label for 1-12; `"?"` otherwise.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("?")
}

/// `d.m.` without zero padding, e.g. `5.2.`
pub fn format_day_month(date: NaiveDate) -> String {
    format!("{}.{}.", date.day(), date.month())
}
