use crate::calendar::CalendarWeek;
use crate::state::ScheduleState;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Returned for every week when the rotation is empty.
pub const NO_NEIGHBOR: &str = "(není soused)";

/// Composite `(year, week)` key of an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    pub fn for_week(year: i32, week: &CalendarWeek) -> Self {
        Self::new(year, week.week_number)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekKeyParseError {
    input: String,
}

impl fmt::Display for WeekKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid week key '{}' (expected <year>-<week>)", self.input)
    }
}

impl std::error::Error for WeekKeyParseError {}

impl FromStr for WeekKey {
    type Err = WeekKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || WeekKeyParseError {
            input: s.to_string(),
        };
        // rsplit so that a negative year keeps its sign
        let (year, week) = s.rsplit_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let week = week.parse::<u32>().map_err(|_| err())?;
        let key = Self { year, week };
        // only the canonical spelling names a week: no padding, signs or blanks
        if week == 0 || key.to_string() != s {
            return Err(err());
        }
        Ok(key)
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a resolved name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeSource {
    Override,
    /// Rotation slot into `neighbors`.
    Rotation { index: usize },
    Unassigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignee<'a> {
    pub name: &'a str,
    pub source: AssigneeSource,
}

impl Assignee<'_> {
    pub fn is_override(&self) -> bool {
        self.source == AssigneeSource::Override
    }
}

/// Resolve the assignee for `key`, reporting whether it is an override.
pub fn resolve(state: &ScheduleState, key: WeekKey) -> Assignee<'_> {
    if let Some(name) = state.overrides.get(&key).filter(|name| !name.is_empty()) {
        return Assignee {
            name,
            source: AssigneeSource::Override,
        };
    }

    match rotation_index(key.week, state.neighbors.len()) {
        Some(index) => Assignee {
            name: &state.neighbors[index],
            source: AssigneeSource::Rotation { index },
        },
        None => Assignee {
            name: NO_NEIGHBOR,
            source: AssigneeSource::Unassigned,
        },
    }
}

/// Name on duty for `week_number` of `year`: override first, then round-robin.
pub fn resolve_assignee(state: &ScheduleState, year: i32, week_number: u32) -> &str {
    resolve(state, WeekKey::new(year, week_number)).name
}

/// Rotation slot for a week; week 1 maps to index 0.
pub fn rotation_index(week_number: u32, neighbor_count: usize) -> Option<usize> {
    if neighbor_count == 0 {
        return None;
    }
    let slot = (i64::from(week_number) - 1).rem_euclid(neighbor_count as i64);
    Some(slot as usize)
}

/// True when `today` lies in the week, both ends inclusive.
pub fn is_current_week(week: &CalendarWeek, today: NaiveDate) -> bool {
    week.contains(today)
}

pub fn is_current_week_at(week: &CalendarWeek, now: NaiveDateTime) -> bool {
    is_current_week(week, now.date())
}
