//! Timeline window, day/month header buckets and bar geometry in day units.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use uuid::Uuid;

use crate::config::LayoutConfig;
use crate::error::{GanttError, Result};
use crate::model::{parse_records, Task, TaskRecord};

/// A run of consecutive days in the same calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSegment {
    /// First day of the run (not necessarily the 1st of the month).
    pub anchor: NaiveDate,
    pub day_count: usize,
}

impl MonthSegment {
    pub fn year(&self) -> i32 {
        self.anchor.year()
    }

    pub fn month(&self) -> u32 {
        self.anchor.month()
    }
}

/// Horizontal placement of one task bar, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    /// Days from the window start; negative when the task starts earlier.
    pub offset_days: i64,
    /// Inclusive day count.
    pub duration_days: i64,
}

impl Bar {
    /// Only bars that start inside the window are painted.
    pub fn is_drawable(&self) -> bool {
        self.offset_days >= 0
    }
}

/// Everything the chart needs to draw headers, grid and bars.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub window_start: NaiveDate,
    /// Every date in the window, ascending, both ends included.
    pub days: Vec<NaiveDate>,
    pub month_segments: Vec<MonthSegment>,
    pub bars: HashMap<Uuid, Bar>,
    /// Days from the window start to today; may fall outside the window.
    pub today_offset: i64,
}

impl TimelineLayout {
    pub fn window_end(&self) -> NaiveDate {
        self.days.last().copied().unwrap_or(self.window_start)
    }

    /// Column of the today marker, if today is inside the window.
    pub fn today_marker(&self) -> Option<usize> {
        usize::try_from(self.today_offset)
            .ok()
            .filter(|offset| *offset < self.days.len())
    }

    pub fn bar(&self, task_id: Uuid) -> Option<&Bar> {
        self.bars.get(&task_id)
    }
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Saturday and Sunday cells are shaded in the day header.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Compute the visible window and every task's bar.
///
/// With no tasks the window is centred loosely on `today`; otherwise it
/// spans the earliest start to the latest end, padded per `config`. Fails
/// only when padding would push the window past the calendar's range.
pub fn compute_layout(tasks: &[Task], today: NaiveDate, config: &LayoutConfig) -> Result<TimelineLayout> {
    let (window_start, window_end) = window(tasks, today, config)?;
    let days: Vec<NaiveDate> = window_start.iter_days().take_while(|d| *d <= window_end).collect();
    let month_segments = group_by_month(&days);

    let bars = tasks
        .iter()
        .map(|task| {
            let bar = Bar {
                offset_days: days_between(window_start, task.start),
                duration_days: days_between(task.start, task.end) + 1,
            };
            (task.id, bar)
        })
        .collect();

    Ok(TimelineLayout {
        window_start,
        days,
        month_segments,
        bars,
        today_offset: days_between(window_start, today),
    })
}

/// Parse raw rows and lay them out. The first malformed row fails the whole
/// computation with [`crate::GanttError::InvalidTaskData`].
pub fn compute_layout_from_records(
    records: &[TaskRecord],
    today: NaiveDate,
    config: &LayoutConfig,
) -> Result<TimelineLayout> {
    let tasks = parse_records(records)?;
    compute_layout(&tasks, today, config)
}

fn pad_before(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_sub_signed(delta))
}

fn pad_after(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

fn window(tasks: &[Task], today: NaiveDate, config: &LayoutConfig) -> Result<(NaiveDate, NaiveDate)> {
    let earliest = tasks.iter().min_by_key(|t| t.start);
    let latest = tasks.iter().max_by_key(|t| t.end);
    match (earliest, latest) {
        (Some(first), Some(last)) => {
            let start = pad_before(first.start, config.lead_days)
                .ok_or_else(|| GanttError::invalid_task(first.id.to_string(), "start_date", first.start.to_string()))?;
            let end = pad_after(last.end, config.trail_days)
                .ok_or_else(|| GanttError::invalid_task(last.id.to_string(), "end_date", last.end.to_string()))?;
            Ok((start, end))
        }
        _ => {
            let start = pad_before(today, config.empty_lead_days);
            let end = pad_after(today, config.empty_trail_days);
            start
                .zip(end)
                .ok_or_else(|| GanttError::validation(format!("timeline around {today} is out of range")))
        }
    }
}

/// Group consecutive dates sharing a (year, month) into segments.
pub fn group_by_month(days: &[NaiveDate]) -> Vec<MonthSegment> {
    let mut segments: Vec<MonthSegment> = Vec::new();
    for day in days {
        match segments.last_mut() {
            Some(last) if (last.year(), last.month()) == (day.year(), day.month()) => {
                last.day_count += 1;
            }
            _ => segments.push(MonthSegment {
                anchor: *day,
                day_count: 1,
            }),
        }
    }
    segments
}
