use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TaskDefaults;
use crate::error::{GanttError, Result};

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    /// Badge text shown next to a task in the list view.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::Doing => "DOING",
            TaskStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Bar colour label from the fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskColor {
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    Gray,
}

impl TaskColor {
    pub const PALETTE: [TaskColor; 6] = [
        TaskColor::Blue,
        TaskColor::Red,
        TaskColor::Green,
        TaskColor::Yellow,
        TaskColor::Purple,
        TaskColor::Gray,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskColor::Blue => "blue",
            TaskColor::Red => "red",
            TaskColor::Green => "green",
            TaskColor::Yellow => "yellow",
            TaskColor::Purple => "purple",
            TaskColor::Gray => "gray",
        }
    }
}

impl fmt::Display for TaskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TaskColor::PALETTE
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown color '{wanted}'"))
    }
}

/// A single task row on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    #[serde(rename = "start_date")]
    pub start: NaiveDate,
    #[serde(rename = "end_date")]
    pub end: NaiveDate,
    pub status: TaskStatus,
    /// 1 (high) to 3 (low).
    pub priority: u8,
    #[serde(default)]
    pub color: Option<TaskColor>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Percent complete, 0 to 100.
    #[serde(default)]
    pub progress: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new top-level task with the stock defaults.
    pub fn new(project_id: Uuid, title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        TaskDraft::new(project_id, title, start, end).into_task(&TaskDefaults::default(), Utc::now())
    }

    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Colour to paint the bar with, falling back to the configured default.
    pub fn effective_color(&self, defaults: &TaskDefaults) -> TaskColor {
        self.color.unwrap_or(defaults.color)
    }

    /// Inclusive number of calendar days the task spans.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Task row exactly as an external store hands it over: dates and enums
/// still in string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub priority: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            project_id: task.project_id.to_string(),
            title: task.title.clone(),
            start_date: task.start.format("%Y-%m-%d").to_string(),
            end_date: task.end.format("%Y-%m-%d").to_string(),
            status: task.status.as_str().to_string(),
            priority: i64::from(task.priority),
            color: task.color.map(|c| c.as_str().to_string()),
            parent_id: task.parent_id.map(|p| p.to_string()),
            progress: task.progress.map(i64::from),
            created_at: Some(task.created_at.to_rfc3339()),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = GanttError;

    fn try_from(record: TaskRecord) -> Result<Self> {
        let id = parse_uuid(&record.id, &record.id, "id")?;
        let project_id = parse_uuid(&record.id, &record.project_id, "project_id")?;
        let parent_id = match record.parent_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_uuid(&record.id, raw, "parent_id")?),
        };

        if record.title.trim().is_empty() {
            return Err(GanttError::invalid_task(&record.id, "title", record.title));
        }

        let start = parse_iso_date(&record.id, &record.start_date, "start_date")?;
        let end = parse_iso_date(&record.id, &record.end_date, "end_date")?;

        let status = record
            .status
            .parse::<TaskStatus>()
            .map_err(|_| GanttError::invalid_task(&record.id, "status", &record.status))?;

        let priority = u8::try_from(record.priority)
            .ok()
            .filter(|p| (1..=3).contains(p))
            .ok_or_else(|| GanttError::invalid_task(&record.id, "priority", record.priority.to_string()))?;

        let color = match record.color.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<TaskColor>()
                    .map_err(|_| GanttError::invalid_task(&record.id, "color", raw))?,
            ),
        };

        let progress = match record.progress {
            None => None,
            Some(p) => Some(
                u8::try_from(p)
                    .ok()
                    .filter(|p| *p <= 100)
                    .ok_or_else(|| GanttError::invalid_task(&record.id, "progress", p.to_string()))?,
            ),
        };

        let created_at = match record.created_at.as_deref() {
            None => Utc::now(),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| GanttError::invalid_task(&record.id, "created_at", raw))?,
        };

        Ok(Task {
            id,
            project_id,
            title: record.title,
            start,
            end,
            status,
            priority,
            color,
            parent_id,
            progress,
            created_at,
        })
    }
}

/// Parse a batch of rows; the first malformed row fails the whole batch.
pub fn parse_records(records: &[TaskRecord]) -> Result<Vec<Task>> {
    records.iter().cloned().map(Task::try_from).collect()
}

fn is_iso_shaped(raw: &str) -> bool {
    raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a strict, zero-padded `YYYY-MM-DD` date (years `0000..=9999`).
pub fn parse_iso_date(task_id: &str, raw: &str, field: &'static str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if !is_iso_shaped(trimmed) {
        return Err(GanttError::invalid_task(task_id, field, raw));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| GanttError::invalid_task(task_id, field, raw))
}

fn parse_uuid(task_id: &str, raw: &str, field: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| GanttError::invalid_task(task_id, field, raw))
}

/// Fields needed to create a task. Unset optional fields are filled from
/// [`TaskDefaults`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// Provisional id; the store assigns a fresh one when `None`.
    pub id: Option<Uuid>,
    pub project_id: Uuid,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: Option<TaskStatus>,
    pub priority: Option<u8>,
    pub color: Option<TaskColor>,
    pub parent_id: Option<Uuid>,
    pub progress: Option<u8>,
}

impl TaskDraft {
    pub fn new(project_id: Uuid, title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: None,
            project_id,
            title: title.into(),
            start,
            end,
            status: None,
            priority: None,
            color: None,
            parent_id: None,
            progress: None,
        }
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn into_task(self, defaults: &TaskDefaults, created_at: DateTime<Utc>) -> Task {
        Task {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            project_id: self.project_id,
            title: self.title,
            start: self.start,
            end: self.end,
            status: self.status.unwrap_or(defaults.status),
            priority: self.priority.unwrap_or(defaults.priority),
            color: Some(self.color.unwrap_or(defaults.color)),
            parent_id: self.parent_id,
            progress: self.progress,
            created_at,
        }
    }
}

/// Partial update of an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<u8>,
    pub color: Option<TaskColor>,
    /// `Some(None)` detaches the task from its parent.
    pub parent_id: Option<Option<Uuid>>,
    pub progress: Option<u8>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(start) = self.start {
            task.start = start;
        }
        if let Some(end) = self.end {
            task.end = end;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(color) = self.color {
            task.color = Some(color);
        }
        if let Some(parent_id) = self.parent_id {
            task.parent_id = parent_id;
        }
        if let Some(progress) = self.progress {
            task.progress = Some(progress);
        }
    }
}
