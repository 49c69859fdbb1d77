use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{GanttError, Result};
use crate::model::{TaskColor, TaskDraft, TaskStatus};

/// Drafts parsed from a CSV file, ready to be created through a store.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvImport {
    /// In file order. Each carries a provisional id so parent links resolve.
    pub drafts: Vec<TaskDraft>,
    pub skipped: usize,
}

impl CsvImport {
    /// Drafts ordered so every parent precedes its children.
    pub fn in_creation_order(&self) -> Vec<&TaskDraft> {
        let mut placed: HashSet<Uuid> = HashSet::new();
        let mut pending: Vec<&TaskDraft> = self.drafts.iter().collect();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let (ready, rest): (Vec<&TaskDraft>, Vec<&TaskDraft>) = pending
                .into_iter()
                .partition(|d| d.parent_id.map_or(true, |p| placed.contains(&p)));
            if ready.is_empty() {
                // Unresolvable links; let the store report them.
                ordered.extend(rest);
                break;
            }
            placed.extend(ready.iter().filter_map(|d| d.id));
            ordered.extend(ready);
            pending = rest;
        }
        ordered
    }
}

/// Map a free-form status label to a status.
fn parse_status(status: &str) -> Option<TaskStatus> {
    match status.trim().to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => Some(TaskStatus::Done),
        "in progress" | "in-progress" | "doing" | "active" | "started" => Some(TaskStatus::Doing),
        "todo" | "to do" | "not started" | "not-started" | "new" | "planned" => Some(TaskStatus::Todo),
        _ => None,
    }
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Title,
    Start,
    End,
    Status,
    Color,
    Parent,
}

fn header_to_column(header: &str) -> Option<Column> {
    let normalized = header.trim().to_lowercase().replace([' ', '-', '_'], "");
    match normalized.as_str() {
        "title" | "name" | "task" | "tasklabel" | "taskname" | "label" => Some(Column::Title),
        "start" | "startdate" | "from" | "begin" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "due" | "duedate" => Some(Column::End),
        "status" | "state" | "stage" => Some(Column::Status),
        "color" | "colour" => Some(Column::Color),
        "parent" | "parenttask" | "parenttitle" | "subtaskof" => Some(Column::Parent),
        _ => None,
    }
}

/// Import task drafts for `project_id` from a CSV file.
///
/// Auto-detects the delimiter and matches headers loosely. Rows without a
/// title or with unparsable dates are skipped. Parent titles are resolved
/// case-insensitively once every row is read.
pub fn import_csv(path: &Path, project_id: Uuid) -> Result<CsvImport> {
    let content = std::fs::read_to_string(path)?;
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns: Vec<Option<Column>> = reader.headers()?.iter().map(header_to_column).collect();
    for required in [Column::Title, Column::Start, Column::End] {
        if !columns.contains(&Some(required)) {
            return Err(GanttError::validation(format!(
                "CSV is missing a {required:?} column; need title, start date and end date"
            )));
        }
    }

    let mut drafts: Vec<TaskDraft> = Vec::new();
    let mut parent_titles: Vec<Option<String>> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let field = |wanted: Column| {
            columns
                .iter()
                .position(|c| *c == Some(wanted))
                .and_then(|idx| record.get(idx))
                .filter(|v| !v.is_empty())
        };

        let Some(title) = field(Column::Title) else {
            tracing::warn!(line, "skipping CSV row without a title");
            skipped += 1;
            continue;
        };
        let (Some(start), Some(end)) = (
            field(Column::Start).and_then(parse_date),
            field(Column::End).and_then(parse_date),
        ) else {
            tracing::warn!(line, title, "skipping CSV row with invalid dates");
            skipped += 1;
            continue;
        };

        let mut draft = TaskDraft::new(project_id, title, start, end.max(start));
        draft.id = Some(Uuid::new_v4());
        draft.status = field(Column::Status).and_then(parse_status);
        draft.color = field(Column::Color).and_then(|c| c.parse::<TaskColor>().ok());

        parent_titles.push(field(Column::Parent).map(str::to_string));
        drafts.push(draft);
    }

    if drafts.is_empty() {
        return Err(GanttError::validation(if skipped > 0 {
            format!("no valid tasks found in CSV ({skipped} rows skipped)")
        } else {
            "CSV file has no data rows".to_string()
        }));
    }

    // Second pass: resolve parent titles to provisional ids.
    let title_to_id: HashMap<String, Uuid> = drafts
        .iter()
        .filter_map(|d| d.id.map(|id| (d.title.to_lowercase(), id)))
        .collect();

    for (draft, parent_title) in drafts.iter_mut().zip(parent_titles) {
        let Some(parent_title) = parent_title else {
            continue;
        };
        match title_to_id.get(&parent_title.to_lowercase()) {
            Some(&pid) if Some(pid) != draft.id => draft.parent_id = Some(pid),
            Some(_) => tracing::warn!(title = %draft.title, "ignoring task listed as its own parent"),
            None => tracing::warn!(parent = %parent_title, title = %draft.title, "parent task not found"),
        }
    }

    tracing::info!(path = %path.display(), tasks = drafts.len(), skipped, "CSV imported");
    Ok(CsvImport { drafts, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn imports_semicolon_file_with_parents() {
        let file = write_csv(
            "Task Label;Start Date;End Date;Status;Parent\n\
             Build;2024-01-10;2024-01-20;In Progress;\n\
             Wire up;11/01/2024;12/01/2024;done;build\n",
        );
        let import = import_csv(file.path(), Uuid::nil()).unwrap();
        assert_eq!(import.skipped, 0);
        assert_eq!(import.drafts.len(), 2);

        let build = &import.drafts[0];
        let wire = &import.drafts[1];
        assert_eq!(build.status, Some(TaskStatus::Doing));
        assert_eq!(wire.status, Some(TaskStatus::Done));
        assert_eq!(wire.start, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(wire.parent_id, build.id);
    }

    #[test]
    fn comma_file_skips_bad_rows() {
        let file = write_csv(
            "name,start,end,color\n\
             Good,2024-02-01,2024-02-03,green\n\
             ,2024-02-01,2024-02-03,red\n\
             Bad dates,someday,2024-02-03,red\n",
        );
        let import = import_csv(file.path(), Uuid::nil()).unwrap();
        assert_eq!(import.drafts.len(), 1);
        assert_eq!(import.skipped, 2);
        assert_eq!(import.drafts[0].color, Some(TaskColor::Green));
    }

    #[test]
    fn missing_columns_is_an_error() {
        let file = write_csv("name;notes\nA;b\n");
        assert!(matches!(
            import_csv(file.path(), Uuid::nil()),
            Err(GanttError::Validation { .. })
        ));
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let file = write_csv("title;start;end\nA;nope;nope\n");
        assert!(import_csv(file.path(), Uuid::nil()).is_err());
    }

    #[test]
    fn creation_order_puts_parents_first() {
        let file = write_csv(
            "title;start;end;parent\n\
             Child;2024-01-02;2024-01-03;Parent\n\
             Parent;2024-01-01;2024-01-05;\n",
        );
        let import = import_csv(file.path(), Uuid::nil()).unwrap();
        let order: Vec<&str> = import
            .in_creation_order()
            .into_iter()
            .map(|d| d.title.as_str())
            .collect();
        assert_eq!(order, vec!["Parent", "Child"]);
    }
}
