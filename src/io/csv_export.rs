use std::collections::HashMap;
use std::path::Path;

use uuid::Uuid;

use crate::error::Result;
use crate::hierarchy;
use crate::model::Task;

/// Export tasks to a semicolon-delimited CSV file that [`super::import_csv`]
/// reads back.
///
/// Columns: Title ; Start Date ; End Date ; Status ; Color ; Parent
/// Dates are written as YYYY-MM-DD and rows follow the list-view order.
/// Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(["Title", "Start Date", "End Date", "Status", "Color", "Parent"])?;

    let titles: HashMap<Uuid, &str> = tasks.iter().map(|t| (t.id, t.title.as_str())).collect();
    let ordered = hierarchy::sort_tasks(tasks);
    for task in &ordered {
        let parent = task
            .parent_id
            .and_then(|pid| titles.get(&pid).copied())
            .unwrap_or("");
        let start = task.start.format("%Y-%m-%d").to_string();
        let end = task.end.format("%Y-%m-%d").to_string();
        wtr.write_record([
            task.title.as_str(),
            start.as_str(),
            end.as_str(),
            task.status.as_str(),
            task.color.map(|c| c.as_str()).unwrap_or(""),
            parent,
        ])?;
    }

    wtr.flush()?;
    tracing::info!(path = %path.display(), tasks = ordered.len(), "CSV exported");
    Ok(ordered.len())
}
