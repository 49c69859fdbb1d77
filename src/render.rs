//! Plain-text rendering of the task list and the timeline chart.

use std::fmt::Write;

use crate::config::TaskDefaults;
use crate::hierarchy::TaskRow;
use crate::layout::{is_weekend, TimelineLayout};
use crate::model::CellGeometry;

const LABEL_WIDTH: usize = 20;
const BAR_CHAR: char = '█';
const TODAY_CHAR: char = '|';
const WEEKEND_CHAR: char = '·';

fn truncate(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text:<width$}")
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

/// Indented task list with status badges and date ranges.
pub fn render_task_list(rows: &[TaskRow<'_>]) -> String {
    if rows.is_empty() {
        return "No tasks\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let marker = match (row.is_child, row.has_children) {
            (true, _) => "  └ ",
            (false, true) => "▾ ",
            (false, false) => "• ",
        };
        let task = row.task;
        let _ = writeln!(
            out,
            "{marker}{} [{}] {} - {}",
            task.title,
            task.status.label(),
            task.start.format("%-m/%-d"),
            task.end.format("%-m/%-d"),
        );
    }
    out
}

/// Month header, day header and one bar line per row.
///
/// Each day takes `cols_per_day` characters. Bars that start before the
/// window are left out, as are today markers outside it.
pub fn render_chart(layout: &TimelineLayout, rows: &[TaskRow<'_>], cols_per_day: usize) -> String {
    let cols = cols_per_day.max(1);
    let mut out = String::new();

    out.push_str(&" ".repeat(LABEL_WIDTH + 1));
    for segment in &layout.month_segments {
        let label = segment.anchor.format("%Y-%m").to_string();
        out.push_str(&truncate(&label, segment.day_count * cols));
    }
    out.push('\n');

    out.push_str(&" ".repeat(LABEL_WIDTH + 1));
    for day in &layout.days {
        let number = day.format("%-d").to_string();
        let cell = if number.len() > cols {
            number[number.len() - cols..].to_string()
        } else {
            format!("{number:>cols$}")
        };
        out.push_str(&cell);
    }
    out.push('\n');

    let today = layout.today_marker();
    for row in rows {
        let label = if row.is_child {
            format!(" {}", row.task.title)
        } else {
            row.task.title.clone()
        };
        out.push_str(&truncate(&label, LABEL_WIDTH));
        out.push(' ');

        let bar = layout.bar(row.task.id).filter(|b| b.is_drawable());
        for (i, day) in layout.days.iter().enumerate() {
            let covered = bar.is_some_and(|b| {
                let i = i as i64;
                i >= b.offset_days && i < b.offset_days + b.duration_days
            });
            let fill = if covered {
                BAR_CHAR
            } else if today == Some(i) {
                TODAY_CHAR
            } else if is_weekend(*day) {
                WEEKEND_CHAR
            } else {
                ' '
            };
            for _ in 0..cols {
                out.push(fill);
            }
        }
        out.push('\n');
    }
    out
}

/// Pixel placement of headers, the today marker and every drawn bar, as a
/// canvas front end would paint them.
pub fn render_geometry(
    layout: &TimelineLayout,
    rows: &[TaskRow<'_>],
    geometry: &CellGeometry,
    defaults: &TaskDefaults,
) -> String {
    let mut out = String::new();
    let mut x = 0.0;
    for segment in &layout.month_segments {
        let width = geometry.span_width(segment.day_count);
        let _ = writeln!(out, "month {} x={x:.0} w={width:.0}", segment.anchor.format("%Y-%m"));
        x += width;
    }
    if let Some(column) = layout.today_marker() {
        let _ = writeln!(out, "today x={:.0}", geometry.today_marker_x(column));
    }
    for (i, row) in rows.iter().enumerate() {
        let task = row.task;
        let color = task.effective_color(defaults);
        let top = geometry.row_top(i);
        match layout.bar(task.id).filter(|b| b.is_drawable()) {
            Some(bar) => {
                let rect = geometry.drawn_bar_rect(bar);
                let _ = writeln!(
                    out,
                    "bar {} {color} x={:.0} y={top:.0} w={:.0}",
                    truncate(&task.title, LABEL_WIDTH).trim_end(),
                    rect.left,
                    rect.width
                );
            }
            None => {
                let _ = writeln!(out, "bar {} {color} hidden", truncate(&task.title, LABEL_WIDTH).trim_end());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::hierarchy::sorted_rows;
    use crate::layout::compute_layout;
    use crate::model::Task;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<Task> {
        let parent = Task::new(Uuid::nil(), "Launch", date("2024-01-10"), date("2024-01-20"));
        let mut child = Task::new(Uuid::nil(), "Prep", date("2024-01-12"), date("2024-01-14"));
        child.parent_id = Some(parent.id);
        vec![child, parent]
    }

    #[test]
    fn list_indents_children() {
        let tasks = sample();
        let text = render_task_list(&sorted_rows(&tasks));
        assert_eq!(
            text,
            "▾ Launch [TODO] 1/10 - 1/20\n  └ Prep [TODO] 1/12 - 1/14\n"
        );
        assert_eq!(render_task_list(&[]), "No tasks\n");
    }

    #[test]
    fn chart_draws_bars_in_day_columns() {
        let tasks = sample();
        let layout = compute_layout(&tasks, date("2024-01-15"), &LayoutConfig::default()).unwrap();
        let chart = render_chart(&layout, &sorted_rows(&tasks), 1);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 4);

        let parent_cells: Vec<char> = lines[2].chars().skip(LABEL_WIDTH + 1).collect();
        assert_eq!(parent_cells.len(), layout.days.len());
        let filled: Vec<usize> = parent_cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == BAR_CHAR)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(filled, (5..16).collect::<Vec<_>>());

        let child_cells: Vec<char> = lines[3].chars().skip(LABEL_WIDTH + 1).collect();
        assert_eq!(child_cells[10], TODAY_CHAR);
    }

    #[test]
    fn geometry_places_bars_in_pixels() {
        let mut tasks = sample();
        tasks[0].color = None;
        let layout = compute_layout(&tasks, date("2024-01-15"), &LayoutConfig::default()).unwrap();
        let text = render_geometry(&layout, &sorted_rows(&tasks), &CellGeometry::default(), &TaskDefaults::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "month 2024-01 x=0 w=1248",
                "today x=504",
                "bar Launch blue x=242 y=0 w=524",
                "bar Prep blue x=338 y=58 w=140",
            ]
        );
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(truncate("abc", 5), "abc  ");
        assert_eq!(truncate("abcdefgh", 5).chars().count(), 5);
    }
}
