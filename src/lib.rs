//! Project planning core: task hierarchy ordering, Gantt timeline layout,
//! and the store/identity collaborators a project board runs against.

pub mod board;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod layout;
pub mod logging;
pub mod model;
pub mod render;
pub mod store;

pub use board::{ProjectBoard, ProjectIndex, TaskForm};
pub use config::{GanttConfig, LayoutConfig, TaskDefaults};
pub use error::{GanttError, Result};
pub use hierarchy::{sort_tasks, sorted_rows, TaskRow};
pub use layout::{compute_layout, compute_layout_from_records, Bar, MonthSegment, TimelineLayout};
pub use model::{Comment, Project, Task, TaskColor, TaskDraft, TaskPatch, TaskRecord, TaskStatus, User};
