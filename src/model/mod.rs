pub mod comment;
pub mod project;
pub mod task;
pub mod timeline;
pub mod user;

pub use comment::Comment;
pub use project::Project;
pub use task::{parse_records, Task, TaskColor, TaskDraft, TaskPatch, TaskRecord, TaskStatus};
pub use timeline::{BarRect, CellGeometry};
pub use user::User;
