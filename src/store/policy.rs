//! Row-level access rules keyed on the viewer and a project's visibility.

use crate::error::{GanttError, Result};
use crate::model::{Project, User};

/// Owners always read their projects; anyone reads a public one.
pub fn can_read(viewer: Option<&User>, project: &Project) -> bool {
    project.is_public || viewer.is_some_and(|u| project.is_owned_by(u.id))
}

/// Only the owner writes a project or its tasks.
pub fn can_write(viewer: Option<&User>, project: &Project) -> bool {
    viewer.is_some_and(|u| project.is_owned_by(u.id))
}

/// A signed-in viewer, or `Unauthenticated`.
pub fn require_user(viewer: Option<&User>) -> Result<&User> {
    viewer.ok_or(GanttError::Unauthenticated)
}

/// Fail unless the viewer may write to `project`.
pub fn ensure_writable(viewer: Option<&User>, project: &Project, action: &str) -> Result<()> {
    require_user(viewer)?;
    if can_write(viewer, project) {
        Ok(())
    } else {
        Err(GanttError::denied(format!("{action} in project '{}'", project.name)))
    }
}
