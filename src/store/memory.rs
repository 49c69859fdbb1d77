use std::collections::HashSet;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use super::policy::{can_read, ensure_writable, require_user};
use super::{DataStore, StoreData};
use crate::config::TaskDefaults;
use crate::error::{GanttError, Result};
use crate::model::{Comment, Project, Task, TaskDraft, TaskPatch, User};

/// In-process store. Also the engine behind [`super::FileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
    defaults: TaskDefaults,
}

impl MemoryStore {
    pub fn new(defaults: TaskDefaults) -> Self {
        Self {
            data: StoreData::default(),
            defaults,
        }
    }

    pub fn from_data(data: StoreData, defaults: TaskDefaults) -> Self {
        Self { data, defaults }
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    fn project(&self, viewer: Option<&User>, project_id: Uuid) -> Result<&Project> {
        self.data
            .projects
            .iter()
            .find(|p| p.id == project_id && can_read(viewer, p))
            .ok_or_else(|| GanttError::not_found("Project", project_id))
    }

    fn project_mut(&mut self, viewer: Option<&User>, project_id: Uuid) -> Result<&mut Project> {
        self.data
            .projects
            .iter_mut()
            .find(|p| p.id == project_id && can_read(viewer, p))
            .ok_or_else(|| GanttError::not_found("Project", project_id))
    }

    /// A task plus its project, both visible to `viewer`.
    fn task_with_project(&self, viewer: Option<&User>, task_id: Uuid) -> Result<(&Task, &Project)> {
        let task = self
            .data
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| GanttError::not_found("Task", task_id))?;
        let project = self
            .project(viewer, task.project_id)
            .map_err(|_| GanttError::not_found("Task", task_id))?;
        Ok((task, project))
    }

    /// Store-side checks every written task must pass.
    fn validate_task(&self, task: &Task) -> Result<()> {
        if task.title.trim().is_empty() {
            return Err(GanttError::validation("task title must not be empty"));
        }
        for (field, date) in [("start", task.start), ("end", task.end)] {
            if !(0..=9999).contains(&date.year()) {
                return Err(GanttError::validation(format!(
                    "task '{}' {field} date {date} is outside years 0000..=9999",
                    task.title
                )));
            }
        }
        if task.start > task.end {
            return Err(GanttError::validation(format!(
                "task '{}' ends ({}) before it starts ({})",
                task.title, task.end, task.start
            )));
        }
        if !(1..=3).contains(&task.priority) {
            return Err(GanttError::validation(format!("priority {} is outside 1..=3", task.priority)));
        }
        if task.progress.is_some_and(|p| p > 100) {
            return Err(GanttError::validation("progress must be within 0..=100"));
        }
        if let Some(parent_id) = task.parent_id {
            if parent_id == task.id {
                return Err(GanttError::validation(format!(
                    "task '{}' cannot be its own parent",
                    task.title
                )));
            }
            let parent = self
                .data
                .tasks
                .iter()
                .find(|t| t.id == parent_id)
                .ok_or_else(|| GanttError::not_found("Parent task", parent_id))?;
            if parent.project_id != task.project_id {
                return Err(GanttError::validation("parent task belongs to another project"));
            }
        }
        Ok(())
    }
}

impl DataStore for MemoryStore {
    fn list_projects(&self, viewer: Option<&User>, owner: Option<Uuid>) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .data
            .projects
            .iter()
            .filter(|p| can_read(viewer, p))
            .filter(|p| owner.map_or(true, |o| p.owner_id == o))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    fn get_project(&self, viewer: Option<&User>, project_id: Uuid) -> Result<Project> {
        self.project(viewer, project_id).cloned()
    }

    fn create_project(&mut self, viewer: Option<&User>, name: &str) -> Result<Project> {
        let user = require_user(viewer)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GanttError::validation("project name must not be empty"));
        }
        let project = Project::new(user.id, name);
        tracing::info!(project = %project.id, owner = %user.id, "project created");
        self.data.projects.push(project.clone());
        Ok(project)
    }

    fn set_project_public(&mut self, viewer: Option<&User>, project_id: Uuid, is_public: bool) -> Result<()> {
        let project = self.project_mut(viewer, project_id)?;
        ensure_writable(viewer, project, "change sharing")?;
        project.is_public = is_public;
        tracing::info!(project = %project_id, is_public, "project visibility changed");
        Ok(())
    }

    fn list_tasks(&self, viewer: Option<&User>, project_id: Uuid) -> Result<Vec<Task>> {
        self.project(viewer, project_id)?;
        let mut tasks: Vec<Task> = self
            .data
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.start);
        Ok(tasks)
    }

    fn get_task(&self, viewer: Option<&User>, task_id: Uuid) -> Result<Task> {
        self.task_with_project(viewer, task_id).map(|(t, _)| t.clone())
    }

    fn create_task(&mut self, viewer: Option<&User>, draft: TaskDraft) -> Result<Task> {
        let project = self.project(viewer, draft.project_id)?;
        ensure_writable(viewer, project, "add a task")?;

        if let Some(id) = draft.id {
            if self.data.tasks.iter().any(|t| t.id == id) {
                return Err(GanttError::validation(format!("task id {id} already exists")));
            }
        }
        let task = draft.into_task(&self.defaults, Utc::now());
        self.validate_task(&task)?;

        tracing::debug!(task = %task.id, project = %task.project_id, "task created");
        self.data.tasks.push(task.clone());
        Ok(task)
    }

    fn create_tasks(&mut self, viewer: Option<&User>, drafts: Vec<TaskDraft>) -> Result<Vec<Task>> {
        let kept = self.data.tasks.len();
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            match self.create_task(viewer, draft) {
                Ok(task) => created.push(task),
                Err(e) => {
                    self.data.tasks.truncate(kept);
                    tracing::warn!(error = %e, rolled_back = created.len(), "task batch rejected");
                    return Err(e);
                }
            }
        }
        tracing::info!(count = created.len(), "task batch created");
        Ok(created)
    }

    fn update_task(&mut self, viewer: Option<&User>, task_id: Uuid, patch: TaskPatch) -> Result<()> {
        let (task, project) = self.task_with_project(viewer, task_id)?;
        ensure_writable(viewer, project, "edit a task")?;
        if patch.is_empty() {
            tracing::debug!(task = %task_id, "empty patch ignored");
            return Ok(());
        }

        let mut updated = task.clone();
        patch.apply(&mut updated);
        self.validate_task(&updated)?;

        if let Some(slot) = self.data.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = updated;
        }
        tracing::debug!(task = %task_id, "task updated");
        Ok(())
    }

    fn delete_task(&mut self, viewer: Option<&User>, task_id: Uuid) -> Result<()> {
        let (_, project) = self.task_with_project(viewer, task_id)?;
        ensure_writable(viewer, project, "delete a task")?;

        let mut removed: HashSet<Uuid> = HashSet::from([task_id]);
        loop {
            let descendants: Vec<Uuid> = self
                .data
                .tasks
                .iter()
                .filter(|t| !removed.contains(&t.id) && t.parent_id.is_some_and(|p| removed.contains(&p)))
                .map(|t| t.id)
                .collect();
            if descendants.is_empty() {
                break;
            }
            removed.extend(descendants);
        }
        self.data.tasks.retain(|t| !removed.contains(&t.id));
        self.data.comments.retain(|c| !removed.contains(&c.task_id));
        tracing::debug!(task = %task_id, removed = removed.len(), "task deleted");
        Ok(())
    }

    fn create_comment(&mut self, viewer: Option<&User>, task_id: Uuid, content: &str) -> Result<Comment> {
        let user = require_user(viewer)?;
        self.task_with_project(viewer, task_id)?;
        if content.trim().is_empty() {
            return Err(GanttError::validation("comment must not be empty"));
        }
        let comment = Comment::new(task_id, user.id, content.trim());
        self.data.comments.push(comment.clone());
        Ok(comment)
    }

    fn list_comments(&self, viewer: Option<&User>, task_id: Uuid) -> Result<Vec<Comment>> {
        self.task_with_project(viewer, task_id)?;
        let mut comments: Vec<Comment> = self
            .data
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}
