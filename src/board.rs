//! Project page orchestration: fetch on load, re-fetch after every mutation.
//!
//! The viewer is carried explicitly by each board instead of being looked up
//! from ambient state. Mutations go straight to the store with no retries;
//! failures are logged and handed back to the caller to show.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::GanttConfig;
use crate::error::{GanttError, Result};
use crate::hierarchy::{self, NestingIssue, TaskRow};
use crate::layout::{self, TimelineLayout};
use crate::model::{Comment, Project, Task, TaskColor, TaskDraft, TaskPatch, TaskStatus, User};
use crate::store::DataStore;

/// Values submitted by the task form. `id` set means edit, unset means create.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub id: Option<Uuid>,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: Option<TaskStatus>,
    pub color: Option<TaskColor>,
    pub parent_id: Option<Uuid>,
}

impl TaskForm {
    /// A blank form for a new task spanning `start..=end`.
    pub fn create(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            start,
            end,
            status: None,
            color: None,
            parent_id: None,
        }
    }

    /// A form pre-filled from an existing task.
    pub fn edit(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            start: task.start,
            end: task.end,
            status: Some(task.status),
            color: task.color,
            parent_id: task.parent_id,
        }
    }
}

fn logged<T>(result: Result<T>, action: &str) -> Result<T> {
    if let Err(e) = &result {
        tracing::error!(action, error = %e, "board operation failed");
    }
    result
}

/// One project with its task snapshot, as seen by one viewer.
#[derive(Debug, Clone)]
pub struct ProjectBoard {
    viewer: Option<User>,
    project: Project,
    tasks: Vec<Task>,
    config: GanttConfig,
}

impl ProjectBoard {
    /// Fetch the project, then its tasks.
    pub fn load<S: DataStore + ?Sized>(
        store: &S,
        viewer: Option<User>,
        project_id: Uuid,
        config: GanttConfig,
    ) -> Result<Self> {
        let project = logged(store.get_project(viewer.as_ref(), project_id), "load project")?;
        let tasks = logged(store.list_tasks(viewer.as_ref(), project_id), "load tasks")?;
        tracing::debug!(project = %project_id, tasks = tasks.len(), "board loaded");

        let board = Self {
            viewer,
            project,
            tasks,
            config,
        };
        for issue in board.nesting_issues() {
            tracing::warn!(?issue, "task hierarchy deeper than one level");
        }
        Ok(board)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    /// Owners edit; everyone else only views.
    pub fn is_owner(&self) -> bool {
        self.viewer
            .as_ref()
            .is_some_and(|u| self.project.is_owned_by(u.id))
    }

    fn require_owner(&self, action: &str) -> Result<()> {
        if self.is_owner() {
            Ok(())
        } else {
            logged(Err(GanttError::denied(action)), action)
        }
    }

    /// Re-read the project and its tasks from the store.
    pub fn refresh<S: DataStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.project = logged(store.get_project(self.viewer.as_ref(), self.project.id), "refresh project")?;
        self.tasks = logged(store.list_tasks(self.viewer.as_ref(), self.project.id), "refresh tasks")?;
        Ok(())
    }

    /// Create or update a task from the form, then refresh. Returns its id.
    pub fn save_task<S: DataStore + ?Sized>(&mut self, store: &mut S, form: TaskForm) -> Result<Uuid> {
        self.require_owner("save a task")?;
        let viewer = self.viewer.as_ref();

        let id = match form.id {
            Some(id) => {
                let patch = TaskPatch {
                    title: Some(form.title),
                    start: Some(form.start),
                    end: Some(form.end),
                    status: form.status,
                    color: form.color,
                    parent_id: Some(form.parent_id),
                    ..Default::default()
                };
                logged(store.update_task(viewer, id, patch), "update task")?;
                id
            }
            None => {
                let defaults = self.config.defaults;
                let draft = TaskDraft {
                    status: Some(form.status.unwrap_or(defaults.status)),
                    priority: Some(defaults.priority),
                    color: Some(form.color.unwrap_or(defaults.color)),
                    parent_id: form.parent_id,
                    ..TaskDraft::new(self.project.id, form.title, form.start, form.end)
                };
                logged(store.create_task(viewer, draft), "create task")?.id
            }
        };

        self.refresh(store)?;
        Ok(id)
    }

    /// Delete a task (and its children), then refresh.
    pub fn delete_task<S: DataStore + ?Sized>(&mut self, store: &mut S, task_id: Uuid) -> Result<()> {
        self.require_owner("delete a task")?;
        logged(store.delete_task(self.viewer.as_ref(), task_id), "delete task")?;
        self.refresh(store)
    }

    /// Flip public sharing. Returns the new visibility.
    pub fn toggle_public<S: DataStore + ?Sized>(&mut self, store: &mut S) -> Result<bool> {
        self.require_owner("change sharing")?;
        let next = !self.project.is_public;
        logged(
            store.set_project_public(self.viewer.as_ref(), self.project.id, next),
            "change sharing",
        )?;
        self.refresh(store)?;
        Ok(self.project.is_public)
    }

    /// Create a batch of drafts (parents first), all or nothing, then
    /// refresh. Returns how many tasks were created.
    pub fn import_tasks<S: DataStore + ?Sized>(&mut self, store: &mut S, drafts: Vec<TaskDraft>) -> Result<usize> {
        self.require_owner("import tasks")?;
        if let Some(stray) = drafts.iter().find(|d| d.project_id != self.project.id) {
            return logged(
                Err(GanttError::validation(format!("task '{}' belongs to another project", stray.title))),
                "import tasks",
            );
        }
        let created = logged(store.create_tasks(self.viewer.as_ref(), drafts), "import tasks")?;
        self.refresh(store)?;
        Ok(created.len())
    }

    pub fn add_comment<S: DataStore + ?Sized>(&self, store: &mut S, task_id: Uuid, content: &str) -> Result<Comment> {
        logged(store.create_comment(self.viewer.as_ref(), task_id, content), "add comment")
    }

    pub fn comments<S: DataStore + ?Sized>(&self, store: &S, task_id: Uuid) -> Result<Vec<Comment>> {
        logged(store.list_comments(self.viewer.as_ref(), task_id), "list comments")
    }

    /// Rows for the list view.
    pub fn rows(&self) -> Vec<TaskRow<'_>> {
        hierarchy::sorted_rows(&self.tasks)
    }

    /// Parent candidates for the task form.
    pub fn potential_parents(&self, editing: Option<Uuid>) -> Vec<&Task> {
        hierarchy::potential_parents(&self.tasks, editing)
    }

    /// Chart layout as of `today`.
    pub fn layout(&self, today: NaiveDate) -> Result<TimelineLayout> {
        logged(layout::compute_layout(&self.tasks, today, &self.config.layout), "lay out timeline")
    }

    pub fn nesting_issues(&self) -> Vec<NestingIssue> {
        hierarchy::nesting_issues(&self.tasks)
    }
}

/// The project list page for one signed-in viewer.
#[derive(Debug, Clone)]
pub struct ProjectIndex {
    viewer: User,
    projects: Vec<Project>,
}

impl ProjectIndex {
    pub fn load<S: DataStore + ?Sized>(store: &S, viewer: Option<User>) -> Result<Self> {
        let viewer = logged(viewer.ok_or(GanttError::Unauthenticated), "list projects")?;
        let projects = logged(store.list_projects(Some(&viewer), None), "list projects")?;
        Ok(Self { viewer, projects })
    }

    /// Newest first.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Projects the viewer owns, as opposed to public ones shared by others.
    pub fn owned(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.is_owned_by(self.viewer.id))
    }

    /// Create a project; it is listed first afterwards.
    pub fn create<S: DataStore + ?Sized>(&mut self, store: &mut S, name: &str) -> Result<Project> {
        let project = logged(store.create_project(Some(&self.viewer), name), "create project")?;
        self.projects.insert(0, project.clone());
        Ok(project)
    }
}
