//! Record storage and identity collaborators.
//!
//! The planner core never touches storage itself; the board talks to a
//! [`DataStore`] and decides edit rights from an [`IdentityProvider`]. Access
//! control lives inside the store, keyed on the viewer passed with each call.

pub mod file;
pub mod identity;
pub mod memory;
pub mod policy;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Comment, Project, Task, TaskDraft, TaskPatch, User};

pub use file::FileStore;
pub use identity::{IdentityProvider, LocalIdentity};
pub use memory::MemoryStore;

/// Project, task and comment CRUD with row-level access control.
pub trait DataStore {
    /// Projects the viewer can read, newest first, optionally one owner's.
    fn list_projects(&self, viewer: Option<&User>, owner: Option<Uuid>) -> Result<Vec<Project>>;

    fn get_project(&self, viewer: Option<&User>, project_id: Uuid) -> Result<Project>;

    fn create_project(&mut self, viewer: Option<&User>, name: &str) -> Result<Project>;

    fn set_project_public(&mut self, viewer: Option<&User>, project_id: Uuid, is_public: bool) -> Result<()>;

    /// Tasks of one project ordered by start date.
    fn list_tasks(&self, viewer: Option<&User>, project_id: Uuid) -> Result<Vec<Task>>;

    fn get_task(&self, viewer: Option<&User>, task_id: Uuid) -> Result<Task>;

    fn create_task(&mut self, viewer: Option<&User>, draft: TaskDraft) -> Result<Task>;

    /// Create drafts in order, all or nothing. A draft may name an earlier
    /// one in the batch as its parent.
    fn create_tasks(&mut self, viewer: Option<&User>, drafts: Vec<TaskDraft>) -> Result<Vec<Task>>;

    fn update_task(&mut self, viewer: Option<&User>, task_id: Uuid, patch: TaskPatch) -> Result<()>;

    /// Removes the task together with its children and their comments.
    fn delete_task(&mut self, viewer: Option<&User>, task_id: Uuid) -> Result<()>;

    fn create_comment(&mut self, viewer: Option<&User>, task_id: Uuid, content: &str) -> Result<Comment>;

    /// Comments on a task, oldest first.
    fn list_comments(&self, viewer: Option<&User>, task_id: Uuid) -> Result<Vec<Comment>>;
}

/// Every row a store holds; also the on-disk document of [`FileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub comments: Vec<Comment>,
}
