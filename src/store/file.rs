use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{DataStore, MemoryStore, StoreData};
use crate::config::TaskDefaults;
use crate::error::Result;
use crate::model::{Comment, Project, Task, TaskDraft, TaskPatch, User};

/// A [`MemoryStore`] persisted as one pretty-printed JSON document,
/// rewritten after every successful mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the document at `path`; a missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>, defaults: TaskDefaults) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            load_data(&path)?
        } else {
            tracing::info!(path = %path.display(), "store file absent, starting empty");
            StoreData::default()
        };
        Ok(Self {
            path,
            inner: MemoryStore::from_data(data, defaults),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &StoreData {
        self.inner.data()
    }

    /// Apply a write to a copy, save the copy, then adopt it. On any error
    /// both memory and disk keep their previous state.
    fn commit<T>(&mut self, write: impl FnOnce(&mut MemoryStore) -> Result<T>) -> Result<T> {
        let mut staged = self.inner.clone();
        let out = write(&mut staged)?;
        save_data(staged.data(), &self.path)?;
        self.inner = staged;
        Ok(out)
    }
}

/// Save store rows to a JSON file.
pub fn save_data(data: &StoreData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), "store saved");
    Ok(())
}

/// Load store rows from a JSON file.
pub fn load_data(path: &Path) -> Result<StoreData> {
    let json = std::fs::read_to_string(path)?;
    let data: StoreData = serde_json::from_str(&json)?;
    tracing::debug!(
        path = %path.display(),
        projects = data.projects.len(),
        tasks = data.tasks.len(),
        "store loaded"
    );
    Ok(data)
}

impl DataStore for FileStore {
    fn list_projects(&self, viewer: Option<&User>, owner: Option<Uuid>) -> Result<Vec<Project>> {
        self.inner.list_projects(viewer, owner)
    }

    fn get_project(&self, viewer: Option<&User>, project_id: Uuid) -> Result<Project> {
        self.inner.get_project(viewer, project_id)
    }

    fn create_project(&mut self, viewer: Option<&User>, name: &str) -> Result<Project> {
        self.commit(|store| store.create_project(viewer, name))
    }

    fn set_project_public(&mut self, viewer: Option<&User>, project_id: Uuid, is_public: bool) -> Result<()> {
        self.commit(|store| store.set_project_public(viewer, project_id, is_public))
    }

    fn list_tasks(&self, viewer: Option<&User>, project_id: Uuid) -> Result<Vec<Task>> {
        self.inner.list_tasks(viewer, project_id)
    }

    fn get_task(&self, viewer: Option<&User>, task_id: Uuid) -> Result<Task> {
        self.inner.get_task(viewer, task_id)
    }

    fn create_task(&mut self, viewer: Option<&User>, draft: TaskDraft) -> Result<Task> {
        self.commit(|store| store.create_task(viewer, draft))
    }

    fn create_tasks(&mut self, viewer: Option<&User>, drafts: Vec<TaskDraft>) -> Result<Vec<Task>> {
        self.commit(|store| store.create_tasks(viewer, drafts))
    }

    fn update_task(&mut self, viewer: Option<&User>, task_id: Uuid, patch: TaskPatch) -> Result<()> {
        self.commit(|store| store.update_task(viewer, task_id, patch))
    }

    fn delete_task(&mut self, viewer: Option<&User>, task_id: Uuid) -> Result<()> {
        self.commit(|store| store.delete_task(viewer, task_id))
    }

    fn create_comment(&mut self, viewer: Option<&User>, task_id: Uuid, content: &str) -> Result<Comment> {
        self.commit(|store| store.create_comment(viewer, task_id, content))
    }

    fn list_comments(&self, viewer: Option<&User>, task_id: Uuid) -> Result<Vec<Comment>> {
        self.inner.list_comments(viewer, task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn failed_save_keeps_memory_in_step_with_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let owner = User::new("owner@example.com");
        let mut store = FileStore::open(&path, TaskDefaults::default()).unwrap();
        store.create_project(Some(&owner), "Saved").unwrap();

        // A directory in the file's place makes every save fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            store.create_project(Some(&owner), "Lost"),
            Err(crate::GanttError::Io(_))
        ));
        let names: Vec<&str> = store.data().projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Saved"]);
    }

    #[test]
    fn rejected_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let owner = User::new("owner@example.com");
        let mut store = FileStore::open(&path, TaskDefaults::default()).unwrap();
        let project = store.create_project(Some(&owner), "Import").unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let drafts = vec![
            TaskDraft::new(project.id, "Fine", date("2024-01-01"), date("2024-01-02")),
            TaskDraft::new(project.id, "Backwards", date("2024-01-05"), date("2024-01-01")),
        ];
        assert!(store.create_tasks(Some(&owner), drafts).is_err());
        assert!(store.data().tasks.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
