//! End-to-end board flows against the in-memory and file-backed stores.

use chrono::NaiveDate;
use gantt_planner::store::{DataStore, FileStore, IdentityProvider, LocalIdentity, MemoryStore};
use gantt_planner::{
    GanttConfig, GanttError, ProjectBoard, ProjectIndex, TaskColor, TaskDefaults, TaskDraft, TaskForm, TaskStatus,
    User,
};
use pretty_assertions::assert_eq;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn owner_and_project(store: &mut MemoryStore) -> (User, uuid::Uuid) {
    let mut identity = LocalIdentity::new();
    let owner = identity.sign_up("owner@example.com", "secret99").unwrap();
    let mut index = ProjectIndex::load(&*store, identity.current_user()).unwrap();
    let project = index.create(store, "Website relaunch").unwrap();
    (owner, project.id)
}

#[test]
fn owner_builds_a_hierarchy() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner), project_id, GanttConfig::default()).unwrap();
    assert!(board.is_owner());
    assert!(board.tasks().is_empty());

    let design = board
        .save_task(&mut store, TaskForm::create("Design", date("2024-03-01"), date("2024-03-10")))
        .unwrap();
    let mut mockups = TaskForm::create("Mockups", date("2024-03-02"), date("2024-03-04"));
    mockups.parent_id = Some(design);
    mockups.color = Some(TaskColor::Purple);
    let mockups_id = board.save_task(&mut store, mockups).unwrap();
    board
        .save_task(&mut store, TaskForm::create("Build", date("2024-02-20"), date("2024-03-20")))
        .unwrap();

    let titles: Vec<&str> = board.rows().iter().map(|r| r.task.title.as_str()).collect();
    assert_eq!(titles, vec!["Build", "Design", "Mockups"]);

    let mockups = board.tasks().iter().find(|t| t.id == mockups_id).unwrap();
    assert_eq!(mockups.color, Some(TaskColor::Purple));
    assert_eq!(mockups.status, TaskStatus::Todo);

    let layout = board.layout(date("2024-03-05")).unwrap();
    assert_eq!(layout.window_start, date("2024-02-15"));
    assert_eq!(layout.window_end(), date("2024-03-30"));
    assert!(board.nesting_issues().is_empty());
}

#[test]
fn editing_a_task_keeps_its_id() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner), project_id, GanttConfig::default()).unwrap();

    let id = board
        .save_task(&mut store, TaskForm::create("Draft", date("2024-05-01"), date("2024-05-02")))
        .unwrap();
    let mut form = TaskForm::edit(&board.tasks()[0]);
    form.title = "Final draft".to_string();
    form.status = Some(TaskStatus::Done);
    assert_eq!(board.save_task(&mut store, form).unwrap(), id);

    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.tasks()[0].title, "Final draft");
    assert_eq!(board.tasks()[0].status, TaskStatus::Done);
}

#[test]
fn invalid_form_is_rejected_by_the_store() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner), project_id, GanttConfig::default()).unwrap();

    let backwards = TaskForm::create("Backwards", date("2024-05-10"), date("2024-05-01"));
    assert!(matches!(
        board.save_task(&mut store, backwards),
        Err(GanttError::Validation { .. })
    ));
    assert!(board.tasks().is_empty());
}

#[test]
fn delete_removes_children_and_refreshes() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner.clone()), project_id, GanttConfig::default()).unwrap();

    let parent = board
        .save_task(&mut store, TaskForm::create("Parent", date("2024-01-01"), date("2024-01-05")))
        .unwrap();
    let mut child = TaskForm::create("Child", date("2024-01-02"), date("2024-01-03"));
    child.parent_id = Some(parent);
    let child_id = board.save_task(&mut store, child).unwrap();
    board.add_comment(&mut store, child_id, "looks good").unwrap();

    board.delete_task(&mut store, parent).unwrap();
    assert!(board.tasks().is_empty());
    assert!(matches!(
        store.list_comments(Some(&owner), child_id),
        Err(GanttError::NotFound { .. })
    ));
}

#[test]
fn visitors_view_public_projects_read_only() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner), project_id, GanttConfig::default()).unwrap();
    board
        .save_task(&mut store, TaskForm::create("Launch", date("2024-06-01"), date("2024-06-02")))
        .unwrap();

    let visitor = User::new("visitor@example.com");
    assert!(matches!(
        ProjectBoard::load(&store, Some(visitor.clone()), project_id, GanttConfig::default()),
        Err(GanttError::NotFound { .. })
    ));

    assert!(board.toggle_public(&mut store).unwrap());
    assert!(board.project().is_public);

    let mut view = ProjectBoard::load(&store, Some(visitor), project_id, GanttConfig::default()).unwrap();
    assert!(!view.is_owner());
    assert_eq!(view.tasks().len(), 1);
    assert!(matches!(
        view.save_task(&mut store, TaskForm::create("Sneaky", date("2024-06-01"), date("2024-06-01"))),
        Err(GanttError::PermissionDenied { .. })
    ));
    assert!(matches!(
        view.toggle_public(&mut store),
        Err(GanttError::PermissionDenied { .. })
    ));

    let anonymous = ProjectBoard::load(&store, None, project_id, GanttConfig::default()).unwrap();
    assert_eq!(anonymous.tasks().len(), 1);
    assert!(anonymous.viewer().is_none());
}

#[test]
fn sharing_refetches_the_project_and_tasks() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner.clone()), project_id, GanttConfig::default()).unwrap();

    // Written behind the board's back; only a re-fetch can see it.
    store
        .create_task(
            Some(&owner),
            TaskDraft::new(project_id, "Elsewhere", date("2024-04-01"), date("2024-04-02")),
        )
        .unwrap();
    assert!(board.tasks().is_empty());

    assert!(board.toggle_public(&mut store).unwrap());
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.project(), &store.get_project(Some(&owner), project_id).unwrap());

    assert!(!board.toggle_public(&mut store).unwrap());
    assert!(!store.get_project(Some(&owner), project_id).unwrap().is_public);
}

#[test]
fn import_is_all_or_nothing() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let mut board = ProjectBoard::load(&store, Some(owner), project_id, GanttConfig::default()).unwrap();

    let good = TaskDraft::new(project_id, "Good", date("2024-08-01"), date("2024-08-02"));
    let bad = TaskDraft::new(project_id, "  ", date("2024-08-01"), date("2024-08-02"));
    assert!(matches!(
        board.import_tasks(&mut store, vec![good.clone(), bad]),
        Err(GanttError::Validation { .. })
    ));
    assert!(board.tasks().is_empty());

    let stray = TaskDraft::new(uuid::Uuid::new_v4(), "Stray", date("2024-08-01"), date("2024-08-02"));
    assert!(board.import_tasks(&mut store, vec![stray]).is_err());

    assert_eq!(board.import_tasks(&mut store, vec![good]).unwrap(), 1);
    assert_eq!(board.tasks().len(), 1);

    let visitor = User::new("visitor@example.com");
    board.toggle_public(&mut store).unwrap();
    let mut view = ProjectBoard::load(&store, Some(visitor), project_id, GanttConfig::default()).unwrap();
    let extra = TaskDraft::new(project_id, "Extra", date("2024-08-03"), date("2024-08-04"));
    assert!(matches!(
        view.import_tasks(&mut store, vec![extra]),
        Err(GanttError::PermissionDenied { .. })
    ));
}

#[test]
fn project_index_requires_a_viewer() {
    let store = MemoryStore::default();
    assert!(matches!(
        ProjectIndex::load(&store, None),
        Err(GanttError::Unauthenticated)
    ));
}

#[test]
fn project_index_lists_newest_first() {
    let mut store = MemoryStore::default();
    let owner = User::new("owner@example.com");
    let mut index = ProjectIndex::load(&store, Some(owner.clone())).unwrap();
    index.create(&mut store, "First").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    index.create(&mut store, "Second").unwrap();

    let names: Vec<&str> = index.projects().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);

    let reloaded = ProjectIndex::load(&store, Some(owner)).unwrap();
    let names: Vec<&str> = reloaded.projects().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);
    assert_eq!(reloaded.owned().count(), 2);
}

#[test]
fn configured_defaults_apply_to_new_tasks() {
    let mut store = MemoryStore::default();
    let (owner, project_id) = owner_and_project(&mut store);
    let config = GanttConfig {
        defaults: TaskDefaults {
            color: TaskColor::Green,
            priority: 1,
            status: TaskStatus::Doing,
        },
        ..GanttConfig::default()
    };
    let mut board = ProjectBoard::load(&store, Some(owner), project_id, config).unwrap();
    board
        .save_task(&mut store, TaskForm::create("Ship", date("2024-07-01"), date("2024-07-01")))
        .unwrap();

    let task = &board.tasks()[0];
    assert_eq!(task.color, Some(TaskColor::Green));
    assert_eq!(task.priority, 1);
    assert_eq!(task.status, TaskStatus::Doing);
}

#[test]
fn file_store_survives_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");
    let owner = User::new("owner@example.com");

    let project_id = {
        let mut store = FileStore::open(&path, TaskDefaults::default()).unwrap();
        let mut index = ProjectIndex::load(&store, Some(owner.clone())).unwrap();
        let project = index.create(&mut store, "Persisted").unwrap();
        let mut board = ProjectBoard::load(&store, Some(owner.clone()), project.id, GanttConfig::default()).unwrap();
        board
            .save_task(&mut store, TaskForm::create("Kickoff", date("2024-09-02"), date("2024-09-03")))
            .unwrap();
        project.id
    };
    assert!(path.exists());

    let store = FileStore::open(&path, TaskDefaults::default()).unwrap();
    assert_eq!(store.path(), path.as_path());
    let board = ProjectBoard::load(&store, Some(owner), project_id, GanttConfig::default()).unwrap();
    assert_eq!(board.project().name, "Persisted");
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.tasks()[0].title, "Kickoff");
    assert_eq!(board.tasks()[0].start, date("2024-09-02"));
}

#[test]
fn file_store_rejects_a_corrupt_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        FileStore::open(&path, TaskDefaults::default()),
        Err(GanttError::Json(_))
    ));
}
