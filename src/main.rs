use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use gantt_planner::io::{export_csv, import_csv};
use gantt_planner::model::task::parse_iso_date;
use gantt_planner::render::{render_chart, render_geometry, render_task_list};
use gantt_planner::store::FileStore;
use gantt_planner::{
    compute_layout_from_records, hierarchy, logging, GanttConfig, GanttError, ProjectBoard, ProjectIndex, Result,
    TaskColor, TaskForm, TaskRecord, TaskStatus, User,
};

#[derive(Parser)]
#[command(name = "gantt-planner")]
#[command(about = "Plan projects as task hierarchies on a Gantt timeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the OS config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct StoreArgs {
    /// Store document (JSON)
    #[arg(long, default_value = "gantt-store.json")]
    store: PathBuf,

    /// Act as this user id; omit to view anonymously
    #[arg(long)]
    user: Option<Uuid>,
}

impl StoreArgs {
    fn viewer(&self) -> Option<User> {
        self.user.map(|id| User {
            id,
            email: String::new(),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the projects visible to the user
    Projects {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Create a project owned by the user
    NewProject {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        name: String,
    },

    /// Print a project's task list and timeline
    Show {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,

        /// Reference date for the today marker (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,

        /// Characters per day column
        #[arg(long, default_value_t = 2)]
        cols: usize,

        /// Also print pixel geometry from the configured cell sizes
        #[arg(long)]
        pixels: bool,
    },

    /// Add a task to a project
    AddTask {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,

        #[arg(short, long)]
        title: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,

        #[arg(long)]
        parent: Option<Uuid>,

        /// todo, doing or done
        #[arg(long)]
        status: Option<String>,

        /// blue, red, green, yellow, purple or gray
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove a task and its children
    DeleteTask {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,

        #[arg(short, long)]
        task: Uuid,
    },

    /// Toggle public sharing of a project
    Share {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,
    },

    /// Comment on a task, or list its comments when no text is given
    Comment {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,

        #[arg(short, long)]
        task: Uuid,

        text: Option<String>,
    },

    /// Import tasks from CSV into a project
    ImportCsv {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,

        file: PathBuf,
    },

    /// Export a project's tasks to CSV
    ExportCsv {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        project: Uuid,

        file: PathBuf,
    },

    /// Lay out raw task rows (JSON array) without a store
    Chart {
        file: PathBuf,

        #[arg(long)]
        today: Option<String>,

        #[arg(long, default_value_t = 2)]
        cols: usize,
    },

    /// Write the default settings file
    InitConfig,
}

fn parse_date_arg(raw: &str, field: &'static str) -> Result<NaiveDate> {
    parse_iso_date("<command line>", raw, field)
}

fn today_or(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date_arg(raw, "today"),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GanttConfig> {
    match path {
        Some(path) => GanttConfig::load_from(path),
        None => Ok(GanttConfig::load()),
    }
}

fn open_board(args: &StoreArgs, project: Uuid, config: GanttConfig) -> Result<(FileStore, ProjectBoard)> {
    let store = FileStore::open(&args.store, config.defaults)?;
    let board = ProjectBoard::load(&store, args.viewer(), project, config)?;
    Ok((store, board))
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Projects { store } => {
            let file_store = FileStore::open(&store.store, config.defaults)?;
            let index = ProjectIndex::load(&file_store, store.viewer())?;
            if index.projects().is_empty() {
                println!("No projects");
            }
            for project in index.projects() {
                let visibility = if project.is_public { "public" } else { "private" };
                println!(
                    "{}  {}  ({}, created {})",
                    project.id,
                    project.name,
                    visibility,
                    project.created_at.format("%Y-%m-%d")
                );
            }
        }

        Commands::NewProject { store, name } => {
            let mut file_store = FileStore::open(&store.store, config.defaults)?;
            let mut index = ProjectIndex::load(&file_store, store.viewer())?;
            let project = index.create(&mut file_store, &name)?;
            println!("Created project '{}' ({})", project.name, project.id);
        }

        Commands::Show {
            store,
            project,
            today,
            cols,
            pixels,
        } => {
            let today = today_or(today.as_deref())?;
            let (_, board) = open_board(&store, project, config)?;
            let rows = board.rows();
            let layout = board.layout(today)?;
            let access = if board.is_owner() { "" } else { " (view only)" };
            println!("{}{}  [{} tasks]\n", board.project().name, access, board.tasks().len());
            print!("{}", render_task_list(&rows));
            println!();
            print!("{}", render_chart(&layout, &rows, cols));
            if pixels {
                let config = board.config();
                println!();
                print!("{}", render_geometry(&layout, &rows, &config.geometry, &config.defaults));
            }
        }

        Commands::AddTask {
            store,
            project,
            title,
            start,
            end,
            parent,
            status,
            color,
        } => {
            let mut form = TaskForm::create(
                title,
                parse_date_arg(&start, "start_date")?,
                parse_date_arg(&end, "end_date")?,
            );
            form.parent_id = parent;
            form.status = status
                .as_deref()
                .map(|s| s.parse::<TaskStatus>().map_err(GanttError::validation))
                .transpose()?;
            form.color = color
                .as_deref()
                .map(|c| c.parse::<TaskColor>().map_err(GanttError::validation))
                .transpose()?;

            let (mut file_store, mut board) = open_board(&store, project, config)?;
            let id = board.save_task(&mut file_store, form)?;
            println!("Added task {id}");
        }

        Commands::DeleteTask { store, project, task } => {
            let (mut file_store, mut board) = open_board(&store, project, config)?;
            board.delete_task(&mut file_store, task)?;
            println!("Deleted task {task}; {} tasks remain", board.tasks().len());
        }

        Commands::Share { store, project } => {
            let (mut file_store, mut board) = open_board(&store, project, config)?;
            if board.toggle_public(&mut file_store)? {
                println!("Project is public at {}", board.project().share_path());
            } else {
                println!("Project is private");
            }
        }

        Commands::Comment {
            store,
            project,
            task,
            text,
        } => {
            let (mut file_store, board) = open_board(&store, project, config)?;
            match text {
                Some(text) => {
                    board.add_comment(&mut file_store, task, &text)?;
                    println!("Comment added");
                }
                None => {
                    for comment in board.comments(&file_store, task)? {
                        println!("{}  {}", comment.created_at.format("%Y-%m-%d %H:%M"), comment.content);
                    }
                }
            }
        }

        Commands::ImportCsv { store, project, file } => {
            let (mut file_store, mut board) = open_board(&store, project, config)?;
            let import = import_csv(&file, project)?;
            let drafts = import.in_creation_order().into_iter().cloned().collect();
            let created = board.import_tasks(&mut file_store, drafts)?;
            println!("Imported {created} tasks ({} rows skipped)", import.skipped);
        }

        Commands::ExportCsv { store, project, file } => {
            let (_, board) = open_board(&store, project, config)?;
            let count = export_csv(board.tasks(), &file)?;
            println!("Exported {count} tasks to {}", file.display());
        }

        Commands::Chart { file, today, cols } => {
            let today = today_or(today.as_deref())?;
            let json = std::fs::read_to_string(&file)?;
            let records: Vec<TaskRecord> = serde_json::from_str(&json)?;
            let layout = compute_layout_from_records(&records, today, &config.layout)?;
            let tasks = gantt_planner::model::parse_records(&records)?;
            let rows = hierarchy::sorted_rows(&tasks);
            print!("{}", render_task_list(&rows));
            println!();
            print!("{}", render_chart(&layout, &rows, cols));
        }

        Commands::InitConfig => {
            let path = cli
                .config
                .or_else(GanttConfig::default_path)
                .ok_or_else(|| GanttError::Config {
                    reason: "no config directory available".to_string(),
                })?;
            GanttConfig::default().save_to(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
