use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tm", about = concat!("taskmap v", env!("CARGO_PKG_VERSION"), " - nested tasks on a mindmap"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different directory
    #[arg(short = 'C', long = "store-dir", global = true)]
    pub store_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a taskmap store in the current directory
    Init(InitArgs),
    /// List tasks as an indented tree
    List(ListArgs),
    /// Add a task (at the root, or under --parent)
    Add(AddArgs),
    /// Delete a task and its subtasks
    Rm(IdArgs),
    /// Change task title
    Title(TitleArgs),
    /// Toggle a task's completed state
    Done(IdArgs),
    /// Collapse a task's subtree
    Collapse(IdArgs),
    /// Expand a task's subtree (or every task with --all)
    Expand(ExpandArgs),
    /// Move a task under a new parent or back to the roots
    Mv(MvArgs),
    /// Draw a custom connection between two tasks
    Connect(ConnectArgs),
    /// Remove a custom connection
    Disconnect(ConnectArgs),
    /// Manage a task's countdown timer
    Timer(TimerCmd),
    /// Print the computed mindmap layout
    Layout,
    /// Print the transform that fits the mindmap into a viewport
    Fit(FitArgs),
    /// Export the mindmap as SVG
    Export(ExportArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Project name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Prefix for task IDs
    #[arg(long, default_value = "T")]
    pub prefix: String,
    /// Reinitialize even if taskmap/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Include subtasks of collapsed tasks
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct FitArgs {
    /// Viewport width in pixels
    #[arg(long)]
    pub width: f64,
    /// Viewport height in pixels
    #[arg(long)]
    pub height: f64,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Parent task ID
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Task ID
    pub id: String,
    /// New title
    pub title: String,
}

#[derive(Args)]
pub struct ExpandArgs {
    /// Task ID
    #[arg(required_unless_present = "all")]
    pub id: Option<String>,
    /// Expand every task
    #[arg(long, conflicts_with = "id")]
    pub all: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID
    pub id: String,
    /// New parent task ID
    #[arg(long, conflicts_with = "root", required_unless_present = "root")]
    pub parent: Option<String>,
    /// Move to the top level
    #[arg(long)]
    pub root: bool,
    /// Position among the new siblings (default: last)
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args)]
pub struct ConnectArgs {
    /// Source task ID
    pub source: String,
    /// Target task ID
    pub target: String,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TimerCmd {
    #[command(subcommand)]
    pub action: TimerAction,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Attach a countdown (replaces an existing one)
    Set(TimerSetArgs),
    /// Start or resume the countdown
    Start(IdArgs),
    /// Pause the countdown
    Pause(IdArgs),
    /// Stop and refill the countdown
    Reset(IdArgs),
    /// Remove the timer
    Clear(IdArgs),
}

#[derive(Args)]
pub struct TimerSetArgs {
    /// Task ID
    pub id: String,
    /// Countdown length in minutes
    pub minutes: u64,
}
