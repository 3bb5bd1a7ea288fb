mod init;
pub use init::cmd_init;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::export::render_svg;
use crate::cli::output::*;
use crate::io::lock::StoreLock;
use crate::io::store::{self, STORE_DIR, Store};
use crate::layout::compute_layout;
use crate::layout::geometry::fmt_num;
use crate::ops::{outline, task_ops, timer_ops};
use crate::view::{Viewport, ViewportSize};

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = resolve_start(cli.store_dir.as_deref())?;

    let Some(cmd) = cli.command else {
        return Err("no subcommand given (try `tm --help`)".into());
    };
    match cmd {
        Commands::Init(args) => cmd_init(args, &start),

        // Read commands
        Commands::List(args) => cmd_list(&start, args, json),
        Commands::Layout => cmd_layout(&start, json),
        Commands::Fit(args) => cmd_fit(&start, args, json),
        Commands::Export(args) => cmd_export(&start, args),

        // Write commands
        Commands::Add(args) => cmd_add(&start, args, json),
        Commands::Rm(args) => cmd_rm(&start, args),
        Commands::Title(args) => cmd_title(&start, args),
        Commands::Done(args) => cmd_done(&start, args),
        Commands::Collapse(args) => cmd_collapse(&start, args),
        Commands::Expand(args) => cmd_expand(&start, args),
        Commands::Mv(args) => cmd_mv(&start, args),
        Commands::Connect(args) => cmd_connect(&start, args),
        Commands::Disconnect(args) => cmd_disconnect(&start, args),
        Commands::Timer(cmd) => cmd_timer(&start, cmd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The directory store discovery starts from: `-C` if given, else the cwd
pub fn resolve_start(store_dir: Option<&str>) -> Result<PathBuf, Box<dyn Error>> {
    match store_dir {
        Some(dir) => Ok(fs::canonicalize(dir).map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn load_store_from(start: &Path) -> Result<Store, store::StoreError> {
    let root = store::discover_store(start)?;
    store::load_store(&root)
}

/// Load under the store lock, apply `f`, save, print its message
fn with_store_mut<F>(start: &Path, f: F) -> CmdResult
where
    F: FnOnce(&mut Store) -> Result<String, Box<dyn Error>>,
{
    let root = store::discover_store(start)?;
    let _lock = StoreLock::acquire_default(&root.join(STORE_DIR))?;
    let mut store = store::load_store(&root)?;
    let message = f(&mut store)?;
    store.save()?;
    debug!(%message, "store updated");
    println!("{}", message);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(start: &Path, args: ListArgs, json: bool) -> CmdResult {
    let store = load_store_from(start)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tree_to_json(&store.tree))?);
        return Ok(());
    }
    let rows = outline::flatten(&store.tree, args.all);
    if rows.is_empty() {
        println!("(no tasks)");
    }
    for line in format_outline(&rows) {
        println!("{}", line);
    }
    let connections: Vec<_> = store.tree.connection_pairs().collect();
    if !connections.is_empty() {
        println!();
        for (source, target) in connections {
            println!("{} -> {}", source, target);
        }
    }
    Ok(())
}

fn cmd_layout(start: &Path, json: bool) -> CmdResult {
    let store = load_store_from(start)?;
    let layout = compute_layout(&store.tree, &store.config.layout);
    if json {
        println!("{}", serde_json::to_string_pretty(&layout_to_json(&layout))?);
    } else {
        for line in format_layout(&layout) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_fit(start: &Path, args: FitArgs, json: bool) -> CmdResult {
    let store = load_store_from(start)?;
    let layout = compute_layout(&store.tree, &store.config.layout);
    let mut viewport = Viewport::new(store.config.viewport);
    viewport.fit_to_view(
        layout.bounds,
        ViewportSize {
            width: args.width,
            height: args.height,
        },
    );
    let t = viewport.transform();
    if json {
        println!("{}", serde_json::to_string_pretty(&t)?);
    } else {
        println!(
            "translate ({}, {}) scale {}",
            fmt_num(t.translate_x),
            fmt_num(t.translate_y),
            fmt_num(t.scale)
        );
    }
    Ok(())
}

fn cmd_export(start: &Path, args: ExportArgs) -> CmdResult {
    let store = load_store_from(start)?;
    let layout = compute_layout(&store.tree, &store.config.layout);
    let svg = render_svg(&layout, &store.config.ui);
    match args.output {
        Some(path) => {
            fs::write(&path, svg)?;
            println!("wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(start: &Path, args: AddArgs, json: bool) -> CmdResult {
    with_store_mut(start, |store| {
        let prefix = store.config.ids.prefix.clone();
        let id = task_ops::add_task(&mut store.tree, &args.title, args.parent.as_deref(), &prefix)?;
        if json {
            Ok(serde_json::json!({ "id": id }).to_string())
        } else {
            Ok(id)
        }
    })
}

fn cmd_rm(start: &Path, args: IdArgs) -> CmdResult {
    with_store_mut(start, |store| {
        let removed = task_ops::delete_task(&mut store.tree, &args.id)?;
        let mut count = 0;
        removed.walk(&mut |_| count += 1);
        Ok(if count > 1 {
            format!("{} deleted with {} subtasks", args.id, count - 1)
        } else {
            format!("{} deleted", args.id)
        })
    })
}

fn cmd_title(start: &Path, args: TitleArgs) -> CmdResult {
    with_store_mut(start, |store| {
        task_ops::set_title(&mut store.tree, &args.id, &args.title)?;
        Ok(format!("{} title updated", args.id))
    })
}

fn cmd_done(start: &Path, args: IdArgs) -> CmdResult {
    with_store_mut(start, |store| {
        let completed = task_ops::toggle_completed(&mut store.tree, &args.id)?;
        Ok(format!(
            "{} {}",
            args.id,
            if completed { "completed" } else { "reopened" }
        ))
    })
}

fn cmd_collapse(start: &Path, args: IdArgs) -> CmdResult {
    with_store_mut(start, |store| {
        task_ops::set_collapsed(&mut store.tree, &args.id, true)?;
        Ok(format!("{} collapsed", args.id))
    })
}

fn cmd_expand(start: &Path, args: ExpandArgs) -> CmdResult {
    with_store_mut(start, |store| match &args.id {
        Some(id) => {
            task_ops::set_collapsed(&mut store.tree, id, false)?;
            Ok(format!("{} expanded", id))
        }
        None => {
            task_ops::expand_all(&mut store.tree);
            Ok("all tasks expanded".to_string())
        }
    })
}

fn cmd_mv(start: &Path, args: MvArgs) -> CmdResult {
    with_store_mut(start, |store| {
        let parent = if args.root { None } else { args.parent.as_deref() };
        task_ops::move_task(&mut store.tree, &args.id, parent, args.index)?;
        Ok(match parent {
            Some(p) => format!("{} moved under {}", args.id, p),
            None => format!("{} moved to top level", args.id),
        })
    })
}

fn cmd_connect(start: &Path, args: ConnectArgs) -> CmdResult {
    with_store_mut(start, |store| {
        let added = task_ops::add_connection(&mut store.tree, &args.source, &args.target)?;
        Ok(if added {
            format!("connected {} -> {}", args.source, args.target)
        } else if args.source == args.target {
            format!("{} cannot connect to itself", args.source)
        } else {
            format!("{} -> {} already connected", args.source, args.target)
        })
    })
}

fn cmd_disconnect(start: &Path, args: ConnectArgs) -> CmdResult {
    with_store_mut(start, |store| {
        if !task_ops::remove_connection(&mut store.tree, &args.source, &args.target) {
            return Err(format!("no connection {} -> {}", args.source, args.target).into());
        }
        Ok(format!("disconnected {} -> {}", args.source, args.target))
    })
}

fn cmd_timer(start: &Path, cmd: TimerCmd) -> CmdResult {
    with_store_mut(start, |store| {
        let tree = &mut store.tree;
        let message = match cmd.action {
            TimerAction::Set(a) => {
                timer_ops::set_timer(tree, &a.id, a.minutes)?;
                format!("{} timer set to {}", a.id, timer_ops::format_remaining(a.minutes * 60))
            }
            TimerAction::Start(a) => {
                timer_ops::start_timer(tree, &a.id)?;
                format!("{} timer started", a.id)
            }
            TimerAction::Pause(a) => {
                timer_ops::pause_timer(tree, &a.id)?;
                format!("{} timer paused", a.id)
            }
            TimerAction::Reset(a) => {
                timer_ops::reset_timer(tree, &a.id)?;
                format!("{} timer reset", a.id)
            }
            TimerAction::Clear(a) => {
                timer_ops::clear_timer(tree, &a.id)?;
                format!("{} timer cleared", a.id)
            }
        };
        Ok(message)
    })
}
