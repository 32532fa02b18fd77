//! # bpm CLI Entry Point
//!
//! This is the main executable for the `bpm` command-line tool.
//! It parses CLI arguments using clap, builds one [`Config`] and routes the
//! command to its handler. Errors from any handler end up here and decide the
//! exit status.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bpm::commands;
use bpm::config::Config;
use bpm::lock;
use bpm::tree;
use bpm::ui;
use bpm::vcs::Git;

#[derive(Parser)]
#[command(name = "bpm")]
#[command(about = "Basic Package Manager: vendors imported Go packages and pins them in bpm.json", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Root dir of project. Dependencies are pulled into $dir/vendor
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Show scanned files, matched packages and git invocations
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of parallel workers [default: one per CPU]
    #[arg(short, long, global = true)]
    jobs: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create bpm.json in the project and get all dependencies
    Init,
    /// Pull configured packages and pin them to the locked versions
    Install,
    /// Move packages to the latest commit of their pinned branch
    Update {
        /// Only update this package (host.tld/org/repo)
        #[arg(short, long = "pkg")]
        pkg: Option<String>,
    },
    /// Forget all dependency data and pull the latest package versions
    Rebuild,
    /// Show the locked dependency graph
    Tree,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ui::set_verbose(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        generate(shell, &mut Cli::command(), "bpm", &mut io::stdout());
        return Ok(());
    }

    let project_dir = project_dir(cli.dir, matches!(command, Commands::Init))?;
    let config = Config::load(project_dir, cli.jobs)?;
    ui::detail(format!("Working dir: {}", config.project_dir.display()));
    let git = Git::new();

    match command {
        Commands::Init => {
            commands::init(&config, &git)?;
        }
        Commands::Install => {
            commands::install(&config, &git)?;
        }
        Commands::Update { pkg } => {
            commands::update(&config, &git, pkg.as_deref())?;
        }
        Commands::Rebuild => {
            commands::rebuild(&config, &git)?;
        }
        Commands::Tree => tree::print_tree(&config)?,
        Commands::Completion { .. } => {}
    }
    Ok(())
}

/// `--dir` when given. Otherwise `init` works in the binary's own directory and
/// every other command in the nearest ancestor of it that holds a lockfile.
fn project_dir(dir: Option<PathBuf>, for_init: bool) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir);
    }

    let exe = std::env::current_exe().context("Could not locate the running binary")?;
    let exe_dir = exe
        .parent()
        .map(Path::to_path_buf)
        .context("The running binary has no parent directory")?;

    if for_init {
        return Ok(exe_dir);
    }
    Ok(lock::find_project_root(&exe_dir).unwrap_or(exe_dir))
}
