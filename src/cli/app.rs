//! Main CLI application

use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{load_dotenv, parse_config_auto, parse_config_file};
use crate::error::{Result, EXIT_NOTHING_TO_DO};
use crate::runner::{
    CacheStore, Context, RunStatus, Runner, Task, TaskGraph, Verbosity,
};
use crate::ui::render_summary;

/// Run the CLI application, returning the process exit code
pub fn run() -> i32 {
    let matches = build_command().get_matches();

    if let Some(shell) = matches.get_one::<Shell>("completions").copied() {
        let mut cmd = build_command();
        generate(shell, &mut cmd, "runfile", &mut io::stdout());
        return 0;
    }

    let verbosity = get_verbosity(&matches);

    match run_with(&matches, verbosity) {
        Ok(code) => code,
        Err(e) => {
            if verbosity >= Verbosity::Quiet {
                eprintln!("{} {}", "error:".red().bold(), e);
            }
            e.exit_code()
        }
    }
}

/// Build the clap command
fn build_command() -> Command {
    Command::new("runfile")
        .version(crate::VERSION)
        .about("A dependency-aware task runner with cached, expiring targets")
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help("Target task name, or a glob pattern matching several"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to the Runfile (default: search upward for Runfile.yml)"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list-targets")
                .help("List target names and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .value_name("FILE")
                .help("Write value-store exports for the parent shell to source"),
        )
        .arg(
            Arg::new("cache-file")
                .long("cache-file")
                .value_name("FILE")
                .help("Use a specific cache file instead of the per-Runfile default"),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(clap::value_parser!(Shell))
                .help("Print a shell completion script and exit"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

fn run_with(matches: &ArgMatches, verbosity: Verbosity) -> Result<i32> {
    let (config, runfile_path) = match matches.get_one::<String>("file") {
        Some(path) => {
            let path = PathBuf::from(path);
            (parse_config_file(&path)?, path)
        }
        None => parse_config_auto()?,
    };

    let mut ctx = Context::new()
        .with_runfile_path(runfile_path.clone())
        .with_verbosity(verbosity);

    if let Some(dotenv_path) = load_dotenv(&runfile_path) {
        ctx.print_debug(&format!(
            "Loaded environment from {}",
            dotenv_path.display()
        ));
    }

    let default_interpreter = config.interpreter.clone();
    let mut records = Vec::with_capacity(config.tasks.len());
    for (name, task_config) in config.tasks {
        records.push(Task::from_config(
            name,
            task_config,
            default_interpreter.as_ref(),
        )?);
    }
    let graph = TaskGraph::build(records)?;

    if matches.get_flag("list") {
        for name in graph.names() {
            println!("{}", name);
        }
        return Ok(0);
    }

    let target = match matches.get_one::<String>("target") {
        Some(target) => target.clone(),
        None => {
            list_targets(&graph);
            return Ok(0);
        }
    };

    let cache_path = match matches.get_one::<String>("cache-file") {
        Some(path) => PathBuf::from(path),
        None => CacheStore::default_path(&runfile_path),
    };
    // A corrupt store is reported but never fatal; the engine restarts
    // from an empty cache.
    let cache = match CacheStore::load(cache_path.clone()) {
        Ok(store) => store,
        Err(e) => {
            ctx.print_warning(&format!("{}; starting with an empty cache", e));
            CacheStore::empty(cache_path)
        }
    };

    let started = Instant::now();
    let mut runner = Runner::new(graph, cache, ctx);
    let result = runner.run_target(&target);

    let export_result = matches
        .get_one::<String>("export")
        .map(|path| runner.write_exports(Path::new(path)));

    if verbosity >= Verbosity::Normal && !runner.outcomes().is_empty() {
        print!(
            "{}",
            render_summary(runner.outcomes(), started.elapsed())
        );
    }

    let status = result?;
    if let Some(export_result) = export_result {
        export_result?;
    }

    match status {
        RunStatus::Completed => Ok(0),
        RunStatus::NothingToDo => Ok(EXIT_NOTHING_TO_DO),
    }
}

/// Print the default no-target listing: every task with its description
fn list_targets(graph: &TaskGraph) {
    if graph.is_empty() {
        eprintln!("No targets found.");
        return;
    }

    for task in graph.iter() {
        match &task.description {
            Some(description) => println!("{}: {}", task.name, description),
            None => println!("{}", task.name),
        }
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}
