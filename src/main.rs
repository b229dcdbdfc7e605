//! synthflow CLI - check, synthesize and flatten archive documents

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use synthflow::{Archive, Config, FixSuggestion, OutputFormat, StackReport, SynthError, System};

#[derive(Parser)]
#[command(name = "synthflow")]
#[command(about = "Provenance workflows for multi-step material synthesis processes")]
#[command(version)]
struct Cli {
    /// Path to a synthflow.toml (default: ./synthflow.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and normalize an archive file, or every archive under a directory
    Validate {
        /// Archive file (.yaml, .yml, .json) or directory
        path: PathBuf,
    },

    /// Report temporal ordering of every process (fails if any is not serial)
    Check {
        /// Archive file
        file: PathBuf,
    },

    /// Print the task chains of serial processes
    Tasks {
        /// Archive file
        file: PathBuf,

        /// Only this process (fails if it is not serial)
        #[arg(short, long)]
        process: Option<String>,

        /// Output format (yaml, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Print the flattened components of thin-film stacks
    Stack {
        /// Archive file
        file: PathBuf,

        /// Only this stack
        #[arg(short, long)]
        stack: Option<String>,

        /// Output format (yaml, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "synthflow=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.downcast_ref::<SynthError>().and_then(|s| s.fix_suggestion()) {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = Config::discover(cli.config.as_deref())
        .and_then(Config::with_env)
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Validate { path } => validate(&path, &config),
        Commands::Check { file } => check(&file, &config),
        Commands::Tasks {
            file,
            process,
            format,
        } => tasks(&file, process.as_deref(), format.unwrap_or(config.output.format), &config),
        Commands::Stack {
            file,
            stack,
            format,
        } => stacks(&file, stack.as_deref(), format.unwrap_or(config.output.format), &config),
    }
}

fn load(file: &Path) -> anyhow::Result<Archive> {
    Archive::load(file).with_context(|| format!("Failed to load archive {}", file.display()))
}

fn is_archive_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

fn validate(path: &Path, config: &Config) -> anyhow::Result<bool> {
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && is_archive_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    let mut ok = true;
    for file in &files {
        match load(file) {
            Ok(mut archive) => {
                let report = archive.normalize(config);
                let serial = report.processes.iter().filter(|p| p.check.is_serial()).count();
                println!("{} Archive '{}' is valid", "✓".green(), file.display());
                println!("  Systems: {}", archive.systems.len());
                for (key, system) in &archive.systems {
                    println!("    • {}", describe_system(key, system));
                }
                println!("  Stacks: {}", report.stacks.len());
                println!("  Processes: {} ({} serial)", report.processes.len(), serial);
            }
            Err(e) => {
                ok = false;
                eprintln!("{} {:#}", "✗".red(), e);
            }
        }
    }

    if files.is_empty() {
        println!("{} No archives found under '{}'", "!".yellow(), path.display());
    }
    Ok(ok)
}

fn describe_system(key: &str, system: &System) -> String {
    let mut line = format!("{}: {}", key, system.kind());
    if let Some(lab_id) = system.lab_id() {
        line.push_str(&format!(" ({})", lab_id));
    }
    if let Some(volume) = system.geometry().and_then(|g| g.volume()) {
        line.push_str(&format!(", volume {:e} m³", volume));
    }
    line
}

fn check(file: &Path, config: &Config) -> anyhow::Result<bool> {
    let mut archive = load(file)?;
    let report = archive.normalize(config);

    for process in &report.processes {
        if process.check.is_serial() {
            println!(
                "{} {}: serial ({} steps)",
                "✓".green(),
                process.name.bold(),
                process.steps
            );
        } else {
            println!("{} {}: {}", "✗".red(), process.name.bold(), process.check);
            println!("  {} {}", "Fix:".yellow(), process.check.hint());
        }
    }

    Ok(report.all_serial())
}

fn tasks(
    file: &Path,
    process: Option<&str>,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<bool> {
    let mut archive = load(file)?;

    let rendered = match process {
        Some(name) => {
            let workflow = archive.process(name)?.to_workflow()?;
            format.render(&workflow)?
        }
        None => format.render(&archive.normalize(config).workflows)?,
    };

    println!("{}", rendered.trim_end());
    Ok(true)
}

fn stacks(
    file: &Path,
    stack: Option<&str>,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<bool> {
    let mut archive = load(file)?;
    archive.normalize_stacks(config);

    let reports: Vec<StackReport> = match stack {
        Some(name) => vec![archive.stack(name)?],
        None => archive.stacks.iter().collect(),
    }
    .into_iter()
    .map(|s| StackReport {
        name: s.name.clone(),
        components: s.components.clone(),
    })
    .collect();

    println!("{}", format.render(&reports)?.trim_end());
    Ok(true)
}
