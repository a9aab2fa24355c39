//! Command-line front end.
//!
//! The front end collects what the arranger needs (source path, destination path,
//! a folder per category, and new folder names) from flags and configuration, then
//! runs one arrangement pass. It does not check paths itself: empty or missing
//! folders are reported by the arranger.

use crate::config::AppConfig;
use crate::file_category::{Category, CategoryRegistry};
use crate::file_organizer::{ArrangeReport, ArrangeRequest, Arranger};
use crate::folder_registry::{FolderRegistry, RegistryError, SENTINEL};
use crate::output::OutputFormatter;
use crate::worker::ArrangeWorker;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Sort the files of a folder into subfolders by file type.
#[derive(Debug, Parser)]
#[command(name = "arrangify", version, about)]
pub struct Cli {
    /// Configuration file (defaults to .arrangifyrc.toml, then ~/.config/arrangify/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move files from the source folder into destination subfolders
    Arrange(ArrangeArgs),
    /// List the categories and the extensions they recognise
    Categories,
}

/// Inputs of one arrangement.
#[derive(Debug, Clone, Default, Args)]
pub struct ArrangeArgs {
    /// Folder whose files are arranged
    #[arg(long, short, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Folder that receives the category subfolders
    #[arg(long, short, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Register a destination folder name (repeatable)
    #[arg(long = "folder", short = 'f', value_name = "NAME")]
    pub folders: Vec<String>,

    /// Folder for document files
    #[arg(long, value_name = "NAME")]
    pub documents: Option<String>,

    /// Folder for image files
    #[arg(long, value_name = "NAME")]
    pub images: Option<String>,

    /// Folder for audio files
    #[arg(long, value_name = "NAME")]
    pub audio: Option<String>,

    /// Folder for video files
    #[arg(long, value_name = "NAME")]
    pub videos: Option<String>,

    /// Folder for archive files
    #[arg(long, value_name = "NAME")]
    pub archives: Option<String>,

    /// Folder for program files
    #[arg(long, value_name = "NAME")]
    pub programs: Option<String>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ArrangeArgs {
    /// The folder chosen on the command line for a category, if any.
    pub fn selection(&self, category: Category) -> Option<&str> {
        let choice = match category {
            Category::Documents => &self.documents,
            Category::Images => &self.images,
            Category::Audio => &self.audio,
            Category::Videos => &self.videos,
            Category::Archives => &self.archives,
            Category::Programs => &self.programs,
        };
        choice.as_deref()
    }
}

/// Runs a parsed command line.
///
/// # Examples
///
/// ```no_run
/// use arrangify::cli::{Cli, run_cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from([
///     "arrangify", "arrange", "-s", "/tmp/in", "-d", "/tmp/out",
///     "--folder", "Docs", "--documents", "Docs",
/// ]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let config = AppConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    match cli.command {
        Command::Arrange(args) => arrange_with_config(&args, &config).map(|_| ()),
        Command::Categories => {
            OutputFormatter::category_table(&config.category_registry());
            Ok(())
        }
    }
}

/// Registers folder names in order. Rejected names are reported and skipped;
/// the registry is unchanged by them.
pub fn register_folders<'a, I>(folders: &mut FolderRegistry, names: I) -> Vec<RegistryError>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut rejected = Vec::new();
    for name in names {
        if let Err(e) = folders.register(name) {
            OutputFormatter::warning(&format!("{}; skipped", e));
            rejected.push(e);
        }
    }
    rejected
}

/// Builds the request from flags, falling back to configured selections and then
/// to the sentinel. Every chosen folder must already be registered.
pub fn build_request(
    args: &ArrangeArgs,
    config: &AppConfig,
    folders: &FolderRegistry,
) -> Result<ArrangeRequest, String> {
    let mut request = ArrangeRequest::new(
        args.source.clone().unwrap_or_default(),
        args.destination.clone().unwrap_or_default(),
    );

    for category in Category::ALL {
        let choice = args
            .selection(category)
            .or_else(|| config.selections.get(&category).map(String::as_str))
            .unwrap_or(SENTINEL);

        if !folders.contains(choice) {
            return Err(format!(
                "Folder '{}' chosen for {} is not registered (known: {}); add it with --folder",
                choice,
                category,
                folders.list().join(", ")
            ));
        }
        request = request.select(category, choice);
    }

    Ok(request)
}

/// Arranges files as described by `args` and `config`, printing progress and a
/// summary. Returns the report of the completed pass.
pub fn arrange_with_config(
    args: &ArrangeArgs,
    config: &AppConfig,
) -> Result<ArrangeReport, String> {
    let mut folders = FolderRegistry::new();
    folders.subscribe(|names| tracing::debug!(folders = ?names, "Folder choices refreshed"));
    register_folders(&mut folders, config.folders.iter().chain(&args.folders));

    let request = build_request(args, config, &folders)?;
    let arranger = build_arranger(config)?;

    let report = run_in_background(arranger, request, !args.json)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Error serializing report: {}", e))?;
        println!("{}", json);
    } else {
        OutputFormatter::success(&format!("Arrangement complete: {} moved", report.moved.len()));
        OutputFormatter::summary_table(&report);
    }

    Ok(report)
}

fn build_arranger(config: &AppConfig) -> Result<Arranger, String> {
    let categories: CategoryRegistry = config.category_registry();
    let exclusions = config
        .exclusions()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    Ok(Arranger::new(categories).with_exclusions(exclusions))
}

fn run_in_background(
    arranger: Arranger,
    request: ArrangeRequest,
    show_spinner: bool,
) -> Result<ArrangeReport, String> {
    let source = request.source.display().to_string();
    let worker = ArrangeWorker::new(arranger);
    let handle = worker.submit(request).map_err(|e| e.to_string())?;

    let spinner = show_spinner.then(|| OutputFormatter::create_spinner(&format!("Arranging {}", source)));

    let outcome = loop {
        if let Some(outcome) = worker.recv_timeout(Duration::from_millis(100)) {
            break outcome;
        }
        if handle.is_finished() {
            // The thread may have sent just before finishing
            match worker.try_recv() {
                Some(outcome) => break outcome,
                None => {
                    if let Some(spinner) = &spinner {
                        spinner.finish_and_clear();
                    }
                    return Err("Arrangement stopped unexpectedly".to_string());
                }
            }
        }
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    outcome.map_err(|e| format!("Error: {}", e))
}
