//! arrangify - sort a folder's files into subfolders by file type
//!
//! This library classifies files by extension into six fixed categories, keeps the
//! list of destination folder names a user has registered, and moves the files of
//! routed categories from a source folder into `<destination>/<folder>/`.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod folder_registry;
pub mod logging;
pub mod output;
pub mod worker;

pub use config::{AppConfig, ConfigError, Exclusions, FilterRules};
pub use file_category::{Category, CategoryRegistry};
pub use file_organizer::{ArrangeError, ArrangeReport, ArrangeRequest, Arranger, RoutingTable};
pub use folder_registry::{FolderRegistry, RegistryError, SENTINEL};
pub use worker::{ArrangeWorker, WorkerBusy};

pub use cli::{Cli, run_cli};
