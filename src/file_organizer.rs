/// File arrangement: one scan-classify-move pass over a source folder.
///
/// The arranger reads the immediate entries of a source directory, classifies each
/// regular file by extension and moves it into `<destination>/<folder>/` when its
/// category is routed to a folder. Nothing is traversed recursively, and files of
/// unrouted or unknown categories are left where they are.
use crate::config::Exclusions;
use crate::file_category::{Category, CategoryRegistry};
use crate::folder_registry::{SENTINEL, validate_folder_name};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, DirEntry, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Input of one arrangement pass.
#[derive(Debug, Clone, Default)]
pub struct ArrangeRequest {
    /// Folder whose immediate files are arranged.
    pub source: PathBuf,
    /// Folder under which the routed subfolders live.
    pub destination: PathBuf,
    /// Folder chosen per category; [`SENTINEL`] or a missing entry means "skip".
    pub selections: BTreeMap<Category, String>,
}

impl ArrangeRequest {
    /// Creates a request with every category set to the sentinel.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            selections: BTreeMap::new(),
        }
    }

    /// Routes a category to a folder.
    pub fn select(mut self, category: Category, folder: impl Into<String>) -> Self {
        self.selections.insert(category, folder.into());
        self
    }
}

/// Category to folder mapping with sentinel entries removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    routes: BTreeMap<Category, String>,
}

impl RoutingTable {
    /// Filters out sentinel selections and validates the remaining folder names.
    pub fn from_selections(selections: &BTreeMap<Category, String>) -> ArrangeResult<Self> {
        let mut routes = BTreeMap::new();
        for (category, folder) in selections {
            if folder == SENTINEL {
                continue;
            }
            validate_folder_name(folder).map_err(|e| ArrangeError::InvalidInput {
                reason: e.to_string(),
            })?;
            routes.insert(*category, folder.clone());
        }
        Ok(Self { routes })
    }

    /// Returns the folder a category is routed to.
    pub fn folder_for(&self, category: Category) -> Option<&str> {
        self.routes.get(&category).map(String::as_str)
    }

    /// Returns true when no category is routed anywhere.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of routed categories.
    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

/// One file moved during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedFile {
    /// Where the file was.
    pub original_path: PathBuf,
    /// Where the file is now.
    pub new_path: PathBuf,
    /// The category that matched.
    pub category: Category,
    /// The folder the category was routed to.
    pub folder: String,
}

/// Summary of a completed pass.
#[derive(Debug, Clone, Serialize)]
pub struct ArrangeReport {
    /// RFC 3339 timestamp of when the pass started.
    pub started_at: String,
    /// Files moved, in processing order.
    pub moved: Vec<MovedFile>,
    /// Folders created by this pass.
    pub created_dirs: Vec<PathBuf>,
    /// Regular files left in the source folder.
    pub left_in_place: usize,
    /// Entries that are not regular files (directories and the like).
    pub skipped_entries: usize,
}

impl ArrangeReport {
    fn new() -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            moved: Vec::new(),
            created_dirs: Vec::new(),
            left_in_place: 0,
            skipped_entries: 0,
        }
    }

    /// Number of files moved into each destination folder.
    pub fn folder_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for file in &self.moved {
            *counts.entry(file.folder.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Errors that abort an arrangement pass.
#[derive(Debug)]
pub enum ArrangeError {
    /// The request itself is unusable (empty path, bad folder name).
    InvalidInput { reason: String },
    /// The source folder could not be listed.
    SourceUnreadable { path: PathBuf, source: io::Error },
    /// A destination subfolder could not be created.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// A file with the same name already sits in the target folder.
    DestinationExists { path: PathBuf },
    /// A file could not be moved.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
}

impl std::fmt::Display for ArrangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "Invalid input: {}", reason),
            Self::SourceUnreadable { path, source } => {
                write!(f, "Cannot read source folder {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DestinationExists { path } => {
                write!(f, "Refusing to overwrite existing file {}", path.display())
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
        }
    }
}

impl std::error::Error for ArrangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnreadable { source, .. } | Self::DirectoryCreationFailed { source, .. } => {
                Some(source)
            }
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::InvalidInput { .. } | Self::DestinationExists { .. } => None,
        }
    }
}

/// Result type for arrangement operations.
pub type ArrangeResult<T> = Result<T, ArrangeError>;

/// Performs arrangement passes.
///
/// The arranger holds only read-only lookup data, so one instance may serve any
/// number of sequential passes, or be shared with a background worker.
#[derive(Debug, Clone, Default)]
pub struct Arranger {
    categories: CategoryRegistry,
    exclusions: Exclusions,
}

impl Arranger {
    /// Creates an arranger classifying with the given registry.
    pub fn new(categories: CategoryRegistry) -> Self {
        Self {
            categories,
            exclusions: Exclusions::default(),
        }
    }

    /// Sets the files to leave alone regardless of category.
    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Runs one arrangement pass.
    ///
    /// The source listing is taken once up front. Files are processed in listing
    /// order and the first filesystem error ends the pass; files moved before the
    /// error stay moved.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if the source or destination path is empty, or a selected
    ///   folder name is not a single path component
    /// * `SourceUnreadable` if the source cannot be listed
    /// * `DestinationExists` if the target already holds a file of the same name
    /// * `DirectoryCreationFailed` / `FileMoveFailure` for filesystem failures
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use arrangify::file_category::Category;
    /// use arrangify::file_organizer::{ArrangeRequest, Arranger};
    ///
    /// let request = ArrangeRequest::new("/home/me/Downloads", "/home/me/Sorted")
    ///     .select(Category::Documents, "Docs")
    ///     .select(Category::Images, "Pics");
    ///
    /// match Arranger::default().arrange(&request) {
    ///     Ok(report) => println!("Moved {} files", report.moved.len()),
    ///     Err(e) => eprintln!("Arrangement failed: {}", e),
    /// }
    /// ```
    pub fn arrange(&self, request: &ArrangeRequest) -> ArrangeResult<ArrangeReport> {
        if request.source.as_os_str().is_empty() || request.destination.as_os_str().is_empty() {
            return Err(ArrangeError::InvalidInput {
                reason: "source and destination paths must not be empty".to_string(),
            });
        }

        let routes = RoutingTable::from_selections(&request.selections)?;
        let entries = Self::snapshot(&request.source)?;
        tracing::info!(
            source = %request.source.display(),
            destination = %request.destination.display(),
            entries = entries.len(),
            routes = routes.len(),
            "Starting arrangement pass"
        );

        let mut report = ArrangeReport::new();
        for entry in entries {
            let path = entry.path();
            if !Self::is_regular_file(&entry) {
                tracing::debug!(path = %path.display(), "Skipping non-file entry");
                report.skipped_entries += 1;
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let route = self
                .categories
                .categorize(&file_name)
                .and_then(|category| routes.folder_for(category).map(|f| (category, f)));

            let Some((category, folder)) = route else {
                tracing::debug!(file = %file_name, "No routed category");
                report.left_in_place += 1;
                continue;
            };
            if self.exclusions.is_excluded(&file_name) {
                tracing::debug!(file = %file_name, "Excluded by filters");
                report.left_in_place += 1;
                continue;
            }

            let target_dir = request.destination.join(folder);
            if Self::ensure_dir(&target_dir)? {
                report.created_dirs.push(target_dir.clone());
            }

            let new_path = target_dir.join(entry.file_name());
            move_file(&path, &new_path)?;
            tracing::info!(from = %path.display(), to = %new_path.display(), "Moved file");

            report.moved.push(MovedFile {
                original_path: path,
                new_path,
                category,
                folder: folder.to_string(),
            });
        }

        Ok(report)
    }

    fn snapshot(source: &Path) -> ArrangeResult<Vec<DirEntry>> {
        let unreadable = |e| ArrangeError::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        };
        fs::read_dir(source)
            .map_err(unreadable)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unreadable)
    }

    /// Regular files, and symlinks that resolve to one.
    fn is_regular_file(entry: &DirEntry) -> bool {
        match entry.file_type() {
            Ok(ft) if ft.is_file() => true,
            Ok(ft) if ft.is_symlink() => fs::metadata(entry.path())
                .map(|m| m.is_file())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Creates a directory and its parents. Returns true if it did not exist before.
    fn ensure_dir(dir: &Path) -> ArrangeResult<bool> {
        if dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(dir).map_err(|e| ArrangeError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(dir = %dir.display(), "Created folder");
        Ok(true)
    }
}

/// Moves a file, never replacing an existing one.
///
/// Within one filesystem the file is hard-linked into place and then unlinked
/// from the source, so an existing target is never overwritten. When source and
/// target are on different filesystems the file is copied next to the target
/// under a temporary name, linked into place and only then removed from the
/// source. A symlink is moved as a link, never as a copy of what it points to.
pub fn move_file(from: &Path, to: &Path) -> ArrangeResult<()> {
    move_file_with(from, to, rename_no_clobber)
}

fn move_file_with<F>(from: &Path, to: &Path, place: F) -> ArrangeResult<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    if fs::symlink_metadata(to).is_ok() {
        return Err(ArrangeError::DestinationExists {
            path: to.to_path_buf(),
        });
    }

    let outcome = match place(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::warn!(
                from = %from.display(),
                to = %to.display(),
                "Move crosses filesystems, falling back to copy and remove"
            );
            copy_then_remove(from, to)
        }
        other => other,
    };

    outcome.map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists && fs::symlink_metadata(to).is_ok() {
            ArrangeError::DestinationExists {
                path: to.to_path_buf(),
            }
        } else {
            ArrangeError::FileMoveFailure {
                source: from.to_path_buf(),
                destination: to.to_path_buf(),
                source_error: e,
            }
        }
    })
}

/// Renames `from` to `to` on one filesystem, failing with `AlreadyExists`
/// instead of replacing `to`.
///
/// Filesystems without hard links fall back to a checked `rename`; there a
/// target created between the check and the rename is replaced.
fn rename_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(from) {
                // both names point at the same data, dropping ours loses nothing
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::AlreadyExists
                    | io::ErrorKind::CrossesDevices
                    | io::ErrorKind::NotFound
            ) =>
        {
            Err(e)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Hard link unavailable, using rename");
            if fs::symlink_metadata(to).is_ok() {
                return Err(io::Error::from(io::ErrorKind::AlreadyExists));
            }
            fs::rename(from, to)
        }
    }
}

fn partial_path(to: &Path) -> PathBuf {
    let name = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    to.with_file_name(format!(".{}.arrangify-partial", name))
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    copy_then_remove_with(from, to, |path| fs::remove_file(path))
}

fn copy_then_remove_with<R>(from: &Path, to: &Path, remove_source: R) -> io::Result<()>
where
    R: FnOnce(&Path) -> io::Result<()>,
{
    if fs::symlink_metadata(from)?.file_type().is_symlink() {
        relink(from, to)?;
    } else {
        copy_into_place(from, to)?;
    }

    remove_source(from).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!(
                "copied to {} but could not remove the original: {}",
                to.display(),
                e
            ),
        )
    })
}

fn copy_into_place(from: &Path, to: &Path) -> io::Result<()> {
    let partial = partial_path(to);
    // a leftover partial file is not ours, so bail out before any cleanup
    let writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&partial)?;

    let placed = fill_partial(from, &partial, writer).and_then(|()| rename_no_clobber(&partial, to));
    if placed.is_err() {
        let _ = fs::remove_file(&partial);
    }
    placed
}

fn fill_partial(from: &Path, partial: &Path, mut writer: fs::File) -> io::Result<()> {
    let mut reader = fs::File::open(from)?;
    io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    drop(writer);
    fs::set_permissions(partial, reader.metadata()?.permissions())
}

/// Recreates the symlink `from` at `to`, keeping relative targets pointing at
/// the same file.
#[cfg(unix)]
fn relink(from: &Path, to: &Path) -> io::Result<()> {
    let mut target = fs::read_link(from)?;
    if target.is_relative()
        && let Some(parent) = from.parent()
    {
        target = parent.join(target);
    }
    std::os::unix::fs::symlink(&target, to)
}

#[cfg(not(unix))]
fn relink(from: &Path, _to: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot move symlink {} across filesystems", from.display()),
    ))
}
