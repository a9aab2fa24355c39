//! Destination folder names chosen by the user.
//!
//! The registry is an ordered, append-only list of folder names. It always starts
//! with the sentinel [`SENTINEL`], which means "do not route this category". Anything
//! that presents the list for selection can subscribe to be told when it grows.

use std::fmt;

/// Reserved folder name meaning "leave files of this category where they are".
pub const SENTINEL: &str = "none";

/// Errors raised when registering a folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is already registered (the sentinel included).
    AlreadyExists(String),
    /// The name cannot denote a single subfolder of the destination.
    InvalidName(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyExists(name) => write!(f, "Folder '{}' already exists", name),
            RegistryError::InvalidName(name) => write!(
                f,
                "Invalid folder name '{}': expected a single non-empty path component",
                name
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Checks that a folder name is one plain path component.
///
/// Rejects empty or blank names, `.` and `..`, and anything holding a path
/// separator, so a routed folder always lands directly under the destination.
pub fn validate_folder_name(name: &str) -> Result<(), RegistryError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains(std::path::MAIN_SEPARATOR);
    if invalid {
        Err(RegistryError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

type Listener = Box<dyn FnMut(&[String])>;

/// Ordered list of destination folder names.
///
/// # Examples
///
/// ```
/// use arrangify::folder_registry::{FolderRegistry, RegistryError, SENTINEL};
///
/// let mut folders = FolderRegistry::new();
/// folders.register("Docs").unwrap();
/// assert_eq!(folders.list(), [SENTINEL, "Docs"]);
/// assert_eq!(
///     folders.register("Docs"),
///     Err(RegistryError::AlreadyExists("Docs".to_string()))
/// );
/// ```
pub struct FolderRegistry {
    names: Vec<String>,
    listeners: Vec<Listener>,
}

impl FolderRegistry {
    /// Creates a registry holding only the sentinel.
    pub fn new() -> Self {
        Self {
            names: vec![SENTINEL.to_string()],
            listeners: Vec::new(),
        }
    }

    /// Appends a folder name.
    ///
    /// On success every subscribed listener receives the updated list. On failure
    /// the registry is left unchanged and no listener runs.
    pub fn register(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.contains(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        validate_folder_name(name)?;

        self.names.push(name.to_string());
        tracing::debug!(folder = name, total = self.names.len(), "Registered folder");

        for listener in &mut self.listeners {
            listener(&self.names);
        }
        Ok(())
    }

    /// Returns all names in insertion order, sentinel first.
    pub fn list(&self) -> &[String] {
        &self.names
    }

    /// Returns true if the exact name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Subscribes a listener that is called with the full list after each
    /// successful registration.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[String]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }
}

impl Default for FolderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FolderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderRegistry")
            .field("names", &self.names)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
