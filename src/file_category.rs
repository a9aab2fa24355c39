/// Extension-based file categories.
///
/// Every file is classified by the extension at the end of its name. There are six
/// fixed categories, each owning an ordered list of extensions. Lookups are exact
/// and case-normalised, so `.PDF` is a document but `.pdfx` is nothing.
///
/// # Examples
///
/// ```
/// use arrangify::file_category::{Category, CategoryRegistry};
///
/// let registry = CategoryRegistry::default();
/// assert_eq!(registry.category_for_extension(".pdf"), Some(Category::Documents));
/// assert_eq!(registry.category_for_extension(".JPG"), Some(Category::Images));
/// assert_eq!(registry.category_for_extension(".unknownext"), None);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A named class of file extensions.
///
/// Variants are declared in lookup order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Office documents and plain text.
    Documents,
    /// Raster and vector images.
    Images,
    /// Audio files.
    Audio,
    /// Video files.
    Videos,
    /// Compressed archives.
    Archives,
    /// Source code and web files.
    Programs,
}

impl Category {
    /// All categories in declared order.
    pub const ALL: [Category; 6] = [
        Category::Documents,
        Category::Images,
        Category::Audio,
        Category::Videos,
        Category::Archives,
        Category::Programs,
    ];

    /// Returns the identifier used in configuration files and on the command line.
    ///
    /// ```
    /// use arrangify::file_category::Category;
    ///
    /// assert_eq!(Category::Documents.id(), "documents");
    /// assert_eq!(Category::Videos.id(), "videos");
    /// ```
    pub fn id(&self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Images => "images",
            Category::Audio => "audio",
            Category::Videos => "videos",
            Category::Archives => "archives",
            Category::Programs => "programs",
        }
    }

    /// Returns a human-readable label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Documents => "Document Files",
            Category::Images => "Image Files",
            Category::Audio => "Audio Files",
            Category::Videos => "Video Files",
            Category::Archives => "Archive Files",
            Category::Programs => "Program Files",
        }
    }

    fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Documents => &[".docx", ".pdf", ".txt", ".pptx", ".xlsx"],
            Category::Images => &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg"],
            Category::Audio => &[".mp3", ".wav", ".aac", ".flac", ".ogg"],
            Category::Videos => &[".mp4", ".mov", ".avi", ".wmv", ".mkv"],
            Category::Archives => &[".zip", ".rar", ".7z"],
            Category::Programs => &[".html", ".css", ".js", ".py", ".java", ".cpp", ".ts"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a string does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.id() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Returns the extension of a file name: everything from the last `.` to the end,
/// dot included. Names without a `.` have no extension.
///
/// ```
/// use arrangify::file_category::extension_of;
///
/// assert_eq!(extension_of("report.final.pdf"), Some(".pdf"));
/// assert_eq!(extension_of("Makefile"), None);
/// ```
pub fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Maps extensions to categories.
///
/// Built with the six default extension lists; extra extensions may be added at
/// startup (for example from the configuration file) but never removed.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    extensions: BTreeMap<Category, Vec<String>>,
}

impl CategoryRegistry {
    /// Creates a registry holding the default extension lists.
    pub fn new() -> Self {
        let extensions = Category::ALL
            .into_iter()
            .map(|category| {
                let exts = category
                    .default_extensions()
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect();
                (category, exts)
            })
            .collect();
        Self { extensions }
    }

    /// Adds an extension to a category. The extension is lowercased and given a
    /// leading dot if it lacks one. Returns `false` when the category already
    /// lists it.
    pub fn add_extension(&mut self, category: Category, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        if ext == "." {
            return false;
        }
        let exts = self.extensions.entry(category).or_default();
        if exts.contains(&ext) {
            false
        } else {
            exts.push(ext);
            true
        }
    }

    /// Returns the extensions of a category in declaration order.
    pub fn extensions(&self, category: Category) -> &[String] {
        self.extensions
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Finds the category owning an extension.
    ///
    /// Categories are scanned in declared order and the first match wins.
    pub fn category_for_extension(&self, ext: &str) -> Option<Category> {
        if !ext.starts_with('.') || ext.len() < 2 {
            return None;
        }
        let ext = ext.to_lowercase();
        self.extensions
            .iter()
            .find(|(_, exts)| exts.iter().any(|known| *known == ext))
            .map(|(category, _)| *category)
    }

    /// Classifies a file by its name.
    pub fn categorize(&self, file_name: &str) -> Option<Category> {
        extension_of(file_name).and_then(|ext| self.category_for_extension(ext))
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
