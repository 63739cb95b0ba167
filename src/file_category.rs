//! Extension-based file classification.
//!
//! A [`CategoryTable`] declares which extensions belong to which category and,
//! optionally, to which subcategory inside it. The table is flattened once into
//! an [`ExtensionIndex`], which answers every lookup for the rest of the run.
//!
//! # Examples
//!
//! ```
//! use downtidy::file_category::{CategoryTable, ExtensionIndex};
//! use std::path::Path;
//!
//! let index = ExtensionIndex::build(&CategoryTable::standard()).unwrap();
//!
//! let pdf = index.classify(Path::new("report.PDF"));
//! assert_eq!(pdf.category(), "Documents");
//! assert_eq!(pdf.subcategory(), Some("PDF"));
//!
//! assert!(index.classify(Path::new("README")).is_catch_all());
//! ```
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Category that receives every file whose extension is not in the table.
pub const CATCH_ALL_CATEGORY: &str = "Other";

/// Errors raised while flattening a [`CategoryTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// An extension was declared without its leading dot.
    #[error("extension '{extension}' must start with '.'")]
    MissingSeparator { extension: String },
    /// The same extension appears under two destinations.
    #[error("extension '{extension}' is declared for both {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: Classification,
        second: Classification,
    },
}

/// Where a file belongs: a category and, for nested categories, a subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Classification {
    category: String,
    subcategory: Option<String>,
}

impl Classification {
    pub fn new(category: impl Into<String>, subcategory: Option<&str>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.map(str::to_string),
        }
    }

    /// The classification given to files nobody claimed.
    pub fn catch_all() -> Self {
        Self::new(CATCH_ALL_CATEGORY, None)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn is_catch_all(&self) -> bool {
        self.category == CATCH_ALL_CATEGORY && self.subcategory.is_none()
    }

    /// Folder for this classification, relative to the organized directory.
    ///
    /// ```
    /// use downtidy::file_category::Classification;
    /// use std::path::PathBuf;
    ///
    /// let text = Classification::new("Documents", Some("Text"));
    /// assert_eq!(text.relative_dir(), PathBuf::from("Documents").join("Text"));
    /// ```
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(&self.category);
        if let Some(subcategory) = &self.subcategory {
            dir.push(subcategory);
        }
        dir
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subcategory {
            Some(subcategory) => write!(f, "{}/{}", self.category, subcategory),
            None => write!(f, "{}", self.category),
        }
    }
}

/// The extensions owned by one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryEntry {
    /// Files go straight into the category folder.
    Extensions(Vec<String>),
    /// Files go into a named subfolder of the category folder.
    Subcategories(Vec<(String, Vec<String>)>),
}

/// Declarative, ordered description of every category and its extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<(String, CategoryEntry)>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category whose files are stored directly in its folder.
    pub fn with_extensions(mut self, category: &str, extensions: &[&str]) -> Self {
        self.categories.push((
            category.to_string(),
            CategoryEntry::Extensions(to_owned_list(extensions)),
        ));
        self
    }

    /// Adds a subfolder to `category`, creating the category on first use.
    pub fn with_subcategory(mut self, category: &str, subcategory: &str, extensions: &[&str]) -> Self {
        let subfolder = (subcategory.to_string(), to_owned_list(extensions));
        match self.categories.iter_mut().find(|(name, _)| name == category) {
            Some((_, CategoryEntry::Subcategories(subcategories))) => subcategories.push(subfolder),
            _ => self.categories.push((
                category.to_string(),
                CategoryEntry::Subcategories(vec![subfolder]),
            )),
        }
        self
    }

    /// Iterates the categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryEntry)> {
        self.categories
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// The built-in table used by the command-line tool.
    pub fn standard() -> Self {
        Self::new()
            .with_extensions("Images", &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"])
            .with_subcategory("Documents", "PDF", &[".pdf"])
            .with_subcategory("Documents", "Word", &[".doc", ".docx"])
            .with_subcategory("Documents", "Excel", &[".xls", ".xlsx"])
            .with_subcategory("Documents", "Presentations", &[".ppt", ".pptx"])
            .with_subcategory("Documents", "Text", &[".txt", ".csv"])
            .with_extensions("Videos", &[".mp4", ".avi", ".mkv", ".mov", ".wmv"])
            .with_extensions("Music", &[".mp3", ".wav", ".aac", ".flac"])
            .with_extensions("Archives", &[".zip", ".rar", ".7z", ".tar", ".gz"])
            .with_extensions("Executables", &[".exe", ".msi", ".bat", ".sh"])
            .with_extensions("PowerBI", &[".pbix"])
            .with_extensions(CATCH_ALL_CATEGORY, &[])
    }
}

fn to_owned_list(extensions: &[&str]) -> Vec<String> {
    extensions.iter().map(|ext| ext.to_string()).collect()
}

/// Flattened extension → classification lookup built from a [`CategoryTable`].
#[derive(Debug, Clone)]
pub struct ExtensionIndex {
    by_extension: HashMap<String, Classification>,
    catch_all: Classification,
}

impl ExtensionIndex {
    /// Flattens `table` into an index.
    ///
    /// Extensions are lower-cased. An extension claimed twice is rejected rather
    /// than letting the later declaration win.
    pub fn build(table: &CategoryTable) -> Result<Self, ClassifierError> {
        let mut by_extension = HashMap::new();

        for (category, entry) in table.categories() {
            match entry {
                CategoryEntry::Extensions(extensions) => {
                    for extension in extensions {
                        insert_unique(
                            &mut by_extension,
                            extension,
                            Classification::new(category, None),
                        )?;
                    }
                }
                CategoryEntry::Subcategories(subcategories) => {
                    for (subcategory, extensions) in subcategories {
                        for extension in extensions {
                            insert_unique(
                                &mut by_extension,
                                extension,
                                Classification::new(category, Some(subcategory.as_str())),
                            )?;
                        }
                    }
                }
            }
        }

        Ok(Self {
            by_extension,
            catch_all: Classification::catch_all(),
        })
    }

    /// Looks up an extension such as `".pdf"`, ignoring case.
    ///
    /// Returns `None` when the table does not mention the extension.
    pub fn lookup(&self, extension: &str) -> Option<&Classification> {
        self.by_extension.get(&extension.to_lowercase())
    }

    /// Classifies a file by the extension of its name.
    ///
    /// Never fails: files with unknown or missing extensions get the catch-all.
    pub fn classify(&self, path: &Path) -> &Classification {
        match normalized_extension(path).and_then(|ext| self.lookup(&ext)) {
            Some(classification) => classification,
            None => &self.catch_all,
        }
    }

    /// Number of distinct extensions in the index.
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

fn insert_unique(
    index: &mut HashMap<String, Classification>,
    extension: &str,
    classification: Classification,
) -> Result<(), ClassifierError> {
    let key = extension.to_lowercase();
    if !key.starts_with('.') {
        return Err(ClassifierError::MissingSeparator { extension: key });
    }
    if let Some(existing) = index.get(&key) {
        return Err(ClassifierError::DuplicateExtension {
            extension: key,
            first: existing.clone(),
            second: classification,
        });
    }
    index.insert(key, classification);
    Ok(())
}

/// Returns the lower-cased extension of `path` with its leading dot.
///
/// Dotfiles such as `.bashrc` and names without a dot have no extension.
///
/// ```
/// use downtidy::file_category::normalized_extension;
/// use std::path::Path;
///
/// assert_eq!(normalized_extension(Path::new("photo.JPG")).as_deref(), Some(".jpg"));
/// assert_eq!(normalized_extension(Path::new("backup.tar.gz")).as_deref(), Some(".gz"));
/// assert_eq!(normalized_extension(Path::new(".bashrc")), None);
/// ```
pub fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
