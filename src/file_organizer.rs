/// Moving classified files into their category folders.
///
/// This module scans the immediate children of a directory, decides where each
/// regular file belongs, creates the destination folder, picks a free name and
/// renames the file into place. Every file ends in exactly one [`FileOutcome`];
/// a failure on one file never stops the run.
use crate::config::{CompiledFilters, Settings};
use crate::file_category::{Classification, ExtensionIndex};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file organization operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The directory to organize is missing or cannot be listed.
    #[error("Cannot read directory {}: {source}", .path.display())]
    InvalidBasePath { path: PathBuf, source: io::Error },
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to rename a file into its category directory.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The path ends in `..` or is a root and cannot be moved.
    #[error("{} has no file name", .path.display())]
    MissingFileName { path: PathBuf },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// One item found in the organized directory at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: OsString,
    pub path: PathBuf,
    /// True for regular files and symlinks pointing at regular files.
    pub is_file: bool,
}

impl FileEntry {
    fn from_dir_entry(entry: &fs::DirEntry) -> Self {
        let path = entry.path();
        Self {
            name: entry.file_name(),
            is_file: path.is_file(),
            path,
        }
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }
}

/// Terminal state of one scanned file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was renamed into its category folder.
    Moved {
        file: PathBuf,
        destination: PathBuf,
        classification: Classification,
    },
    /// Dry run: where the file would have been moved.
    Planned {
        file: PathBuf,
        destination: PathBuf,
        classification: Classification,
    },
    /// Left in place by the filter configuration.
    Skipped { file: PathBuf },
    /// Folder creation or the rename failed.
    Failed { file: PathBuf, error: OrganizeError },
}

impl FileOutcome {
    /// The scanned file this outcome is about.
    pub fn file(&self) -> &Path {
        match self {
            Self::Moved { file, .. }
            | Self::Planned { file, .. }
            | Self::Skipped { file }
            | Self::Failed { file, .. } => file,
        }
    }

    pub fn file_name(&self) -> Cow<'_, str> {
        self.file()
            .file_name()
            .map(OsStr::to_string_lossy)
            .unwrap_or_else(|| self.file().to_string_lossy())
    }
}

/// Every outcome of one run, in processing order.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub outcomes: Vec<FileOutcome>,
}

impl OrganizeReport {
    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Moved { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// Returns true if no file failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    /// Moved or planned files per destination folder, e.g. `"Documents/PDF"`.
    pub fn counts_by_destination(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for outcome in &self.outcomes {
            let (FileOutcome::Moved { classification, .. }
            | FileOutcome::Planned { classification, .. }) = outcome
            else {
                continue;
            };
            let label = classification.to_string();
            match counts.iter_mut().find(|(name, _)| *name == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }
        counts
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

/// Filesystem primitives used while organizing.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Lists the immediate children of `dir` in the order the OS returns them.
    ///
    /// Entries that cannot be read are logged and left out.
    pub fn scan(dir: &Path) -> OrganizeResult<Vec<FileEntry>> {
        let entries = fs::read_dir(dir).map_err(|e| OrganizeError::InvalidBasePath {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut scanned = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => scanned.push(FileEntry::from_dir_entry(&entry)),
                Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "unreadable directory entry"),
            }
        }
        Ok(scanned)
    }

    /// Creates `dir` and any missing parents. Existing directories are left alone.
    pub fn ensure_dir(dir: &Path) -> OrganizeResult<()> {
        fs::create_dir_all(dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })
    }

    /// `name` with `_<counter>` inserted before its extension.
    ///
    /// `report.pdf` becomes `report_1.pdf`; `README` becomes `README_1`; for
    /// `backup.tar.gz` only the last extension is kept aside: `backup.tar_1.gz`.
    /// A trailing dot is not an extension: `draft.` becomes `draft._1`.
    pub fn suffixed_name(name: &OsStr, counter: u64) -> OsString {
        let path = Path::new(name);
        let suffix = format!("_{}", counter);

        match (path.file_stem(), path.extension()) {
            (Some(stem), Some(ext)) if !ext.is_empty() => {
                let mut renamed = stem.to_os_string();
                renamed.push(suffix);
                renamed.push(".");
                renamed.push(ext);
                renamed
            }
            _ => {
                let mut renamed = name.to_os_string();
                renamed.push(suffix);
                renamed
            }
        }
    }

    /// First path in `dir` for `name` that `is_taken` rejects.
    ///
    /// Tries `name` itself, then `name_1`, `name_2`, ... checking each candidate
    /// as it is produced.
    pub fn resolve_collision_with(
        dir: &Path,
        name: &OsStr,
        mut is_taken: impl FnMut(&Path) -> bool,
    ) -> PathBuf {
        let mut candidate = dir.join(name);
        let mut counter = 1;
        while is_taken(candidate.as_path()) {
            candidate = dir.join(Self::suffixed_name(name, counter));
            counter += 1;
        }
        candidate
    }

    /// First free path in `dir` for `name`, checked against the filesystem.
    pub fn resolve_collision(dir: &Path, name: &OsStr) -> PathBuf {
        Self::resolve_collision_with(dir, name, entry_exists)
    }

    /// Renames `file` to `destination`.
    pub fn move_file(file: &Path, destination: &Path) -> OrganizeResult<()> {
        fs::rename(file, destination).map_err(|e| OrganizeError::FileMoveFailure {
            from: file.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        })
    }

    /// Moves `file` into the folder for `classification` under `base_path`.
    ///
    /// Creates the folder if needed and never overwrites: an occupied name gets
    /// a numeric suffix. Returns the final path of the file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use downtidy::file_category::Classification;
    /// use downtidy::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let pdf = Classification::new("Documents", Some("PDF"));
    /// match FileOrganizer::move_to_category(Path::new("/tmp/in"), Path::new("/tmp/in/a.pdf"), &pdf) {
    ///     Ok(dest) => println!("moved to {}", dest.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn move_to_category(
        base_path: &Path,
        file: &Path,
        classification: &Classification,
    ) -> OrganizeResult<PathBuf> {
        let name = file_name_of(file)?;
        let dir = base_path.join(classification.relative_dir());
        Self::ensure_dir(&dir)?;

        let destination = Self::resolve_collision(&dir, name);
        Self::move_file(file, &destination)?;
        Ok(destination)
    }

    /// Where `move_to_category` would put `file`, without touching anything.
    pub fn plan_destination(
        base_path: &Path,
        file: &Path,
        classification: &Classification,
    ) -> OrganizeResult<PathBuf> {
        let name = file_name_of(file)?;
        let dir = base_path.join(classification.relative_dir());
        Ok(Self::resolve_collision(&dir, name))
    }
}

/// True if anything, including a dangling symlink, occupies `path`.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn file_name_of(file: &Path) -> OrganizeResult<&OsStr> {
    file.file_name().ok_or_else(|| OrganizeError::MissingFileName {
        path: file.to_path_buf(),
    })
}

/// Sorts the files of one directory using an [`ExtensionIndex`].
pub struct Organizer<'a> {
    index: &'a ExtensionIndex,
    filters: &'a CompiledFilters,
}

impl<'a> Organizer<'a> {
    pub fn new(index: &'a ExtensionIndex, filters: &'a CompiledFilters) -> Self {
        Self { index, filters }
    }

    /// Scans and organizes `settings.target_dir`, returning every outcome.
    ///
    /// # Errors
    ///
    /// Fails only if the directory cannot be listed; per-file problems end up
    /// as [`FileOutcome::Failed`] in the report.
    pub fn run(&self, settings: &Settings) -> OrganizeResult<OrganizeReport> {
        let entries = FileOrganizer::scan(&settings.target_dir)?;
        Ok(self.process(settings, entries, |_| {}))
    }

    /// Organizes already scanned entries, calling `on_outcome` as each file finishes.
    pub fn process(
        &self,
        settings: &Settings,
        entries: Vec<FileEntry>,
        mut on_outcome: impl FnMut(&FileOutcome),
    ) -> OrganizeReport {
        let mut report = OrganizeReport::default();

        for entry in entries {
            if !entry.is_file {
                tracing::debug!(entry = %entry.display_name(), "not a regular file, leaving in place");
                continue;
            }

            let outcome = self.process_file(settings, entry);
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            moved = report.moved(),
            planned = report.planned(),
            skipped = report.skipped(),
            failed = report.failed(),
            "run finished"
        );
        report
    }

    fn process_file(&self, settings: &Settings, entry: FileEntry) -> FileOutcome {
        let file = entry.path;
        if !self.filters.should_include(&file) {
            return FileOutcome::Skipped { file };
        }

        let classification = self.index.classify(&file).clone();
        let base = &settings.target_dir;

        let result = if settings.dry_run {
            FileOrganizer::plan_destination(base, &file, &classification)
        } else {
            FileOrganizer::move_to_category(base, &file, &classification)
        };

        match result {
            Ok(destination) if settings.dry_run => FileOutcome::Planned {
                file,
                destination,
                classification,
            },
            Ok(destination) => FileOutcome::Moved {
                file,
                destination,
                classification,
            },
            Err(error) => {
                tracing::warn!(file = %file.display(), error = %error, "could not organize file");
                FileOutcome::Failed { file, error }
            }
        }
    }
}
