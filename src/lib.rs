//! downtidy - sort a downloads folder by file extension
//!
//! This library classifies files by extension into category and subcategory
//! folders, moves them there without overwriting anything, and reports what
//! happened to each file. Directories are never descended into.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use config::{CompiledFilters, ConfigError, FilterConfig, Settings};
pub use file_category::{CategoryTable, Classification, ClassifierError, ExtensionIndex};
pub use file_organizer::{FileOrganizer, FileOutcome, OrganizeError, OrganizeReport, Organizer};

pub use cli::{Cli, CliError, run_cli};
