//! File discovery module for ETL sources
//!
//! Enumerates source files by extension in one directory. Files are returned
//! grouped by format (CSV, then JSON, then XML) and sorted by name within each
//! format, which fixes the row order of the aggregated table.

use crate::error::{EtlError, Result};
use crate::models::{SourceFile, SourceFormat};
use glob::{Pattern, glob};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File discovery component for a source directory
#[derive(Debug)]
pub struct FileDiscovery {
    source_dir: PathBuf,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Discover files of every format, in extraction order
    pub fn discover_all(&self) -> Result<Vec<SourceFile>> {
        if !self.source_dir.is_dir() {
            return Err(EtlError::SourceNotFound {
                path: self.source_dir.clone(),
            });
        }

        let mut files = Vec::new();
        for format in SourceFormat::ALL {
            let paths = self.discover(format)?;
            debug!("Found {} {} files", paths.len(), format);
            files.extend(paths.into_iter().map(|path| SourceFile { format, path }));
        }

        Ok(files)
    }

    /// Discover files of one format directly inside the source directory.
    ///
    /// The directory part of the pattern is escaped so that directory names
    /// containing glob metacharacters are matched literally.
    pub fn discover(&self, format: SourceFormat) -> Result<Vec<PathBuf>> {
        let escaped_dir = Pattern::escape(&self.source_dir.to_string_lossy());
        let pattern = format!("{}/*.{}", escaped_dir, format.extension());

        debug!("Searching for source files with pattern: {}", pattern);

        let mut files = Vec::new();
        for entry in glob(&pattern)? {
            let path = entry.map_err(|e| EtlError::Io(e.into_error()))?;
            if path.is_file() {
                files.push(path);
            }
        }

        // Lexical order within a format
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a source directory with mixed files
    fn create_source_dir(temp_dir: &TempDir) -> PathBuf {
        let source_dir = temp_dir.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();

        fs::write(source_dir.join("source2.csv"), "name,height,weight\n").unwrap();
        fs::write(source_dir.join("source1.csv"), "name,height,weight\n").unwrap();
        fs::write(source_dir.join("source1.json"), "").unwrap();
        fs::write(source_dir.join("source1.xml"), "<data/>").unwrap();
        fs::write(source_dir.join("notes.txt"), "ignored").unwrap();
        fs::write(source_dir.join("upper.CSV"), "ignored").unwrap();

        // Nested files are not scanned
        let nested = source_dir.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.csv"), "name,height,weight\n").unwrap();

        source_dir
    }

    #[test]
    fn test_discover_all_orders_by_format_then_name() {
        let temp_dir = TempDir::new().unwrap();
        let source_dir = create_source_dir(&temp_dir);

        let discovery = FileDiscovery::new(&source_dir);
        let files = discovery.discover_all().unwrap();

        let names: Vec<(SourceFormat, String)> = files
            .iter()
            .map(|f| {
                (
                    f.format,
                    f.path.file_name().unwrap().to_string_lossy().to_string(),
                )
            })
            .collect();

        assert_eq!(
            names,
            vec![
                (SourceFormat::Csv, "source1.csv".to_string()),
                (SourceFormat::Csv, "source2.csv".to_string()),
                (SourceFormat::Json, "source1.json".to_string()),
                (SourceFormat::Xml, "source1.xml".to_string()),
            ]
        );
    }

    #[test]
    fn test_discover_missing_format_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let source_dir = temp_dir.path().join("source");
        fs::create_dir_all(&source_dir).unwrap();
        fs::write(source_dir.join("only.csv"), "name,height,weight\n").unwrap();

        let discovery = FileDiscovery::new(&source_dir);

        assert_eq!(discovery.discover(SourceFormat::Json).unwrap().len(), 0);
        assert_eq!(discovery.discover(SourceFormat::Xml).unwrap().len(), 0);
        assert_eq!(discovery.discover_all().unwrap().len(), 1);
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source_dir = temp_dir.path().join("empty");
        fs::create_dir_all(&source_dir).unwrap();

        let files = FileDiscovery::new(&source_dir).discover_all().unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source_dir = temp_dir.path().join("missing");

        match FileDiscovery::new(&source_dir).discover_all().unwrap_err() {
            EtlError::SourceNotFound { path } => assert_eq!(path, source_dir),
            other => panic!("Expected SourceNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_discover_escapes_directory_name() {
        let temp_dir = TempDir::new().unwrap();
        let source_dir = temp_dir.path().join("in[put]");
        fs::create_dir_all(&source_dir).unwrap();
        fs::write(source_dir.join("a.csv"), "name,height,weight\n").unwrap();

        let files = FileDiscovery::new(&source_dir)
            .discover(SourceFormat::Csv)
            .unwrap();

        assert_eq!(files, vec![source_dir.join("a.csv")]);
    }
}
