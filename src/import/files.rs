//! Input file discovery and file-level errors

use std::io;
use std::path::{Path, PathBuf};

/// Errors that affect a whole input file or the list of input files
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("No input files given")]
    NoPatterns,
    #[error("Invalid file pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: csv::Error },
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand a comma-separated list of paths and glob patterns.
///
/// Plain paths are returned as given even if they don't exist, so that the
/// failure is reported when the file is opened. Glob matches are sorted per
/// pattern. A path matched more than once is only returned the first time.
pub fn expand_patterns(patterns: &str) -> Result<Vec<PathBuf>, FileError> {
    let patterns: Vec<&str> = patterns
        .split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .collect();
    if patterns.is_empty() {
        return Err(FileError::NoPatterns);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        if !is_glob(pattern) {
            push_unique(&mut files, Path::new(pattern).to_path_buf());
            continue;
        }

        let paths = glob::glob(pattern).map_err(|source| FileError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let mut matched: Vec<PathBuf> = Vec::new();
        for path in paths {
            match path {
                Ok(path) if path.is_file() => matched.push(path),
                Ok(_) => {}
                Err(err) => log::warn!("Skipping unreadable path while expanding {pattern:?}: {err}"),
            }
        }
        if matched.is_empty() {
            log::warn!("Pattern {pattern:?} did not match any file");
        }
        matched.sort();
        for path in matched {
            push_unique(&mut files, path);
        }
    }
    Ok(files)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}
