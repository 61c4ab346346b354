//! Loading drafts from the filesystem.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{Draft, config::AppConfig, error::DraftError};

/// Subdirectory holding the documents of a draft folder.
const FEATURES_DIR: &str = "sketch-features";

/// Index file marking a draft folder.
const INDEX_FILE: &str = "index.json";

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Source name of a document file: its file name up to the first dot.
fn source_name(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    file_name.split('.').next().filter(|name| !name.is_empty())
}

impl Draft {
    /// Load a draft from `path`.
    ///
    /// `path` may name:
    ///
    /// - a single document file, loaded as the only source
    /// - a directory of documents
    /// - a directory with a `sketch-features` subdirectory of documents
    /// - the `index.json` file inside such a directory
    ///
    /// Each document is named after its file, so `bracket.yaml` becomes the
    /// source `bracket`. Files that are not documents are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Io`] if the path cannot be read,
    /// [`DraftError::UnsupportedFile`] if a single file is not a document,
    /// and [`DraftError::MalformedDocument`] for the first document that does
    /// not parse.
    pub fn load(path: impl AsRef<Path>, config: AppConfig) -> Result<Self, DraftError> {
        let path = path.as_ref();
        let path = if path.file_name().is_some_and(|name| name == INDEX_FILE) {
            path.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
        } else {
            path
        };
        info!(path:? = path; "Loading draft");

        let mut draft = Draft::new(config);

        if fs::metadata(path)?.is_file() {
            let name = source_name(path)
                .filter(|_| is_document(path))
                .ok_or_else(|| DraftError::UnsupportedFile(path.to_path_buf()))?;
            draft.add_document(name, fs::read_to_string(path)?)?;
            return Ok(draft);
        }

        let features = path.join(FEATURES_DIR);
        let dir = if features.is_dir() {
            features
        } else {
            path.to_path_buf()
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        files.sort();

        for file in files {
            let name = match source_name(&file) {
                Some(name) if file.is_file() && is_document(&file) => name,
                _ => {
                    debug!(path:? = file; "Skipping non-document file");
                    continue;
                }
            };
            draft.add_document(name, fs::read_to_string(&file)?)?;
        }

        info!(sources = draft.sources().count(); "Draft loaded");
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(source_name(Path::new("a/bracket.yaml")), Some("bracket"));
        assert_eq!(source_name(Path::new("plate.sketch.yml")), Some("plate"));
        assert_eq!(source_name(Path::new(".hidden.yaml")), None);
    }

    #[test]
    fn test_is_document() {
        assert!(is_document(Path::new("x.yaml")));
        assert!(is_document(Path::new("x.yml")));
        assert!(!is_document(Path::new("x.js")));
        assert!(!is_document(Path::new("yaml")));
    }
}
