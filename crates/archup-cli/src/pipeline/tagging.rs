//! Search tag derivation

use super::{ArchiveName, FileMetadata, TagSet};
use std::path::{Path, PathBuf};

/// Derives the search tags attached to an archive
pub trait Tagger: Send + Sync {
    fn tags(&self, path: &Path, metadata: &FileMetadata, name: &ArchiveName) -> TagSet;
}

/// Tags every segment of the source path (below the ignore prefix), every
/// segment of the archive name, and every static override value.
#[derive(Debug, Clone, Default)]
pub struct PathTagger {
    ignore_prefix: Option<PathBuf>,
    static_tags: Vec<String>,
}

impl PathTagger {
    pub fn new(ignore_prefix: Option<PathBuf>, overrides: &FileMetadata) -> Self {
        Self {
            ignore_prefix,
            static_tags: overrides.rendered_values().collect(),
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        self.ignore_prefix
            .as_deref()
            .and_then(|prefix| path.strip_prefix(prefix).ok())
            .unwrap_or(path)
    }
}

impl Tagger for PathTagger {
    fn tags(&self, path: &Path, _metadata: &FileMetadata, name: &ArchiveName) -> TagSet {
        let relative = self.relative(path).to_string_lossy();

        segments(&relative)
            .into_iter()
            .chain(segments(name.as_str()))
            .chain(self.static_tags.iter().cloned())
            .collect()
    }
}

/// Split a path-like string into segments with the final extension removed
fn segments(raw: &str) -> Vec<String> {
    let normalized = raw.replace('\\', "/");

    strip_extension(&normalized)
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect()
}

// A leading dot in the last segment is a hidden name, not an extension.
fn strip_extension(path: &str) -> &str {
    let last_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[last_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..last_start + dot],
        _ => path,
    }
}
