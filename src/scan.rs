use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::model::{ClassQuery, ClassTarget, Match, SOURCE_EXTENSION, SourceAccessor};

/// Lazily yields every regular file under `root`, sorted by name at each level.
///
/// Walk failures (an unreadable directory, a root that vanished) are yielded
/// as errors rather than skipped.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<PathBuf, ignore::Error>> + use<> {
    WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                Some(Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
}

pub fn is_directory_candidate(file: &Path, query: &ClassQuery) -> bool {
    file.file_name()
        .is_some_and(|name| name.to_string_lossy().contains(query.short_name()))
}

/// Path of `file` relative to `root`, which stands in for the package name.
pub fn relative_name(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .to_string()
}

pub fn find_in_directory<F>(
    root: &Path,
    query: &ClassQuery,
    source_mode: bool,
    mut on_match: F,
) -> Result<ControlFlow<()>>
where
    F: FnMut(Match<'_>) -> Result<ControlFlow<()>>,
{
    for file in walk_files(root) {
        let file = file.with_context(|| format!("Failed to walk directory: {}", root.display()))?;
        if !is_directory_candidate(&file, query) {
            continue;
        }

        let location = file.to_string_lossy().to_string();
        let has_source = file
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains(SOURCE_EXTENSION));
        let source = (source_mode && has_source).then(|| SourceAccessor::File(file.clone()));

        let hit = Match {
            package: relative_name(root, &file),
            target: ClassTarget::Location(location.clone()),
            location,
            source,
            first_in_container: true,
        };
        if on_match(hit)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}
