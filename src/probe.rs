use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::Path;
use zip::ZipArchive;

use crate::model::{CLASS_EXTENSION, ClassQuery, ClassTarget, Match, SourceAccessor, mode_extension};

/// Loose containment on both the query and the extension, not a suffix check.
pub fn is_archive_candidate(entry_name: &str, query: &ClassQuery, extension: &str) -> bool {
    entry_name.contains(query.slash_form()) && entry_name.contains(extension)
}

pub fn find_in_archive<F>(
    jar_path: &Path,
    query: &ClassQuery,
    source_mode: bool,
    mut on_match: F,
) -> Result<ControlFlow<()>>
where
    F: FnMut(Match<'_>) -> Result<ControlFlow<()>>,
{
    let file =
        File::open(jar_path).with_context(|| format!("Failed to open jar: {}", jar_path.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping, which is
    // dropped at the end of this function together with the archive.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap jar: {}", jar_path.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", jar_path.display()))?;

    let extension = mode_extension(source_mode);
    let container = jar_path.to_string_lossy().to_string();
    let mut first_in_container = true;

    for i in 0..archive.len() {
        let name = archive
            .by_index_raw(i)
            .with_context(|| format!("Failed to read entry #{i} of {container}"))?
            .name()
            .to_string();
        if !is_archive_candidate(&name, query, extension) {
            continue;
        }

        let source = if source_mode {
            let entry = archive
                .by_index(i)
                .with_context(|| format!("Failed to open {name} in {container}"))?;
            Some(SourceAccessor::Entry(entry))
        } else {
            None
        };

        let hit = Match {
            location: container.clone(),
            target: ClassTarget::ArchiveEntry {
                container: jar_path.to_path_buf(),
                class: name.replace(CLASS_EXTENSION, ""),
            },
            package: name,
            source,
            first_in_container,
        };
        first_in_container = false;

        if on_match(hit)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}
