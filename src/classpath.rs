use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl ClasspathEntry {
    /// Paths with a `.jar` extension are archives, everything else is walked
    /// as a directory.
    pub fn classify(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("jar"))
        {
            ClasspathEntry::Archive(path)
        } else {
            ClasspathEntry::Directory(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::Directory(p) | ClasspathEntry::Archive(p) => p,
        }
    }
}

/// `lib/foo-1.0.jar` -> `lib/foo-1.0-sources.jar`
pub fn source_archive_path(jar_path: &Path) -> PathBuf {
    let stem = jar_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    jar_path.with_file_name(format!("{stem}-sources.jar"))
}

/// Ordered, duplicate-free list of entries to search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<ClasspathEntry>,
    seen: HashSet<ClasspathEntry>,
}

impl Classpath {
    /// Splits a platform classpath string (`:` on unix, `;` on windows).
    pub fn parse(raw: &OsStr) -> Self {
        let mut classpath = Self::default();
        for path in std::env::split_paths(raw) {
            if path.as_os_str().is_empty() {
                continue;
            }
            classpath.push(ClasspathEntry::classify(path));
        }
        classpath
    }

    pub fn push(&mut self, entry: ClasspathEntry) {
        if self.seen.insert(entry.clone()) {
            self.entries.push(entry);
        }
    }

    /// Appends `<jdk_root>/src` as a directory entry.
    pub fn push_jdk_source(&mut self, jdk_root: &Path) {
        self.push(ClasspathEntry::Directory(jdk_source_dir(jdk_root)));
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn jdk_source_dir(jdk_root: &Path) -> PathBuf {
    jdk_root.join("src")
}
