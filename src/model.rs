use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;
use zip::read::ZipFile;

pub const CLASS_EXTENSION: &str = ".class";
pub const SOURCE_EXTENSION: &str = ".java";

/// Extension an archive entry or file name must contain to count as a hit.
pub fn mode_extension(source_mode: bool) -> &'static str {
    if source_mode {
        SOURCE_EXTENSION
    } else {
        CLASS_EXTENSION
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassQuery {
    short_name: String,
    slash_form: String,
}

impl ClassQuery {
    pub fn new(short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        let slash_form = short_name.replace('.', "/");
        Self {
            short_name,
            slash_form,
        }
    }

    /// Name as typed, matched against file names on disk.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Dots replaced by slashes, matched against archive entry names.
    pub fn slash_form(&self) -> &str {
        &self.slash_form
    }
}

/// What the disassembler is pointed at for a given match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassTarget {
    /// A file path or resource URL that `javap` can open directly.
    Location(String),
    /// A class inside an archive, addressed by `-classpath <container> <class>`.
    ArchiveEntry { container: PathBuf, class: String },
}

pub enum SourceAccessor<'a> {
    File(PathBuf),
    Entry(ZipFile<'a>),
}

impl SourceAccessor<'_> {
    pub fn read_text(self) -> Result<String> {
        let bytes = match self {
            SourceAccessor::File(path) => std::fs::read(&path)
                .with_context(|| format!("Failed to read source file: {}", path.display()))?,
            SourceAccessor::Entry(mut entry) => {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut bytes)
                    .with_context(|| format!("Failed to read archive entry: {}", entry.name()))?;
                bytes
            }
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// One rendered hit, whichever source produced it.
pub struct Match<'a> {
    pub location: String,
    /// Raw package field: a fully qualified name, a root-relative path or an
    /// archive entry name. The renderer derives the dotted form.
    pub package: String,
    pub target: ClassTarget,
    pub source: Option<SourceAccessor<'a>>,
    /// Only the first hit of an archive prints the container path.
    pub first_in_container: bool,
}
