use anyhow::{Context, Result};
use std::io::Write;
use std::ops::ControlFlow;

use crate::config::DisplayConfig;
use crate::javap::Disassembler;
use crate::model::{CLASS_EXTENSION, Match};

/// `a/b/C.class` -> `a.b.C`. Strings without `.class` pass through untouched.
pub fn from_path_to_package(path: &str) -> String {
    if !path.contains(CLASS_EXTENSION) {
        return path.to_string();
    }
    path.replace(['\\', '/'], ".").replace(CLASS_EXTENSION, "")
}

/// Writes matches to `out` and runs the disassembler for each when asked.
pub struct Reporter<W: Write, D: Disassembler> {
    config: DisplayConfig,
    out: W,
    disassembler: D,
}

impl<W: Write, D: Disassembler> Reporter<W, D> {
    pub fn new(config: DisplayConfig, out: W, disassembler: D) -> Self {
        Self {
            config,
            out,
            disassembler,
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (W, D) {
        (self.out, self.disassembler)
    }

    /// Returns `Break` once a source body has been printed.
    pub fn render(&mut self, hit: Match<'_>) -> Result<ControlFlow<()>> {
        if self.config.show_path && hit.first_in_container {
            writeln!(self.out, "Path: {}", hit.location)?;
        }
        if self.config.show_package {
            if self.config.show_path {
                write!(self.out, "    ")?;
            }
            writeln!(self.out, "Package: {}", from_path_to_package(&hit.package))?;
        }

        if let Some(listing) = self.config.method_listing() {
            // The child writes to the same console.
            self.out.flush()?;
            self.disassembler.list_methods(&hit.target, listing)?;
        }

        if self.config.source_mode
            && let Some(source) = hit.source
        {
            let text = source
                .read_text()
                .with_context(|| format!("Failed to read source of {}", hit.package))?;
            let text = text.replace("\r\n", "\n");
            write!(self.out, "{text}")?;
            if !text.ends_with('\n') {
                writeln!(self.out)?;
            }
            self.out.flush()?;
            return Ok(ControlFlow::Break(()));
        }

        Ok(ControlFlow::Continue(()))
    }
}
