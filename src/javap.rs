use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::model::ClassTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodListing {
    Public,
    /// `-p`: private members too.
    Private,
}

pub trait Disassembler {
    /// Prints the member listing of `target` straight to the console.
    fn list_methods(&mut self, target: &ClassTarget, listing: MethodListing) -> Result<()>;
}

pub fn javap_args(target: &ClassTarget, listing: MethodListing) -> Vec<String> {
    let mut args = Vec::with_capacity(4);
    if listing == MethodListing::Private {
        args.push("-p".to_string());
    }
    match target {
        ClassTarget::Location(location) => args.push(location.clone()),
        ClassTarget::ArchiveEntry { container, class } => {
            args.push("-classpath".to_string());
            args.push(container.to_string_lossy().to_string());
            args.push(class.clone());
        }
    }
    args
}

fn javap_command(javap_bin: &Path) -> Command {
    #[cfg(windows)]
    {
        let lower = javap_bin.to_string_lossy().to_ascii_lowercase();
        if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(javap_bin);
            return cmd;
        }
    }

    Command::new(javap_bin)
}

/// Runs the JDK `javap` tool with inherited stdio and waits for it.
#[derive(Debug, Clone)]
pub struct Javap {
    javap_bin: PathBuf,
}

impl Javap {
    pub fn new(javap_bin: PathBuf) -> Self {
        Self { javap_bin }
    }

    pub fn bin(&self) -> &Path {
        &self.javap_bin
    }
}

impl Disassembler for Javap {
    fn list_methods(&mut self, target: &ClassTarget, listing: MethodListing) -> Result<()> {
        let args = javap_args(target, listing);
        debug!("{} {}", self.javap_bin.display(), args.join(" "));

        // The exit status is not a failure signal, only the spawn is.
        let status = javap_command(&self.javap_bin)
            .args(&args)
            .status()
            .with_context(|| {
                format!(
                    "Failed to execute {} (ensure a JDK is installed, or use --javap)",
                    self.javap_bin.display()
                )
            })?;
        debug!("javap exited with {status}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn javap_args_for_plain_location() {
        let target = ClassTarget::Location("/out/com/x/Foo.class".to_string());
        assert_eq!(
            javap_args(&target, MethodListing::Public),
            vec!["/out/com/x/Foo.class"]
        );
        assert_eq!(
            javap_args(&target, MethodListing::Private),
            vec!["-p", "/out/com/x/Foo.class"]
        );
    }

    #[test]
    fn javap_args_for_archive_entry() {
        let target = ClassTarget::ArchiveEntry {
            container: PathBuf::from("lib/util.jar"),
            class: "com/x/Foo".to_string(),
        };
        assert_eq!(
            javap_args(&target, MethodListing::Private),
            vec!["-p", "-classpath", "lib/util.jar", "com/x/Foo"]
        );
    }

    #[test]
    fn missing_binary_is_fatal() {
        let mut javap = Javap::new(PathBuf::from("/definitely/not/here/javap"));
        let err = javap
            .list_methods(
                &ClassTarget::Location("Foo.class".to_string()),
                MethodListing::Public,
            )
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_not_an_error() -> Result<()> {
        let mut javap = Javap::new(PathBuf::from("false"));
        javap.list_methods(
            &ClassTarget::Location("Foo.class".to_string()),
            MethodListing::Public,
        )
    }
}
