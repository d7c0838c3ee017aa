use clap::Parser;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classpath::jdk_source_dir;

#[derive(Debug, Clone, Parser)]
#[command(name = "jcf", disable_help_flag = true, args_override_self = true)]
#[command(about = "Find Java classes by short name across the classpath and the Java runtime")]
pub struct Cli {
    #[arg(value_name = "CLASS")]
    pub class_name: Option<String>,

    #[arg(long)]
    pub methods: bool,

    #[arg(long)]
    pub private_methods: bool,

    #[arg(long)]
    pub no_path: bool,

    #[arg(long)]
    pub no_package: bool,

    #[arg(long)]
    pub source: bool,

    #[arg(long)]
    pub runtime_only: bool,

    #[arg(long)]
    pub debug: bool,

    #[arg(long, value_name = "DIR")]
    pub jdk_source: Option<PathBuf>,

    #[arg(long, value_name = "PATHS")]
    pub classpath: Option<OsString>,

    #[arg(long, value_name = "FILE")]
    pub javap: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub java_home: Option<PathBuf>,

    #[arg(long)]
    pub help: bool,
}

impl Cli {
    /// Only meaningful after [`parse_args`] succeeded.
    pub fn class_name(&self) -> &str {
        self.class_name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("A class name is required")]
    MissingClassName,
    #[error("Usage requested")]
    Help,
    #[error("Missing jdk source location")]
    MissingJdkSource,
    #[error("File path '{}' does not exist", .0.display())]
    PathMissing(PathBuf),
    #[error("File path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{0}")]
    Invalid(String),
}

pub const USAGE: &str = "\
Usage: jcf ClassName
-m : Get the methods of the class
-mp : Get the private methods of the class
-path : Doesn't print the path of the class
-package : Doesn't print the package of the class
-rt : Only search for class in the runtime
-s : Search for the source, only prints the first one
-debug : Print diagnostic lines
-js <path-to-jdk-root-source-folder>
-cp <classpath> : Search this classpath instead of $CLASSPATH";

/// The failure reason first, then the usage text. `-h` gets the usage text alone.
pub fn write_usage<W: Write>(out: &mut W, err: &UsageError) -> io::Result<()> {
    if !matches!(err, UsageError::Help) {
        writeln!(out, "{err}\n")?;
    }
    writeln!(out, "{USAGE}")
}

pub fn print_usage(err: &UsageError) {
    let _ = write_usage(&mut io::stderr().lock(), err);
}

enum Legacy {
    Switch(&'static str),
    Valued(&'static str),
}

/// Single-dash flags are prefix matched, so `-mp` has to be tried before `-m`.
fn legacy_flag(arg: &str) -> Option<Legacy> {
    const EXACT: [(&str, Legacy); 2] = [
        ("-cp", Legacy::Valued("--classpath")),
        ("-classpath", Legacy::Valued("--classpath")),
    ];
    const PREFIXED: [(&str, Legacy); 9] = [
        ("-mp", Legacy::Switch("--private-methods")),
        ("-m", Legacy::Switch("--methods")),
        ("-debug", Legacy::Switch("--debug")),
        ("-path", Legacy::Switch("--no-path")),
        ("-package", Legacy::Switch("--no-package")),
        ("-rt", Legacy::Switch("--runtime-only")),
        ("-s", Legacy::Switch("--source")),
        ("-js", Legacy::Valued("--jdk-source")),
        ("-h", Legacy::Switch("--help")),
    ];

    for (flag, legacy) in EXACT {
        if arg == flag {
            return Some(legacy);
        }
    }
    PREFIXED
        .into_iter()
        .find(|(prefix, _)| arg.starts_with(*prefix))
        .map(|(_, legacy)| legacy)
}

fn takes_value(long_flag: &str) -> bool {
    matches!(
        long_flag,
        "--jdk-source" | "--classpath" | "--javap" | "--java-home"
    )
}

/// Maps the legacy single-dash flags onto the long flags clap understands.
pub fn rewrite_legacy_args(args: Vec<OsString>) -> Result<Vec<OsString>, UsageError> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    if let Some(bin) = iter.next() {
        out.push(bin);
    }

    while let Some(arg) = iter.next() {
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };

        if s == "--" {
            out.push(arg);
            out.extend(iter);
            break;
        }

        if s.starts_with("--") {
            let needs_value = takes_value(s);
            out.push(arg);
            if needs_value && let Some(value) = iter.next() {
                out.push(value);
            }
            continue;
        }

        match legacy_flag(s) {
            Some(Legacy::Switch(long)) => out.push(OsString::from(long)),
            Some(Legacy::Valued(long)) => {
                let Some(value) = iter.next() else {
                    return Err(if long == "--jdk-source" {
                        UsageError::MissingJdkSource
                    } else {
                        UsageError::Invalid(format!("Missing value for {s}"))
                    });
                };
                // `--flag=value` keeps values that start with `-` intact.
                let mut joined = OsString::from(format!("{long}="));
                joined.push(value);
                out.push(joined);
            }
            None => out.push(arg),
        }
    }

    Ok(out)
}

/// `dir` and `dir/src` must both be existing directories.
pub fn validate_jdk_source(dir: &Path) -> Result<PathBuf, UsageError> {
    let src = jdk_source_dir(dir);
    for path in [dir, src.as_path()] {
        if !path.exists() {
            return Err(UsageError::PathMissing(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(UsageError::NotADirectory(path.to_path_buf()));
        }
    }
    Ok(src)
}

pub fn parse_args<I, T>(args: I) -> Result<Cli, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = rewrite_legacy_args(args.into_iter().map(Into::into).collect())?;
    let cli = Cli::try_parse_from(args).map_err(|err| {
        let rendered = err.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        UsageError::Invalid(first.trim_start_matches("error: ").to_string())
    })?;

    if cli.help {
        return Err(UsageError::Help);
    }
    if cli.class_name.is_none() {
        return Err(UsageError::MissingClassName);
    }
    if let Some(dir) = cli.jdk_source.as_deref() {
        validate_jdk_source(dir)?;
    }

    Ok(cli)
}
