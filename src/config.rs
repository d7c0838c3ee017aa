use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::classpath::Classpath;
use crate::cli::Cli;
use crate::javap::MethodListing;

pub const CLASSPATH_ENV: &str = "CLASSPATH";
pub const JAVAP_ENV: &str = "JCF_JAVAP";
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

/// Display toggles, fixed once the command line is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub show_methods: bool,
    pub show_private_methods: bool,
    pub show_path: bool,
    pub show_package: bool,
    pub source_mode: bool,
    pub runtime_only: bool,
    pub debug: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_methods: false,
            show_private_methods: false,
            show_path: true,
            show_package: true,
            source_mode: false,
            runtime_only: false,
            debug: false,
        }
    }
}

impl DisplayConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            show_methods: cli.methods,
            show_private_methods: cli.private_methods,
            show_path: !cli.no_path,
            show_package: !cli.no_package,
            source_mode: cli.source,
            runtime_only: cli.runtime_only,
            debug: cli.debug,
        }
    }

    pub fn method_listing(&self) -> Option<MethodListing> {
        if self.show_private_methods {
            Some(MethodListing::Private)
        } else if self.show_methods {
            Some(MethodListing::Public)
        } else {
            None
        }
    }
}

/// `--classpath`, then `$CLASSPATH`, then `.`; the JDK source dir goes last.
pub fn resolve_classpath(cli: &Cli) -> Classpath {
    let raw = cli
        .classpath
        .clone()
        .or_else(|| env::var_os(CLASSPATH_ENV))
        .unwrap_or_else(|| OsString::from("."));

    let mut classpath = Classpath::parse(&raw);
    if let Some(jdk_root) = cli.jdk_source.as_deref() {
        classpath.push_jdk_source(jdk_root);
    }
    classpath
}

pub fn resolve_javap(cli: &Cli) -> PathBuf {
    if let Some(p) = cli.javap.clone() {
        return p;
    }

    if let Some(p) = env::var_os(JAVAP_ENV) {
        return PathBuf::from(p);
    }

    PathBuf::from("javap")
}

pub fn resolve_java_home(cli: &Cli) -> Option<PathBuf> {
    cli.java_home
        .clone()
        .or_else(|| env::var_os(JAVA_HOME_ENV).map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty())
}
