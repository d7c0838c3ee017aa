//! Classes the Java runtime already knows about.
//!
//! The finder cannot ask a running JVM which packages it has loaded, so the
//! runtime's own class store stands in for it: the `lib/modules` image on
//! JDK 9+ or `rt.jar` on JDK 8. A short name resolves in a package when that
//! package holds a class file with exactly that name.

use anyhow::{Context, Result};
use memmap2::Mmap;
use ristretto_jimage::Image;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::model::CLASS_EXTENSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedClass {
    pub fqn: String,
    pub location: String,
}

pub trait LoadedClasses {
    /// Every `<package>.<short_name>` the runtime can resolve, sorted by name.
    fn resolve(&self, short_name: &str) -> Result<Vec<LoadedClass>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeImage {
    Modules(PathBuf),
    RtJar(PathBuf),
    Unavailable,
}

impl RuntimeImage {
    pub fn locate(java_home: Option<&Path>) -> Self {
        let Some(home) = java_home else {
            debug!("No Java home configured, runtime classes are not searched");
            return RuntimeImage::Unavailable;
        };

        let modules = home.join("lib").join("modules");
        if modules.is_file() {
            return RuntimeImage::Modules(modules);
        }

        for rt_jar in [home.join("jre/lib/rt.jar"), home.join("lib/rt.jar")] {
            if rt_jar.is_file() {
                return RuntimeImage::RtJar(rt_jar);
            }
        }

        debug!("No runtime image under {}", home.display());
        RuntimeImage::Unavailable
    }
}

impl LoadedClasses for RuntimeImage {
    fn resolve(&self, short_name: &str) -> Result<Vec<LoadedClass>> {
        let found = match self {
            RuntimeImage::Modules(path) => resolve_in_modules(path, short_name),
            RuntimeImage::RtJar(path) => resolve_in_rt_jar(path, short_name),
            RuntimeImage::Unavailable => return Ok(Vec::new()),
        };

        match found {
            Ok(mut classes) => {
                classes.sort_by(|a, b| a.fqn.cmp(&b.fqn));
                classes.dedup_by(|a, b| a.fqn == b.fqn);
                Ok(classes)
            }
            Err(err) => {
                warn!("Runtime classes unavailable: {err:#}");
                Ok(Vec::new())
            }
        }
    }
}

/// Strips the leading `/<module>` segment that image paths may carry.
fn package_path(parent: &str) -> &str {
    match parent.strip_prefix('/') {
        Some(rest) => rest.split_once('/').map_or("", |(_, path)| path),
        None => parent,
    }
}

/// `jrt:/<module>/<path>`, the URL the runtime reports for an image resource.
fn jrt_location(module: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if module.is_empty() {
        format!("jrt:/{name}")
    } else {
        format!("jrt:/{module}/{name}")
    }
}

fn resolve_in_modules(image_path: &Path, short_name: &str) -> Result<Vec<LoadedClass>> {
    let image = Image::from_file(image_path)
        .with_context(|| format!("Failed to open runtime image: {}", image_path.display()))?;

    let mut classes = Vec::new();
    for resource in image.iter().flatten() {
        if resource.extension() != "class" || resource.base() != short_name {
            continue;
        }

        let parent = resource.parent().to_string();
        let package = package_path(&parent).replace('/', ".");
        if package.is_empty() {
            continue;
        }

        classes.push(LoadedClass {
            fqn: format!("{package}.{short_name}"),
            location: jrt_location(resource.module(), &resource.name()),
        });
    }
    Ok(classes)
}

fn resolve_in_rt_jar(rt_jar: &Path, short_name: &str) -> Result<Vec<LoadedClass>> {
    let file =
        File::open(rt_jar).with_context(|| format!("Failed to open jar: {}", rt_jar.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap jar: {}", rt_jar.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", rt_jar.display()))?;

    let wanted_suffix = format!("/{short_name}{CLASS_EXTENSION}");
    let mut classes = Vec::new();

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name();
        if !name.ends_with(&wanted_suffix) {
            continue;
        }
        let fqn = name.trim_end_matches(CLASS_EXTENSION).replace('/', ".");
        classes.push(LoadedClass {
            location: format!("jar:file:{}!/{name}", rt_jar.display()),
            fqn,
        });
    }
    Ok(classes)
}
