//! Walks the runtime and then each classpath entry in order, handing every hit
//! to the reporter. A `Break` from the reporter ends the whole search.

use anyhow::Result;
use std::io::Write;
use std::ops::ControlFlow;
use tracing::{debug, warn};

use crate::classpath::{Classpath, ClasspathEntry, source_archive_path};
use crate::javap::Disassembler;
use crate::model::{ClassQuery, ClassTarget, Match};
use crate::probe::find_in_archive;
use crate::report::Reporter;
use crate::runtime::LoadedClasses;
use crate::scan::find_in_directory;

pub struct Finder<'a> {
    query: &'a ClassQuery,
    runtime: &'a dyn LoadedClasses,
}

impl<'a> Finder<'a> {
    pub fn new(query: &'a ClassQuery, runtime: &'a dyn LoadedClasses) -> Self {
        Self { query, runtime }
    }

    pub fn run<W: Write, D: Disassembler>(
        &self,
        classpath: &Classpath,
        reporter: &mut Reporter<W, D>,
    ) -> Result<ControlFlow<()>> {
        if self.search_runtime(reporter)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
        if reporter.config().runtime_only {
            debug!("Runtime-only search, classpath skipped");
            return Ok(ControlFlow::Break(()));
        }

        for entry in classpath.entries() {
            if self.search_entry(entry, reporter)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn search_runtime<W: Write, D: Disassembler>(
        &self,
        reporter: &mut Reporter<W, D>,
    ) -> Result<ControlFlow<()>> {
        for class in self.runtime.resolve(self.query.short_name())? {
            let hit = Match {
                target: ClassTarget::Location(class.location.clone()),
                location: class.location,
                package: class.fqn,
                source: None,
                first_in_container: true,
            };
            if reporter.render(hit)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn search_entry<W: Write, D: Disassembler>(
        &self,
        entry: &ClasspathEntry,
        reporter: &mut Reporter<W, D>,
    ) -> Result<ControlFlow<()>> {
        let source_mode = reporter.config().source_mode;

        match entry {
            ClasspathEntry::Directory(root) => {
                debug!("Path: {}", root.display());
                if !root.exists() {
                    debug!("Skipping missing classpath entry {}", root.display());
                    return Ok(ControlFlow::Continue(()));
                }
                find_in_directory(root, self.query, source_mode, |hit| reporter.render(hit))
            }
            ClasspathEntry::Archive(jar) => {
                let archive = if source_mode {
                    let sources = source_archive_path(jar);
                    if !sources.exists() {
                        warn!("File does not exist: {}", sources.display());
                        return Ok(ControlFlow::Continue(()));
                    }
                    sources
                } else {
                    if !jar.exists() {
                        debug!("Skipping missing classpath entry {}", jar.display());
                        return Ok(ControlFlow::Continue(()));
                    }
                    jar.clone()
                };
                find_in_archive(&archive, self.query, source_mode, |hit| reporter.render(hit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::javap::MethodListing;
    use crate::runtime::LoadedClass;
    use std::cell::Cell;
    use std::ffi::OsString;
    use std::fs;
    use std::path::{Path, PathBuf};
    use zip::write::FileOptions;

    struct FakeRuntime {
        classes: Vec<LoadedClass>,
        calls: Cell<usize>,
    }

    impl FakeRuntime {
        fn new(fqns: &[&str]) -> Self {
            Self {
                classes: fqns
                    .iter()
                    .map(|fqn| LoadedClass {
                        fqn: fqn.to_string(),
                        location: format!("jrt:/java.base/{}.class", fqn.replace('.', "/")),
                    })
                    .collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl LoadedClasses for FakeRuntime {
        fn resolve(&self, _short_name: &str) -> Result<Vec<LoadedClass>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.classes.clone())
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(ClassTarget, MethodListing)>,
    }

    impl Disassembler for Recorder {
        fn list_methods(&mut self, target: &ClassTarget, listing: MethodListing) -> Result<()> {
            self.calls.push((target.clone(), listing));
            Ok(())
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "jcf_finder_test_{}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos(),
            name
        ))
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn classpath<P: AsRef<Path>>(paths: &[P]) -> Classpath {
        let joined = std::env::join_paths(paths.iter().map(|p| p.as_ref()))
            .unwrap_or_else(|_| OsString::new());
        Classpath::parse(&joined)
    }

    fn run(
        config: DisplayConfig,
        runtime: &FakeRuntime,
        cp: &Classpath,
        query: &str,
    ) -> (ControlFlow<()>, String, Recorder) {
        let query = ClassQuery::new(query);
        let mut reporter = Reporter::new(config, Vec::new(), Recorder::default());
        let flow = Finder::new(&query, runtime).run(cp, &mut reporter).unwrap();
        let (out, recorder) = reporter.into_parts();
        (flow, String::from_utf8(out).unwrap(), recorder)
    }

    #[test]
    fn directory_then_jar_in_classpath_order() {
        let base = temp_dir("order");
        let out_dir = base.join("out");
        let jar = base.join("lib/util.jar");
        write_file(&out_dir.join("com/x/Foo.class"), "");
        write_jar(&jar, &[("com/x/Foo.class", "")]);

        let cp = classpath(&[&out_dir, &jar]);
        let (flow, out, _) = run(DisplayConfig::default(), &FakeRuntime::new(&[]), &cp, "Foo");

        assert!(flow.is_continue());
        let expected = format!(
            "Path: {}\n    Package: com.x.Foo\nPath: {}\n    Package: com.x.Foo\n",
            out_dir.join("com/x/Foo.class").display(),
            jar.display()
        );
        assert_eq!(out, expected);
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn runtime_hits_come_first() {
        let base = temp_dir("runtime_first");
        write_file(&base.join("out/my/List.class"), "");
        let cp = classpath(&[&base.join("out")]);
        let runtime = FakeRuntime::new(&["java.awt.List", "java.util.List"]);

        let config = DisplayConfig {
            show_path: false,
            ..DisplayConfig::default()
        };
        let (_, out, _) = run(config, &runtime, &cp, "List");
        assert_eq!(
            out,
            "Package: java.awt.List\nPackage: java.util.List\nPackage: my.List\n"
        );
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn runtime_only_never_touches_classpath() {
        let base = temp_dir("runtime_only");
        write_file(&base.join("out/my/List.class"), "");
        let cp = classpath(&[&base.join("out")]);
        let runtime = FakeRuntime::new(&["java.util.List"]);

        let config = DisplayConfig {
            runtime_only: true,
            show_path: false,
            ..DisplayConfig::default()
        };
        let (flow, out, _) = run(config, &runtime, &cp, "List");
        assert!(flow.is_break());
        assert_eq!(out, "Package: java.util.List\n");
        assert_eq!(runtime.calls.get(), 1);

        let (flow, out, _) = run(config, &FakeRuntime::new(&[]), &cp, "List");
        assert!(flow.is_break());
        assert!(out.is_empty());
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn missing_entries_are_skipped() {
        let base = temp_dir("missing");
        let cp = classpath(&[&base.join("nope"), &base.join("nope.jar")]);
        let (flow, out, _) = run(DisplayConfig::default(), &FakeRuntime::new(&[]), &cp, "Foo");
        assert!(flow.is_continue());
        assert!(out.is_empty());
    }

    #[test]
    fn jar_container_line_printed_once() {
        let base = temp_dir("container");
        let jar = base.join("app.jar");
        write_jar(
            &jar,
            &[("a/Foo.class", ""), ("b/Foo.class", ""), ("c/Foo.class", "")],
        );
        let (_, out, _) = run(
            DisplayConfig::default(),
            &FakeRuntime::new(&[]),
            &classpath(&[&jar]),
            "Foo",
        );
        assert_eq!(out.matches("Path: ").count(), 1);
        assert_eq!(out.matches("Package: ").count(), 3);
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn source_mode_prints_first_body_and_stops() {
        let base = temp_dir("source");
        let first = base.join("first");
        let second = base.join("second");
        let jar = base.join("lib/util.jar");
        write_file(&first.join("com/x/Foo.java"), "class Foo { /* first */ }\n");
        write_file(&second.join("com/x/Foo.java"), "class Foo { /* second */ }\n");
        write_jar(&base.join("lib/util-sources.jar"), &[("com/x/Foo.java", "jar")]);

        let config = DisplayConfig {
            source_mode: true,
            show_path: false,
            show_package: false,
            ..DisplayConfig::default()
        };
        let cp = classpath(&[&jar, &first, &second]);
        let (flow, out, _) = run(config, &FakeRuntime::new(&[]), &cp, "Foo");
        assert!(flow.is_break());
        assert_eq!(out, "jar\n");

        let cp = classpath(&[&first, &second]);
        let (flow, out, _) = run(config, &FakeRuntime::new(&[]), &cp, "Foo");
        assert!(flow.is_break());
        assert_eq!(out, "class Foo { /* first */ }\n");
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn source_mode_skips_jar_without_sources() {
        let base = temp_dir("no_sources");
        let jar = base.join("lib/util.jar");
        write_jar(&jar, &[("com/x/Foo.class", "")]);
        write_file(&base.join("src/com/x/Foo.java"), "class Foo {}");

        let config = DisplayConfig {
            source_mode: true,
            ..DisplayConfig::default()
        };
        let cp = classpath(&[&jar, &base.join("src")]);
        let (flow, out, _) = run(config, &FakeRuntime::new(&[]), &cp, "Foo");
        assert!(flow.is_break());
        assert!(!out.contains("util.jar"));
        assert!(out.ends_with("class Foo {}\n"));
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn methods_run_against_jar_entries_without_class_suffix() {
        let base = temp_dir("methods");
        let jar = base.join("util.jar");
        write_jar(&jar, &[("com/x/Foo.class", "")]);

        let config = DisplayConfig {
            show_methods: true,
            ..DisplayConfig::default()
        };
        let (_, _, recorder) = run(config, &FakeRuntime::new(&[]), &classpath(&[&jar]), "Foo");
        assert_eq!(
            recorder.calls,
            vec![(
                ClassTarget::ArchiveEntry {
                    container: jar.clone(),
                    class: "com/x/Foo".to_string(),
                },
                MethodListing::Public
            )]
        );
        let _ = fs::remove_dir_all(base);
    }
}
