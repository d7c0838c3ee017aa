//! # jcf
//!
//! Finds Java classes by short name across a classpath, the Java runtime and
//! JDK source trees.
//!
//! ## Architecture
//!
//! - **cli**: legacy prefix flags rewritten onto a clap parser
//! - **config**: display toggles and flag/environment resolution
//! - **classpath**: ordered classpath entries and source-jar naming
//! - **model**: the query and the match handed between components
//! - **runtime**: classes resolvable from the Java runtime image
//! - **scan**: directory tree matching
//! - **probe**: jar entry matching
//! - **javap**: method listings via the JDK disassembler
//! - **report**: output formatting and the source-mode short circuit
//! - **finder**: runtime first, then every classpath entry in order

pub mod classpath;
pub mod cli;
pub mod config;
pub mod finder;
pub mod javap;
pub mod logging;
pub mod model;
pub mod probe;
pub mod report;
pub mod runtime;
pub mod scan;
