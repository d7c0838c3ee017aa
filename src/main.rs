use anyhow::Result;
use jcf::cli::{parse_args, print_usage};
use jcf::config::{DisplayConfig, resolve_classpath, resolve_java_home, resolve_javap};
use jcf::finder::Finder;
use jcf::javap::Javap;
use jcf::logging::init_logging;
use jcf::model::ClassQuery;
use jcf::report::Reporter;
use jcf::runtime::RuntimeImage;
use tracing::debug;

fn main() -> Result<()> {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            print_usage(&err);
            std::process::exit(1);
        }
    };
    let config = DisplayConfig::from_cli(&cli);
    init_logging(config.debug);

    let query = ClassQuery::new(cli.class_name());
    let classpath = resolve_classpath(&cli);
    let runtime = RuntimeImage::locate(resolve_java_home(&cli).as_deref());
    let javap = Javap::new(resolve_javap(&cli));
    debug!(
        "Searching for {} in {} classpath entries, runtime {:?}, javap {}",
        query.short_name(),
        classpath.len(),
        runtime,
        javap.bin().display()
    );

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(config, stdout.lock(), javap);
    if Finder::new(&query, &runtime)
        .run(&classpath, &mut reporter)?
        .is_break()
    {
        debug!("Search stopped early");
    }

    Ok(())
}
