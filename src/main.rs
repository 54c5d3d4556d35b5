use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use pydev::cli::{commands, output, Cli, CliError, CliResult, Dispatcher};
use pydev::config::Settings;
use pydev::domain::{Action, TargetRegistry};
use pydev::infrastructure::di::ServiceContainer;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let registry = TargetRegistry::standard();
    let (name, args) = cli.target();

    // unknown targets and help never read config
    let target = registry
        .get(name)
        .ok_or_else(|| CliError::unknown_target(name, &registry))?;
    if target.action == Action::Help {
        return commands::help(&registry, name, args);
    }

    let settings = Settings::load(cli.project_dir.as_deref())?;
    tracing::debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    Dispatcher::new(&registry, &container).dispatch(name, args)
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -v -v -v");
            LevelFilter::TRACE
        }
    };

    // Create a noisy module filter
    let noisy_modules = ["config::"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // RUST_LOG takes over from -v when set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(filter.into()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(env_filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pydev::util::testing;
    use tracing::info;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        testing::init_test_setup();
        use clap::CommandFactory;
        Cli::command().debug_assert();
        info!("Debug mode: info");
    }

    #[test]
    fn given_unknown_target_when_run_then_usage_error_without_config() {
        let cli = Cli::try_parse_from(["pydev", "foo"]).unwrap();

        let err = run(&cli).unwrap_err();

        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn given_broken_config_when_run_help_then_succeeds() {
        let project = tempfile::TempDir::new().unwrap();
        std::fs::write(project.path().join("pydev.toml"), "package = [\n").unwrap();
        let dir = project.path().to_str().unwrap();

        for argv in [vec!["pydev", "-C", dir, "help"], vec!["pydev", "-C", dir]] {
            let cli = Cli::try_parse_from(argv).unwrap();
            assert!(run(&cli).is_ok());
        }
    }
}
