//! Target dispatch
//!
//! Resolves a target name through the registry and runs its action.

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, instrument};

use crate::application::services::{report_to_json, ScanOptions};
use crate::cli::args::ImportsArgs;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{Action, TargetRegistry};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Runs targets from an explicit registry against a service container.
pub struct Dispatcher<'a> {
    registry: &'a TargetRegistry,
    container: &'a ServiceContainer,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a TargetRegistry, container: &'a ServiceContainer) -> Self {
        Self {
            registry,
            container,
        }
    }

    /// Execute the target `name` with its raw arguments.
    #[instrument(skip(self))]
    pub fn dispatch(&self, name: &str, args: &[String]) -> CliResult<()> {
        let target = self
            .registry
            .get(name)
            .ok_or_else(|| CliError::unknown_target(name, self.registry))?;
        debug!("dispatch: {} -> {:?}", name, target.action);

        match target.action {
            Action::Help => help(self.registry, name, args),
            Action::Lint => {
                expect_no_args(name, args)?;
                self.container.lint_service().run()?;
                output::success("lint passed");
                Ok(())
            }
            Action::Publish => {
                expect_no_args(name, args)?;
                self.container.publish_service().run()?;
                output::success("published");
                Ok(())
            }
            Action::Config => self.config(args),
            Action::Imports => self.imports(args),
        }
    }

    fn config(&self, args: &[String]) -> CliResult<()> {
        match args {
            [] => {
                output::info(&self.container.settings.to_toml()?);
                Ok(())
            }
            [sub] if sub == "template" => {
                output::info(&Settings::template());
                Ok(())
            }
            _ => Err(CliError::Usage(format!(
                "usage: pydev config [template] (got: {})",
                args.join(" ")
            ))),
        }
    }

    fn imports(&self, args: &[String]) -> CliResult<()> {
        let argv = std::iter::once("pydev imports".to_string()).chain(args.iter().cloned());
        let parsed = match ImportsArgs::try_parse_from(argv) {
            Ok(parsed) => parsed,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.print().map_err(|io| InfraError::io("print help", io))?;
                return Ok(());
            }
            Err(e) => return Err(CliError::InvalidArgs(e.to_string())),
        };

        let options = ScanOptions {
            paths: parsed.path,
            depth_limit: parsed.depth,
            include_stdlib: !parsed.ignore_stdlib,
        };
        let report = self.container.import_service().scan(&options)?;
        output::info(&report_to_json(&report)?);
        Ok(())
    }
}

/// Print the target table. Needs no settings, so it works with a broken config.
pub fn help(registry: &TargetRegistry, name: &str, args: &[String]) -> CliResult<()> {
    expect_no_args(name, args)?;
    for (name, description) in registry.help_lines() {
        output::help_entry(&name, &description);
    }
    Ok(())
}

fn expect_no_args(name: &str, args: &[String]) -> CliResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CliError::Usage(format!(
            "target '{}' takes no arguments (got: {})",
            name,
            args.join(" ")
        )))
    }
}
