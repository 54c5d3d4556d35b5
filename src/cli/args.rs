//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::services::DEFAULT_DEPTH;

/// Developer tooling for a Python package: lint, publish, and static import checking
#[derive(Parser, Debug)]
#[command(name = "pydev")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
#[command(after_help = "Run `pydev help` to list the available targets.")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, env = "PYDEV_PROJECT_DIR", value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Target name followed by its raw arguments
    #[command(external_subcommand)]
    Target(Vec<String>),
}

impl Cli {
    /// Target name and its arguments; `help` when none was given.
    pub fn target(&self) -> (&str, &[String]) {
        match &self.command {
            Some(Commands::Target(argv)) => match argv.split_first() {
                Some((name, rest)) => (name.as_str(), rest),
                None => ("help", &[]),
            },
            None => ("help", &[]),
        }
    }
}

/// Arguments of the `imports` target
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "pydev imports")]
#[command(about = "Statically list the imports of Python files")]
pub struct ImportsArgs {
    /// File(s) to start at
    #[arg(short, long, required = true, num_args = 1.., value_hint = ValueHint::FilePath)]
    pub path: Vec<String>,

    /// How far to recurse into locally resolvable imports
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Leave standard library modules out of library_dependencies
    ///
    /// A module counts as standard library when its top-level package does,
    /// so `os.path` and `xml.etree` are dropped along with `os`.
    #[arg(short, long)]
    pub ignore_stdlib: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
        ImportsArgs::command().debug_assert();
    }

    #[test]
    fn given_imports_long_help_when_rendered_then_explains_stdlib_match() {
        let help = ImportsArgs::command().render_long_help().to_string();
        assert!(help.contains("top-level package"));
    }

    #[test]
    fn given_no_target_when_parse_then_defaults_to_help() {
        let cli = Cli::try_parse_from(["pydev"]).unwrap();
        assert_eq!(cli.target(), ("help", &[][..]));
    }

    #[test]
    fn given_target_with_flags_when_parse_then_passes_raw_args() {
        let cli = Cli::try_parse_from(["pydev", "-vv", "imports", "-p", "a.py", "--help"]).unwrap();
        let (name, args) = cli.target();
        assert_eq!(cli.verbose, 2);
        assert_eq!(name, "imports");
        assert_eq!(args, ["-p", "a.py", "--help"]);
    }

    #[test]
    fn given_help_word_when_parse_then_is_a_target() {
        let cli = Cli::try_parse_from(["pydev", "help"]).unwrap();
        assert_eq!(cli.target().0, "help");
    }

    #[test]
    fn given_imports_flags_when_parse_then_reads_all() {
        let args =
            ImportsArgs::try_parse_from(["pydev imports", "-p", "a.py", "b.py", "-d", "0", "-i"])
                .unwrap();
        assert_eq!(args.path, vec!["a.py", "b.py"]);
        assert_eq!(args.depth, 0);
        assert!(args.ignore_stdlib);
    }

    #[test]
    fn given_imports_without_path_when_parse_then_error() {
        assert!(ImportsArgs::try_parse_from(["pydev imports"]).is_err());
    }
}
