//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pydev/pydev.toml`
//! 3. Local config: `<project_dir>/pydev.toml`
//! 4. Environment variables: `PYDEV_*` prefix

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, ToolStep};

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "pydev.toml";

/// An external tool with its fixed leading arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Start a tool step with this program and its fixed arguments.
    pub fn to_step(&self) -> ToolStep {
        ToolStep::new(&self.program).args(self.args.iter().cloned())
    }
}

/// Lint tool chain, run in order over the package sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LintConfig {
    pub tools: Vec<ToolSpec>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            tools: vec![
                ToolSpec::new("isort", &[]),
                ToolSpec::new("black", &[]),
                ToolSpec::new("pylint", &[]),
                ToolSpec::new("mypy", &["--ignore-missing-imports"]),
            ],
        }
    }
}

/// Build-and-upload tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublishConfig {
    /// Flag preceding the username
    pub username_flag: String,
    /// Flag preceding the password
    pub password_flag: String,
    pub tool: ToolSpec,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            username_flag: "--username".into(),
            password_flag: "--password".into(),
            tool: ToolSpec::new("poetry", &["publish", "--build"]),
        }
    }
}

/// Raw lint config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLintConfig {
    pub tools: Option<Vec<ToolSpec>>,
}

/// Raw publish config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPublishConfig {
    pub tool: Option<ToolSpec>,
    pub username_flag: Option<String>,
    pub password_flag: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub package: Option<String>,
    pub lint: RawLintConfig,
    pub publish: RawPublishConfig,
}

/// Unified configuration for pydev.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Project root; tools run here and relative imports resolve from here
    pub project_dir: PathBuf,
    /// Package directory (relative to project_dir) that lint operates on
    pub package: String,
    pub lint: LintConfig,
    pub publish: PublishConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            package: "import_checker".into(),
            lint: LintConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

/// Get the XDG config directory for pydev.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pydev").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pydev.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Absolute-or-relative path of the package directory.
    pub fn package_dir(&self) -> PathBuf {
        self.project_dir.join(&self.package)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.project_dir.to_string_lossy().as_ref());
        self.project_dir = PathBuf::from(expanded);
    }

    /// Overlay a raw layer. Specified fields win; tool lists are replaced wholesale.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            project_dir: self.project_dir.clone(),
            package: overlay
                .package
                .clone()
                .unwrap_or_else(|| self.package.clone()),
            lint: LintConfig {
                tools: overlay
                    .lint
                    .tools
                    .clone()
                    .unwrap_or_else(|| self.lint.tools.clone()),
            },
            publish: PublishConfig {
                username_flag: overlay
                    .publish
                    .username_flag
                    .clone()
                    .unwrap_or_else(|| self.publish.username_flag.clone()),
                password_flag: overlay
                    .publish
                    .password_flag
                    .clone()
                    .unwrap_or_else(|| self.publish.password_flag.clone()),
                tool: overlay
                    .publish
                    .tool
                    .clone()
                    .unwrap_or_else(|| self.publish.tool.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Project root (default: cwd); its `pydev.toml` is the local layer
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();
        if let Some(dir) = project_dir {
            current.project_dir = dir.to_path_buf();
        }
        current.expand_paths();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        let local_path = local_config_path(&current.project_dir);
        if local_path.exists() {
            debug!("load: local config {}", local_path.display());
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current, None)
    }

    /// Apply PYDEV_* environment variables as explicit overrides.
    ///
    /// `env` replaces the process environment (for tests).
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PYDEV")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("package") {
            settings.package = val;
        }
        if let Ok(val) = config.get_string("publish.tool.program") {
            settings.publish.tool.program = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pydev configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pydev/pydev.toml
#   Local:  <project_dir>/pydev.toml
#   Env:    PYDEV_PACKAGE, PYDEV_PUBLISH__TOOL__PROGRAM
#
# Tool lists replace the lower layer entirely.

# Package directory that `pydev lint` operates on
# package = "import_checker"

# Lint tools, run in order; the package sources are appended to each
# [[lint.tools]]
# program = "isort"
#
# [[lint.tools]]
# program = "mypy"
# args = ["--ignore-missing-imports"]

[publish]
# Credentials come from PYPI_USERNAME / PYPI_PASSWORD
# username_flag = "--username"
# password_flag = "--password"

# [publish.tool]
# program = "poetry"
# args = ["publish", "--build"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_has_makefile_tool_chain() {
        let settings = Settings::default();
        let programs: Vec<_> = settings
            .lint
            .tools
            .iter()
            .map(|t| t.program.as_str())
            .collect();
        assert_eq!(programs, vec!["isort", "black", "pylint", "mypy"]);
        assert_eq!(settings.lint.tools[3].args, vec!["--ignore-missing-imports"]);
        assert_eq!(settings.package, "import_checker");
        assert_eq!(settings.publish.tool.program, "poetry");
    }

    #[test]
    fn given_overlay_with_package_when_merge_then_only_package_changes() {
        let base = Settings::default();
        let overlay = RawSettings {
            package: Some("ast_import_checker".into()),
            ..Default::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.package, "ast_import_checker");
        assert_eq!(result.lint, base.lint);
        assert_eq!(result.publish, base.publish);
    }

    #[test]
    fn given_overlay_with_tools_when_merge_then_replaces_list() {
        let base = Settings::default();
        let overlay = RawSettings {
            lint: RawLintConfig {
                tools: Some(vec![ToolSpec::new("ruff", &["check"])]),
            },
            ..Default::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.lint.tools, vec![ToolSpec::new("ruff", &["check"])]);
    }

    #[test]
    fn given_env_map_when_apply_overrides_then_env_wins() {
        let mut env = HashMap::new();
        env.insert("PYDEV_PACKAGE".to_string(), "from_env".to_string());
        env.insert(
            "PYDEV_PUBLISH__TOOL__PROGRAM".to_string(),
            "twine".to_string(),
        );

        let settings = Settings::apply_env_overrides(Settings::default(), Some(env)).unwrap();

        assert_eq!(settings.package, "from_env");
        assert_eq!(settings.publish.tool.program, "twine");
    }

    #[test]
    fn given_empty_env_map_when_apply_overrides_then_unchanged() {
        let settings = Settings::apply_env_overrides(Settings::default(), Some(HashMap::new()))
            .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_tilde_in_project_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            project_dir: PathBuf::from("~/project"),
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.project_dir.starts_with(&home));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.package.is_none());
        assert!(raw.lint.tools.is_none());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
