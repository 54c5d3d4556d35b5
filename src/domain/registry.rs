//! Target registry: the ordered, immutable set of invocable targets

use std::collections::HashSet;

use itertools::Itertools;

use crate::domain::{Action, DomainError, Target};

/// Minimum column at which help descriptions start.
pub const HELP_NAME_WIDTH: usize = 30;

/// Ordered list of targets, validated once at construction.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    /// Build a registry, rejecting empty or duplicate names.
    pub fn new(targets: Vec<Target>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for target in &targets {
            if target.name.is_empty() {
                return Err(DomainError::EmptyTargetName);
            }
            if !seen.insert(target.name.as_str()) {
                return Err(DomainError::DuplicateTarget(target.name.clone()));
            }
        }
        Ok(Self { targets })
    }

    /// The built-in targets.
    pub fn standard() -> Self {
        Self {
            targets: vec![
                Target::new("help", "Show this help", Action::Help),
                Target::new(
                    "lint",
                    "Sort imports, format, lint and type-check the package",
                    Action::Lint,
                ),
                Target::new(
                    "publish",
                    "Build the package and upload it to the package index",
                    Action::Publish,
                ),
                Target::new(
                    "imports",
                    "Statically list the imports of Python files",
                    Action::Imports,
                ),
                Target::new("config", "Show the effective configuration", Action::Config),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Targets in registration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Target names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).sorted().collect()
    }

    /// `<name><padding><description>` per target, sorted by name.
    pub fn help_lines(&self) -> Vec<(String, String)> {
        let width = self
            .targets
            .iter()
            .map(|t| t.name.len() + 1)
            .max()
            .unwrap_or(0)
            .max(HELP_NAME_WIDTH);

        self.targets
            .iter()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .map(|t| (format!("{:<width$}", t.name), t.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_standard_registry_when_help_then_sorted_and_complete() {
        let registry = TargetRegistry::standard();
        let lines = registry.help_lines();

        let names: Vec<_> = lines.iter().map(|(n, _)| n.trim_end().to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), registry.targets().len());
        for target in registry.targets() {
            assert_eq!(names.iter().filter(|n| **n == target.name).count(), 1);
        }
    }

    #[test]
    fn given_short_names_when_help_then_padded_to_min_width() {
        let registry = TargetRegistry::standard();
        for (name, _) in registry.help_lines() {
            assert_eq!(name.len(), HELP_NAME_WIDTH);
        }
    }

    #[test]
    fn given_long_name_when_help_then_still_separated() {
        let long = "a".repeat(HELP_NAME_WIDTH + 5);
        let registry = TargetRegistry::new(vec![
            Target::new(long.clone(), "long one", Action::Help),
            Target::new("b", "short one", Action::Lint),
        ])
        .unwrap();

        let lines = registry.help_lines();
        assert_eq!(lines[0].0, format!("{long} "));
        assert_eq!(lines[1].0.len(), long.len() + 1);
    }

    #[test]
    fn given_duplicate_names_when_new_then_rejected() {
        let result = TargetRegistry::new(vec![
            Target::new("lint", "one", Action::Lint),
            Target::new("lint", "two", Action::Lint),
        ]);
        assert_eq!(
            result.unwrap_err(),
            DomainError::DuplicateTarget("lint".into())
        );
    }

    #[test]
    fn given_empty_name_when_new_then_rejected() {
        let result = TargetRegistry::new(vec![Target::new("", "nameless", Action::Help)]);
        assert_eq!(result.unwrap_err(), DomainError::EmptyTargetName);
    }

    #[test]
    fn given_registry_when_get_then_resolves_by_exact_name() {
        let registry = TargetRegistry::standard();
        assert_eq!(registry.get("lint").map(|t| t.action), Some(Action::Lint));
        assert!(registry.get("foo").is_none());
        assert!(registry.get("Lint").is_none());
    }
}
