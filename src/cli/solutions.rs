//! Remediation hints rendered under errors
//!
//! The repository is only built when an error is rendered.

use itertools::Itertools;

use crate::application::project::{LOCK_FILE, PROJECT_FILE};
use crate::application::ApplicationError;
use crate::cli::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub title: String,
    pub description: String,
    pub links: Vec<String>,
}

pub trait SolutionProvider: Send + Sync {
    fn solutions(&self, error: &CliError) -> Vec<Solution>;
}

/// Suggests registered names close to an unknown command.
pub struct UnknownCommandSolutionProvider {
    names: Vec<String>,
}

impl UnknownCommandSolutionProvider {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl SolutionProvider for UnknownCommandSolutionProvider {
    fn solutions(&self, error: &CliError) -> Vec<Solution> {
        let CliError::UnknownCommand { name } = error.root() else {
            return Vec::new();
        };
        let suggestions = suggest(name, &self.names);
        if suggestions.is_empty() {
            return Vec::new();
        }
        vec![Solution {
            title: "Did you mean one of these?".to_string(),
            description: suggestions.join("\n"),
            links: Vec::new(),
        }]
    }
}

pub struct MissingProjectSolutionProvider;

impl SolutionProvider for MissingProjectSolutionProvider {
    fn solutions(&self, error: &CliError) -> Vec<Solution> {
        match error.application_error() {
            Some(ApplicationError::ProjectNotFound(dir)) => vec![Solution {
                title: format!("Create a {PROJECT_FILE}"),
                description: format!(
                    "Run the command from a project directory, or add {PROJECT_FILE} with a [package] table (name, version) to {}.",
                    dir.display()
                ),
                links: Vec::new(),
            }],
            _ => Vec::new(),
        }
    }
}

pub struct MissingLockSolutionProvider;

impl SolutionProvider for MissingLockSolutionProvider {
    fn solutions(&self, error: &CliError) -> Vec<Solution> {
        match error.application_error() {
            Some(ApplicationError::LockFileMissing(path)) => vec![Solution {
                title: format!("Lock the project first: {} is required", LOCK_FILE),
                description: format!(
                    "Generate {} from {PROJECT_FILE} with your resolver, then run install again.",
                    path.display()
                ),
                links: Vec::new(),
            }],
            _ => Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct SolutionProviderRepository {
    providers: Vec<Box<dyn SolutionProvider>>,
}

impl SolutionProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository with the built-in providers.
    pub fn with_defaults(command_names: Vec<String>) -> Self {
        let mut repository = Self::new();
        repository.register(Box::new(UnknownCommandSolutionProvider::new(command_names)));
        repository.register(Box::new(MissingProjectSolutionProvider));
        repository.register(Box::new(MissingLockSolutionProvider));
        repository
    }

    pub fn register(&mut self, provider: Box<dyn SolutionProvider>) {
        self.providers.push(provider);
    }

    pub fn solutions_for(&self, error: &CliError) -> Vec<Solution> {
        self.providers
            .iter()
            .flat_map(|p| p.solutions(error))
            .collect()
    }
}

/// Candidates close to `name`: namespace members first, then by edit distance.
pub fn suggest(name: &str, candidates: &[String]) -> Vec<String> {
    let threshold = (name.chars().count() / 3).max(1);
    let namespace_prefix = format!("{name} ");
    candidates
        .iter()
        .filter_map(|candidate| {
            if candidate.starts_with(&namespace_prefix) {
                return Some((0, candidate));
            }
            let distance = levenshtein(name, candidate);
            (distance <= threshold).then_some((distance, candidate))
        })
        .sorted()
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}
