//! Input rebinding for the pass-through command
//!
//! `quill -v run pytest -x` must leave `-x` to pytest while still reporting
//! `-v` to the shell. The original input is bound leniently against the
//! global definition, the options supplied before `run` are snapshotted, and
//! a pass-through input is built that recognizes only those options.

use tracing::debug;

use crate::cli::input::argv::ArgvInput;
use crate::cli::input::definition::{InputDefinition, OptionValue};

/// A global option the caller supplied before the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppliedOption {
    pub name: String,
    pub shortcuts: Vec<String>,
    pub value: OptionValue,
}

impl SuppliedOption {
    /// `--name` followed by `-alias` for every shortcut alias.
    pub fn parameter_forms(&self) -> Vec<String> {
        std::iter::once(format!("--{}", self.name))
            .chain(self.shortcuts.iter().map(|s| format!("-{s}")))
            .collect()
    }
}

/// Global options the original input actually received, in parse order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptionSnapshot {
    options: Vec<SuppliedOption>,
}

impl GlobalOptionSnapshot {
    /// Capture truthy options bound before the command token of `input`.
    pub fn capture(input: &ArgvInput) -> Self {
        let definition = input.definition();
        let options = input
            .leading_options()
            .into_iter()
            .filter(|(_, value)| value.is_truthy())
            .filter_map(|(name, value)| {
                let declared = definition.option(&name)?;
                Some(SuppliedOption {
                    shortcuts: declared.shortcuts(),
                    name,
                    value,
                })
            })
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &[SuppliedOption] {
        &self.options
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Rebuild `input` for the pass-through command `command_name`.
///
/// Returns `None` when `input` does not invoke that command. The returned
/// input holds the original tokens verbatim; only the snapshotted options are
/// recognized, and only before the command token.
pub fn rebind(
    input: &ArgvInput,
    definition: &InputDefinition,
    command_name: &str,
) -> Option<ArgvInput> {
    let mut original = input.clone();
    if let Some(err) = original.bind_lenient(definition) {
        debug!("rebind: original input: {err}");
    }
    if original.first_argument() != Some(command_name) {
        return None;
    }
    let command_index = original.command_index()?;
    let snapshot = GlobalOptionSnapshot::capture(&original);

    let program = original.script_name().unwrap_or_default().to_string();
    let argv = std::iter::once(program).chain(original.tokens().iter().cloned());
    let mut rebuilt = ArgvInput::pass_through(argv, command_index);

    for option in snapshot.options() {
        for form in option.parameter_forms() {
            rebuilt.add_parameter_option(form);
        }
    }
    if let Some(err) = rebuilt.bind_lenient(definition) {
        debug!("rebind: rebuilt input: {err}");
    }
    for option in snapshot.options() {
        // declared on `definition`, so this cannot fail
        rebuilt.set_option(&option.name, option.value.clone()).ok();
    }

    debug!(
        "rebound {command_name} with {} global option(s), forwarding {:?}",
        snapshot.options().len(),
        rebuilt.forwarded_args()
    );
    Some(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::input::definition::{InputArgument, InputOption, ValueMode};

    fn global() -> InputDefinition {
        InputDefinition::new()
            .with_argument(InputArgument::new("command", true, false, ""))
            .with_option(InputOption::flag("verbose", Some("-v|-vv|-vvv"), ""))
            .with_option(InputOption::flag("quiet", Some("q"), ""))
            .with_option(InputOption::new("directory", Some("C"), ValueMode::Required, ""))
    }

    #[test]
    fn given_other_command_when_rebind_then_none() {
        let input = ArgvInput::new(["quill", "-v", "install"]);
        assert!(rebind(&input, &global(), "run").is_none());
    }

    #[test]
    fn given_option_after_run_when_rebind_then_not_snapshotted() {
        let input = ArgvInput::new(["quill", "run", "pytest", "-q"]);

        let rebuilt = rebind(&input, &global(), "run").unwrap();

        assert!(!rebuilt.flag("quiet"));
        assert_eq!(rebuilt.forwarded_args(), ["pytest", "-q"]);
    }

    #[test]
    fn given_value_option_before_run_when_rebind_then_value_kept() {
        let input = ArgvInput::new(["quill", "-C", "/srv/app", "run", "python", "-C", "x"]);

        let rebuilt = rebind(&input, &global(), "run").unwrap();

        assert_eq!(rebuilt.option("directory").unwrap().as_str(), Some("/srv/app"));
        assert_eq!(rebuilt.forwarded_args(), ["python", "-C", "x"]);
        assert_eq!(rebuilt.command_index(), Some(2));
    }

    #[test]
    fn given_supplied_shortcut_when_snapshot_then_every_alias_declared() {
        let input = ArgvInput::new(["quill", "-vv", "run", "ls"]);

        let rebuilt = rebind(&input, &global(), "run").unwrap();

        assert_eq!(
            rebuilt.parameter_options(),
            ["--verbose", "-v", "-vv", "-vvv"]
        );
        assert!(rebuilt.flag("verbose"));
    }

    #[test]
    fn given_tokens_without_program_name_when_rebind_then_tokens_kept() {
        let input = ArgvInput::from_tokens(vec!["-q".into(), "run".into(), "ls".into()]);

        let rebuilt = rebind(&input, &global(), "run").unwrap();

        assert_eq!(rebuilt.tokens(), ["-q", "run", "ls"]);
        assert!(rebuilt.flag("quiet"));
    }
}
