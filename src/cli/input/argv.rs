//! Argument-vector input and binding
//!
//! An [`ArgvInput`] holds the raw tokens and the values produced by the last
//! bind against an [`InputDefinition`]. Two modes exist:
//!
//! - standard: options may appear anywhere before `--`
//! - pass-through: only declared parameter options placed before the
//!   pass-through command token are parsed; every token after it is kept
//!   verbatim for the forwarded process

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::cli::input::definition::{InputDefinition, OptionValue, ValueMode};

/// Errors raised while binding tokens against a definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputBindError {
    #[error("the option \"{0}\" does not exist")]
    UnknownOption(String),

    #[error("the option \"--{0}\" does not accept a value")]
    UnexpectedValue(String),

    #[error("the option \"--{0}\" requires a value")]
    MissingValue(String),

    #[error("{}", too_many_arguments(.token, .expected))]
    TooManyArguments { token: String, expected: Vec<String> },

    #[error("not enough arguments (missing: \"{}\")", .0.join(", "))]
    NotEnoughArguments(Vec<String>),
}

fn too_many_arguments(token: &str, expected: &[String]) -> String {
    if expected.is_empty() {
        format!("no arguments expected, got \"{token}\"")
    } else {
        format!(
            "too many arguments at \"{token}\", expected arguments \"{}\"",
            expected.join("\", \"")
        )
    }
}

/// Bound value of a positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    Single(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PassThrough {
    /// Index (into `tokens`) of the pass-through command name
    command_index: usize,
    /// Options recognized before the command name, e.g. `--verbose`, `-v`
    parameter_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgvInput {
    script_name: Option<String>,
    tokens: Vec<String>,
    definition: InputDefinition,
    options: BTreeMap<String, OptionValue>,
    arguments: BTreeMap<String, ArgumentValue>,
    positional_count: usize,
    /// Positional tokens the definition has no slot for (lenient binds only)
    extra: Vec<String>,
    /// Options set before the first positional token, in parse order
    leading: Vec<String>,
    command_index: Option<usize>,
    pass_through: Option<PassThrough>,
    /// Values from `set_option`, re-applied after every bind
    pinned: BTreeMap<String, OptionValue>,
}

impl ArgvInput {
    /// Input from a full argument vector; the first element is the program name.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let script_name = argv.next();
        let mut input = Self::from_tokens(argv.collect());
        input.script_name = script_name;
        input
    }

    /// Input from tokens only (no program name).
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            script_name: None,
            tokens,
            definition: InputDefinition::default(),
            options: BTreeMap::new(),
            arguments: BTreeMap::new(),
            positional_count: 0,
            extra: Vec::new(),
            leading: Vec::new(),
            command_index: None,
            pass_through: None,
            pinned: BTreeMap::new(),
        }
    }

    /// Pass-through input over the full argument vector.
    ///
    /// `command_index` is the position (in tokens, program name excluded) of
    /// the pass-through command name.
    pub fn pass_through<I, S>(argv: I, command_index: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut input = Self::new(argv);
        input.pass_through = Some(PassThrough {
            command_index,
            parameter_options: Vec::new(),
        });
        input
    }

    pub fn script_name(&self) -> Option<&str> {
        self.script_name.as_deref()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn definition(&self) -> &InputDefinition {
        &self.definition
    }

    pub fn is_pass_through(&self) -> bool {
        self.pass_through.is_some()
    }

    /// Declare `name` (`--long` or `-x`) as recognized before the pass-through
    /// command. No effect on standard inputs.
    pub fn add_parameter_option(&mut self, name: impl Into<String>) {
        if let Some(pt) = &mut self.pass_through {
            let name = name.into();
            if !pt.parameter_options.contains(&name) {
                pt.parameter_options.push(name);
            }
        }
    }

    /// Join `count` tokens starting at `index` into one, so a namespaced
    /// command name (`env info`) binds as a single argument.
    pub fn join_command_words(&mut self, index: usize, count: usize) {
        if count < 2 || index + count > self.tokens.len() || self.pass_through.is_some() {
            return;
        }
        let joined = self.tokens[index..index + count].join(" ");
        self.tokens.splice(index..index + count, std::iter::once(joined));
        self.command_index = None;
    }

    pub fn parameter_options(&self) -> &[String] {
        self.pass_through
            .as_ref()
            .map(|pt| pt.parameter_options.as_slice())
            .unwrap_or_default()
    }

    /// Token range the shell may interpret: all tokens, or only those before
    /// the pass-through command.
    fn shell_tokens(&self) -> &[String] {
        match &self.pass_through {
            Some(pt) => &self.tokens[..pt.command_index.min(self.tokens.len())],
            None => &self.tokens,
        }
    }

    /// The command name: the first positional token.
    pub fn first_argument(&self) -> Option<&str> {
        if let Some(pt) = &self.pass_through {
            return self.tokens.get(pt.command_index).map(String::as_str);
        }
        if let Some(index) = self.command_index {
            return self.tokens.get(index).map(String::as_str);
        }
        let mut after_separator = false;
        for token in &self.tokens {
            if !after_separator && token == "--" {
                after_separator = true;
            } else if after_separator || !token.starts_with('-') || token == "-" {
                return Some(token);
            }
        }
        None
    }

    /// Position of the command name in `tokens`, once bound.
    pub fn command_index(&self) -> Option<usize> {
        match &self.pass_through {
            Some(pt) => Some(pt.command_index),
            None => self.command_index,
        }
    }

    /// Whether any raw token matches one of `values`, without binding.
    ///
    /// Long names also match `--name=value`; short names match as a prefix so
    /// `-v` matches `-vv`. With `only_params`, scanning stops at `--`.
    pub fn has_parameter_option(&self, values: &[&str], only_params: bool) -> bool {
        for token in self.shell_tokens() {
            if only_params && token == "--" {
                return false;
            }
            for value in values {
                let leading = if value.starts_with("--") {
                    format!("{value}=")
                } else {
                    (*value).to_string()
                };
                if token == value || (!leading.is_empty() && token.starts_with(&leading)) {
                    return true;
                }
            }
        }
        false
    }

    /// Raw value of an option given as `--name value`, `--name=value` or `-xvalue`.
    pub fn parameter_option(&self, values: &[&str], only_params: bool) -> Option<String> {
        let tokens = self.shell_tokens();
        for (i, token) in tokens.iter().enumerate() {
            if only_params && token == "--" {
                return None;
            }
            for value in values {
                if token == value {
                    return tokens.get(i + 1).cloned();
                }
                let leading = if value.starts_with("--") {
                    format!("{value}=")
                } else {
                    (*value).to_string()
                };
                if !leading.is_empty() && token.starts_with(&leading) {
                    return Some(token[leading.len()..].to_string());
                }
            }
        }
        None
    }

    // ============================================================
    // Binding
    // ============================================================

    /// Strict bind: any malformed token fails the bind.
    ///
    /// State parsed before the failing token stays visible.
    pub fn bind(&mut self, definition: &InputDefinition) -> Result<(), InputBindError> {
        self.reset(definition);
        let result = if self.pass_through.is_some() {
            self.parse_pass_through(true)
        } else {
            self.parse_standard()
        };
        self.apply_pinned();
        result
    }

    /// Strict bind, falling back to a permissive parse on failure.
    ///
    /// The permissive parse extracts recognized options placed before the
    /// first positional token and keeps every other token as positional data
    /// in its original order. Returns the suppressed strict error, if any.
    pub fn bind_lenient(&mut self, definition: &InputDefinition) -> Option<InputBindError> {
        let err = self.bind(definition).err()?;
        debug!("lenient bind: {err}");
        self.reset(definition);
        if self.pass_through.is_some() {
            // errors before the command are the only ones possible here
            self.parse_pass_through(false).ok();
        } else {
            self.parse_permissive();
        }
        self.apply_pinned();
        Some(err)
    }

    /// Check that every required argument received a value.
    pub fn validate(&self) -> Result<(), InputBindError> {
        let missing: Vec<String> = self
            .definition
            .arguments()
            .iter()
            .filter(|a| a.is_required() && !self.arguments.contains_key(a.name()))
            .map(|a| a.name().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InputBindError::NotEnoughArguments(missing))
        }
    }

    fn reset(&mut self, definition: &InputDefinition) {
        self.definition = definition.clone();
        self.options.clear();
        self.arguments.clear();
        self.positional_count = 0;
        self.extra.clear();
        self.leading.clear();
        self.command_index = None;
    }

    fn apply_pinned(&mut self) {
        for (name, value) in &self.pinned {
            if self.definition.has_option(name) {
                self.options.insert(name.clone(), value.clone());
            }
        }
    }

    fn parse_standard(&mut self) -> Result<(), InputBindError> {
        let tokens = self.tokens.clone();
        let mut parse_options = true;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let next = tokens.get(i + 1).map(String::as_str);
            if parse_options && token == "--" {
                parse_options = false;
                i += 1;
            } else if parse_options && token.starts_with("--") {
                i += 1 + self.parse_long_option(token, next)?;
            } else if parse_options && token.starts_with('-') && token != "-" {
                i += 1 + self.parse_short_option(token, next)?;
            } else {
                self.parse_argument(i, token, false)?;
                i += 1;
            }
        }
        Ok(())
    }

    fn parse_permissive(&mut self) {
        let tokens = self.tokens.clone();
        let mut parse_options = true;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let next = tokens.get(i + 1).map(String::as_str);
            let before_command = self.command_index.is_none();
            if before_command && parse_options && token == "--" {
                parse_options = false;
                i += 1;
                continue;
            }
            if before_command && parse_options && token.starts_with('-') && token != "-" {
                let parsed = if token.starts_with("--") {
                    self.parse_long_option(token, next)
                } else {
                    self.parse_short_option(token, next)
                };
                match parsed {
                    Ok(consumed) => i += 1 + consumed,
                    Err(e) => {
                        debug!("permissive bind: skipping {token}: {e}");
                        i += 1;
                    }
                }
                continue;
            }
            // cannot fail when lenient
            self.parse_argument(i, token, true).ok();
            i += 1;
        }
    }

    fn parse_pass_through(&mut self, strict: bool) -> Result<(), InputBindError> {
        let Some(pt) = self.pass_through.clone() else {
            return Ok(());
        };
        let tokens = self.tokens.clone();
        let mut result = Ok(());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if i >= pt.command_index {
                self.parse_argument(i, token, true).ok();
                i += 1;
                continue;
            }
            let next = tokens.get(i + 1).map(String::as_str);
            let declared = pt.parameter_options.iter().any(|p| {
                token == p || (p.starts_with("--") && token.starts_with(&format!("{p}=")))
            });
            if !declared {
                debug!("pass-through bind: ignoring undeclared token {token}");
                i += 1;
                continue;
            }
            // a value token never reaches into the forwarded command line
            let next = next.filter(|_| i + 1 < pt.command_index);
            let parsed = if token.starts_with("--") {
                self.parse_long_option(token, next)
            } else {
                self.parse_short_option(token, next)
            };
            match parsed {
                Ok(consumed) => i += 1 + consumed,
                Err(e) if strict => {
                    if result.is_ok() {
                        result = Err(e);
                    }
                    i += 1;
                }
                Err(e) => {
                    debug!("pass-through bind: skipping {token}: {e}");
                    i += 1;
                }
            }
        }
        result
    }

    /// Returns how many following tokens were consumed as the value.
    fn parse_long_option(&mut self, token: &str, next: Option<&str>) -> Result<usize, InputBindError> {
        let body = &token[2..];
        match body.split_once('=') {
            Some((name, value)) => self.add_long_option(name, Some(value.to_string()), None),
            None => self.add_long_option(body, None, next),
        }
    }

    fn parse_short_option(&mut self, token: &str, next: Option<&str>) -> Result<usize, InputBindError> {
        let name = &token[1..];
        if self.definition.has_shortcut(name) {
            return self.add_short_option(name, None, next);
        }
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(InputBindError::UnknownOption(token.to_string()));
        };
        let rest = chars.as_str();
        let first = first.to_string();
        if rest.is_empty() {
            return self.add_short_option(&first, None, next);
        }
        let takes_value = self
            .definition
            .option_for_shortcut(&first)
            .is_some_and(|o| o.accepts_value());
        if takes_value {
            self.add_short_option(&first, Some(rest.to_string()), None)
        } else {
            self.parse_short_option_set(name, next)
        }
    }

    /// `-abc` as `-a -b -c`; a value-taking option swallows the remainder.
    fn parse_short_option_set(&mut self, name: &str, next: Option<&str>) -> Result<usize, InputBindError> {
        for (idx, c) in name.char_indices() {
            let alias = c.to_string();
            let option = self
                .definition
                .option_for_shortcut(&alias)
                .cloned()
                .ok_or_else(|| InputBindError::UnknownOption(format!("-{alias}")))?;
            if option.accepts_value() {
                let rest = &name[idx + c.len_utf8()..];
                return if rest.is_empty() {
                    self.add_long_option(option.name(), None, next)
                } else {
                    self.add_long_option(option.name(), Some(rest.to_string()), None)
                };
            }
            self.add_long_option(option.name(), None, None)?;
        }
        Ok(0)
    }

    fn add_short_option(
        &mut self,
        alias: &str,
        value: Option<String>,
        next: Option<&str>,
    ) -> Result<usize, InputBindError> {
        let name = self
            .definition
            .option_for_shortcut(alias)
            .map(|o| o.name().to_string())
            .ok_or_else(|| InputBindError::UnknownOption(format!("-{alias}")))?;
        self.add_long_option(&name, value, next)
    }

    fn add_long_option(
        &mut self,
        name: &str,
        value: Option<String>,
        next: Option<&str>,
    ) -> Result<usize, InputBindError> {
        let option = self
            .definition
            .option(name)
            .cloned()
            .ok_or_else(|| InputBindError::UnknownOption(format!("--{name}")))?;

        let (bound, consumed) = match option.mode() {
            ValueMode::Flag => {
                if value.is_some() {
                    return Err(InputBindError::UnexpectedValue(name.to_string()));
                }
                (OptionValue::Flag(true), 0)
            }
            ValueMode::Required => match (value, next) {
                (Some(v), _) => (OptionValue::Text(Some(v)), 0),
                (None, Some(n)) if !n.starts_with('-') => {
                    (OptionValue::Text(Some(n.to_string())), 1)
                }
                _ => return Err(InputBindError::MissingValue(name.to_string())),
            },
            ValueMode::Optional => (OptionValue::Text(value), 0),
        };

        if self.command_index.is_none() && !self.leading.iter().any(|n| n == name) {
            self.leading.push(name.to_string());
        }
        self.options.insert(name.to_string(), bound);
        Ok(consumed)
    }

    fn parse_argument(&mut self, index: usize, token: &str, lenient: bool) -> Result<(), InputBindError> {
        if self.command_index.is_none() {
            self.command_index = Some(index);
        }
        let count = self.positional_count;
        if let Some(argument) = self.definition.argument(count).cloned() {
            let value = if argument.is_list() {
                ArgumentValue::List(vec![token.to_string()])
            } else {
                ArgumentValue::Single(token.to_string())
            };
            self.arguments.insert(argument.name().to_string(), value);
            self.positional_count += 1;
            return Ok(());
        }
        let last_list = self
            .definition
            .last_argument()
            .filter(|a| a.is_list())
            .map(|a| a.name().to_string());
        if let Some(name) = last_list {
            if let Some(ArgumentValue::List(values)) = self.arguments.get_mut(&name) {
                values.push(token.to_string());
                return Ok(());
            }
        }
        if lenient {
            self.extra.push(token.to_string());
            return Ok(());
        }
        Err(InputBindError::TooManyArguments {
            token: token.to_string(),
            expected: self.definition.argument_names(),
        })
    }

    // ============================================================
    // Bound values
    // ============================================================

    /// Every option of the bound definition, in declaration order, with its
    /// bound value or default.
    pub fn options(&self) -> Vec<(String, OptionValue)> {
        self.definition
            .options()
            .iter()
            .map(|o| {
                let value = self
                    .options
                    .get(o.name())
                    .cloned()
                    .unwrap_or_else(|| o.default_value().clone());
                (o.name().to_string(), value)
            })
            .collect()
    }

    pub fn option(&self, name: &str) -> Result<OptionValue, InputBindError> {
        let declared = self
            .definition
            .option(name)
            .ok_or_else(|| InputBindError::UnknownOption(format!("--{name}")))?;
        Ok(self
            .options
            .get(name)
            .cloned()
            .unwrap_or_else(|| declared.default_value().clone()))
    }

    /// Whether `name` is bound truthy; unknown options are false.
    pub fn flag(&self, name: &str) -> bool {
        self.option(name).map(|v| v.is_truthy()).unwrap_or(false)
    }

    /// Options that were set before the command name, with their values.
    pub fn leading_options(&self) -> Vec<(String, OptionValue)> {
        self.leading
            .iter()
            .filter_map(|name| self.options.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }

    /// Set an option on the bound definition; the value survives later binds.
    pub fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), InputBindError> {
        if !self.definition.has_option(name) {
            return Err(InputBindError::UnknownOption(format!("--{name}")));
        }
        self.options.insert(name.to_string(), value.clone());
        self.pinned.insert(name.to_string(), value);
        Ok(())
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        match self.arguments.get(name)? {
            ArgumentValue::Single(v) => Some(v),
            ArgumentValue::List(values) => values.first().map(String::as_str),
        }
    }

    pub fn argument_list(&self, name: &str) -> Vec<String> {
        match self.arguments.get(name) {
            Some(ArgumentValue::Single(v)) => vec![v.clone()],
            Some(ArgumentValue::List(values)) => values.clone(),
            None => Vec::new(),
        }
    }

    /// Positional tokens that had no argument slot.
    pub fn extra_arguments(&self) -> &[String] {
        &self.extra
    }

    /// Tokens after the pass-through command name, verbatim.
    pub fn forwarded_args(&self) -> &[String] {
        match &self.pass_through {
            Some(pt) if pt.command_index < self.tokens.len() => &self.tokens[pt.command_index + 1..],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::input::definition::{InputArgument, InputOption};

    fn definition() -> InputDefinition {
        InputDefinition::new()
            .with_argument(InputArgument::new("command", true, false, ""))
            .with_option(InputOption::flag("verbose", Some("v|vv|vvv"), ""))
            .with_option(InputOption::flag("quiet", Some("q"), ""))
            .with_option(InputOption::new("directory", Some("C"), ValueMode::Required, ""))
    }

    #[test]
    fn given_long_and_short_flags_when_bind_then_options_set() {
        let mut input = ArgvInput::new(["prog", "-q", "--verbose", "install"]);

        input.bind(&definition()).unwrap();

        assert!(input.flag("quiet"));
        assert!(input.flag("verbose"));
        assert_eq!(input.argument("command"), Some("install"));
    }

    #[test]
    fn given_required_value_forms_when_bind_then_value_bound() {
        for argv in [
            vec!["prog", "--directory", "/tmp", "x"],
            vec!["prog", "--directory=/tmp", "x"],
            vec!["prog", "-C/tmp", "x"],
            vec!["prog", "-C", "/tmp", "x"],
        ] {
            let mut input = ArgvInput::new(argv.clone());
            input.bind(&definition()).unwrap();
            assert_eq!(
                input.option("directory").unwrap().as_str(),
                Some("/tmp"),
                "{argv:?}"
            );
            assert_eq!(input.argument("command"), Some("x"));
        }
    }

    #[test]
    fn given_packed_short_flags_when_bind_then_each_set() {
        let mut input = ArgvInput::new(["prog", "-vq", "list"]);
        input.bind(&definition()).unwrap();
        assert!(input.flag("verbose"));
        assert!(input.flag("quiet"));
    }

    #[test]
    fn given_unknown_option_when_bind_then_error() {
        let mut input = ArgvInput::new(["prog", "--bogus"]);
        let err = input.bind(&definition()).unwrap_err();
        assert_eq!(err, InputBindError::UnknownOption("--bogus".into()));
    }

    #[test]
    fn given_flag_with_value_when_bind_then_unexpected_value() {
        let mut input = ArgvInput::new(["prog", "--quiet=yes"]);
        let err = input.bind(&definition()).unwrap_err();
        assert_eq!(err, InputBindError::UnexpectedValue("quiet".into()));
    }

    #[test]
    fn given_missing_required_value_when_bind_then_missing_value() {
        let mut input = ArgvInput::new(["prog", "--directory", "-q"]);
        let err = input.bind(&definition()).unwrap_err();
        assert_eq!(err, InputBindError::MissingValue("directory".into()));
    }

    #[test]
    fn given_extra_positional_when_bind_then_too_many_arguments() {
        let mut input = ArgvInput::new(["prog", "run", "foo"]);
        let err = input.bind(&definition()).unwrap_err();
        assert!(matches!(err, InputBindError::TooManyArguments { ref token, .. } if token == "foo"));
        // state before the failing token stays bound
        assert_eq!(input.argument("command"), Some("run"));
    }

    #[test]
    fn given_double_dash_when_bind_then_rest_is_positional() {
        let def = InputDefinition::new()
            .with_argument(InputArgument::new("args", false, true, ""))
            .with_option(InputOption::flag("quiet", Some("q"), ""));
        let mut input = ArgvInput::new(["prog", "a", "--", "-q", "--x"]);

        input.bind(&def).unwrap();

        assert!(!input.flag("quiet"));
        assert_eq!(input.argument_list("args"), vec!["a", "-q", "--x"]);
    }

    #[test]
    fn given_trailing_tokens_when_bind_lenient_then_options_after_command_ignored() {
        let mut input = ArgvInput::new(["prog", "-q", "run", "foo", "-v"]);

        let suppressed = input.bind_lenient(&definition());

        assert!(suppressed.is_some());
        assert!(input.flag("quiet"));
        assert!(!input.flag("verbose"));
        assert_eq!(input.first_argument(), Some("run"));
        assert_eq!(input.extra_arguments(), ["foo", "-v"]);
    }

    #[test]
    fn given_unknown_option_before_command_when_bind_lenient_then_skipped() {
        let mut input = ArgvInput::new(["prog", "--bogus", "-q", "install"]);

        input.bind_lenient(&definition());

        assert!(input.flag("quiet"));
        assert_eq!(input.first_argument(), Some("install"));
    }

    #[test]
    fn given_unbound_input_when_first_argument_then_skips_options() {
        let input = ArgvInput::new(["prog", "-q", "--no-plugins", "env", "info"]);
        assert_eq!(input.first_argument(), Some("env"));

        let input = ArgvInput::new(["prog", "-q", "--", "-x"]);
        assert_eq!(input.first_argument(), Some("-x"));

        let input = ArgvInput::new(["prog", "--", "--"]);
        assert_eq!(input.first_argument(), Some("--"));

        let input = ArgvInput::new(["prog", "-q", "-"]);
        assert_eq!(input.first_argument(), Some("-"));

        let input = ArgvInput::new(["prog", "-q", "--"]);
        assert_eq!(input.first_argument(), None);
    }

    #[test]
    fn given_raw_tokens_when_has_parameter_option_then_matches_without_binding() {
        let input = ArgvInput::new(["prog", "--no-plugins", "-vv", "install"]);

        assert!(input.has_parameter_option(&["--no-plugins"], true));
        assert!(input.has_parameter_option(&["-v"], false));
        assert!(!input.has_parameter_option(&["--quiet", "-q"], true));
    }

    #[test]
    fn given_separator_when_has_parameter_option_only_params_then_stops() {
        let input = ArgvInput::new(["prog", "x", "--", "--no-plugins"]);
        assert!(!input.has_parameter_option(&["--no-plugins"], true));
        assert!(input.has_parameter_option(&["--no-plugins"], false));
    }

    #[test]
    fn given_value_forms_when_parameter_option_then_returns_raw_value() {
        let input = ArgvInput::new(["prog", "--directory=/a", "x"]);
        assert_eq!(input.parameter_option(&["--directory"], true), Some("/a".into()));

        let input = ArgvInput::new(["prog", "-C", "/b", "x"]);
        assert_eq!(input.parameter_option(&["--directory", "-C"], true), Some("/b".into()));
    }

    #[test]
    fn given_set_option_when_rebinding_then_value_survives() {
        let mut input = ArgvInput::new(["prog", "install"]);
        input.bind(&definition()).unwrap();

        input.set_option("quiet", OptionValue::Flag(true)).unwrap();
        input.bind(&definition()).unwrap();

        assert!(input.flag("quiet"));
    }

    #[test]
    fn given_missing_required_argument_when_validate_then_not_enough_arguments() {
        let mut input = ArgvInput::new(["prog", "-q"]);
        input.bind(&definition()).unwrap();

        let err = input.validate().unwrap_err();

        assert_eq!(err, InputBindError::NotEnoughArguments(vec!["command".into()]));
    }

    #[test]
    fn given_options_after_command_when_leading_options_then_excluded() {
        let mut input = ArgvInput::new(["prog", "-q", "install", "-v"]);
        input.bind(&definition()).unwrap();

        let names: Vec<String> = input.leading_options().into_iter().map(|(n, _)| n).collect();

        assert_eq!(names, vec!["quiet"]);
        assert!(input.flag("verbose"));
    }
}
