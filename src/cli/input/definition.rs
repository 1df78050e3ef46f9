//! Option and argument declarations

use std::sync::OnceLock;

use regex::Regex;

/// How an option consumes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// Presence only (`--quiet`)
    Flag,
    /// Must be followed by a value (`--directory path`, `--directory=path`)
    Required,
    /// May carry a value, only through `=` or an attached short value
    Optional,
}

/// Bound value of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Text(Option<String>),
}

impl OptionValue {
    /// Whether the option counts as supplied: a set flag or a non-empty value.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Flag(set) => *set,
            OptionValue::Text(value) => value.as_deref().is_some_and(|v| !v.is_empty()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Flag(_) => None,
            OptionValue::Text(value) => value.as_deref(),
        }
    }
}

/// Split a packed shortcut declaration into its aliases.
///
/// `"-v|-vv|-vvv"` and `"v|vv|vvv"` both yield `["v", "vv", "vvv"]`; empty
/// fragments (`"-|"`) are dropped.
pub fn split_shortcuts(spec: &str) -> Vec<String> {
    static DELIMITER: OnceLock<Regex> = OnceLock::new();
    let delimiter = DELIMITER.get_or_init(|| Regex::new(r"\|-?").expect("valid shortcut delimiter"));

    delimiter
        .split(spec.trim_start_matches('-'))
        .map(|alias| alias.trim_start_matches('-'))
        .filter(|alias| !alias.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOption {
    name: String,
    shortcut: Option<String>,
    mode: ValueMode,
    description: String,
    default: OptionValue,
}

impl InputOption {
    /// `name` may be given with or without its leading `--`.
    pub fn new(name: &str, shortcut: Option<&str>, mode: ValueMode, description: &str) -> Self {
        let default = match mode {
            ValueMode::Flag => OptionValue::Flag(false),
            ValueMode::Required | ValueMode::Optional => OptionValue::Text(None),
        };
        Self {
            name: name.trim_start_matches('-').to_string(),
            shortcut: shortcut.map(str::to_string).filter(|s| !s.is_empty()),
            mode,
            description: description.to_string(),
            default,
        }
    }

    pub fn flag(name: &str, shortcut: Option<&str>, description: &str) -> Self {
        Self::new(name, shortcut, ValueMode::Flag, description)
    }

    pub fn with_default(mut self, value: &str) -> Self {
        if self.mode != ValueMode::Flag {
            self.default = OptionValue::Text(Some(value.to_string()));
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw shortcut declaration, possibly packing several aliases.
    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    pub fn shortcuts(&self) -> Vec<String> {
        self.shortcut.as_deref().map(split_shortcuts).unwrap_or_default()
    }

    pub fn mode(&self) -> ValueMode {
        self.mode
    }

    pub fn is_flag(&self) -> bool {
        self.mode == ValueMode::Flag
    }

    pub fn accepts_value(&self) -> bool {
        self.mode != ValueMode::Flag
    }

    pub fn requires_value(&self) -> bool {
        self.mode == ValueMode::Required
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputArgument {
    name: String,
    required: bool,
    list: bool,
    description: String,
}

impl InputArgument {
    pub fn new(name: &str, required: bool, list: bool, description: &str) -> Self {
        Self {
            name: name.to_string(),
            required,
            list,
            description: description.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// A list argument absorbs every remaining positional token.
    pub fn is_list(&self) -> bool {
        self.list
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Ordered options and arguments a command (or the shell) accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputDefinition {
    options: Vec<InputOption>,
    arguments: Vec<InputArgument>,
}

impl InputDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, replacing one with the same name.
    pub fn add_option(&mut self, option: InputOption) -> &mut Self {
        match self.options.iter_mut().find(|o| o.name == option.name) {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
        self
    }

    pub fn add_argument(&mut self, argument: InputArgument) -> &mut Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_option(mut self, option: InputOption) -> Self {
        self.add_option(option);
        self
    }

    pub fn with_argument(mut self, argument: InputArgument) -> Self {
        self.add_argument(argument);
        self
    }

    pub fn options(&self) -> &[InputOption] {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&InputOption> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    /// Option declaring `alias` among its shortcuts.
    pub fn option_for_shortcut(&self, alias: &str) -> Option<&InputOption> {
        self.options
            .iter()
            .find(|o| o.shortcuts().iter().any(|s| s == alias))
    }

    pub fn has_shortcut(&self, alias: &str) -> bool {
        self.option_for_shortcut(alias).is_some()
    }

    pub fn arguments(&self) -> &[InputArgument] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&InputArgument> {
        self.arguments.get(index)
    }

    pub fn argument_named(&self, name: &str) -> Option<&InputArgument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn last_argument(&self) -> Option<&InputArgument> {
        self.arguments.last()
    }

    pub fn argument_names(&self) -> Vec<String> {
        self.arguments.iter().map(|a| a.name.clone()).collect()
    }

    /// `self` (the shell's definition) followed by a command's own declarations.
    ///
    /// Shell arguments come first so the command name binds before the
    /// command's arguments; command options never shadow shell options.
    pub fn merged(&self, command: &InputDefinition) -> InputDefinition {
        let mut merged = self.clone();
        for option in &command.options {
            if !merged.has_option(&option.name) {
                merged.options.push(option.clone());
            }
        }
        merged.arguments.extend(command.arguments.iter().cloned());
        merged
    }
}
