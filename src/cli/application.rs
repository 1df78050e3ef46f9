//! The application shell
//!
//! One run walks `Idle -> PluginsLoading -> PluginsLoaded -> IoConfigured ->
//! Dispatching -> Succeeded | Failed`:
//! 1. `--no-plugins` is read from the shell's own tokens (never from tokens
//!    forwarded by a pass-through command); plugins load on the first run only
//! 2. the input is bound to the global definition, or rebuilt when it invokes
//!    a pass-through command; verbosity, decoration and interactivity are
//!    applied to the run's `Io`
//! 3. the command is resolved, bound, configured by the listeners and executed
//! 4. errors are rendered with solutions; the solution repository is built on
//!    the first failure only

use std::error::Error as _;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::cli::args::{global_definition, DEFAULT_COMMAND};
use crate::cli::commands::{Command, CommandContext};
use crate::cli::context::{ProjectContext, ShellContext};
use crate::cli::events::{CommandEvent, CommandListener, EventDispatcher};
use crate::cli::input::{rebind, ArgvInput, InputDefinition};
use crate::cli::listeners::{EnvironmentListener, InstallerListener, LoggerListener};
use crate::cli::loader::CommandLoader;
use crate::cli::logging::LogRouter;
use crate::cli::output;
use crate::cli::plugins::{
    ExecutablePluginDiscovery, PluginActivationState, PluginDiscovery, PLUGIN_NAMESPACE,
};
use crate::cli::solutions::SolutionProviderRepository;
use crate::cli::{CliError, CliResult};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::io::{Io, Verbosity};

/// Stage of the current (or last) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    PluginsLoading,
    PluginsLoaded,
    IoConfigured,
    Dispatching,
    Succeeded,
    Failed,
}

pub struct Application {
    shell: ShellContext,
    loader: CommandLoader,
    dispatcher: EventDispatcher,
    definition: InputDefinition,
    base_io: Io,
    io: Io,
    plugins: PluginActivationState,
    discovery: Arc<dyn PluginDiscovery>,
    log_router: LogRouter,
    solutions: Option<SolutionProviderRepository>,
    state: RunState,
}

impl Application {
    /// Shell with the built-in commands and listeners, writing to stdio.
    pub fn new(services: ServiceContainer, project: ProjectContext) -> Self {
        let log_router = LogRouter::new();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_listener(Box::new(LoggerListener::new(log_router.clone())));
        dispatcher.add_listener(Box::new(EnvironmentListener::new(Arc::clone(
            &services.env_manager,
        ))));
        dispatcher.add_listener(Box::new(InstallerListener::new(Arc::clone(
            &services.installer_factory,
        ))));
        let discovery = Arc::new(ExecutablePluginDiscovery::new(
            services.settings.plugins.path.clone(),
        ));
        let io = Io::stdio();

        Self {
            shell: ShellContext::new(services, project),
            loader: CommandLoader::with_builtins(),
            dispatcher,
            definition: global_definition(),
            base_io: io.clone(),
            io,
            plugins: PluginActivationState::default(),
            discovery,
            log_router,
            solutions: None,
            state: RunState::Idle,
        }
    }

    pub fn with_io(mut self, io: Io) -> Self {
        self.base_io = io.clone();
        self.io = io;
        self
    }

    pub fn with_plugin_discovery(mut self, discovery: Arc<dyn PluginDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn command_loader(&self) -> &CommandLoader {
        &self.loader
    }

    pub fn command_loader_mut(&mut self) -> &mut CommandLoader {
        &mut self.loader
    }

    /// Append a listener after the built-in ones.
    pub fn add_listener(&mut self, listener: Box<dyn CommandListener>) {
        self.dispatcher.add_listener(listener);
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn definition(&self) -> &InputDefinition {
        &self.definition
    }

    /// Routing table fed by [`crate::cli::logging::IoLogLayer`].
    pub fn log_router(&self) -> &LogRouter {
        &self.log_router
    }

    /// `Io` of the current (or last) run.
    pub fn io(&self) -> &Io {
        &self.io
    }

    pub fn shell(&self) -> &ShellContext {
        &self.shell
    }

    pub fn plugin_state(&self) -> PluginActivationState {
        self.plugins
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn has_solution_repository(&self) -> bool {
        self.solutions.is_some()
    }

    /// Run with a full argument vector (program name first) and return the
    /// exit code.
    pub fn run<I, S>(&mut self, argv: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_input(ArgvInput::new(argv))
    }

    pub fn run_input(&mut self, input: ArgvInput) -> i32 {
        self.state = RunState::Idle;
        self.io = self.base_io.clone();
        self.log_router.clear();

        match self.do_run(input) {
            Ok(code) => {
                self.state = RunState::Succeeded;
                code
            }
            Err(e) => {
                self.state = RunState::Failed;
                self.render_error(&e);
                e.exit_code()
            }
        }
    }

    fn do_run(&mut self, input: ArgvInput) -> CliResult<i32> {
        let rebound = self.rebind_pass_through(&input);
        let disabled = rebound
            .as_ref()
            .unwrap_or(&input)
            .has_parameter_option(&["--no-plugins"], true)
            || !self.shell.settings().plugins.enabled;
        self.load_plugins(disabled)?;

        // plugins may have registered further pass-through commands
        let mut input = match rebound.or_else(|| self.rebind_pass_through(&input)) {
            Some(rebuilt) => rebuilt,
            None => {
                let mut input = input;
                if let Some(err) = input.bind_lenient(&self.definition) {
                    // full binding happens once the command is known
                    debug!("global bind: {err}");
                }
                input
            }
        };
        self.configure_io(&input);
        self.state = RunState::IoConfigured;

        if input.has_parameter_option(&["--version", "-V"], true) {
            self.io.write_line(&format!(
                "{} (version {})",
                output::info_text(self.io.output(), "Quill"),
                self.shell.version()
            ));
            return Ok(crate::exitcode::OK);
        }

        self.state = RunState::Dispatching;
        if input.command_index().is_none() {
            let argv = std::iter::once(input.script_name().unwrap_or_default().to_string())
                .chain(input.tokens().iter().cloned())
                .chain(std::iter::once(DEFAULT_COMMAND.to_string()));
            input = ArgvInput::new(argv);
            input.bind_lenient(&self.definition);
        }
        let name = self.command_name(&mut input)?;
        let mut command = self.loader.resolve(&name)?;
        let merged = self.definition.merged(&command.definition());

        if input.has_parameter_option(&["--help", "-h"], true) {
            self.render_help(command.as_ref(), &merged);
            return Ok(crate::exitcode::OK);
        }

        input.bind(&merged)?;
        input.validate()?;
        self.dispatch(command.as_mut(), &input)?;

        let ctx = CommandContext {
            io: &self.io,
            input: &input,
            shell: &self.shell,
            commands: &self.loader,
            global_definition: &self.definition,
        };
        command.execute(&ctx)
    }

    /// Run the pre-run listeners for `command`.
    pub fn dispatch(&self, command: &mut dyn Command, input: &ArgvInput) -> CliResult<()> {
        let mut event = CommandEvent {
            command,
            input,
            io: &self.io,
            shell: &self.shell,
        };
        self.dispatcher.dispatch(&mut event)
    }

    /// Pass-through input for `input` when it invokes a registered
    /// pass-through command.
    fn rebind_pass_through(&self, input: &ArgvInput) -> Option<ArgvInput> {
        let mut probe = input.clone();
        probe.bind_lenient(&self.definition);
        let name = probe
            .first_argument()
            .filter(|name| self.loader.is_pass_through(name))?
            .to_string();
        rebind::rebind(input, &self.definition, &name)
    }

    #[instrument(skip(self))]
    fn load_plugins(&mut self, disabled: bool) -> CliResult<()> {
        self.state = RunState::PluginsLoading;
        if self.plugins.begin(disabled) {
            let plugins = self.discovery.discover(PLUGIN_NAMESPACE)?;
            for plugin in plugins {
                info!("activating plugin {}", plugin.name());
                plugin.activate(self)?;
            }
        }
        self.state = RunState::PluginsLoaded;
        Ok(())
    }

    fn configure_io(&mut self, input: &ArgvInput) {
        let io = &mut self.io;
        if input.has_parameter_option(&["--ansi"], true) {
            io.set_decorated(true);
        } else if input.has_parameter_option(&["--no-ansi"], true) {
            io.set_decorated(false);
        }

        if input.has_parameter_option(&["--no-interaction", "-n"], true) {
            io.set_interactive(false);
        }

        let verbosity = if input.has_parameter_option(&["--quiet", "-q"], true) {
            Verbosity::Quiet
        } else if input.has_parameter_option(&["-vvv", "--verbose=3"], true) {
            Verbosity::Debug
        } else if input.has_parameter_option(&["-vv", "--verbose=2"], true) {
            Verbosity::VeryVerbose
        } else if input.has_parameter_option(&["-v", "--verbose"], true) {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        io.set_verbosity(verbosity);
        debug!("io configured: {verbosity:?}");
    }

    /// Registered name invoked by `input`, joining namespaced words.
    fn command_name(&self, input: &mut ArgvInput) -> CliResult<String> {
        let Some(index) = input.command_index() else {
            return Ok(DEFAULT_COMMAND.to_string());
        };
        if input.is_pass_through() {
            if let Some(name) = input.first_argument() {
                return Ok(name.to_string());
            }
        }
        let words: Vec<String> = input.tokens()[index..]
            .iter()
            .take_while(|t| !t.starts_with('-'))
            .cloned()
            .collect();
        let (name, count) =
            self.loader
                .find_name(&words)
                .ok_or_else(|| CliError::UnknownCommand {
                    name: words.first().cloned().unwrap_or_default(),
                })?;
        input.join_command_words(index, count);
        Ok(name)
    }

    fn render_help(&self, command: &dyn Command, definition: &InputDefinition) {
        let out = self.io.output();
        output::header(out, "Description:");
        out.write_line(&format!("  {}", command.description()));
        out.write_line("");

        output::header(out, "Usage:");
        let arguments: Vec<String> = definition
            .arguments()
            .iter()
            .skip(1)
            .map(|a| match (a.is_required(), a.is_list()) {
                (true, true) => format!("<{}>...", a.name()),
                (true, false) => format!("<{}>", a.name()),
                (false, true) => format!("[<{}>...]", a.name()),
                (false, false) => format!("[<{}>]", a.name()),
            })
            .collect();
        let usage = format!("  {} [options] {}", command.name(), arguments.join(" "));
        out.write_line(usage.trim_end());

        let own = command.definition();
        if !own.arguments().is_empty() {
            out.write_line("");
            output::header(out, "Arguments:");
            for argument in own.arguments() {
                let padded = format!("{:<24}", argument.name());
                out.write_line(&format!(
                    "  {} {}",
                    output::info_text(out, &padded),
                    argument.description()
                ));
            }
        }

        out.write_line("");
        output::header(out, "Options:");
        for option in definition.options() {
            let shortcut = option.shortcuts().first().map(|s| format!("-{s}, ")).unwrap_or_default();
            let padded = format!("{:<24}", format!("{shortcut}--{}", option.name()));
            out.write_line(&format!(
                "  {} {}",
                output::info_text(out, &padded),
                option.description()
            ));
        }
    }

    fn render_error(&mut self, error: &CliError) {
        let out = self.io.error_output().clone();
        output::error(&out, error);
        if self.io.is_verbose() {
            let mut source = error.source();
            while let Some(cause) = source {
                output::detail(&out, &format!("caused by: {cause}"));
                source = cause.source();
            }
        }

        let names = self.loader.names();
        let repository = self
            .solutions
            .get_or_insert_with(|| SolutionProviderRepository::with_defaults(names));
        for solution in repository.solutions_for(error) {
            out.write_line("");
            out.write_line(&format!("  • {}", output::comment_text(&out, &solution.title)));
            for line in solution.description.lines() {
                out.write_line(&format!("    {line}"));
            }
            for link in &solution.links {
                out.write_line(&format!("    {}", output::info_text(&out, link)));
            }
        }
    }
}
