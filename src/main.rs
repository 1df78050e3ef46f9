use std::{env, io, process};

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use quill::cli::context::ProjectContext;
use quill::cli::logging::{IoLogLayer, LogRouter, LOG_ENV};
use quill::cli::{output, Application, CliError};
use quill::config::Settings;
use quill::infrastructure::di::ServiceContainer;
use quill::infrastructure::io::Output;

fn main() {
    let settings = match Settings::load(None) {
        Ok(settings) => settings,
        Err(e) => fail(e.into()),
    };
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => fail(quill::infrastructure::InfraError::io("current directory", e).into()),
    };

    let services = ServiceContainer::new(settings);
    let project = ProjectContext::for_directory(cwd, &services);
    let mut app = Application::new(services, project);
    setup_logging(app.log_router().clone());

    let code = app.run(env::args());
    process::exit(code);
}

fn fail(e: CliError) -> ! {
    output::error(&Output::stderr(), &e);
    process::exit(e.exit_code());
}

/// Command-facing log handlers plus, with `QUILL_LOG` set, a developer log on stderr.
fn setup_logging(router: LogRouter) {
    let dev_layer = EnvFilter::try_from_env(LOG_ENV).ok().map(|filter| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
    });

    tracing_subscriber::registry()
        .with(IoLogLayer::new(router))
        .with(dev_layer)
        .init();
}
