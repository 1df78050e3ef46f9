//! Output-bound log handlers on top of `tracing`
//!
//! A log channel is a `tracing` target prefix (`quill::packages::locker`).
//! The [`LogRouter`] holds one handler per channel: a severity threshold and
//! the output it writes to. [`IoLogLayer`] is the subscriber layer that feeds
//! events to the router; targets without a handler are ignored.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::cli::output;
use crate::infrastructure::io::Output;

/// Env var holding the developer log filter (`EnvFilter` syntax).
pub const LOG_ENV: &str = "QUILL_LOG";

#[derive(Clone)]
struct ChannelHandler {
    channel: String,
    level: Level,
    output: Output,
}

/// Channel to handler routing, shared between the layer and the listener.
#[derive(Clone, Default)]
pub struct LogRouter {
    handlers: Arc<Mutex<Vec<ChannelHandler>>>,
}

impl fmt::Debug for LogRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRouter")
            .field("channels", &self.channels())
            .finish()
    }
}

/// `target` belongs to `channel` when equal or nested below it.
pub fn channel_matches(channel: &str, target: &str) -> bool {
    target == channel
        || target
            .strip_prefix(channel)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl LogRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler for `channel`, replacing an existing one.
    pub fn attach(&self, channel: &str, level: Level, output: Output) {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let handler = ChannelHandler {
            channel: channel.to_string(),
            level,
            output,
        };
        match handlers.iter_mut().find(|h| h.channel == channel) {
            Some(existing) => *existing = handler,
            None => handlers.push(handler),
        }
    }

    pub fn clear(&self) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn channels(&self) -> Vec<String> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|h| h.channel.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Threshold of the handler for `channel` itself.
    pub fn level(&self, channel: &str) -> Option<Level> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|h| h.channel == channel)
            .map(|h| h.level)
    }

    /// Most specific handler for `target`.
    fn route(&self, target: &str) -> Option<ChannelHandler> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| channel_matches(&h.channel, target))
            .max_by_key(|h| h.channel.len())
            .cloned()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}

/// Render one record the way it appears on the console.
pub fn format_record(out: &Output, level: &Level, target: &str, message: &str) -> String {
    match *level {
        Level::ERROR => output::error_text(out, message),
        Level::WARN => output::comment_text(out, message),
        Level::INFO => message.to_string(),
        _ => format!("{} {message}", output::debug_text(out, &format!("{target}:"))),
    }
}

/// Subscriber layer writing routed events to their handler's output.
#[derive(Clone, Debug)]
pub struct IoLogLayer {
    router: LogRouter,
}

impl IoLogLayer {
    pub fn new(router: LogRouter) -> Self {
        Self { router }
    }
}

impl<S: Subscriber> Layer<S> for IoLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let Some(handler) = self.router.route(metadata.target()) else {
            return;
        };
        // more verbose levels compare greater
        if *metadata.level() > handler.level {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let mut message = visitor.message;
        if !visitor.fields.is_empty() {
            message = format!("{message} {}", visitor.fields.join(" "));
        }
        handler.output.write_line(&format_record(
            &handler.output,
            metadata.level(),
            metadata.target(),
            &message,
        ));
    }
}
