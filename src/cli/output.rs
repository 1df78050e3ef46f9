//! Terminal output formatting with colors
//!
//! Styling is applied only when the target output is decorated (`--ansi`,
//! `--no-ansi`, or a terminal). `colored` additionally honours NO_COLOR and
//! CLICOLOR_FORCE.

use std::fmt::Display;

use colored::{ColoredString, Colorize};

use crate::infrastructure::io::Output;

fn paint(out: &Output, text: String, style: impl FnOnce(&str) -> ColoredString) -> String {
    if out.is_decorated() {
        style(&text).to_string()
    } else {
        text
    }
}

/// Red bold "error:" prefix
pub fn error(out: &Output, msg: &(impl Display + ?Sized)) {
    let label = paint(out, "error".into(), |s| s.red().bold());
    out.write_line(&format!("{label}: {msg}"));
}

/// Yellow "Warning:" prefix
pub fn warning(out: &Output, msg: &(impl Display + ?Sized)) {
    let label = paint(out, "Warning".into(), |s| s.yellow());
    out.write_line(&format!("{label}: {msg}"));
}

/// Green checkmark
pub fn success(out: &Output, msg: &(impl Display + ?Sized)) {
    let mark = paint(out, "✓".into(), |s| s.green());
    out.write_line(&format!("{mark} {msg}"));
}

/// Red X, indented
pub fn failure(out: &Output, msg: &(impl Display + ?Sized)) {
    let mark = paint(out, "✗".into(), |s| s.red());
    out.write_line(&format!("  {mark} {msg}"));
}

/// Section header (cyan bold)
pub fn header(out: &Output, msg: &(impl Display + ?Sized)) {
    out.write_line(&paint(out, msg.to_string(), |s| s.cyan().bold()));
}

/// `label` in green, then the message
pub fn action(out: &Output, label: &str, msg: &(impl Display + ?Sized)) {
    let label = paint(out, label.into(), |s| s.green());
    out.write_line(&format!("{label}: {msg}"));
}

/// Indented detail (no color)
pub fn detail(out: &Output, msg: &(impl Display + ?Sized)) {
    out.write_line(&format!("  {msg}"));
}

/// Inline styles for composing lines
pub fn info_text(out: &Output, text: &str) -> String {
    paint(out, text.into(), |s| s.green())
}

pub fn comment_text(out: &Output, text: &str) -> String {
    paint(out, text.into(), |s| s.yellow())
}

pub fn debug_text(out: &Output, text: &str) -> String {
    paint(out, text.into(), |s| s.dimmed())
}

pub fn error_text(out: &Output, text: &str) -> String {
    paint(out, text.into(), |s| s.red())
}
