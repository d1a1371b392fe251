//! Terminal output for the mapscript CLI.
//!
//! Status lines are written Cargo-style to stderr: a right-aligned verb,
//! coloured by tone, then the message. stdout carries only machine-readable
//! output (`build --stdout`, `--json`).

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::{Diagnostic, Severity};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Width of the verb column.
const VERB_WIDTH: usize = 12;

/// Colour of a status verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Progress,
    Info,
    Warning,
    Failure,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Progress => "\x1b[32m",
            Tone::Info => "\x1b[36m",
            Tone::Warning => "\x1b[33m",
            Tone::Failure => "\x1b[31m",
        }
    }
}

impl From<Severity> for Tone {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Tone::Warning,
            Severity::Error => Tone::Failure,
        }
    }
}

/// Status printer for stderr.
///
/// Colour is on when stderr is a terminal and `NO_COLOR` is unset.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        let color = io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    /// A printer with colour forced on or off.
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    /// e.g. "  Generating harbor (maps/harbor.map.yaml)"
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Progress, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.line(Tone::Progress, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.line(Tone::Info, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Warning, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(Tone::Failure, verb, message);
    }

    /// Print one validation diagnostic and its help text.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        let mut stderr = io::stderr().lock();
        let label = self.paint(
            &[BOLD, Tone::from(diagnostic.severity).ansi()],
            &diagnostic.severity,
        );
        let _ = match &diagnostic.map {
            Some(map) => writeln!(
                stderr,
                "  {}[{}]: {}: {}",
                label, diagnostic.code, map, diagnostic.message
            ),
            None => writeln!(stderr, "  {}[{}]: {}", label, diagnostic.code, diagnostic.message),
        };
        if let Some(help) = &diagnostic.help {
            let _ = writeln!(stderr, "    {} {}", self.dim("help:"), help);
        }
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(&[DIM], text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(&[BOLD], text)
    }

    /// Paths and other values worth picking out.
    pub fn highlight(&self, text: &str) -> String {
        self.paint(&[Tone::Info.ansi()], text)
    }

    fn paint(&self, codes: &[&str], text: impl Display) -> String {
        if self.color {
            format!("{}{}{}", codes.concat(), text, RESET)
        } else {
            text.to_string()
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        let verb = format!("{verb:>VERB_WIDTH$}");
        let verb = self.paint(&[BOLD, tone.ansi()], verb);
        let _ = writeln!(io::stderr().lock(), "{} {}", verb, message);
    }
}

/// `plural(1, "map", "maps")` is "1 map".
pub fn plural(n: usize, singular: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { many })
}

/// A path relative to the working directory when it lies below it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => p.display().to_string(),
        None => path.display().to_string(),
    }
}
