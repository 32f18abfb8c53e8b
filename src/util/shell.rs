//! User-facing terminal output.
//!
//! All status lines go through [`Shell`] so that formatting, verbosity and
//! JSON mode are decided in one place:
//!
//! - Human mode prints right-aligned status words on stderr
//! - JSON mode prints one event object per line on stdout and nothing else
//! - A capturing shell records lines in memory for tests

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shell output mode. Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    #[default]
    Normal,
    /// --verbose: span start lines are printed immediately
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status words for output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // green
    Finished,
    Fresh,

    // cyan
    Resolving,
    Exporting,
    Building,
    Uploading,

    // blue
    Running,
    Info,

    // red
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Fresh => "Fresh",
            Status::Resolving => "Resolving",
            Status::Exporting => "Exporting",
            Status::Building => "Building",
            Status::Uploading => "Uploading",
            Status::Running => "Running",
            Status::Info => "Info",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished | Status::Fresh => "\x1b[1;32m",
            Status::Resolving | Status::Exporting | Status::Building | Status::Uploading => {
                "\x1b[1;36m"
            }
            Status::Running | Status::Info => "\x1b[1;34m",
            Status::Error => "\x1b[1;31m",
        }
    }

    /// Status words are right-aligned to this width.
    const WIDTH: usize = 12;
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
    /// When set, lines are recorded here instead of written out
    captured: Option<Mutex<Vec<String>>>,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell {
            mode,
            use_color,
            captured: None,
        }
    }

    /// A shell that records every line it would print.
    pub fn capture(mode: ShellMode) -> Self {
        Shell {
            use_color: false,
            captured: Some(Mutex::new(Vec::new())),
            ..Shell::new(mode)
        }
    }

    /// Create a shell from CLI flags. JSON mode takes precedence over
    /// quiet/verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                ..
            }
        )
    }

    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status line: `{status:>12} {message}`.
    ///
    /// In quiet mode only errors are printed; in JSON mode nothing is.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || (self.is_quiet() && status != Status::Error) {
            return;
        }

        let line = format!("{} {}", self.format_status(status), msg);
        self.write_err(line);
    }

    /// Print a plain, indented line under the previous status line.
    pub fn detail(&self, msg: impl Display) {
        if self.is_json() || self.is_quiet() {
            return;
        }
        self.write_err(format!("{:width$} {}", "", msg, width = Status::WIDTH));
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print an error. In JSON mode this becomes an error event.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            self.json_event(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string()
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Print data meant for the user's stdout (listings, plans).
    ///
    /// Ignored in JSON mode, where the same data is sent as an event.
    pub fn print(&self, msg: impl Display) {
        if self.is_json() {
            return;
        }
        self.write_out(msg.to_string());
    }

    /// Print a JSON event to stdout. Ignored in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }
        self.write_out(serde_json::to_string(event).unwrap_or_default());
    }

    /// Lines recorded by a capturing shell.
    pub fn captured(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .and_then(|c| c.lock().ok().map(|lines| lines.clone()))
            .unwrap_or_default()
    }

    fn write_err(&self, line: String) {
        if !self.record(&line) {
            eprintln!("{}", line);
        }
    }

    fn write_out(&self, line: String) {
        if !self.record(&line) {
            println!("{}", line);
            let _ = io::stdout().flush();
        }
    }

    fn record(&self, line: &str) -> bool {
        match &self.captured {
            Some(captured) => {
                if let Ok(mut lines) = captured.lock() {
                    lines.push(line.to_string());
                }
                true
            }
            None => false,
        }
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = Status::WIDTH
            )
        } else {
            format!("{:>width$}", text, width = Status::WIDTH)
        }
    }

    /// Start a timed span. The start line is printed right away in verbose
    /// mode; the finish line carries the elapsed time.
    pub fn span(self: &Arc<Self>, status: Status, msg: impl Display) -> Span {
        Span::new(Arc::clone(self), status, msg.to_string())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// A timed operation such as one package build.
pub struct Span {
    shell: Arc<Shell>,
    start: Instant,
    finished: bool,
}

impl Span {
    fn new(shell: Arc<Shell>, status: Status, message: String) -> Self {
        shell.status(status, &message);
        Span {
            shell,
            start: Instant::now(),
            finished: false,
        }
    }

    /// Finish the span with a message and the elapsed time.
    pub fn finish_with_message(mut self, msg: impl Display) {
        self.finished = true;
        let elapsed = format_duration(self.start.elapsed());
        self.shell
            .status(Status::Finished, format!("{} in {}", msg, elapsed));
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if !self.finished && self.shell.is_verbose() {
            self.shell.detail(format!(
                "stopped after {}",
                format_duration(self.start.elapsed())
            ));
        }
    }
}

/// Format a duration in a human-readable way.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
