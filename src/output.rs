//! # Progress Output
//!
//! Operator-facing progress lines for a copy run, and the color/emoji
//! decision behind them.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! `Reporter` implements the authentication and copy observer hooks, so the
//! library reports each phase without printing anything itself.

use std::env;
use std::path::Path;

use console::style;

use crate::auth::AuthObserver;
use crate::copy::{CopyObserver, CopyReport, TargetStatus};
use crate::error::Error;
use crate::model::{ContentType, Stack};
use crate::remap::{Rewrite, UnresolvedReference};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// In auto mode, colors are disabled if `NO_COLOR` is set, `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a TTY (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even if empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain marker otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Kind of progress line, which picks the marker and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Step,
    Success,
    Warning,
    Failure,
}

/// Prints progress lines to stdout.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: OutputConfig,
    quiet: bool,
}

impl Reporter {
    pub fn new(config: OutputConfig, quiet: bool) -> Self {
        Self { config, quiet }
    }

    fn format_line(&self, tone: Tone, message: &str) -> String {
        let marker = match tone {
            Tone::Step => emoji(&self.config, "🔍", "[..]"),
            Tone::Success => emoji(&self.config, "✅", "[OK]"),
            Tone::Warning => emoji(&self.config, "⚠️ ", "[WARN]"),
            Tone::Failure => emoji(&self.config, "❌", "[ERR]"),
        };
        if !self.config.use_color {
            return format!("{} {}", marker, message);
        }
        let styled = match tone {
            Tone::Step => style(message).blue(),
            Tone::Success => style(message).green().bold(),
            Tone::Warning => style(message).yellow(),
            Tone::Failure => style(message).red().bold(),
        }
        .force_styling(true);
        format!("{} {}", marker, styled)
    }

    fn line(&self, tone: Tone, message: &str) {
        if !self.quiet {
            println!("{}", self.format_line(tone, message));
        }
    }

    pub fn banner(&self, message: &str) {
        if self.quiet {
            return;
        }
        let rule = "─".repeat(message.chars().count() + 4);
        if self.config.use_color {
            println!("{}", style(&rule).dim());
            println!("  {}", style(message).bold());
            println!("{}", style(&rule).dim());
        } else {
            println!("{}\n  {}\n{}", rule, message, rule);
        }
    }

    pub fn logged_in(&self) {
        let message = format!("Logged in! {}", emoji(&self.config, "🚀", ""));
        self.banner(message.trim_end());
    }

    /// One line per target, then totals.
    pub fn summary(&self, report: &CopyReport) {
        if self.quiet {
            return;
        }
        println!();
        for outcome in &report.targets {
            match &outcome.status {
                TargetStatus::Written { path, .. } => self.line(
                    Tone::Success,
                    &format!("{}: {}", outcome.stack.name, path.display()),
                ),
                TargetStatus::Skipped { reason } => self.line(
                    Tone::Warning,
                    &format!("{}: skipped ({})", outcome.stack.name, reason),
                ),
                TargetStatus::Failed { error } => self.line(
                    Tone::Failure,
                    &format!("{}: failed ({})", outcome.stack.name, error),
                ),
            }
        }
        println!(
            "   {} written, {} skipped, {} failed",
            report.written(),
            report.skipped(),
            report.failed()
        );
    }
}

impl AuthObserver for Reporter {
    fn using_cached_token(&self) {
        self.line(Tone::Step, "Using stored authtoken to log in.");
    }

    fn cached_token_rejected(&self, error: &Error) {
        self.line(
            Tone::Warning,
            &format!(
                "Unable to log in using authtoken ({}). Proceeding to password authentication.",
                error
            ),
        );
    }

    fn logging_in(&self) {
        self.line(Tone::Step, "Logging in with user session API endpoint.");
    }

    fn token_saved(&self) {
        self.line(Tone::Step, "Wrote authtoken to local file.");
    }
}

impl CopyObserver for Reporter {
    fn fetching_schema(&self, stack: &Stack, content_type_uid: &str) {
        self.line(
            Tone::Step,
            &format!("Fetching content type {} on stack {}.", content_type_uid, stack.name),
        );
    }

    fn schema_fetched(&self, content_type: &ContentType) {
        self.line(
            Tone::Success,
            &format!("Schema for {} fetched!", content_type.uid),
        );
    }

    fn fetching_extensions(&self, stack: &Stack) {
        self.line(
            Tone::Step,
            &format!("Fetching list of extensions and apps for {}.", stack.name),
        );
    }

    fn extensions_fetched(&self, stack: &Stack, count: usize) {
        self.line(
            Tone::Success,
            &format!("Fetched {} extensions and apps installed on {}!", count, stack.name),
        );
    }

    fn field_remapped(&self, stack: &Stack, rewrite: &Rewrite) {
        self.line(
            Tone::Success,
            &format!(
                "[{}] Replacing uid for extension/app {} in field {}.",
                stack.name, rewrite.extension, rewrite.field
            ),
        );
    }

    fn field_unresolved(&self, stack: &Stack, unresolved: &UnresolvedReference) {
        self.line(
            Tone::Warning,
            &format!(
                "[{}] Field {} refers to extension {}: {}.",
                stack.name, unresolved.field, unresolved.extension_uid, unresolved.reason
            ),
        );
    }

    fn artifact_written(&self, stack: &Stack, path: &Path) {
        self.line(
            Tone::Success,
            &format!("[{}] Wrote new content type definition to {}.", stack.name, path.display()),
        );
    }

    fn target_skipped(&self, stack: &Stack, reason: &str) {
        self.line(
            Tone::Failure,
            &format!("[{}] Nothing written: {}.", stack.name, reason),
        );
    }
}
