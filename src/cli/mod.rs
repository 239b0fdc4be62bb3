//! CLI module for the reflectgrid demo
//!
//! Renders the bundled [`JobConfig`](crate::demo::JobConfig) through the headless toolkit and prints
//! the resulting grid as text.
//!
//! ## Commands
//!
//! - `render` (default) - Render the demo object, optionally after scripted edits
//! - `members` - List the members the walker discovers, with their classification
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions write to a caller-supplied sink and return [`CliResult`]; only [`run`] touches
//! stdout, so the commands are testable.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::io::{self, Write};
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use miette::Diagnostic;
use reflectgrid_core::{MemberKind, NamingStrategy};
use thiserror::Error;

use crate::config::GridConfig;
use crate::demo::JobConfig;
use crate::engine::{ReflectorGrid, classify, collect_members};
use crate::errors::BindError;
use crate::layout::LayoutStrategy;
use crate::numeric::parse_decimal;
use crate::propagation::FieldChange;
use crate::toolkit::{ControlKind, Widget};
use crate::toolkit::headless::{HeadlessGrid, HeadlessToolkit};
use crate::version::REFLECTGRID_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Error type for CLI operations.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("no control is labelled `{label}`")]
    #[diagnostic(code(reflectgrid::cli::unknown_label), help("run `reflectgrid render` to see every label"))]
    UnknownLabel { label: String },

    #[error("`{raw}` is not an edit")]
    #[diagnostic(code(reflectgrid::cli::bad_edit), help("edits are written as LABEL=VALUE"))]
    BadEdit { raw: String },

    #[error("`{value}` is not a number")]
    #[diagnostic(code(reflectgrid::cli::bad_number))]
    BadNumber { value: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    #[diagnostic(code(reflectgrid::cli::io))]
    Io(#[from] io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Render annotated Rust objects as editable grid forms
#[derive(Parser, Debug)]
#[command(name = "reflectgrid")]
#[command(version = REFLECTGRID_VERSION)]
#[command(about = "Render annotated Rust objects as editable grid forms", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Placement of labels relative to their controls
    #[arg(long, value_enum, default_value_t = LayoutArg::Paired, global = true)]
    pub layout: LayoutArg,

    /// How member identifiers become label text
    #[arg(long, value_enum, default_value_t = NamingArg::Split, global = true)]
    pub naming: NamingArg,

    /// Maximum control width
    #[arg(long, value_name = "PIXELS", default_value_t = 300.0, global = true)]
    pub width: f64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the demo object
    Render {
        /// Edit a control before printing, as LABEL=VALUE (buttons ignore VALUE)
        #[arg(long = "set", value_name = "LABEL=VALUE")]
        edits: Vec<String>,
    },

    /// List the members the walker discovers
    Members,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Paired,
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    Verbatim,
    Split,
}

impl Cli {
    /// Engine configuration selected by the global flags.
    pub fn config(&self) -> GridConfig {
        let naming = match self.naming {
            NamingArg::Verbatim => NamingStrategy::Verbatim,
            NamingArg::Split => NamingStrategy::SplitToCapitalizedWords,
        };
        let layout = match self.layout {
            LayoutArg::Paired => LayoutStrategy::Paired,
            LayoutArg::Stacked => LayoutStrategy::Stacked,
        };
        GridConfig::new()
            .with_layout(layout)
            .with_width_limit(self.width)
            .with_field_naming(naming.clone())
            .with_method_naming(naming)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
pub fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    execute(&cli, &mut stdout.lock())?;
    Ok(())
}

/// Execute the parsed command against `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> CliResult<()> {
    match &cli.command {
        None => render(cli, &[], out),
        Some(Command::Render { edits }) => render(cli, edits, out),
        Some(Command::Members) => members(out),
    }
}

fn render(cli: &Cli, edits: &[String], out: &mut dyn Write) -> CliResult<()> {
    let target = JobConfig::shared();
    let mut grid = ReflectorGrid::new(Rc::new(HeadlessToolkit)).with_config(cli.config());
    grid.subscribe(|change: &FieldChange<'_>| {
        tracing::info!(
            field = change.field.name,
            old = %change.old_value,
            new = %change.new_value,
            object = change.object.type_name(),
            "field changed"
        );
    });
    grid.bind(&target)?;

    if !edits.is_empty() {
        for edit in edits {
            apply_edit(&mut grid, edit)?;
        }
        grid.regenerate()?;
    }

    if let Some(headless) = HeadlessGrid::downcast(grid.container()) {
        write!(out, "{}", headless.render_text())?;
    }
    Ok(())
}

/// Drive the control labelled by the left-hand side of `edit`.
fn apply_edit(grid: &mut ReflectorGrid, edit: &str) -> CliResult<()> {
    let (label, value) = edit
        .split_once('=')
        .ok_or_else(|| CliError::BadEdit { raw: edit.to_string() })?;
    let control = HeadlessGrid::downcast_mut(grid.container_mut())
        .and_then(|headless| headless.control_mut(label))
        .ok_or_else(|| CliError::UnknownLabel {
            label: label.to_string(),
        })?;

    tracing::debug!(label, value, kind = %control.kind(), "applying edit");
    match control.kind() {
        ControlKind::SingleLineText | ControlKind::MultiLineText => control.enter_text(value)?,
        ControlKind::Selection => control.select_named(value)?,
        ControlKind::NumericStepper => {
            let number = parse_decimal(value).map_err(|_| CliError::BadNumber {
                value: value.to_string(),
            })?;
            control.set_value(number)?;
        }
        ControlKind::Trigger => control.fire()?,
        ControlKind::Custom(_) => {}
    }
    Ok(())
}

fn members(out: &mut dyn Write) -> CliResult<()> {
    let target = JobConfig::new();
    for member in collect_members(&target) {
        let shape = match &member.kind {
            MemberKind::Action(_) => "action".to_string(),
            MemberKind::Field { .. } => match classify(&member) {
                Ok(classification) => format!("{classification:?}"),
                Err(err) => format!("invalid: {err}"),
            },
        };
        writeln!(
            out,
            "{depth} {owner}.{name} {shape}",
            depth = member.depth,
            owner = member.declaring_type,
            name = member.name,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> String {
        let cli = Cli::parse_from(std::iter::once("reflectgrid").chain(args.iter().copied()));
        let mut out = Vec::new();
        execute(&cli, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_members_lists_derived_first() {
        let output = run_args(&["members"]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.first(), Some(&"0 JobConfig.function_name Text(SingleLineText)"));
        assert_eq!(lines.last(), Some(&"1 NamedItem.name Text(SingleLineText)"));
        assert!(lines.contains(&"0 JobConfig.data Composite"));
        assert!(lines.contains(&"0 JobConfig.test_function action"));
    }

    #[test]
    fn test_render_applies_edits() {
        let output = run_args(&["render", "--set", "Number=42", "--set", "Function Name=go"]);
        assert!(output.contains("stepper 42"));
        assert!(output.contains("text \"go\""));
    }

    #[test]
    fn test_unknown_label_is_reported() {
        let cli = Cli::parse_from(["reflectgrid", "render", "--set", "Nope=1"]);
        let err = execute(&cli, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::UnknownLabel { label } if label == "Nope"));
    }

    #[test]
    fn test_extreme_exponent_edit_is_a_bad_number() {
        let cli = Cli::parse_from(["reflectgrid", "render", "--set", "Number=1e-99999999"]);
        let err = execute(&cli, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::BadNumber { value } if value == "1e-99999999"));
    }

    #[test]
    fn test_stacked_verbatim_flags() {
        let output = run_args(&["--layout", "stacked", "--naming", "verbatim"]);
        assert!(output.starts_with("00:0 label \"function_name\"\n01:0 text \"testFunction\"\n"));
    }
}
