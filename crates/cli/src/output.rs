//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! messages on stderr, aligned key/value lines, and JSON.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use selectgen_lib::consts::TOPLEVEL_DIR;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Path of the BUILD file for `dir`, relative to the source root.
pub fn build_file_path(dir: &str) -> String {
  if dir == TOPLEVEL_DIR || dir.is_empty() {
    "BUILD.bazel".to_string()
  } else {
    format!("{}/BUILD.bazel", dir)
  }
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

/// `label → value`, with the label padded to `width`.
pub fn print_mapping(label: &str, value: &str, width: usize) {
  println!(
    "  {:<width$} {} {}",
    label,
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value,
    width = width
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
