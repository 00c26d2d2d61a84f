//! Convert command implementation.
//!
//! Reads exported module snapshots, converts them and prints one BUILD file
//! per directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::debug;

use selectgen_lib::axis::AxisRegistry;
use selectgen_lib::convert::{ConversionConfig, ConvertContext, ConverterRegistry, ModuleSnapshot, convert_modules};
use selectgen_lib::emit::{RenderedTarget, render_build_file, render_target};

use crate::output::{OutputFormat, build_file_path, print_json, print_warning};

pub struct ConvertOptions<'a> {
  pub modules: &'a Path,
  pub config: Option<&'a Path>,
  pub dir: Option<&'a str>,
  pub check_apex_available: bool,
  pub output: OutputFormat,
}

#[derive(Serialize)]
struct BuildFileOutput {
  dir: String,
  path: String,
  targets: Vec<RenderedTarget>,
  content: String,
}

fn load_modules(path: &Path) -> Result<Vec<ModuleSnapshot>> {
  let json = fs::read_to_string(path).with_context(|| format!("Failed to read modules: {}", path.display()))?;
  serde_json::from_str(&json).with_context(|| format!("Failed to parse modules: {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<ConversionConfig> {
  let Some(path) = path else {
    return Ok(ConversionConfig::default());
  };
  let json = fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
  ConversionConfig::from_json(&json).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn cmd_convert(options: ConvertOptions<'_>) -> Result<()> {
  let registry = AxisRegistry::global();
  let modules = load_modules(options.modules)?;
  let mut config = load_config(options.config)?;
  if options.check_apex_available {
    config.enforce_apex_available = true;
  }

  for module in &modules {
    module
      .validate(registry)
      .with_context(|| format!("Invalid module snapshot in {}", options.modules.display()))?;
  }
  debug!(modules = modules.len(), "loaded module snapshots");

  let converters = ConverterRegistry::builtin();
  let ctx = ConvertContext::new(registry, &converters, &config);
  let files = convert_modules(&ctx, &modules).context("Conversion failed")?;

  let dirs: Vec<&str> = match options.dir {
    Some(dir) if files.targets(dir).is_empty() => bail!("No targets generated in directory: {}", dir),
    Some(dir) => vec![dir],
    None => files.dirs().collect(),
  };

  let mut outputs = Vec::new();
  for dir in dirs {
    let targets = files.targets(dir);
    let rendered = targets
      .iter()
      .map(|target| render_target(target, registry))
      .collect::<Result<Vec<_>, _>>()
      .with_context(|| format!("Failed to render targets in {}", dir))?;
    let content =
      render_build_file(targets, registry).with_context(|| format!("Failed to render {}", build_file_path(dir)))?;
    outputs.push(BuildFileOutput {
      dir: dir.to_string(),
      path: build_file_path(dir),
      targets: rendered,
      content,
    });
  }

  if options.output.is_json() {
    return print_json(&outputs);
  }

  if outputs.is_empty() {
    print_warning("No targets generated");
    return Ok(());
  }
  for (i, output) in outputs.iter().enumerate() {
    if i > 0 {
      println!();
    }
    println!("# {}", output.path);
    print!("{}", output.content);
  }
  Ok(())
}
