//! Conversion of module snapshots into targets.
//!
//! [`convert_modules`] is the entry point. It validates the snapshots,
//! optionally runs the apex availability check, converts every available
//! module on the rayon pool and merges the results into [`BuildFiles`] on the
//! calling thread.

mod config;
mod policy;
mod schema;
mod types;

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

pub use config::{Availability, ConversionConfig};
pub use policy::{APEX_AVAILABLE_PROPERTY, APEX_MODULE_TYPE, PolicyError, check_apex_available};
pub use schema::{AttrKind, AttrSpec, ConverterRegistry, ModuleConverter, RuleSchema, SchemaConverter};
pub use types::{BazelModuleProps, ConvertError, ModuleSnapshot, PropertyValue, VariantSnapshot};

use crate::attribute::Label;
use crate::axis::AxisRegistry;
use crate::emit::{BazelTarget, BuildFiles};

/// Modules of one run, by name.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex<'a> {
  modules: BTreeMap<&'a str, &'a ModuleSnapshot>,
}

impl<'a> ModuleIndex<'a> {
  /// Index `modules`. When a name repeats, the last snapshot wins.
  pub fn new(modules: &'a [ModuleSnapshot]) -> Self {
    Self {
      modules: modules.iter().map(|module| (module.name.as_str(), module)).collect(),
    }
  }

  pub fn get(&self, name: &str) -> Option<&'a ModuleSnapshot> {
    self.modules.get(name).copied()
  }

  /// Modules in name order.
  pub fn iter(&self) -> impl Iterator<Item = &'a ModuleSnapshot> {
    self.modules.values().copied()
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }
}

/// Shared, read-only inputs of a conversion run.
pub struct ConvertContext<'a> {
  pub registry: &'a AxisRegistry,
  pub converters: &'a ConverterRegistry,
  pub config: &'a ConversionConfig,
}

impl<'a> ConvertContext<'a> {
  pub fn new(registry: &'a AxisRegistry, converters: &'a ConverterRegistry, config: &'a ConversionConfig) -> Self {
    Self {
      registry,
      converters,
      config,
    }
  }
}

/// What a [`ModuleConverter`] sees while converting one module.
pub struct ModuleContext<'a> {
  pub registry: &'a AxisRegistry,
  pub config: &'a ConversionConfig,
  modules: &'a ModuleIndex<'a>,
}

impl<'a> ModuleContext<'a> {
  pub fn new(registry: &'a AxisRegistry, config: &'a ConversionConfig, modules: &'a ModuleIndex<'a>) -> Self {
    Self {
      registry,
      config,
      modules,
    }
  }

  pub fn module(&self, name: &str) -> Option<&'a ModuleSnapshot> {
    self.modules.get(name)
  }

  /// Label of module `name` as seen from a target in `from_dir`. Modules
  /// outside the run are assumed to live next to the referencing module.
  pub fn label_for(&self, name: &str, from_dir: &str) -> Label {
    let module_dir = self.module(name).map_or(from_dir, |module| module.dir.as_str());
    Label::for_module(name, module_dir, from_dir)
  }
}

fn convert_module(
  ctx: &ModuleContext<'_>,
  converters: &ConverterRegistry,
  module: &ModuleSnapshot,
) -> Result<Vec<BazelTarget>, ConvertError> {
  let Some(converter) = converters.get(&module.module_type) else {
    debug!(module = %module.name, module_type = %module.module_type, "no converter for module type");
    return Ok(Vec::new());
  };
  if !ctx.config.is_converted(module) {
    debug!(module = %module.name, dir = %module.dir, "module not available for conversion");
    return Ok(Vec::new());
  }
  let targets = converter.convert(ctx, module)?;
  debug!(module = %module.name, targets = targets.len(), "converted module");
  Ok(targets)
}

/// Convert `modules` into BUILD file contents.
///
/// # Errors
///
/// Returns the first error in input order: an invalid variant, a property of
/// the wrong shape, an apex availability violation (when enabled), or two
/// targets with the same name in one directory.
pub fn convert_modules(ctx: &ConvertContext<'_>, modules: &[ModuleSnapshot]) -> Result<BuildFiles, ConvertError> {
  for module in modules {
    module.validate(ctx.registry)?;
  }

  let index = ModuleIndex::new(modules);
  if ctx.config.enforce_apex_available {
    check_apex_available(&index, ctx.converters)?;
  }

  let module_ctx = ModuleContext::new(ctx.registry, ctx.config, &index);
  let results: Vec<Result<Vec<BazelTarget>, ConvertError>> = modules
    .par_iter()
    .map(|module| convert_module(&module_ctx, ctx.converters, module))
    .collect();

  let mut files = BuildFiles::new();
  for result in results {
    for target in result? {
      let (dir, name) = (target.dir.clone(), target.name.clone());
      if !files.insert(target) {
        return Err(ConvertError::DuplicateTarget { dir, name });
      }
    }
  }

  info!(modules = modules.len(), targets = files.len(), dirs = files.dirs().count(), "conversion complete");
  Ok(files)
}
