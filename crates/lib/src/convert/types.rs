//! Module snapshot input and conversion errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::axis::{AxisError, AxisRegistry, ConfigurationAxis};
use crate::consts::TOPLEVEL_DIR;

use super::policy::PolicyError;

/// Errors that can occur while converting modules.
#[derive(Debug, Error)]
pub enum ConvertError {
  /// A variant names an axis or config the registry does not define.
  #[error("module {module}: {source}")]
  Axis {
    module: String,
    #[source]
    source: AxisError,
  },

  /// A property has a different shape than its attribute expects.
  #[error("module {module}: property {property} must be {expected}")]
  InvalidProperty {
    module: String,
    property: String,
    expected: &'static str,
  },

  /// Two targets with the same name would land in one BUILD file.
  #[error("duplicate target {name} in {dir}")]
  DuplicateTarget { dir: String, name: String },

  #[error(transparent)]
  Policy(#[from] PolicyError),
}

/// A property value as exported by the graph builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
  Bool(bool),
  Int(i64),
  String(String),
  List(Vec<String>),
}

/// Bazel specific module properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BazelModuleProps {
  /// Overrides the directory level availability when set.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bp2build_available: Option<bool>,
}

/// Properties of one module under one (axis, config) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSnapshot {
  pub axis: ConfigurationAxis,
  pub config: String,
  #[serde(default)]
  pub properties: BTreeMap<String, PropertyValue>,
}

/// A module with its unconditional properties and per-variant overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
  pub name: String,
  pub module_type: String,
  /// Directory of the module definition, relative to the source root.
  #[serde(default = "toplevel_dir")]
  pub dir: String,
  #[serde(default)]
  pub properties: BTreeMap<String, PropertyValue>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub variants: Vec<VariantSnapshot>,
  #[serde(default)]
  pub bazel_module: BazelModuleProps,
}

fn toplevel_dir() -> String {
  TOPLEVEL_DIR.to_string()
}

impl ModuleSnapshot {
  pub fn new(name: impl Into<String>, module_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      module_type: module_type.into(),
      dir: toplevel_dir(),
      properties: BTreeMap::new(),
      variants: Vec::new(),
      bazel_module: BazelModuleProps::default(),
    }
  }

  pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
    self.dir = dir.into();
    self
  }

  pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
    self.properties.insert(name.into(), value);
    self
  }

  pub fn with_variant(
    mut self,
    axis: ConfigurationAxis,
    config: impl Into<String>,
    properties: BTreeMap<String, PropertyValue>,
  ) -> Self {
    self.variants.push(VariantSnapshot {
      axis,
      config: config.into(),
      properties,
    });
    self
  }

  pub fn with_bp2build_available(mut self, available: bool) -> Self {
    self.bazel_module.bp2build_available = Some(available);
    self
  }

  pub fn property(&self, name: &str) -> Option<&PropertyValue> {
    self.properties.get(name)
  }

  /// A list property of the module, `None` when absent.
  ///
  /// # Errors
  ///
  /// Returns `InvalidProperty` if the property is not a list.
  pub fn list_property(&self, name: &str) -> Result<Option<&[String]>, ConvertError> {
    list_of(&self.name, name, self.properties.get(name))
  }

  /// Check every variant against the registry.
  ///
  /// Conversion panics on a variant the registry rejects, so input read from
  /// outside the process goes through this first.
  pub fn validate(&self, registry: &AxisRegistry) -> Result<(), ConvertError> {
    for variant in &self.variants {
      registry
        .validate(&variant.axis, &variant.config)
        .map_err(|source| ConvertError::Axis {
          module: self.name.clone(),
          source,
        })?;
    }
    Ok(())
  }
}

pub(crate) fn list_of<'a>(
  module: &str,
  property: &str,
  value: Option<&'a PropertyValue>,
) -> Result<Option<&'a [String]>, ConvertError> {
  match value {
    None => Ok(None),
    Some(PropertyValue::List(items)) => Ok(Some(items)),
    Some(_) => Err(ConvertError::InvalidProperty {
      module: module.to_string(),
      property: property.to_string(),
      expected: "a list of strings",
    }),
  }
}
