//! Valid configuration values per axis and their select keys.
//!
//! Every axis kind except product variables has a closed table mapping each
//! configuration value to the label of a platform constraint. Product
//! variables accept any value and derive the key from it. In both cases the
//! reserved `conditions_default` value maps to `//conditions:default`.
//!
//! Registries are plain values. [`AxisRegistry::standard`] builds the stock
//! tables and [`AxisRegistry::global`] hands out a shared read-only copy;
//! tests can assemble their own with [`AxisRegistry::empty`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use thiserror::Error;

use super::{ConfigurationAxis, ConfigurationType};
use crate::consts::{
  ARCH_CONSTRAINT_PACKAGE, CONDITIONS_DEFAULT_CONFIG_KEY, CONDITIONS_DEFAULT_SELECT_KEY, OS_ARCH_CONSTRAINT_PACKAGE,
  OS_CONSTRAINT_PACKAGE, PRODUCT_VARIABLE_PACKAGE,
};

const ARCHES: [&str; 4] = ["arm", "arm64", "x86", "x86_64"];

const OS_ARCHES: [&str; 13] = [
  "android_arm",
  "android_arm64",
  "android_x86",
  "android_x86_64",
  "darwin_x86_64",
  "linux_glibc_x86",
  "linux_glibc_x86_64",
  "linux_musl_x86",
  "linux_musl_x86_64",
  "linux_bionic_arm64",
  "linux_bionic_x86_64",
  "windows_x86",
  "windows_x86_64",
];

static STANDARD: LazyLock<AxisRegistry> = LazyLock::new(AxisRegistry::standard);

/// Errors raised when an axis or configuration value is not known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AxisError {
  #[error("unknown {axis}: {config}")]
  UnknownConfig { axis: ConfigurationAxis, config: String },

  #[error("cannot specify config with no_config, but got {0}")]
  UnexpectedConfig(String),

  #[error("empty config value for {0}")]
  EmptyConfig(ConfigurationAxis),

  #[error("select key is unnecessary for no_config")]
  NotSelectable,

  #[error("no vocabulary registered for axis kind {0}")]
  Unregistered(ConfigurationType),

  #[error("unknown configuration axis: {0}")]
  UnknownKind(String),
}

/// Position of a configuration value within its axis, used to order
/// `select()` keys. The default branch always sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigRank {
  default: bool,
  index: usize,
}

/// The set of values an axis accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vocabulary {
  /// A fixed table of `(config, select key)` in enumeration order.
  Closed(Vec<(String, String)>),

  /// Any non-empty value, keyed as `<package>:<lowercased value>`.
  Open { package: String },
}

impl Vocabulary {
  /// Build a closed table. The `conditions_default` entry is appended.
  pub fn closed<I, C, K>(entries: I) -> Self
  where
    I: IntoIterator<Item = (C, K)>,
    C: Into<String>,
    K: Into<String>,
  {
    let mut table: Vec<(String, String)> = entries.into_iter().map(|(c, k)| (c.into(), k.into())).collect();
    table.push((
      CONDITIONS_DEFAULT_CONFIG_KEY.to_string(),
      CONDITIONS_DEFAULT_SELECT_KEY.to_string(),
    ));
    Self::Closed(table)
  }

  pub fn open(package: impl Into<String>) -> Self {
    Self::Open {
      package: package.into(),
    }
  }

  fn accepts(&self, config: &str) -> bool {
    match self {
      Self::Closed(table) => table.iter().any(|(c, _)| c == config),
      Self::Open { .. } => !config.is_empty(),
    }
  }

  fn select_key(&self, config: &str) -> Option<String> {
    if config == CONDITIONS_DEFAULT_CONFIG_KEY {
      return Some(CONDITIONS_DEFAULT_SELECT_KEY.to_string());
    }
    match self {
      Self::Closed(table) => table.iter().find(|(c, _)| c == config).map(|(_, key)| key.clone()),
      Self::Open { package } => Some(format!("{}:{}", package, config.to_lowercase())),
    }
  }

  fn rank(&self, config: &str) -> ConfigRank {
    let index = match self {
      Self::Closed(table) => table.iter().position(|(c, _)| c == config).unwrap_or(table.len()),
      Self::Open { .. } => 0,
    };
    ConfigRank {
      default: config == CONDITIONS_DEFAULT_CONFIG_KEY,
      index,
    }
  }
}

/// Lookup tables for every axis kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisRegistry {
  vocabularies: BTreeMap<ConfigurationType, Vocabulary>,
}

impl AxisRegistry {
  /// A registry with no vocabularies at all.
  pub fn empty() -> Self {
    Self::default()
  }

  /// The stock platform tables.
  pub fn standard() -> Self {
    let constraint = |package: &str, value: &str| format!("{}:{}", package, value);

    Self::empty()
      .with_closed(
        ConfigurationType::Arch,
        ARCHES.iter().map(|a| (*a, constraint(ARCH_CONSTRAINT_PACKAGE, a))),
      )
      .with_closed(
        ConfigurationType::Os,
        [
          ("android", "android"),
          ("darwin", "darwin"),
          ("linux_glibc", "linux"),
          ("linux_musl", "linux_musl"),
          ("linux_bionic", "linux_bionic"),
          ("windows", "windows"),
        ]
        .into_iter()
        .map(|(os, value)| (os, constraint(OS_CONSTRAINT_PACKAGE, value))),
      )
      .with_closed(
        ConfigurationType::OsArch,
        OS_ARCHES.iter().map(|t| (*t, constraint(OS_ARCH_CONSTRAINT_PACKAGE, t))),
      )
      .with_closed(
        ConfigurationType::Bionic,
        [("bionic", constraint(OS_CONSTRAINT_PACKAGE, "bionic"))],
      )
      .with_open(ConfigurationType::ProductVariables, PRODUCT_VARIABLE_PACKAGE)
  }

  /// The process-wide stock registry.
  pub fn global() -> &'static AxisRegistry {
    &STANDARD
  }

  pub fn with_closed<I, C, K>(mut self, kind: ConfigurationType, entries: I) -> Self
  where
    I: IntoIterator<Item = (C, K)>,
    C: Into<String>,
    K: Into<String>,
  {
    self.vocabularies.insert(kind, Vocabulary::closed(entries));
    self
  }

  pub fn with_open(mut self, kind: ConfigurationType, package: impl Into<String>) -> Self {
    self.vocabularies.insert(kind, Vocabulary::open(package));
    self
  }

  pub fn vocabulary(&self, kind: ConfigurationType) -> Option<&Vocabulary> {
    self.vocabularies.get(&kind)
  }

  pub fn vocabularies(&self) -> impl Iterator<Item = (ConfigurationType, &Vocabulary)> {
    self.vocabularies.iter().map(|(kind, vocab)| (*kind, vocab))
  }

  /// Check that `config` is a valid value of `axis`.
  ///
  /// The no-config axis only accepts the empty string.
  pub fn validate(&self, axis: &ConfigurationAxis, config: &str) -> Result<(), AxisError> {
    if axis.kind() == ConfigurationType::NoConfig {
      return if config.is_empty() {
        Ok(())
      } else {
        Err(AxisError::UnexpectedConfig(config.to_string()))
      };
    }

    let vocabulary = self.lookup(axis)?;
    if vocabulary.accepts(config) {
      return Ok(());
    }
    match vocabulary {
      Vocabulary::Open { .. } => Err(AxisError::EmptyConfig(axis.clone())),
      Vocabulary::Closed(_) => Err(AxisError::UnknownConfig {
        axis: axis.clone(),
        config: config.to_string(),
      }),
    }
  }

  /// The select key for `config` on `axis`.
  ///
  /// # Errors
  ///
  /// Returns [`AxisError::NotSelectable`] for the no-config axis, which never
  /// appears in a `select()`, and a validation error for unknown values.
  pub fn select_key(&self, axis: &ConfigurationAxis, config: &str) -> Result<String, AxisError> {
    if axis.kind() == ConfigurationType::NoConfig {
      return Err(AxisError::NotSelectable);
    }
    self.validate(axis, config)?;
    self
      .lookup(axis)?
      .select_key(config)
      .ok_or_else(|| AxisError::UnknownConfig {
        axis: axis.clone(),
        config: config.to_string(),
      })
  }

  /// Sort position of `config` among the values of `axis`.
  ///
  /// Closed axes keep table order; open axes rank every value equally so
  /// callers fall back to lexicographic order.
  pub fn config_rank(&self, axis: &ConfigurationAxis, config: &str) -> ConfigRank {
    match self.vocabularies.get(&axis.kind()) {
      Some(vocabulary) => vocabulary.rank(config),
      None => ConfigRank {
        default: config == CONDITIONS_DEFAULT_CONFIG_KEY,
        index: 0,
      },
    }
  }

  fn lookup(&self, axis: &ConfigurationAxis) -> Result<&Vocabulary, AxisError> {
    self
      .vocabularies
      .get(&axis.kind())
      .ok_or(AxisError::Unregistered(axis.kind()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> &'static AxisRegistry {
    AxisRegistry::global()
  }

  #[test]
  fn arch_keys_are_constraint_labels() {
    for (arch, key) in [
      ("arm", "//build/bazel/platforms/arch:arm"),
      ("arm64", "//build/bazel/platforms/arch:arm64"),
      ("x86", "//build/bazel/platforms/arch:x86"),
      ("x86_64", "//build/bazel/platforms/arch:x86_64"),
    ] {
      assert_eq!(registry().select_key(&ConfigurationAxis::ARCH, arch).unwrap(), key);
    }
  }

  #[test]
  fn os_keys_are_constraint_labels() {
    for (os, key) in [
      ("android", "//build/bazel/platforms/os:android"),
      ("darwin", "//build/bazel/platforms/os:darwin"),
      ("linux_glibc", "//build/bazel/platforms/os:linux"),
      ("linux_musl", "//build/bazel/platforms/os:linux_musl"),
      ("linux_bionic", "//build/bazel/platforms/os:linux_bionic"),
      ("windows", "//build/bazel/platforms/os:windows"),
    ] {
      assert_eq!(registry().select_key(&ConfigurationAxis::OS, os).unwrap(), key);
    }
  }

  #[test]
  fn os_arch_and_bionic_keys() {
    for target in OS_ARCHES {
      assert_eq!(
        registry().select_key(&ConfigurationAxis::OS_ARCH, target).unwrap(),
        format!("//build/bazel/platforms/os_arch:{}", target)
      );
    }
    assert_eq!(
      registry().select_key(&ConfigurationAxis::BIONIC, "bionic").unwrap(),
      "//build/bazel/platforms/os:bionic"
    );
  }

  #[test]
  fn default_config_maps_to_default_key_on_every_axis() {
    for axis in [
      ConfigurationAxis::ARCH,
      ConfigurationAxis::OS,
      ConfigurationAxis::OS_ARCH,
      ConfigurationAxis::BIONIC,
      ConfigurationAxis::product_variable("malloc_not_svelte"),
    ] {
      assert_eq!(
        registry().select_key(&axis, CONDITIONS_DEFAULT_CONFIG_KEY).unwrap(),
        CONDITIONS_DEFAULT_SELECT_KEY,
        "axis {}",
        axis
      );
    }
  }

  #[test]
  fn product_variable_keys_are_lowercased_and_namespaced() {
    let axis = ConfigurationAxis::product_variable("Malloc_not_svelte");
    assert_eq!(
      registry().select_key(&axis, "Malloc_Not_Svelte").unwrap(),
      "//build/bazel/product_variables:malloc_not_svelte"
    );
  }

  #[test]
  fn closed_axes_reject_unknown_values() {
    let err = registry().validate(&ConfigurationAxis::ARCH, "riscv64").unwrap_err();
    assert_eq!(
      err,
      AxisError::UnknownConfig {
        axis: ConfigurationAxis::ARCH,
        config: "riscv64".to_string()
      }
    );
    assert_eq!(err.to_string(), "unknown arch: riscv64");

    // Values of one axis are not valid on another.
    assert!(registry().validate(&ConfigurationAxis::OS, "arm").is_err());
    assert!(registry().validate(&ConfigurationAxis::BIONIC, "android").is_err());
  }

  #[test]
  fn product_variables_accept_any_non_empty_value() {
    let axis = ConfigurationAxis::product_variable("eng");
    for config in ["eng", "anything", "With Spaces", "0"] {
      assert!(registry().validate(&axis, config).is_ok());
    }
    assert_eq!(registry().validate(&axis, ""), Err(AxisError::EmptyConfig(axis)));
  }

  #[test]
  fn no_config_axis_is_never_selectable() {
    assert!(registry().validate(&ConfigurationAxis::NO_CONFIG, "").is_ok());
    assert_eq!(
      registry().validate(&ConfigurationAxis::NO_CONFIG, "arm"),
      Err(AxisError::UnexpectedConfig("arm".to_string()))
    );
    assert_eq!(
      registry().select_key(&ConfigurationAxis::NO_CONFIG, ""),
      Err(AxisError::NotSelectable)
    );
  }

  #[test]
  fn custom_registry_replaces_tables() {
    let custom = AxisRegistry::empty().with_closed(ConfigurationType::Arch, [("riscv64", "//platforms:riscv64")]);

    assert_eq!(
      custom.select_key(&ConfigurationAxis::ARCH, "riscv64").unwrap(),
      "//platforms:riscv64"
    );
    assert!(custom.validate(&ConfigurationAxis::ARCH, "arm").is_err());
    assert_eq!(
      custom.validate(&ConfigurationAxis::OS, "android"),
      Err(AxisError::Unregistered(ConfigurationType::Os))
    );
  }

  #[test]
  fn ranks_follow_table_order_with_default_last() {
    let axis = ConfigurationAxis::ARCH;
    let mut configs = vec![CONDITIONS_DEFAULT_CONFIG_KEY, "x86_64", "arm", "x86", "arm64"];
    configs.sort_by_key(|c| registry().config_rank(&axis, c));
    assert_eq!(configs, ["arm", "arm64", "x86", "x86_64", CONDITIONS_DEFAULT_CONFIG_KEY]);

    let pv = ConfigurationAxis::product_variable("eng");
    assert!(registry().config_rank(&pv, "zzz") < registry().config_rank(&pv, CONDITIONS_DEFAULT_CONFIG_KEY));
  }
}
