//! Which modules get converted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::TOPLEVEL_DIR;

use super::types::ModuleSnapshot;

/// Conversion default of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
  /// Modules in this directory are converted.
  DefaultTrue,
  /// Modules in this directory are not converted.
  DefaultFalse,
  /// Modules in this directory and every directory below it are converted.
  DefaultTrueRecursively,
}

/// Conversion settings, usually read from a JSON file.
///
/// ```json
/// {
///   "dirs": { ".": "default_true_recursively", "vendor": "default_false" },
///   "enforce_apex_available": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
  /// Availability per directory, keyed by path relative to the source root.
  #[serde(default = "default_dirs")]
  pub dirs: BTreeMap<String, Availability>,
  /// Reject apexes that depend on modules not listing them in
  /// `apex_available`.
  #[serde(default)]
  pub enforce_apex_available: bool,
}

fn default_dirs() -> BTreeMap<String, Availability> {
  BTreeMap::from([(TOPLEVEL_DIR.to_string(), Availability::DefaultTrueRecursively)])
}

impl Default for ConversionConfig {
  fn default() -> Self {
    Self {
      dirs: default_dirs(),
      enforce_apex_available: false,
    }
  }
}

impl ConversionConfig {
  /// A config that converts nothing unless modules opt in.
  pub fn empty() -> Self {
    Self {
      dirs: BTreeMap::new(),
      enforce_apex_available: false,
    }
  }

  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn with_dir(mut self, dir: impl Into<String>, availability: Availability) -> Self {
    self.dirs.insert(dir.into(), availability);
    self
  }

  pub fn with_apex_available_check(mut self, enforce: bool) -> Self {
    self.enforce_apex_available = enforce;
    self
  }

  /// Whether `module` is converted.
  ///
  /// The module's own `bp2build_available` wins. Otherwise the entry for its
  /// directory decides, and failing that the nearest ancestor marked
  /// `default_true_recursively`.
  pub fn is_converted(&self, module: &ModuleSnapshot) -> bool {
    if let Some(available) = module.bazel_module.bp2build_available {
      return available;
    }
    self.is_dir_converted(&module.dir)
  }

  /// Directory part of [`is_converted`](Self::is_converted).
  pub fn is_dir_converted(&self, dir: &str) -> bool {
    if let Some(availability) = self.dirs.get(dir) {
      return *availability != Availability::DefaultFalse;
    }
    ancestors(dir).any(|ancestor| self.dirs.get(ancestor) == Some(&Availability::DefaultTrueRecursively))
  }
}

/// Proper ancestors of `dir`, nearest first, ending at the top level.
fn ancestors(dir: &str) -> impl Iterator<Item = &str> {
  let parents = std::iter::successors(Some(dir), |&d| d.rfind('/').map(|i| &d[..i])).skip(1);
  let top = (dir != TOPLEVEL_DIR && !dir.is_empty()).then_some(TOPLEVEL_DIR);
  parents.chain(top)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn module(dir: &str) -> ModuleSnapshot {
    ModuleSnapshot::new("m", "filegroup").in_dir(dir)
  }

  #[test]
  fn ancestors_nearest_first() {
    assert_eq!(ancestors("a/b/c").collect::<Vec<_>>(), ["a/b", "a", "."]);
    assert_eq!(ancestors(".").count(), 0);
  }

  #[test]
  fn default_converts_everything() {
    let config = ConversionConfig::default();
    assert!(config.is_converted(&module(".")));
    assert!(config.is_converted(&module("a/b")));
  }

  #[test]
  fn module_flag_wins_over_directory() {
    let config = ConversionConfig::default();
    assert!(!config.is_converted(&module("a").with_bp2build_available(false)));

    let config = ConversionConfig::empty();
    assert!(config.is_converted(&module("a").with_bp2build_available(true)));
  }

  #[test]
  fn non_recursive_entries_apply_to_their_directory_only() {
    let config = ConversionConfig::empty()
      .with_dir("a", Availability::DefaultTrue)
      .with_dir("b", Availability::DefaultTrueRecursively)
      .with_dir("b/off", Availability::DefaultFalse);

    assert!(config.is_converted(&module("a")));
    assert!(!config.is_converted(&module("a/sub")));
    assert!(config.is_converted(&module("b/x/y")));
    assert!(!config.is_converted(&module("b/off")));
    assert!(config.is_converted(&module("b/off/below")));
    assert!(!config.is_converted(&module("c")));
  }

  #[test]
  fn config_from_json() {
    let config = ConversionConfig::from_json(r#"{ "dirs": { "vendor": "default_false" }, "enforce_apex_available": true }"#)
      .unwrap();
    assert!(config.enforce_apex_available);
    assert!(!config.is_dir_converted("vendor"));
    assert!(!config.is_dir_converted("system"));

    let config = ConversionConfig::from_json("{}").unwrap();
    assert_eq!(config, ConversionConfig::default());
  }
}
