use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::TOPLEVEL_DIR;

/// A Bazel label: a source path relative to the package (`src/a.c`) or a
/// target reference (`:foo`, `//a/b:foo`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub String);

impl Label {
  pub fn new(label: impl Into<String>) -> Self {
    Self(label.into())
  }

  /// Label of module `name` declared in `module_dir`, as seen from a target
  /// in `from_dir`.
  pub fn for_module(name: &str, module_dir: &str, from_dir: &str) -> Self {
    if module_dir == from_dir {
      Self(format!(":{}", name))
    } else if module_dir == TOPLEVEL_DIR || module_dir.is_empty() {
      Self(format!("//:{}", name))
    } else {
      Self(format!("//{}:{}", module_dir, name))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for Label {
  fn from(label: &str) -> Self {
    Label::new(label)
  }
}
