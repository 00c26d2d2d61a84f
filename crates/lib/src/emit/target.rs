//! Emission records: targets ready to be rendered into BUILD files.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::attribute::{Label, ResolvedList};
use crate::axis::{AxisError, AxisRegistry};

use super::starlark::render_build_file;

/// Value of one target attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
  Bool(bool),
  Int(i64),
  String(String),
  Label(Label),
  StringList(ResolvedList<String>),
  LabelList(ResolvedList<Label>),
}

/// A target generated from a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BazelTarget {
  pub name: String,
  pub rule_class: String,
  /// `.bzl` file defining `rule_class`, when it is not a native rule.
  pub bzl_load_location: Option<String>,
  /// Directory of the BUILD file the target lives in.
  pub dir: String,
  /// Attributes other than `name`.
  pub attrs: BTreeMap<String, AttrValue>,
}

impl BazelTarget {
  pub fn new(name: impl Into<String>, rule_class: impl Into<String>, dir: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      rule_class: rule_class.into(),
      bzl_load_location: None,
      dir: dir.into(),
      attrs: BTreeMap::new(),
    }
  }

  pub fn with_load_location(mut self, location: impl Into<String>) -> Self {
    self.bzl_load_location = Some(location.into());
    self
  }

  pub fn with_attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
    self.set_attr(name, value);
    self
  }

  pub fn set_attr(&mut self, name: impl Into<String>, value: AttrValue) {
    self.attrs.insert(name.into(), value);
  }
}

/// A target rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTarget {
  pub name: String,
  pub rule_class: String,
  pub bzl_load_location: Option<String>,
  /// Rendered value of every emitted attribute except `name`.
  pub attributes: BTreeMap<String, String>,
  /// The full rule invocation.
  pub content: String,
}

/// Targets grouped by directory, each directory sorted by target name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildFiles {
  dirs: BTreeMap<String, Vec<BazelTarget>>,
}

impl BuildFiles {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a target in name order.
  ///
  /// Returns `false`, leaving the collection untouched, if the directory
  /// already has a target with that name.
  pub fn insert(&mut self, target: BazelTarget) -> bool {
    let targets = self.dirs.entry(target.dir.clone()).or_default();
    match targets.binary_search_by(|t| t.name.cmp(&target.name)) {
      Ok(_) => false,
      Err(pos) => {
        targets.insert(pos, target);
        true
      }
    }
  }

  pub fn targets(&self, dir: &str) -> &[BazelTarget] {
    self.dirs.get(dir).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn dirs(&self) -> impl Iterator<Item = &str> {
    self.dirs.keys().map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[BazelTarget])> {
    self.dirs.iter().map(|(dir, targets)| (dir.as_str(), targets.as_slice()))
  }

  /// Total number of targets.
  pub fn len(&self) -> usize {
    self.dirs.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Render every directory to the content of its BUILD file.
  pub fn render(&self, registry: &AxisRegistry) -> Result<BTreeMap<String, String>, AxisError> {
    self
      .dirs
      .iter()
      .map(|(dir, targets)| Ok((dir.clone(), render_build_file(targets, registry)?)))
      .collect()
  }
}
