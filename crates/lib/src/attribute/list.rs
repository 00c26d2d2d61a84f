//! Configurable list attributes.
//!
//! A [`ConfigurableList`] collects a base value plus per-(axis, config)
//! overrides and exclusions while a module's variant snapshots are walked.
//! Exclusions are applied lazily by [`ConfigurableList::resolve_excludes`]
//! because overrides and excludes may arrive in separate passes. Once the
//! walk is done, [`ConfigurableList::resolve`] freezes the attribute into a
//! [`ResolvedList`], which is the only form the emitter accepts.
//!
//! # Resolution
//!
//! For every recorded pair the effective value is
//! `dedup(base ++ override) \ excludes`, keeping first-seen order.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use crate::axis::{AxisRegistry, ConfigurationAxis, ConfigurationType};

/// Per-axis, per-config values.
pub type AxisValues<T> = BTreeMap<ConfigurationAxis, BTreeMap<String, Vec<T>>>;

/// A list attribute in its accumulating phase.
#[derive(Debug, Clone)]
pub struct ConfigurableList<'r, T> {
  registry: &'r AxisRegistry,
  base: Vec<T>,
  base_excludes: Vec<T>,
  overrides: AxisValues<T>,
  excludes: AxisValues<T>,
  resolved: AxisValues<T>,
}

impl<'r, T> ConfigurableList<'r, T>
where
  T: Clone + Eq + Hash,
{
  pub fn new(registry: &'r AxisRegistry) -> Self {
    Self {
      registry,
      base: Vec::new(),
      base_excludes: Vec::new(),
      overrides: BTreeMap::new(),
      excludes: BTreeMap::new(),
      resolved: BTreeMap::new(),
    }
  }

  pub fn with_value(registry: &'r AxisRegistry, value: Vec<T>) -> Self {
    let mut list = Self::new(registry);
    list.set_value(value);
    list
  }

  /// Set the unconditional value, replacing any previous one.
  ///
  /// Pairs resolved before this call keep the base they were resolved
  /// against.
  pub fn set_value(&mut self, value: Vec<T>) {
    self.base = value;
  }

  pub fn value(&self) -> &[T] {
    &self.base
  }

  /// Record the override for `config` on `axis`. A later call for the same
  /// pair replaces the earlier one. On the no-config axis this sets the base
  /// value.
  ///
  /// # Panics
  ///
  /// Panics if `config` is not a valid value of `axis` in the registry. The
  /// caller asked for a variant the platform tables do not define, which is
  /// a defect in the conversion code rather than bad module data.
  pub fn set_select_value(&mut self, axis: &ConfigurationAxis, config: &str, value: Vec<T>) {
    self.check(axis, config);
    if axis.kind() == ConfigurationType::NoConfig {
      self.base = value;
      return;
    }
    self
      .overrides
      .entry(axis.clone())
      .or_default()
      .insert(config.to_string(), value);
  }

  /// Record the exclusions for `config` on `axis`. On the no-config axis the
  /// exclusions apply to the base value.
  ///
  /// # Panics
  ///
  /// Same as [`set_select_value`](Self::set_select_value).
  pub fn set_select_excludes(&mut self, axis: &ConfigurationAxis, config: &str, excludes: Vec<T>) {
    self.check(axis, config);
    if axis.kind() == ConfigurationType::NoConfig {
      self.base_excludes = excludes;
      return;
    }
    self
      .excludes
      .entry(axis.clone())
      .or_default()
      .insert(config.to_string(), excludes);
  }

  /// Whether any axis carries a value or exclusion.
  pub fn has_configurable_values(&self) -> bool {
    [&self.overrides, &self.excludes, &self.resolved]
      .iter()
      .any(|values| values.values().any(|configs| !configs.is_empty()))
  }

  /// Apply pending exclusions to every recorded pair.
  ///
  /// Pending overrides and exclusions are consumed, so calling this again
  /// without new input changes nothing. Input arriving for a pair that is
  /// already resolved applies on top of its resolved value.
  pub fn resolve_excludes(&mut self) {
    if !self.base_excludes.is_empty() {
      let excludes = std::mem::take(&mut self.base_excludes);
      self.base = merge(&self.base, &[], &excludes);
    }
    self.base = merge(&self.base, &[], &[]);

    let mut pairs: Vec<(ConfigurationAxis, String)> = Vec::new();
    for values in [&self.overrides, &self.excludes] {
      for (axis, configs) in values {
        for config in configs.keys() {
          pairs.push((axis.clone(), config.clone()));
        }
      }
    }
    pairs.sort();
    pairs.dedup();

    for (axis, config) in pairs {
      let value = take_pair(&mut self.overrides, &axis, &config);
      let excludes = take_pair(&mut self.excludes, &axis, &config);
      let configs = self.resolved.entry(axis).or_default();
      let start = configs.get(&config).unwrap_or(&self.base);
      let resolved = merge(start, &value, &excludes);
      configs.insert(config, resolved);
    }

    self.overrides.retain(|_, configs| !configs.is_empty());
    self.excludes.retain(|_, configs| !configs.is_empty());
  }

  /// Resolve and freeze the attribute.
  pub fn resolve(mut self) -> ResolvedList<T> {
    self.resolve_excludes();
    ResolvedList {
      base: self.base,
      axes: self.resolved,
    }
  }

  fn check(&self, axis: &ConfigurationAxis, config: &str) {
    if let Err(e) = self.registry.validate(axis, config) {
      panic!("{}", e);
    }
  }
}

fn take_pair<T>(values: &mut AxisValues<T>, axis: &ConfigurationAxis, config: &str) -> Vec<T> {
  values
    .get_mut(axis)
    .and_then(|configs| configs.remove(config))
    .unwrap_or_default()
}

/// `dedup(base ++ extra) \ excludes`, keeping first-seen order.
fn merge<T: Clone + Eq + Hash>(base: &[T], extra: &[T], excludes: &[T]) -> Vec<T> {
  let excluded: HashSet<&T> = excludes.iter().collect();
  let mut seen: HashSet<&T> = HashSet::new();
  base
    .iter()
    .chain(extra)
    .filter(|item| !excluded.contains(item) && seen.insert(*item))
    .cloned()
    .collect()
}

/// A list attribute after exclusions have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedList<T> {
  base: Vec<T>,
  axes: AxisValues<T>,
}

impl<T> ResolvedList<T>
where
  T: Clone + Eq + Hash,
{
  /// A list with no configurable values.
  pub fn from_value(value: Vec<T>) -> Self {
    Self {
      base: merge(&value, &[], &[]),
      axes: BTreeMap::new(),
    }
  }

  pub fn value(&self) -> &[T] {
    &self.base
  }

  /// The effective value of one (axis, config) pair, if it was configured.
  pub fn select_value(&self, axis: &ConfigurationAxis, config: &str) -> Option<&[T]> {
    self.axes.get(axis)?.get(config).map(Vec::as_slice)
  }

  pub fn axes(&self) -> impl Iterator<Item = (&ConfigurationAxis, &BTreeMap<String, Vec<T>>)> {
    self.axes.iter()
  }

  /// The common value of `axis` when every configured pair on it resolves
  /// to the base value.
  pub fn uniform_value(&self, axis: &ConfigurationAxis) -> Option<&[T]> {
    match self.axes.get(axis) {
      Some(configs) if configs.values().any(|value| *value != self.base) => None,
      _ => Some(&self.base),
    }
  }

  /// Whether every axis is uniform, i.e. the attribute is really a scalar.
  pub fn is_uniform(&self) -> bool {
    self.axes.keys().all(|axis| self.uniform_value(axis).is_some())
  }

  /// Whether the value is empty in every branch.
  pub fn is_empty(&self) -> bool {
    self.base.is_empty() && self.axes.values().all(|configs| configs.values().all(Vec::is_empty))
  }
}

impl<T> Default for ResolvedList<T> {
  fn default() -> Self {
    Self {
      base: Vec::new(),
      axes: BTreeMap::new(),
    }
  }
}
