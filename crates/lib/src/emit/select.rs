//! Decomposition of a resolved list into additive `select()` clauses.
//!
//! A list configured on several axes is rendered as
//! `common + select(axis1) + select(axis2)`, where the consumer concatenates
//! the matching branch of every clause. Base items that stay in every
//! branch form `common`. A base item that some config removes is moved into
//! the clause of that axis: it then appears in every branch of the axis that
//! keeps it, including the default branch.
//!
//! An item removed on two different axes cannot be expressed additively. It
//! is owned by the first axis and the removal on the later axis is lost
//! (logged as a warning).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use tracing::warn;

use crate::attribute::ResolvedList;
use crate::axis::{AxisError, AxisRegistry, ConfigurationAxis};
use crate::consts::{CONDITIONS_DEFAULT_CONFIG_KEY, CONDITIONS_DEFAULT_SELECT_KEY};

/// One `select()` over a single axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectClause<T> {
  pub axis: ConfigurationAxis,
  /// `(select key, value)` in emission order, without the default branch.
  pub branches: Vec<(String, Vec<T>)>,
  pub default: Vec<T>,
}

impl<T> SelectClause<T> {
  /// Branches followed by the default branch.
  pub fn entries(&self) -> impl Iterator<Item = (&str, &[T])> {
    self
      .branches
      .iter()
      .map(|(key, value)| (key.as_str(), value.as_slice()))
      .chain(std::iter::once((CONDITIONS_DEFAULT_SELECT_KEY, self.default.as_slice())))
  }
}

/// `common + select(..) + select(..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectExpr<T> {
  pub common: Vec<T>,
  pub clauses: Vec<SelectClause<T>>,
}

impl<T> SelectExpr<T> {
  pub fn is_empty(&self) -> bool {
    self.common.is_empty() && self.clauses.is_empty()
  }

  /// Whether the expression is a plain list.
  pub fn is_scalar(&self) -> bool {
    self.clauses.is_empty()
  }
}

/// Split `list` into additive clauses.
///
/// A list that is uniform across every axis comes back as a plain list.
/// Branches equal to their clause's default are dropped, and a clause left
/// with no other branch is folded into `common`.
///
/// Configs of an open axis that share a select key are merged into one
/// branch, keeping first-seen order.
pub fn decompose<T>(list: &ResolvedList<T>, registry: &AxisRegistry) -> Result<SelectExpr<T>, AxisError>
where
  T: Clone + Eq + Hash + fmt::Debug,
{
  let base = list.value();
  if list.is_uniform() {
    return Ok(SelectExpr {
      common: base.to_vec(),
      clauses: Vec::new(),
    });
  }

  let mut owners: HashMap<&T, &ConfigurationAxis> = HashMap::new();
  for item in base {
    let mut removing = list
      .axes()
      .filter(|(_, configs)| configs.values().any(|value| !value.contains(item)))
      .map(|(axis, _)| axis);
    if let Some(owner) = removing.next() {
      owners.insert(item, owner);
      for other in removing {
        warn!(item = ?item, owner = %owner, axis = %other, "item excluded on several axes, dropping the later exclusion");
      }
    }
  }

  let base_items: HashSet<&T> = base.iter().collect();
  let mut common: Vec<T> = base.iter().filter(|item| !owners.contains_key(item)).cloned().collect();
  let mut clauses = Vec::new();

  for (axis, configs) in list.axes() {
    let branch = |value: &[T]| -> Vec<T> {
      value
        .iter()
        .filter(|item| !base_items.contains(item) || owners.get(item) == Some(&axis))
        .cloned()
        .collect()
    };

    let default = branch(configs.get(CONDITIONS_DEFAULT_CONFIG_KEY).map_or(base, Vec::as_slice));

    let mut configured = Vec::new();
    for (config, value) in configs {
      if config.as_str() != CONDITIONS_DEFAULT_CONFIG_KEY {
        let rank = registry.config_rank(axis, config);
        configured.push((rank, registry.select_key(axis, config)?, config, value));
      }
    }
    configured.sort_by(|(rank_a, key_a, config_a, _), (rank_b, key_b, config_b, _)| {
      rank_a.cmp(rank_b).then_with(|| key_a.cmp(key_b)).then_with(|| config_a.cmp(config_b))
    });

    // Open vocabularies may map several configs onto one key.
    let mut merged: Vec<(String, Vec<T>)> = Vec::new();
    for (_, key, _, value) in configured {
      let value = branch(value);
      match merged.last_mut() {
        Some((last, items)) if *last == key => {
          for item in value {
            if !items.contains(&item) {
              items.push(item);
            }
          }
        }
        _ => merged.push((key, value)),
      }
    }
    let branches: Vec<(String, Vec<T>)> = merged.into_iter().filter(|(_, value)| *value != default).collect();

    if branches.is_empty() {
      for item in default {
        if !common.contains(&item) {
          common.push(item);
        }
      }
      continue;
    }

    clauses.push(SelectClause {
      axis: axis.clone(),
      branches,
      default,
    });
  }

  Ok(SelectExpr { common, clauses })
}
