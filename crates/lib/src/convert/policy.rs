//! Apex availability check.
//!
//! Every module an apex pulls in, directly or through another module's
//! dependency properties (a classpath fragment's `contents` for instance),
//! must name the apex in its `apex_available` list.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use thiserror::Error;
use tracing::debug;

use crate::consts::ANY_APEX;

use super::ModuleIndex;
use super::schema::ConverterRegistry;
use super::types::{ConvertError, ModuleSnapshot, PropertyValue};

/// Module type whose dependencies are checked.
pub const APEX_MODULE_TYPE: &str = "apex";

/// Property listing the apexes a module may be bundled into.
pub const APEX_AVAILABLE_PROPERTY: &str = "apex_available";

/// Errors from cross-module checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
  #[error("\"{apex}\" requires \"{dependency}\" that doesn't list the APEX under 'apex_available'.")]
  NotAvailable { apex: String, dependency: String },
}

/// Dependency graph over the modules of one run. Dependencies naming
/// modules outside the index are ignored.
struct DependencyGraph<'a> {
  graph: DiGraph<&'a ModuleSnapshot, ()>,
  nodes: BTreeMap<&'a str, NodeIndex>,
}

impl<'a> DependencyGraph<'a> {
  fn build(index: &ModuleIndex<'a>, converters: &ConverterRegistry) -> Result<Self, ConvertError> {
    let mut graph = DiGraph::new();
    let mut nodes = BTreeMap::new();
    for module in index.iter() {
      nodes.insert(module.name.as_str(), graph.add_node(module));
    }

    for module in index.iter() {
      let Some(converter) = converters.get(&module.module_type) else {
        continue;
      };
      let from = nodes[module.name.as_str()];
      for property in converter.dependency_properties() {
        for dependency in dependency_names(module, property)? {
          if let Some(&to) = nodes.get(dependency) {
            graph.add_edge(from, to, ());
          }
        }
      }
    }

    Ok(Self { graph, nodes })
  }

  /// Modules reachable from `name`, excluding itself, in name order.
  fn reachable(&self, name: &str) -> Vec<&'a ModuleSnapshot> {
    let Some(&start) = self.nodes.get(name) else {
      return Vec::new();
    };
    let mut found = Vec::new();
    let mut dfs = Dfs::new(&self.graph, start);
    while let Some(node) = dfs.next(&self.graph) {
      if node != start {
        found.push(self.graph[node]);
      }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
  }
}

fn dependency_names<'m>(module: &'m ModuleSnapshot, property: &str) -> Result<Vec<&'m str>, ConvertError> {
  match module.property(property) {
    None => Ok(Vec::new()),
    Some(PropertyValue::String(name)) => Ok(vec![name.as_str()]),
    Some(PropertyValue::List(names)) => Ok(names.iter().map(String::as_str).collect()),
    Some(_) => Err(ConvertError::InvalidProperty {
      module: module.name.clone(),
      property: property.to_string(),
      expected: "a module name or a list of module names",
    }),
  }
}

fn is_available(module: &ModuleSnapshot, apex: &str) -> Result<bool, ConvertError> {
  let allowed = module.list_property(APEX_AVAILABLE_PROPERTY)?.unwrap_or_default();
  Ok(allowed.iter().any(|entry| entry == apex || entry == ANY_APEX))
}

/// Check every apex in `index` against the `apex_available` lists of the
/// modules it reaches.
///
/// Apexes are checked in name order and the first offending dependency, in
/// name order, is reported.
pub fn check_apex_available(index: &ModuleIndex<'_>, converters: &ConverterRegistry) -> Result<(), ConvertError> {
  let graph = DependencyGraph::build(index, converters)?;
  for apex in index.iter().filter(|module| module.module_type == APEX_MODULE_TYPE) {
    let reachable = graph.reachable(&apex.name);
    debug!(apex = %apex.name, dependencies = reachable.len(), "checking apex availability");
    for dependency in reachable {
      if !is_available(dependency, &apex.name)? {
        return Err(
          PolicyError::NotAvailable {
            apex: apex.name.clone(),
            dependency: dependency.name.clone(),
          }
          .into(),
        );
      }
    }
  }
  Ok(())
}
