//! Starlark rendering of targets and BUILD files.
//!
//! The layout matches what the downstream formatter expects, so generated
//! files can be compared textually:
//!
//! ```text
//! load("//build/bazel/rules:rules.bzl", "my_library")
//!
//! my_library(
//!     name = "foo",
//!     srcs = ["a.c"] + select({
//!         "//build/bazel/platforms/arch:arm": ["arm.c"],
//!         "//conditions:default": [],
//!     }),
//! )
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::attribute::{Label, ResolvedList};
use crate::axis::{AxisError, AxisRegistry};

use super::select::{SelectExpr, decompose};
use super::target::{AttrValue, BazelTarget, RenderedTarget};

const INDENT: &str = "    ";

/// A list element that renders as a Starlark literal.
pub trait StarlarkValue {
  fn to_starlark(&self) -> String;
}

impl StarlarkValue for String {
  fn to_starlark(&self) -> String {
    quote(self)
  }
}

impl StarlarkValue for Label {
  fn to_starlark(&self) -> String {
    quote(self.as_str())
  }
}

/// Quote `s` as a Starlark string literal.
pub fn quote(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 2);
  out.push('"');
  for c in s.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      _ => out.push(c),
    }
  }
  out.push('"');
  out
}

fn pad(level: usize) -> String {
  INDENT.repeat(level)
}

/// Render a list whose opening bracket sits on a line indented `level` times.
fn render_list<T: StarlarkValue>(items: &[T], level: usize) -> String {
  match items {
    [] => "[]".to_string(),
    [item] => format!("[{}]", item.to_starlark()),
    _ => {
      let mut out = String::from("[\n");
      for item in items {
        out.push_str(&format!("{}{},\n", pad(level + 1), item.to_starlark()));
      }
      out.push_str(&pad(level));
      out.push(']');
      out
    }
  }
}

fn render_expr<T: StarlarkValue>(expr: &SelectExpr<T>, level: usize) -> String {
  let mut parts = Vec::new();
  if !expr.common.is_empty() || expr.clauses.is_empty() {
    parts.push(render_list(&expr.common, level));
  }
  for clause in &expr.clauses {
    let mut out = String::from("select({\n");
    for (key, value) in clause.entries() {
      out.push_str(&format!(
        "{}{}: {},\n",
        pad(level + 1),
        quote(key),
        render_list(value, level + 1)
      ));
    }
    out.push_str(&pad(level));
    out.push_str("})");
    parts.push(out);
  }
  parts.join(" + ")
}

fn render_configurable<T>(list: &ResolvedList<T>, registry: &AxisRegistry) -> Result<Option<String>, AxisError>
where
  T: StarlarkValue + Clone + Eq + Hash + Debug,
{
  if list.is_empty() {
    return Ok(None);
  }
  Ok(Some(render_expr(&decompose(list, registry)?, 1)))
}

/// Render one attribute value, or `None` when it has nothing to emit.
pub fn render_value(value: &AttrValue, registry: &AxisRegistry) -> Result<Option<String>, AxisError> {
  match value {
    AttrValue::Bool(true) => Ok(Some("True".to_string())),
    AttrValue::Bool(false) => Ok(Some("False".to_string())),
    AttrValue::Int(n) => Ok(Some(n.to_string())),
    AttrValue::String(s) => Ok(Some(quote(s))),
    AttrValue::Label(label) => Ok(Some(label.to_starlark())),
    AttrValue::StringList(list) => render_configurable(list, registry),
    AttrValue::LabelList(list) => render_configurable(list, registry),
  }
}

/// Render a target as a rule invocation, `name` first and the remaining
/// attributes in alphabetical order.
pub fn render_target(target: &BazelTarget, registry: &AxisRegistry) -> Result<RenderedTarget, AxisError> {
  let mut attributes = BTreeMap::new();
  for (name, value) in &target.attrs {
    if let Some(rendered) = render_value(value, registry)? {
      attributes.insert(name.clone(), rendered);
    }
  }

  let mut content = format!("{}(\n{}name = {},\n", target.rule_class, INDENT, quote(&target.name));
  for (name, rendered) in &attributes {
    content.push_str(&format!("{}{} = {},\n", INDENT, name, rendered));
  }
  content.push(')');

  Ok(RenderedTarget {
    name: target.name.clone(),
    rule_class: target.rule_class.clone(),
    bzl_load_location: target.bzl_load_location.clone(),
    attributes,
    content,
  })
}

/// `load()` statements for the non-native rules used by `targets`, one per
/// location, locations and symbols sorted.
pub fn load_statements(targets: &[BazelTarget]) -> Vec<String> {
  let mut loads: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
  for target in targets {
    if let Some(location) = &target.bzl_load_location {
      loads.entry(location).or_default().insert(&target.rule_class);
    }
  }
  loads
    .into_iter()
    .map(|(location, symbols)| {
      let symbols: Vec<String> = symbols.into_iter().map(quote).collect();
      format!("load({}, {})", quote(location), symbols.join(", "))
    })
    .collect()
}

/// Content of one BUILD file holding `targets`, in the given order.
pub fn render_build_file(targets: &[BazelTarget], registry: &AxisRegistry) -> Result<String, AxisError> {
  let mut sections = Vec::new();
  let loads = load_statements(targets);
  if !loads.is_empty() {
    sections.push(loads.join("\n"));
  }
  for target in targets {
    sections.push(render_target(target, registry)?.content);
  }
  let mut out = sections.join("\n\n");
  out.push('\n');
  Ok(out)
}
