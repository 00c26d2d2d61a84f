//! Axes command implementation.
//!
//! Lists every configuration axis with the values it accepts and the select
//! key each value maps to.

use anyhow::Result;
use serde::Serialize;

use selectgen_lib::axis::{AxisRegistry, Vocabulary};

use crate::output::{OutputFormat, print_info, print_json, print_mapping};

#[derive(Serialize)]
struct AxisOutput {
  axis: String,
  /// Package of an open vocabulary, which accepts any non-empty value.
  #[serde(skip_serializing_if = "Option::is_none")]
  open_package: Option<String>,
  values: Vec<ValueOutput>,
}

#[derive(Serialize)]
struct ValueOutput {
  config: String,
  select_key: String,
}

fn collect_axes(registry: &AxisRegistry) -> Vec<AxisOutput> {
  registry
    .vocabularies()
    .map(|(kind, vocabulary)| match vocabulary {
      Vocabulary::Closed(table) => AxisOutput {
        axis: kind.to_string(),
        open_package: None,
        values: table
          .iter()
          .map(|(config, select_key)| ValueOutput {
            config: config.clone(),
            select_key: select_key.clone(),
          })
          .collect(),
      },
      Vocabulary::Open { package } => AxisOutput {
        axis: kind.to_string(),
        open_package: Some(package.clone()),
        values: Vec::new(),
      },
    })
    .collect()
}

pub fn cmd_axes(output: OutputFormat) -> Result<()> {
  let axes = collect_axes(AxisRegistry::global());

  if output.is_json() {
    return print_json(&axes);
  }

  for (i, axis) in axes.iter().enumerate() {
    if i > 0 {
      println!();
    }
    match &axis.open_package {
      Some(package) => {
        print_info(&format!("{} (any value)", axis.axis));
        print_mapping("<value>", &format!("{}:<value>", package), 0);
      }
      None => {
        print_info(&axis.axis);
        let width = axis.values.iter().map(|v| v.config.len()).max().unwrap_or(0);
        for value in &axis.values {
          print_mapping(&value.config, &value.select_key, width);
        }
      }
    }
  }
  Ok(())
}
