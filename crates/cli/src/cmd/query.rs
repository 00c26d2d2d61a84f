//! Query command implementation.
//!
//! Decodes one reply line of the configured-query tool, as a way to inspect
//! what the engine makes of it.

use anyhow::{Context, Result};
use clap::ValueEnum;

use selectgen_lib::cquery::{GetCcInfo, GetOutputFiles, GetPythonBinary, RequestType};

use crate::output::{OutputFormat, print_json, print_stat};

/// The request the reply line answers.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RequestKind {
  OutputFiles,
  PythonBinary,
  CcInfo,
}

fn parse<R: RequestType>(request: R, line: &str) -> Result<R::Output> {
  request
    .parse_result(line)
    .with_context(|| format!("Failed to parse {} reply", request.name()))
}

pub fn cmd_query(kind: RequestKind, line: &str, output: OutputFormat) -> Result<()> {
  match kind {
    RequestKind::OutputFiles => {
      let files = parse(GetOutputFiles, line)?;
      if output.is_json() {
        return print_json(&files);
      }
      for file in files {
        println!("{}", file);
      }
    }
    RequestKind::PythonBinary => {
      let binary = parse(GetPythonBinary, line)?;
      if output.is_json() {
        return print_json(&binary);
      }
      println!("{}", binary);
    }
    RequestKind::CcInfo => {
      let info = parse(GetCcInfo, line)?;
      if output.is_json() {
        return print_json(&info);
      }
      let fields = [
        ("output_files", &info.output_files),
        ("cc_static_library_files", &info.cc_static_library_files),
        ("cc_object_files", &info.cc_object_files),
        ("includes", &info.includes),
        ("system_includes", &info.system_includes),
        ("root_static_archives", &info.root_static_archives),
        ("root_dynamic_libraries", &info.root_dynamic_libraries),
      ];
      for (label, values) in fields {
        print_stat(label, &values.join(", "));
      }
    }
  }
  Ok(())
}
